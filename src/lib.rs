mod bindings;
mod client;
mod error;
mod interop;
mod loader;
mod upload_component;

pub use bindings::*;
pub use client::*;
pub use error::*;
pub use interop::*;
pub use loader::*;
pub use upload_component::*;
