//! Error type shared by the loader and the widget client.
//!
//! None of these reach the component's caller: the component logs them and
//! stays inert.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("no global `window` available")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    #[error("document has no <body> to attach the script to")]
    NoBody,

    /// A JS call threw; carries the thrown value rendered as text.
    #[error("javascript error: {0}")]
    Js(String),

    /// The upload configuration could not be turned into a JS object.
    #[error("invalid upload configuration: {0}")]
    Config(String),
}

impl From<JsValue> for WidgetError {
    fn from(value: JsValue) -> Self {
        WidgetError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

impl From<serde_wasm_bindgen::Error> for WidgetError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        WidgetError::Config(err.to_string())
    }
}
