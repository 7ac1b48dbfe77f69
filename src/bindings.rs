//! yew_cloudinary/src/bindings.rs
//!
//! Low-level wasm-bindgen bindings to the Cloudinary Upload Widget script.
//!
//! Exposes the raw handles (`JsCloudinary`, `JsUploadWidget`) exactly as the
//! vendor's `all.js` publishes them on `window.cloudinary`.
//! Higher-level wrappers live in `client.rs`.

use wasm_bindgen::prelude::*;
use web_sys::js_sys::{Function, Reflect};

#[wasm_bindgen]
extern "C" {
    //------------------------------------------------------------------------------
    // Core Types
    //------------------------------------------------------------------------------

    /// The `window.cloudinary` namespace object.
    #[derive(Debug, Clone)]
    pub type JsCloudinary;

    /// An upload widget instance returned by `createUploadWidget`.
    #[derive(Debug, Clone)]
    pub type JsUploadWidget;

    //------------------------------------------------------------------------------
    // Constructors
    //------------------------------------------------------------------------------

    /// `cloudinary.createUploadWidget(options, callback)` → `JsUploadWidget`
    ///
    /// ```js
    ///   const widget = cloudinary.createUploadWidget({ cloudName, uploadPreset }, (error, result) => {});
    /// ```
    #[wasm_bindgen(method, catch, js_name = createUploadWidget)]
    pub fn create_upload_widget(
        this: &JsCloudinary,
        options: &JsValue,
        callback: &Function,
    ) -> Result<JsUploadWidget, JsValue>;

    //------------------------------------------------------------------------------
    // Instance Methods
    //------------------------------------------------------------------------------

    /// `widget.open()` → `()`
    #[wasm_bindgen(method, catch)]
    pub fn open(this: &JsUploadWidget) -> Result<(), JsValue>;
}

/// Look up `window.cloudinary`, returning `None` until the widget script has
/// executed (or if something else shadowed it with `null`/`undefined`).
pub fn cloudinary_global() -> Option<JsCloudinary> {
    let window = web_sys::window()?;
    let value = Reflect::get(&window, &JsValue::from_str("cloudinary")).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }
    Some(value.unchecked_into())
}
