//! yew_cloudinary/src/client.rs
//!
//! High-level Rust API over the Cloudinary Upload Widget.
//!
//! This module provides:
//! - `UploadConfig`, the opaque options object handed to `createUploadWidget`.
//! - `UploadResult` / `UploadInfo`, the parts of the vendor callback payload we read.
//! - `AppendUrl` / `UploadedUrls`, an append-only reducer for the caller's URL list.
//! - `UploadHandler`, which turns vendor callbacks into `set_state` / `set_public_id` emits.
//! - `open_widget()`, the readiness-gated invoker, written against `WidgetFactory`.
//! - `CloudinaryFactory`, the `WidgetFactory` backed by `window.cloudinary`.
//!
//! # Example Usage
//! ```rust,ignore
//! use yew::prelude::*;
//! use yew_cloudinary::{open_widget, CloudinaryFactory, ScriptSource, UploadConfig, UploadHandler};
//! use yew_cloudinary::{use_upload_script, use_uploaded_urls};
//!
//! #[function_component(Uploader)]
//! fn uploader() -> Html {
//!     let ready = use_upload_script(ScriptSource::default());
//!     let (urls, set_state) = use_uploaded_urls();
//!
//!     let onclick = Callback::from(move |_: MouseEvent| {
//!         let config = UploadConfig::new("demo", "unsigned_preset");
//!         let handler = UploadHandler::new(set_state.clone(), None);
//!         if let Err(err) = open_widget(ready.into(), CloudinaryFactory::from_window().as_ref(), &config, handler) {
//!             log::warn!("upload widget failed: {}", err);
//!         }
//!     });
//!
//!     html! { <button {onclick}>{ "Upload" }</button> }
//! }
//! ```

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use wasm_bindgen::{prelude::Closure, JsCast, JsValue};
use web_sys::js_sys::{Function, Reflect, JSON};
use yew::functional::Reducible;
use yew::Callback;

use crate::bindings::{cloudinary_global, JsCloudinary, JsUploadWidget};
use crate::error::WidgetError;
use crate::loader::ScriptLoadState;

/// The only callback event tag that carries a finished upload.
pub const SUCCESS_EVENT: &str = "success";

/// Options object for `cloudinary.createUploadWidget(options, ...)`.
///
/// Passed through verbatim; the helpers below only build the object.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct UploadConfig(Map<String, JsonValue>);

impl UploadConfig {
    /// Minimal unsigned-upload config: `{ cloudName, uploadPreset }`.
    pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self::default()
            .with("cloudName", cloud_name.into())
            .with("uploadPreset", upload_preset.into())
    }

    /// Set (or replace) one top-level option, e.g. `with("multiple", false)`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Wrap an existing JSON object.
    pub fn from_value(value: JsonValue) -> Result<Self, WidgetError> {
        match value {
            JsonValue::Object(map) => Ok(Self(map)),
            other => Err(WidgetError::Config(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    /// Convert into a plain JS object (not a `Map`), as the widget expects.
    pub fn to_js(&self) -> Result<JsValue, WidgetError> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        Ok(self.0.serialize(&serializer)?)
    }
}

/// Envelope of every widget callback: `{ event, info }`.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct UploadResult {
    pub event: String,
    /// Shape depends on `event`; only read for `"success"`.
    #[serde(default)]
    pub info: JsonValue,
}

impl UploadResult {
    pub fn is_success(&self) -> bool {
        self.event == SUCCESS_EVENT
    }
}

/// `result.info` of a `"success"` event.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct UploadInfo {
    pub secure_url: String,
    pub public_id: String,

    /// Everything else Cloudinary reports (format, bytes, width, ...).
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// List update emitted through `set_state`: append one URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendUrl(pub String);

impl AppendUrl {
    /// `prev ++ [url]` as a new sequence; `prev` is left untouched.
    pub fn apply(&self, prev: &[String]) -> Vec<String> {
        let mut next = Vec::with_capacity(prev.len() + 1);
        next.extend_from_slice(prev);
        next.push(self.0.clone());
        next
    }
}

/// Caller-owned list of uploaded URLs, replaced wholesale on every append.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadedUrls {
    urls: Vec<String>,
}

impl UploadedUrls {
    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.urls.iter()
    }
}

impl From<Vec<String>> for UploadedUrls {
    fn from(urls: Vec<String>) -> Self {
        Self { urls }
    }
}

impl Reducible for UploadedUrls {
    type Action = AppendUrl;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        Rc::new(Self {
            urls: action.apply(&self.urls),
        })
    }
}

/// Routes widget callbacks into the caller's state hooks.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadHandler {
    set_state: Callback<AppendUrl>,
    set_public_id: Option<Callback<String>>,
}

impl UploadHandler {
    pub fn new(set_state: Callback<AppendUrl>, set_public_id: Option<Callback<String>>) -> Self {
        Self {
            set_state,
            set_public_id,
        }
    }

    /// Handle one `(error, result)` callback already converted to JSON.
    ///
    /// Only an error-free `"success"` result with a readable `info` produces
    /// writes; everything else is dropped.
    pub fn handle(&self, error: Option<JsonValue>, result: Option<JsonValue>) {
        let has_error = error.as_ref().is_some_and(json_is_truthy);
        let event = result
            .as_ref()
            .and_then(|r| r.get("event"))
            .and_then(JsonValue::as_str);
        self.handle_parts(has_error, event, || {
            Ok(result
                .as_ref()
                .and_then(|r| r.get("info"))
                .cloned()
                .unwrap_or(JsonValue::Null))
        });
    }

    /// Decide on the event tag alone; `read_info` runs only for an
    /// error-free `"success"`.
    pub fn handle_parts<I>(&self, has_error: bool, event: Option<&str>, read_info: I)
    where
        I: FnOnce() -> Result<JsonValue, String>,
    {
        if has_error {
            log::debug!("upload widget reported an error");
            return;
        }
        let Some(event) = event else {
            return;
        };
        if event != SUCCESS_EVENT {
            log::trace!("upload widget event `{}`", event);
            return;
        }
        let info = match read_info() {
            Ok(info) => info,
            Err(err) => {
                log::debug!("unreadable upload info: {}", err);
                return;
            }
        };
        let info: UploadInfo = match serde_json::from_value(info) {
            Ok(info) => info,
            Err(err) => {
                log::warn!("success event without usable upload info: {}", err);
                return;
            }
        };

        log::info!("Upload successful: {} ({})", info.public_id, info.secure_url);

        self.set_state.emit(AppendUrl(info.secure_url));
        if let Some(set_public_id) = &self.set_public_id {
            set_public_id.emit(info.public_id);
        }
    }

    /// Adapter for the raw JS callback arguments. Never throws back into
    /// the widget: only `result.event` is read up front, and `result.info`
    /// goes through a `JSON.stringify` whose failure is caught.
    pub fn handle_js(&self, error: &JsValue, result: &JsValue) {
        if error.is_truthy() {
            log::debug!("upload widget reported an error: {:?}", error);
            return;
        }
        let event = if result.is_object() {
            Reflect::get(result, &JsValue::from_str("event"))
                .ok()
                .and_then(|v| v.as_string())
        } else {
            None
        };
        self.handle_parts(false, event.as_deref(), || {
            let info = Reflect::get(result, &JsValue::from_str("info"))
                .map_err(|e| format!("{:?}", e))?;
            let text = JSON::stringify(&info)
                .map_err(|e| format!("{:?}", e))?
                .as_string()
                .ok_or_else(|| "info is not serializable".to_string())?;
            serde_json::from_str(&text).map_err(|e| e.to_string())
        });
    }
}

/// JS truthiness of a JSON value: the widget reports "no error" with any
/// falsy value, not just `null`.
fn json_is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// Builds widgets; `None` in place of a factory means the vendor global is
/// missing.
pub trait WidgetFactory {
    type Widget: UploadWidgetHandle;

    fn create(
        &self,
        config: &UploadConfig,
        handler: UploadHandler,
    ) -> Result<Self::Widget, WidgetError>;
}

pub trait UploadWidgetHandle {
    fn open(&self) -> Result<(), WidgetError>;
}

/// Result of one click.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvokeOutcome {
    NotReady,
    VendorMissing,
    Opened,
}

/// Open a widget if the script is ready and the vendor API is present.
///
/// The two gate failures are ordinary outcomes, not errors: nothing is
/// constructed and no state is written.
pub fn open_widget<F: WidgetFactory>(
    state: ScriptLoadState,
    factory: Option<&F>,
    config: &UploadConfig,
    handler: UploadHandler,
) -> Result<InvokeOutcome, WidgetError> {
    if !state.is_loaded() {
        return Ok(InvokeOutcome::NotReady);
    }
    let Some(factory) = factory else {
        return Ok(InvokeOutcome::VendorMissing);
    };

    let widget = factory.create(config, handler)?;
    widget.open()?;
    Ok(InvokeOutcome::Opened)
}

/// [`WidgetFactory`] over `window.cloudinary`.
#[derive(Debug, Clone)]
pub struct CloudinaryFactory {
    inner: JsCloudinary,
}

impl CloudinaryFactory {
    /// `None` until the widget script has defined `window.cloudinary`.
    pub fn from_window() -> Option<Self> {
        cloudinary_global().map(|inner| Self { inner })
    }
}

impl WidgetFactory for CloudinaryFactory {
    type Widget = CloudinaryWidget;

    fn create(
        &self,
        config: &UploadConfig,
        handler: UploadHandler,
    ) -> Result<CloudinaryWidget, WidgetError> {
        let options = config.to_js()?;

        // The widget may call back long after the creating component is
        // gone, so JS takes ownership of the closure.
        let callback = Closure::<dyn FnMut(JsValue, JsValue)>::new(
            move |error: JsValue, result: JsValue| handler.handle_js(&error, &result),
        );
        let callback: Function = callback.into_js_value().unchecked_into();

        let inner = self.inner.create_upload_widget(&options, &callback)?;
        Ok(CloudinaryWidget { inner })
    }
}

/// A created (not necessarily open) widget.
#[derive(Debug, Clone)]
pub struct CloudinaryWidget {
    inner: JsUploadWidget,
}

impl UploadWidgetHandle for CloudinaryWidget {
    fn open(&self) -> Result<(), WidgetError> {
        self.inner.open().map_err(WidgetError::from)
    }
}
