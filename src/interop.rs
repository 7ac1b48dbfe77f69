//! interop.rs
//!
//! Custom Yew hooks around the Cloudinary Upload Widget script (no inline JS).
//!
//! # Overview
//! `use_upload_script()` injects a single
//! `<script id="cloudinary-upload-widget" src="https://upload-widget.cloudinary.com/global/all.js" async>`
//! into `<body>` on first use, returns `false` until the
//! script’s `load` event fires, then returns `true`
//! on every subsequent call.
//!
//! # Usage
//! ```rust,ignore
//! use yew::prelude::*;
//! use yew_cloudinary::{use_upload_script, ScriptSource};
//!
//! #[function_component(App)]
//! fn app() -> Html {
//!     let ready = use_upload_script(ScriptSource::default());
//!     html! {
//!         if ready {
//!             <p>{"Upload widget loaded"}</p>
//!         } else {
//!             <p>{"Loading upload widget..."}</p>
//!         }
//!     }
//! }
//! ```

use yew::functional::hook;
use yew::prelude::*;

use crate::client::{AppendUrl, UploadedUrls};
use crate::loader::{ensure_script, DomScriptHost, LoadStep, ScriptLoadState, ScriptSource};

/// Readiness published to descendants of [`UploadWidget`].
///
/// [`UploadWidget`]: crate::UploadWidget
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScriptStatus {
    pub loaded: bool,
}

/// Custom hook: load the upload widget script exactly once and track readiness.
///
/// # Returns
/// - `false` while the `<script>` is being fetched & parsed, and forever if
///   that fetch fails.
/// - `true` once its `load` event fired, or immediately when another mount
///   already inserted the element.
#[hook]
pub fn use_upload_script(source: ScriptSource) -> bool {
    let state = use_state(ScriptLoadState::default);

    {
        let state = state.clone();
        use_effect_with(*state, move |current| {
            let current = *current;
            match DomScriptHost::from_window() {
                Ok(host) => {
                    let on_ready = move || state.set(ScriptLoadState::Loaded);
                    match ensure_script(&host, &source, current, on_ready) {
                        Ok(LoadStep::Injected) => {
                            log::debug!("injected upload widget script `{}`", source.src);
                        }
                        Ok(_) => {}
                        Err(err) => log::warn!("could not load upload widget script: {}", err),
                    }
                }
                Err(err) => log::warn!("could not load upload widget script: {}", err),
            }
            // No cleanup: the element belongs to the document.
            || ()
        });
    }

    (*state).is_loaded()
}

/// Readiness of the nearest enclosing [`UploadWidget`], if any.
///
/// [`UploadWidget`]: crate::UploadWidget
#[hook]
pub fn use_upload_script_status() -> Option<ScriptStatus> {
    use_context::<ScriptStatus>()
}

/// Caller-side list state for `UploadWidget::set_state`.
///
/// Returns the reducer handle to render from and the callback to pass down.
#[hook]
pub fn use_uploaded_urls() -> (UseReducerHandle<UploadedUrls>, Callback<AppendUrl>) {
    let urls = use_reducer(UploadedUrls::default);
    let set_state = {
        let dispatcher = urls.dispatcher();
        use_callback(dispatcher, |update: AppendUrl, dispatcher| {
            dispatcher.dispatch(update)
        })
    };
    (urls, set_state)
}
