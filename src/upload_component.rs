//! A drop-in Yew button that opens the Cloudinary Upload Widget.
//!
//! The component loads the widget script once per page, opens a widget on
//! click, and forwards every successful upload into caller-owned state.

use yew::prelude::*;

use crate::client::{open_widget, AppendUrl, CloudinaryFactory, InvokeOutcome, UploadConfig, UploadHandler};
use crate::interop::{use_upload_script, ScriptStatus};
use crate::loader::ScriptSource;

/// Style hook always present on the rendered button.
pub const BUTTON_CLASS: &str = "cloudinary-button";

/// Properties for the [`UploadWidget`] component.
///
/// # Fields
///
/// * `uw_config` – Options for `createUploadWidget`, passed through as-is.
/// * `set_state` – Receives one [`AppendUrl`] per successful upload.
/// * `set_public_id` – Optional; receives the uploaded asset's `public_id`.
/// * `script` – Where to load the widget from (default: Cloudinary's CDN).
/// * `button_label` – Override the button text (default: `"Upload"`).
/// * `class` – Extra classes added after `cloudinary-button`.
/// * `children` – Rendered after the button, inside the [`ScriptStatus`] context.
#[derive(Properties, PartialEq, Clone)]
pub struct UploadWidgetProps {
    pub uw_config: UploadConfig,
    pub set_state: Callback<AppendUrl>,
    #[prop_or_default]
    pub set_public_id: Option<Callback<String>>,
    #[prop_or_default]
    pub script: ScriptSource,
    #[prop_or_default]
    pub button_label: Option<AttrValue>,
    #[prop_or_default]
    pub class: Classes,
    #[prop_or_default]
    pub children: Children,
}

/// Button that opens the Cloudinary Upload Widget.
///
/// Clicking before the script has loaded, or while `window.cloudinary` is
/// missing, does nothing. Vendor errors and non-success events never reach
/// the caller.
///
/// # Example
///
/// ```rust,ignore
/// use yew::prelude::*;
/// use yew_cloudinary::{use_uploaded_urls, UploadConfig, UploadWidget};
///
/// #[function_component(Gallery)]
/// fn gallery() -> Html {
///     let (urls, set_state) = use_uploaded_urls();
///     let public_id = use_state(|| None::<String>);
///     let set_public_id = {
///         let public_id = public_id.clone();
///         Callback::from(move |id: String| public_id.set(Some(id)))
///     };
///
///     html! {
///         <>
///             <UploadWidget
///                 uw_config={UploadConfig::new("demo", "unsigned_preset")}
///                 {set_state}
///                 set_public_id={Some(set_public_id)}
///             />
///             { for urls.iter().map(|url| html! { <img src={url.clone()} /> }) }
///         </>
///     }
/// }
/// ```
#[function_component(UploadWidget)]
pub fn upload_widget(props: &UploadWidgetProps) -> Html {
    let loaded = use_upload_script(props.script.clone());

    let on_click = {
        let config = props.uw_config.clone();
        let handler = UploadHandler::new(props.set_state.clone(), props.set_public_id.clone());

        Callback::from(move |_: MouseEvent| {
            let factory = CloudinaryFactory::from_window();
            match open_widget(loaded.into(), factory.as_ref(), &config, handler.clone()) {
                Ok(InvokeOutcome::Opened) => {}
                Ok(outcome) => log::debug!("upload widget not opened: {:?}", outcome),
                Err(err) => log::warn!("upload widget failed to open: {}", err),
            }
        })
    };

    let label = props
        .button_label
        .clone()
        .unwrap_or_else(|| AttrValue::from("Upload"));

    html! {
        <ContextProvider<ScriptStatus> context={ScriptStatus { loaded }}>
            <button
                type="button"
                onclick={on_click}
                class={classes!(BUTTON_CLASS, props.class.clone())}>
                { label.to_string() }
            </button>
            { for props.children.iter() }
        </ContextProvider<ScriptStatus>>
    }
}
