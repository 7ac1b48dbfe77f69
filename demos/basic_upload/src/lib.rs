// src/lib.rs
use wasm_bindgen::prelude::*;
use yew::prelude::*;
use yew_cloudinary::{use_upload_script_status, use_uploaded_urls, UploadConfig, UploadWidget};

// Replace with your own cloud name and an unsigned upload preset.
const CLOUD_NAME: &str = "demo";
const UPLOAD_PRESET: &str = "unsigned_demo";

#[wasm_bindgen(start)]
pub fn start() {
    yew::Renderer::<BasicUpload>::new().render();
}

#[function_component(ReadyBadge)]
fn ready_badge() -> Html {
    let loaded = use_upload_script_status().map(|s| s.loaded).unwrap_or(false);
    html! {
        <small style="margin-left:0.5rem;">
            { if loaded { "ready" } else { "loading widget…" } }
        </small>
    }
}

#[function_component(BasicUpload)]
fn basic_upload() -> Html {
    let (urls, set_state) = use_uploaded_urls();
    let public_id = use_state(|| None::<String>);

    let set_public_id = {
        let public_id = public_id.clone();
        Callback::from(move |id: String| {
            log::info!("last public id: {}", id);
            public_id.set(Some(id));
        })
    };

    let config = UploadConfig::new(CLOUD_NAME, UPLOAD_PRESET)
        .with("multiple", true)
        .with("sources", vec!["local", "url", "camera"]);

    html! {
        <div>
            <UploadWidget
                uw_config={config}
                {set_state}
                set_public_id={Some(set_public_id)}>
                <ReadyBadge />
            </UploadWidget>
            {
                if let Some(id) = &*public_id {
                    html! { <p>{ format!("Last public id: {}", id) }</p> }
                } else {
                    html! {}
                }
            }
            <ul>
                { for urls.iter().map(|url| html! {
                    <li><img src={url.clone()} style="max-width:200px;" /></li>
                }) }
            </ul>
        </div>
    }
}
