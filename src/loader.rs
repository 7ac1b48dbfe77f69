//! Script loading gate for the vendor upload script.
//!
//! The document is the registry: a `<script>` element carrying a fixed id
//! marks the script as acquired, and nobody ever removes it. `ensure_script`
//! is the lookup-or-create step run from [`use_upload_script`]; it is written
//! against [`ScriptHost`] so the state machine can be exercised without a
//! browser.
//!
//! [`use_upload_script`]: crate::use_upload_script

use wasm_bindgen::{prelude::Closure, JsCast};
use web_sys::{Document, HtmlScriptElement};

use crate::error::WidgetError;

/// DOM id of the injected `<script>` element.
pub const CLOUDINARY_SCRIPT_ID: &str = "cloudinary-upload-widget";

/// Vendor endpoint for the upload widget bundle.
pub const CLOUDINARY_SCRIPT_SRC: &str = "https://upload-widget.cloudinary.com/global/all.js";

/// Identity and location of the shared script resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptSource {
    pub id: String,
    pub src: String,
}

impl Default for ScriptSource {
    fn default() -> Self {
        Self {
            id: CLOUDINARY_SCRIPT_ID.to_string(),
            src: CLOUDINARY_SCRIPT_SRC.to_string(),
        }
    }
}

/// Per-component readiness. `Loaded` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScriptLoadState {
    #[default]
    NotLoaded,
    Loaded,
}

impl ScriptLoadState {
    pub fn is_loaded(self) -> bool {
        self == ScriptLoadState::Loaded
    }
}

impl From<bool> for ScriptLoadState {
    fn from(loaded: bool) -> Self {
        if loaded {
            ScriptLoadState::Loaded
        } else {
            ScriptLoadState::NotLoaded
        }
    }
}

impl From<ScriptLoadState> for bool {
    fn from(state: ScriptLoadState) -> bool {
        state.is_loaded()
    }
}

/// What a single `ensure_script` pass did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStep {
    /// Readiness was already `Loaded`; the document was not touched.
    AlreadyLoaded,
    /// A new element was attached; readiness flips when it fires `onload`.
    Injected,
    /// Another mount already attached the element; readiness was set
    /// immediately, whether or not that script has finished executing.
    FoundExisting,
}

/// Where script elements live.
pub trait ScriptHost {
    /// Whether an element with `id` is already present.
    fn has_script(&self, id: &str) -> bool;

    /// Attach a new async script element and arrange for `on_load` to run
    /// once it has executed.
    fn inject_script(
        &self,
        source: &ScriptSource,
        on_load: Box<dyn FnOnce()>,
    ) -> Result<(), WidgetError>;
}

/// Run one pass of the loading gate.
///
/// `on_ready` is called synchronously when the element already exists, handed
/// to the host as the load handler when it does not, and dropped when the
/// state is already `Loaded`. A script that never loads never calls it.
pub fn ensure_script<H, F>(
    host: &H,
    source: &ScriptSource,
    state: ScriptLoadState,
    on_ready: F,
) -> Result<LoadStep, WidgetError>
where
    H: ScriptHost + ?Sized,
    F: FnOnce() + 'static,
{
    if state.is_loaded() {
        return Ok(LoadStep::AlreadyLoaded);
    }

    if host.has_script(&source.id) {
        on_ready();
        return Ok(LoadStep::FoundExisting);
    }

    host.inject_script(source, Box::new(on_ready))?;
    Ok(LoadStep::Injected)
}

/// [`ScriptHost`] backed by the live browser document.
#[derive(Clone, Debug)]
pub struct DomScriptHost {
    document: Document,
}

impl DomScriptHost {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Host for `window.document`.
    pub fn from_window() -> Result<Self, WidgetError> {
        let document = web_sys::window()
            .ok_or(WidgetError::NoWindow)?
            .document()
            .ok_or(WidgetError::NoDocument)?;
        Ok(Self::new(document))
    }
}

impl ScriptHost for DomScriptHost {
    fn has_script(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn inject_script(
        &self,
        source: &ScriptSource,
        on_load: Box<dyn FnOnce()>,
    ) -> Result<(), WidgetError> {
        let script: HtmlScriptElement = self
            .document
            .create_element("script")?
            .dyn_into()
            .map_err(|el| WidgetError::Js(format!("not a <script>: {:?}", el)))?;

        script.set_id(&source.id);
        script.set_src(&source.src);
        script.set_async(true);

        // JS owns the handler; it is freed after the single `load` event.
        let onload = Closure::once_into_js(move || on_load());
        script.set_onload(Some(onload.unchecked_ref()));

        self.document
            .body()
            .ok_or(WidgetError::NoBody)?
            .append_child(&script)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// In-memory document: a list of attached ids and their pending
    /// `onload` handlers.
    #[derive(Default)]
    struct FakeHost {
        scripts: RefCell<Vec<ScriptSource>>,
        pending: RefCell<Vec<Box<dyn FnOnce()>>>,
    }

    impl FakeHost {
        fn with_existing(id: &str) -> Self {
            let host = Self::default();
            host.scripts.borrow_mut().push(ScriptSource {
                id: id.to_string(),
                src: CLOUDINARY_SCRIPT_SRC.to_string(),
            });
            host
        }

        fn count(&self, id: &str) -> usize {
            self.scripts.borrow().iter().filter(|s| s.id == id).count()
        }

        fn fire_loads(&self) {
            let handlers: Vec<_> = self.pending.borrow_mut().drain(..).collect();
            for handler in handlers {
                handler();
            }
        }
    }

    impl ScriptHost for FakeHost {
        fn has_script(&self, id: &str) -> bool {
            self.count(id) > 0
        }

        fn inject_script(
            &self,
            source: &ScriptSource,
            on_load: Box<dyn FnOnce()>,
        ) -> Result<(), WidgetError> {
            self.scripts.borrow_mut().push(source.clone());
            self.pending.borrow_mut().push(on_load);
            Ok(())
        }
    }

    struct BrokenHost;

    impl ScriptHost for BrokenHost {
        fn has_script(&self, _id: &str) -> bool {
            false
        }

        fn inject_script(
            &self,
            _source: &ScriptSource,
            _on_load: Box<dyn FnOnce()>,
        ) -> Result<(), WidgetError> {
            Err(WidgetError::NoBody)
        }
    }

    fn readiness() -> (Rc<Cell<ScriptLoadState>>, impl Fn() -> Box<dyn FnOnce()>) {
        let state = Rc::new(Cell::new(ScriptLoadState::NotLoaded));
        let handle = state.clone();
        let make = move || {
            let handle = handle.clone();
            Box::new(move || handle.set(ScriptLoadState::Loaded)) as Box<dyn FnOnce()>
        };
        (state, make)
    }

    #[test]
    fn default_source_points_at_cloudinary() {
        let source = ScriptSource::default();
        assert_eq!(source.id, "cloudinary-upload-widget");
        assert_eq!(source.src, "https://upload-widget.cloudinary.com/global/all.js");
    }

    #[test]
    fn fresh_mount_waits_for_onload() {
        let host = FakeHost::default();
        let source = ScriptSource::default();
        let (state, on_ready) = readiness();

        let step = ensure_script(&host, &source, state.get(), on_ready()).unwrap();

        assert_eq!(step, LoadStep::Injected);
        assert_eq!(state.get(), ScriptLoadState::NotLoaded);
        assert_eq!(host.count(&source.id), 1);

        host.fire_loads();
        assert_eq!(state.get(), ScriptLoadState::Loaded);
    }

    #[test]
    fn existing_element_marks_loaded_without_second_insert() {
        let host = FakeHost::with_existing(CLOUDINARY_SCRIPT_ID);
        let source = ScriptSource::default();
        let (state, on_ready) = readiness();

        let step = ensure_script(&host, &source, state.get(), on_ready()).unwrap();

        assert_eq!(step, LoadStep::FoundExisting);
        assert_eq!(state.get(), ScriptLoadState::Loaded);
        assert_eq!(host.count(&source.id), 1);
        assert!(host.pending.borrow().is_empty());
    }

    #[test]
    fn second_mount_before_load_reuses_the_element() {
        let host = FakeHost::default();
        let source = ScriptSource::default();
        let (first, first_ready) = readiness();
        let (second, second_ready) = readiness();

        ensure_script(&host, &source, first.get(), first_ready()).unwrap();
        let step = ensure_script(&host, &source, second.get(), second_ready()).unwrap();

        // The second mount reports ready even though the script has not run.
        assert_eq!(step, LoadStep::FoundExisting);
        assert_eq!(second.get(), ScriptLoadState::Loaded);
        assert_eq!(first.get(), ScriptLoadState::NotLoaded);
        assert_eq!(host.count(&source.id), 1);
    }

    #[test]
    fn loaded_state_short_circuits() {
        let host = FakeHost::default();
        let called = Rc::new(Cell::new(false));
        let flag = called.clone();

        let step = ensure_script(
            &host,
            &ScriptSource::default(),
            ScriptLoadState::Loaded,
            move || flag.set(true),
        )
        .unwrap();

        assert_eq!(step, LoadStep::AlreadyLoaded);
        assert!(!called.get());
        assert!(host.scripts.borrow().is_empty());
    }

    #[test]
    fn unfired_onload_stays_not_loaded() {
        let host = FakeHost::default();
        let (state, on_ready) = readiness();

        ensure_script(&host, &ScriptSource::default(), state.get(), on_ready()).unwrap();
        // Failed fetch: the handler is never fired.
        host.pending.borrow_mut().clear();
        assert_eq!(host.count(CLOUDINARY_SCRIPT_ID), 1);
        assert_eq!(state.get(), ScriptLoadState::NotLoaded);
    }

    #[test]
    fn host_failure_is_reported() {
        let (state, on_ready) = readiness();
        let err = ensure_script(&BrokenHost, &ScriptSource::default(), state.get(), on_ready())
            .unwrap_err();
        assert_eq!(err, WidgetError::NoBody);
        assert_eq!(state.get(), ScriptLoadState::NotLoaded);
    }

    #[test]
    fn custom_source_is_keyed_by_its_own_id() {
        let host = FakeHost::with_existing(CLOUDINARY_SCRIPT_ID);
        let source = ScriptSource {
            id: "staging-widget".into(),
            src: "https://example.test/all.js".into(),
        };
        let (state, on_ready) = readiness();

        let step = ensure_script(&host, &source, state.get(), on_ready()).unwrap();
        assert_eq!(step, LoadStep::Injected);
        assert_eq!(host.count("staging-widget"), 1);
    }

    #[test]
    fn load_state_converts_to_bool() {
        assert!(!bool::from(ScriptLoadState::default()));
        assert!(bool::from(ScriptLoadState::Loaded));
        assert_eq!(ScriptLoadState::from(true), ScriptLoadState::Loaded);
    }
}
