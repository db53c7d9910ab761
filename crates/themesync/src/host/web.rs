//! Browser collaborators, built on `web-sys`.
//!
//! Every type here degrades to a no-op when the page has no `window`,
//! `document` or `localStorage` (server rendering, workers, sandboxed
//! frames), so the same code runs in every context.
//!
//! Call [`apply_initial_theme`] from the entry point before mounting the UI,
//! then [`mount`] once the interactive tree exists:
//!
//! ```rust,ignore
//! let config = themesync::ThemeConfig::default();
//! themesync::host::web::apply_initial_theme(&config);
//! // ... build and mount the app ...
//! let theme = themesync::host::web::mount(&config);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, MediaQueryList, Storage};

use super::{ChangeHandler, ColorSchemeSignal, DarkFlag, PreferenceStore, SubscriptionHandle};
use crate::config::ThemeConfig;
use crate::error::HostError;
use crate::mode::EffectiveTheme;
use crate::sync::ThemeSync;

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn root_element() -> Option<Element> {
    web_sys::window()?.document()?.document_element()
}

fn js_error(value: JsValue) -> HostError {
    HostError::Rejected(format!("{value:?}"))
}

/// `window.localStorage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl PreferenceStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, HostError> {
        let Some(storage) = local_storage() else {
            return Ok(None);
        };
        storage.get_item(key).map_err(js_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), HostError> {
        let storage = local_storage().ok_or(HostError::Unavailable("localStorage"))?;
        storage.set_item(key, value).map_err(js_error)
    }
}

/// The `prefers-color-scheme` media query and its `change` events.
///
/// Listeners are owned here and detached on [`cancel`](ColorSchemeSignal::cancel)
/// or when the signal is dropped.
pub struct MediaQuerySignal {
    list: Option<MediaQueryList>,
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<SubscriptionHandle, Closure<dyn FnMut()>>>,
}

impl MediaQuerySignal {
    /// Evaluates `query` against the current window.
    pub fn new(query: &str) -> Self {
        let list = web_sys::window().and_then(|w| w.match_media(query).ok().flatten());
        Self {
            list,
            next_id: Cell::new(0),
            listeners: RefCell::new(HashMap::new()),
        }
    }

    /// Uses the configured media query.
    pub fn from_config(config: &ThemeConfig) -> Self {
        Self::new(&config.media_query)
    }

    fn detach(list: &MediaQueryList, listener: &Closure<dyn FnMut()>) {
        if let Err(err) =
            list.remove_event_listener_with_callback("change", listener.as_ref().unchecked_ref())
        {
            tracing::warn!(error = ?err, "failed to remove color scheme listener");
        }
    }
}

impl std::fmt::Debug for MediaQuerySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaQuerySignal")
            .field("available", &self.list.is_some())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

impl ColorSchemeSignal for MediaQuerySignal {
    fn is_dark_preferred(&self) -> bool {
        self.list.as_ref().map(MediaQueryList::matches).unwrap_or(false)
    }

    fn on_preference_change(&self, handler: ChangeHandler) -> Option<SubscriptionHandle> {
        let list = self.list.as_ref()?;
        let listener = Closure::<dyn FnMut()>::new(move || handler());
        if let Err(err) =
            list.add_event_listener_with_callback("change", listener.as_ref().unchecked_ref())
        {
            tracing::warn!(error = ?err, "failed to add color scheme listener");
            return None;
        }

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let handle = SubscriptionHandle::new(id);
        self.listeners.borrow_mut().insert(handle, listener);
        Some(handle)
    }

    fn cancel(&self, handle: SubscriptionHandle) {
        let removed = self.listeners.borrow_mut().remove(&handle);
        if let (Some(list), Some(listener)) = (self.list.as_ref(), removed) {
            Self::detach(list, &listener);
        }
    }
}

impl Drop for MediaQuerySignal {
    fn drop(&mut self) {
        if let Some(list) = self.list.as_ref() {
            for (_, listener) in self.listeners.borrow_mut().drain() {
                Self::detach(list, &listener);
            }
        }
    }
}

/// A class on `document.documentElement`.
#[derive(Debug, Clone)]
pub struct RootClassFlag {
    class: String,
}

impl RootClassFlag {
    /// Toggles `class` on the root element.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }

    /// Uses the configured dark class.
    pub fn from_config(config: &ThemeConfig) -> Self {
        Self::new(config.dark_class.clone())
    }

    /// Whether the class is currently present.
    pub fn is_set(&self) -> bool {
        root_element()
            .map(|root| root.class_list().contains(&self.class))
            .unwrap_or(false)
    }
}

impl DarkFlag for RootClassFlag {
    fn set_dark_flag(&self, dark: bool) {
        let Some(root) = root_element() else {
            return;
        };
        let classes = root.class_list();
        let result = if dark {
            classes.add_1(&self.class)
        } else {
            classes.remove_1(&self.class)
        };
        if let Err(err) = result {
            tracing::warn!(error = ?err, class = %self.class, "failed to toggle theme class");
        }
    }
}

/// Applies the persisted theme to the document before first paint.
pub fn apply_initial_theme(config: &ThemeConfig) -> EffectiveTheme {
    crate::bootstrap::apply_initial_theme_with(
        config,
        &LocalStorage,
        &MediaQuerySignal::from_config(config),
        &RootClassFlag::from_config(config),
    )
}

/// Mounts a [`ThemeSync`] wired to the browser.
pub fn mount(config: &ThemeConfig) -> ThemeSync<LocalStorage, MediaQuerySignal, RootClassFlag> {
    ThemeSync::mount_with_config(
        config,
        LocalStorage,
        MediaQuerySignal::from_config(config),
        RootClassFlag::from_config(config),
    )
}
