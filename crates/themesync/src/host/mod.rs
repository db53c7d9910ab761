//! Host collaborators.
//!
//! The theme subsystem never touches platform APIs directly. It talks to three
//! small traits, which keeps it testable and lets the same logic drive a
//! browser document, a desktop app, or nothing at all:
//!
//! - [`PreferenceStore`]: durable key-value storage for the selected mode
//! - [`ColorSchemeSignal`]: the environment's light/dark preference, queried
//!   synchronously and observed through change notifications
//! - [`DarkFlag`]: the single visual switch on the root presentation surface
//!
//! # Implementations
//!
//! | Module   | Store          | Signal              | Flag            |
//! |----------|----------------|---------------------|-----------------|
//! | `os`     | [`FileStore`]  | [`OsColorScheme`]   | [`FlagFile`]    |
//! | `web`    | `LocalStorage` | `MediaQuerySignal`  | `RootClassFlag` |
//! | [`mock`] | [`MockStore`]  | [`MockSignal`]      | [`MockFlag`]    |
//!
//! [`NoHost`] implements all three as no-ops for server-side or other
//! non-interactive contexts.
//!
//! All collaborators are used from a single event loop, so handlers are
//! `Rc`-based and nothing here is `Send`.
//!
//! [`FileStore`]: os::FileStore
//! [`OsColorScheme`]: os::OsColorScheme
//! [`FlagFile`]: os::FlagFile
//! [`MockStore`]: mock::MockStore
//! [`MockSignal`]: mock::MockSignal
//! [`MockFlag`]: mock::MockFlag

pub mod mock;
#[cfg(feature = "os")]
pub mod os;
#[cfg(feature = "web")]
pub mod web;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::HostError;

/// Callback invoked when the environment's preference changes.
pub type ChangeHandler = Rc<dyn Fn()>;

/// Identifies one environment-change subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    /// Wraps a host-specific identifier.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The host-specific identifier.
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Durable key-value storage.
pub trait PreferenceStore {
    /// Reads a value; `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, HostError>;

    /// Writes a value.
    fn set(&self, key: &str, value: &str) -> Result<(), HostError>;
}

/// The environment's light/dark preference.
pub trait ColorSchemeSignal {
    /// Whether the environment currently prefers dark.
    ///
    /// Hosts that cannot tell report `false`.
    fn is_dark_preferred(&self) -> bool;

    /// Registers `handler` for change notifications.
    ///
    /// Returns `None` when the host cannot deliver notifications.
    fn on_preference_change(&self, handler: ChangeHandler) -> Option<SubscriptionHandle>;

    /// Removes a subscription. Unknown handles are ignored.
    fn cancel(&self, handle: SubscriptionHandle);
}

/// The visual dark-mode switch on the root surface.
pub trait DarkFlag {
    /// Sets (`true`) or clears (`false`) the flag.
    fn set_dark_flag(&self, dark: bool);
}

macro_rules! forward_collaborators {
    ($($wrapper:ident),*) => {$(
        impl<T: PreferenceStore + ?Sized> PreferenceStore for $wrapper<T> {
            fn get(&self, key: &str) -> Result<Option<String>, HostError> {
                (**self).get(key)
            }

            fn set(&self, key: &str, value: &str) -> Result<(), HostError> {
                (**self).set(key, value)
            }
        }

        impl<T: ColorSchemeSignal + ?Sized> ColorSchemeSignal for $wrapper<T> {
            fn is_dark_preferred(&self) -> bool {
                (**self).is_dark_preferred()
            }

            fn on_preference_change(&self, handler: ChangeHandler) -> Option<SubscriptionHandle> {
                (**self).on_preference_change(handler)
            }

            fn cancel(&self, handle: SubscriptionHandle) {
                (**self).cancel(handle)
            }
        }

        impl<T: DarkFlag + ?Sized> DarkFlag for $wrapper<T> {
            fn set_dark_flag(&self, dark: bool) {
                (**self).set_dark_flag(dark)
            }
        }
    )*};
}

forward_collaborators!(Rc, Box);

/// A host with no capabilities.
///
/// Reads report nothing stored, writes fail with
/// [`HostError::Unavailable`], the environment is never dark and never
/// notifies, and the flag goes nowhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHost;

impl PreferenceStore for NoHost {
    fn get(&self, _key: &str) -> Result<Option<String>, HostError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), HostError> {
        Err(HostError::Unavailable("preference storage"))
    }
}

impl ColorSchemeSignal for NoHost {
    fn is_dark_preferred(&self) -> bool {
        false
    }

    fn on_preference_change(&self, _handler: ChangeHandler) -> Option<SubscriptionHandle> {
        None
    }

    fn cancel(&self, _handle: SubscriptionHandle) {}
}

impl DarkFlag for NoHost {
    fn set_dark_flag(&self, _dark: bool) {}
}

/// Handler registry for signals that dispatch notifications themselves.
///
/// Used by [`mock::MockSignal`] and [`os::OsColorScheme`](self::os::OsColorScheme).
#[derive(Default)]
pub struct Subscribers {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(SubscriptionHandle, ChangeHandler)>>,
}

impl Subscribers {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler and returns its handle.
    pub fn add(&self, handler: ChangeHandler) -> SubscriptionHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let handle = SubscriptionHandle::new(id);
        self.handlers.borrow_mut().push((handle, handler));
        handle
    }

    /// Removes a handler. Returns `false` if the handle was not registered.
    pub fn remove(&self, handle: SubscriptionHandle) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(h, _)| *h != handle);
        handlers.len() != before
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }

    /// Invokes every registered handler once.
    ///
    /// Handlers may subscribe or cancel while being notified; they see the
    /// registry as it was when notification started.
    pub fn notify(&self) {
        let snapshot: Vec<ChangeHandler> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in snapshot {
            handler();
        }
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("active", &self.len())
            .finish()
    }
}
