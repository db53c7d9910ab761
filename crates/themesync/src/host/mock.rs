//! In-memory collaborators for tests.
//!
//! Each mock is a cheap handle over shared state: clone it, hand one copy to
//! the code under test, and inspect or drive the other.
//!
//! ```rust
//! use themesync::host::mock::{MockFlag, MockSignal, MockStore};
//! use themesync::{ThemeMode, ThemeSync};
//!
//! let signal = MockSignal::light();
//! let flag = MockFlag::new();
//! let sync = ThemeSync::mount(MockStore::new(), signal.clone(), flag.clone());
//! assert!(!flag.is_dark());
//!
//! signal.fire(true);
//! assert!(flag.is_dark());
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::{
    ChangeHandler, ColorSchemeSignal, DarkFlag, PreferenceStore, Subscribers, SubscriptionHandle,
};
use crate::error::HostError;

#[derive(Debug, Default)]
struct StoreState {
    entries: HashMap<String, String>,
    writes: Vec<(String, String)>,
    reads: usize,
    fail_reads: bool,
    fail_writes: bool,
}

/// Mock key-value store that records every write.
#[derive(Debug, Clone, Default)]
pub struct MockStore {
    state: Rc<RefCell<StoreState>>,
}

impl MockStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one entry. Seeding does not count as a write.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .state
            .borrow_mut()
            .entries
            .insert(key.into(), value.into());
        store
    }

    /// Creates a store whose reads and writes all fail.
    pub fn failing() -> Self {
        let store = Self::new();
        {
            let mut state = store.state.borrow_mut();
            state.fail_reads = true;
            state.fail_writes = true;
        }
        store
    }

    /// Current value for `key`.
    pub fn value(&self, key: &str) -> Option<String> {
        self.state.borrow().entries.get(key).cloned()
    }

    /// Every successful write, in order.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.state.borrow().writes.clone()
    }

    /// Number of `get` calls, including failed ones.
    pub fn read_count(&self) -> usize {
        self.state.borrow().reads
    }
}

impl PreferenceStore for MockStore {
    fn get(&self, key: &str) -> Result<Option<String>, HostError> {
        let mut state = self.state.borrow_mut();
        state.reads += 1;
        if state.fail_reads {
            return Err(HostError::Rejected("mock read failure".into()));
        }
        Ok(state.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(HostError::Rejected("mock write failure".into()));
        }
        state.entries.insert(key.to_string(), value.to_string());
        state.writes.push((key.to_string(), value.to_string()));
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SignalState {
    dark: Cell<bool>,
    muted: Cell<bool>,
    subscribes: Cell<usize>,
    cancels: Cell<usize>,
    subscribers: Subscribers,
}

/// Mock environment signal that tests flip by hand.
#[derive(Debug, Clone, Default)]
pub struct MockSignal {
    state: Rc<SignalState>,
}

impl MockSignal {
    /// Creates a signal with the given initial preference.
    pub fn new(dark: bool) -> Self {
        let signal = Self::default();
        signal.state.dark.set(dark);
        signal
    }

    /// A signal that prefers dark.
    pub fn dark() -> Self {
        Self::new(true)
    }

    /// A signal that prefers light.
    pub fn light() -> Self {
        Self::new(false)
    }

    /// Makes the signal refuse subscriptions, like a host without change events.
    pub fn without_notifications(self) -> Self {
        self.state.muted.set(true);
        self
    }

    /// Changes the preference and notifies every subscriber, as the host
    /// would when the user flips the system setting.
    pub fn fire(&self, dark: bool) {
        self.state.dark.set(dark);
        self.state.subscribers.notify();
    }

    /// Changes the preference silently.
    pub fn set_dark(&self, dark: bool) {
        self.state.dark.set(dark);
    }

    /// Number of currently registered handlers.
    pub fn active_subscriptions(&self) -> usize {
        self.state.subscribers.len()
    }

    /// Total `on_preference_change` calls that produced a handle.
    pub fn subscribe_count(&self) -> usize {
        self.state.subscribes.get()
    }

    /// Total `cancel` calls.
    pub fn cancel_count(&self) -> usize {
        self.state.cancels.get()
    }
}

impl ColorSchemeSignal for MockSignal {
    fn is_dark_preferred(&self) -> bool {
        self.state.dark.get()
    }

    fn on_preference_change(&self, handler: ChangeHandler) -> Option<SubscriptionHandle> {
        if self.state.muted.get() {
            return None;
        }
        self.state.subscribes.set(self.state.subscribes.get() + 1);
        Some(self.state.subscribers.add(handler))
    }

    fn cancel(&self, handle: SubscriptionHandle) {
        self.state.cancels.set(self.state.cancels.get() + 1);
        self.state.subscribers.remove(handle);
    }
}

/// Mock dark flag that remembers every application.
#[derive(Debug, Clone, Default)]
pub struct MockFlag {
    history: Rc<RefCell<Vec<bool>>>,
}

impl MockFlag {
    /// Creates a flag that has never been set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current flag state; `false` if never set.
    pub fn is_dark(&self) -> bool {
        self.history.borrow().last().copied().unwrap_or(false)
    }

    /// Every value applied, in order.
    pub fn history(&self) -> Vec<bool> {
        self.history.borrow().clone()
    }

    /// Number of applications.
    pub fn apply_count(&self) -> usize {
        self.history.borrow().len()
    }
}

impl DarkFlag for MockFlag {
    fn set_dark_flag(&self, dark: bool) {
        self.history.borrow_mut().push(dark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_store_seed_is_not_a_write() {
        let store = MockStore::with_entry("k", "dark");
        assert_eq!(store.get("k").unwrap(), Some("dark".to_string()));
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_mock_store_records_writes() {
        let store = MockStore::new();
        store.set("k", "light").unwrap();
        store.set("k", "system").unwrap();
        assert_eq!(store.value("k"), Some("system".to_string()));
        assert_eq!(store.writes().len(), 2);
    }

    #[test]
    fn test_mock_store_failing() {
        let store = MockStore::failing();
        assert!(store.get("k").is_err());
        assert!(store.set("k", "dark").is_err());
        assert_eq!(store.read_count(), 1);
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_mock_signal_fire_notifies() {
        let signal = MockSignal::light();
        let seen = Rc::new(Cell::new(0));
        let handle = {
            let seen = Rc::clone(&seen);
            signal
                .on_preference_change(Rc::new(move || seen.set(seen.get() + 1)))
                .unwrap()
        };
        signal.fire(true);
        assert!(signal.is_dark_preferred());
        assert_eq!(seen.get(), 1);

        signal.cancel(handle);
        signal.fire(false);
        assert_eq!(seen.get(), 1);
        assert_eq!(signal.active_subscriptions(), 0);
    }

    #[test]
    fn test_mock_signal_without_notifications() {
        let signal = MockSignal::dark().without_notifications();
        assert!(signal.on_preference_change(Rc::new(|| {})).is_none());
        assert_eq!(signal.subscribe_count(), 0);
    }

    #[test]
    fn test_mock_signal_clones_share_state() {
        let signal = MockSignal::light();
        let other = signal.clone();
        other.set_dark(true);
        assert!(signal.is_dark_preferred());
    }

    #[test]
    fn test_mock_flag_history() {
        let flag = MockFlag::new();
        assert!(!flag.is_dark());
        flag.set_dark_flag(true);
        flag.set_dark_flag(false);
        assert_eq!(flag.history(), vec![true, false]);
        assert!(!flag.is_dark());
    }
}
