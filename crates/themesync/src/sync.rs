//! The mounted theme state and its environment subscription.
//!
//! [`ThemeSync`] owns the selected [`ThemeMode`], the persistence entry, the
//! dark flag and at most one environment subscription. Every mutation goes
//! through it, and each mutator runs the same sequence:
//!
//! 1. update the in-memory mode
//! 2. persist it
//! 3. resolve and apply the dark flag
//! 4. keep or drop the environment subscription
//! 5. notify mode observers (only if the mode actually changed)
//!
//! The subscription exists exactly while the mode follows the system. The
//! handler holds a weak reference to the state, checks the mode again when
//! it fires (a notification may already be queued when the user picks an
//! explicit mode), and never writes persistence.
//!
//! Release is explicit: call [`ThemeSync::teardown`] when the UI unmounts.
//! Dropping the value tears down too.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::config::{ThemeConfig, DEFAULT_STORAGE_KEY};
use crate::host::{ChangeHandler, ColorSchemeSignal, DarkFlag, PreferenceStore, SubscriptionHandle};
use crate::mode::{EffectiveTheme, ThemeMode};
use crate::resolve::resolve;

type Observer = Rc<dyn Fn(ThemeMode)>;

/// Identifies an observer registered with [`ThemeSync::watch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

struct State<S, E, F>
where
    S: PreferenceStore + 'static,
    E: ColorSchemeSignal + 'static,
    F: DarkFlag + 'static,
{
    store: S,
    signal: E,
    flag: F,
    storage_key: String,
    mode: Cell<ThemeMode>,
    subscription: Cell<Option<SubscriptionHandle>>,
    observers: RefCell<Vec<(WatchId, Observer)>>,
    next_watch: Cell<u64>,
}

impl<S, E, F> State<S, E, F>
where
    S: PreferenceStore + 'static,
    E: ColorSchemeSignal + 'static,
    F: DarkFlag + 'static,
{
    fn apply(&self) -> EffectiveTheme {
        let mode = self.mode.get();
        let effective = resolve(mode, self.signal.is_dark_preferred());
        self.flag.set_dark_flag(effective.is_dark());
        tracing::debug!(theme = %mode, effective = %effective, "theme applied");
        effective
    }

    fn persist(&self, mode: ThemeMode) {
        let Some(value) = mode.as_persisted() else {
            return;
        };
        if let Err(err) = self.store.set(&self.storage_key, value) {
            tracing::warn!(key = %self.storage_key, error = %err, "could not persist theme");
        }
    }

    fn on_environment_change(&self) {
        if !self.mode.get().follows_system() {
            tracing::trace!(theme = %self.mode.get(), "ignoring stale color scheme notification");
            return;
        }
        self.apply();
    }

    fn release(&self) {
        if let Some(handle) = self.subscription.take() {
            self.signal.cancel(handle);
            tracing::trace!(handle = handle.id(), "color scheme subscription released");
        }
    }

    fn notify_observers(&self, mode: ThemeMode) {
        let snapshot: Vec<Observer> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        for observer in snapshot {
            // An observer may have changed the mode again; the nested commit
            // already reported the newer value to everyone.
            if self.mode.get() != mode {
                return;
            }
            observer(mode);
        }
    }
}

/// Resolves and tracks the theme for a mounted UI.
///
/// # Example
///
/// ```rust
/// use themesync::host::mock::{MockFlag, MockSignal, MockStore};
/// use themesync::{ThemeMode, ThemeSync};
///
/// let store = MockStore::new();
/// let signal = MockSignal::dark();
/// let flag = MockFlag::new();
///
/// let sync = ThemeSync::mount(store.clone(), signal.clone(), flag.clone());
/// assert_eq!(sync.mode(), ThemeMode::Unset);
/// assert!(flag.is_dark());
/// assert!(sync.is_subscribed());
///
/// sync.set_mode(ThemeMode::Light);
/// assert!(!flag.is_dark());
/// assert!(!sync.is_subscribed());
/// assert_eq!(store.value("rss-reader-theme").as_deref(), Some("light"));
/// ```
pub struct ThemeSync<S, E, F>
where
    S: PreferenceStore + 'static,
    E: ColorSchemeSignal + 'static,
    F: DarkFlag + 'static,
{
    state: Rc<State<S, E, F>>,
}

impl<S, E, F> ThemeSync<S, E, F>
where
    S: PreferenceStore + 'static,
    E: ColorSchemeSignal + 'static,
    F: DarkFlag + 'static,
{
    /// Mounts with the default storage key.
    ///
    /// Reads the persisted mode, applies the flag and subscribes to the
    /// environment if the mode follows the system.
    pub fn mount(store: S, signal: E, flag: F) -> Self {
        Self::mount_with_key(DEFAULT_STORAGE_KEY, store, signal, flag)
    }

    /// Mounts using the storage key from `config`.
    pub fn mount_with_config(config: &ThemeConfig, store: S, signal: E, flag: F) -> Self {
        Self::mount_with_key(&config.storage_key, store, signal, flag)
    }

    fn mount_with_key(key: &str, store: S, signal: E, flag: F) -> Self {
        let mode = crate::bootstrap::read_persisted_mode(&store, key);
        let sync = Self {
            state: Rc::new(State {
                store,
                signal,
                flag,
                storage_key: key.to_string(),
                mode: Cell::new(mode),
                subscription: Cell::new(None),
                observers: RefCell::new(Vec::new()),
                next_watch: Cell::new(0),
            }),
        };
        sync.state.apply();
        sync.sync_subscription();
        sync
    }

    /// The in-memory mode. Never re-reads storage.
    pub fn mode(&self) -> ThemeMode {
        self.state.mode.get()
    }

    /// The theme currently rendered.
    pub fn effective(&self) -> EffectiveTheme {
        resolve(self.mode(), self.state.signal.is_dark_preferred())
    }

    /// The environment's current preference, regardless of mode.
    pub fn system_theme(&self) -> EffectiveTheme {
        EffectiveTheme::from(self.state.signal.is_dark_preferred())
    }

    /// Whether the mode is `System` or `Unset`.
    pub fn is_following_system(&self) -> bool {
        self.mode().follows_system()
    }

    /// Whether an environment subscription is currently held.
    pub fn is_subscribed(&self) -> bool {
        self.state.subscription.get().is_some()
    }

    /// The storage key the mode is persisted under.
    pub fn storage_key(&self) -> &str {
        &self.state.storage_key
    }

    /// The environment signal, e.g. to drive [`OsColorScheme::poll`].
    ///
    /// [`OsColorScheme::poll`]: crate::host::os::OsColorScheme::poll
    pub fn signal(&self) -> &E {
        &self.state.signal
    }

    /// Applies an explicit user choice.
    ///
    /// `Light` and `Dark` are persisted, applied and drop any environment
    /// subscription. `System` and `Unset` are routed to
    /// [`follow_system`](Self::follow_system).
    pub fn set_mode(&self, mode: ThemeMode) {
        if mode.follows_system() {
            self.follow_system();
        } else {
            self.commit(mode);
        }
    }

    /// Follows the environment from now on.
    ///
    /// Persists `system`, applies the flag and subscribes to environment
    /// changes unless a subscription is already held.
    pub fn follow_system(&self) {
        self.commit(ThemeMode::System);
    }

    /// Switches between light and dark based on what is currently rendered,
    /// and returns the new mode.
    pub fn toggle(&self) -> ThemeMode {
        let next = match self.effective() {
            EffectiveTheme::Dark => ThemeMode::Light,
            EffectiveTheme::Light => ThemeMode::Dark,
        };
        self.commit(next);
        next
    }

    /// Releases the environment subscription, if any.
    ///
    /// Safe to call repeatedly. Must be called when the UI unmounts; a later
    /// mutator that selects `System` subscribes again.
    pub fn teardown(&self) {
        self.state.release();
    }

    /// Registers an observer called with the new mode after each change.
    ///
    /// Environment-driven flag updates do not change the mode and are not
    /// reported.
    pub fn watch(&self, observer: impl Fn(ThemeMode) + 'static) -> WatchId {
        let id = WatchId(self.state.next_watch.get());
        self.state.next_watch.set(id.0 + 1);
        let observer: Observer = Rc::new(observer);
        self.state.observers.borrow_mut().push((id, observer));
        id
    }

    /// Removes an observer. Returns `false` if it was not registered.
    pub fn unwatch(&self, id: WatchId) -> bool {
        let mut observers = self.state.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(watch, _)| *watch != id);
        observers.len() != before
    }

    fn commit(&self, mode: ThemeMode) {
        let previous = self.state.mode.replace(mode);
        self.state.persist(mode);
        self.state.apply();
        self.sync_subscription();
        if previous != mode {
            self.state.notify_observers(mode);
        }
    }

    fn sync_subscription(&self) {
        if !self.mode().follows_system() {
            self.state.release();
            return;
        }
        if self.is_subscribed() {
            return;
        }

        let weak: Weak<State<S, E, F>> = Rc::downgrade(&self.state);
        let handler: ChangeHandler = Rc::new(move || {
            if let Some(state) = weak.upgrade() {
                state.on_environment_change();
            }
        });
        let handle = self.state.signal.on_preference_change(handler);
        if handle.is_none() {
            tracing::debug!("host does not report color scheme changes");
        }
        self.state.subscription.set(handle);
    }
}

impl<S, E, F> Drop for ThemeSync<S, E, F>
where
    S: PreferenceStore + 'static,
    E: ColorSchemeSignal + 'static,
    F: DarkFlag + 'static,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<S, E, F> fmt::Debug for ThemeSync<S, E, F>
where
    S: PreferenceStore + 'static,
    E: ColorSchemeSignal + 'static,
    F: DarkFlag + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeSync")
            .field("mode", &self.mode())
            .field("storage_key", &self.state.storage_key)
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}
