//! Light/dark theme resolution and synchronization.
//!
//! `themesync` decides whether an interface renders light or dark by
//! reconciling three inputs: an explicit user choice, the persisted
//! preference, and the environment's live color-scheme signal. Its only
//! output is a single dark flag on the root presentation surface.
//!
//! # Quick Start
//!
//! ```rust
//! use themesync::host::mock::{MockFlag, MockSignal, MockStore};
//! use themesync::{apply_initial_theme, ThemeMode, ThemeSync};
//!
//! let store = MockStore::new();
//! let signal = MockSignal::light();
//! let flag = MockFlag::new();
//!
//! // Before building the UI: no flash of the wrong theme.
//! apply_initial_theme(&store, &signal, &flag);
//!
//! // Once the UI mounts: track the system while no choice is stored.
//! let theme = ThemeSync::mount(store, signal.clone(), flag.clone());
//! signal.fire(true);
//! assert!(flag.is_dark());
//!
//! theme.set_mode(ThemeMode::Light);
//! signal.fire(false);
//! assert!(!flag.is_dark());
//!
//! theme.teardown();
//! ```
//!
//! # Modes
//!
//! | Persisted  | [`ThemeMode`] | Rendered                   |
//! |------------|---------------|----------------------------|
//! | (nothing)  | `Unset`       | follows the environment    |
//! | `"system"` | `System`      | follows the environment    |
//! | `"light"`  | `Light`       | light                      |
//! | `"dark"`   | `Dark`        | dark                       |
//!
//! Unreadable or unrecognized persisted values count as `Unset`.
//!
//! # Architecture
//!
//! ```text
//! resolve(mode, env_is_dark) ──┬── apply_initial_theme   (once, before first paint)
//!                              └── ThemeSync             (after mount)
//!                                   ├── PreferenceStore   persisted mode
//!                                   ├── ColorSchemeSignal query + change events
//!                                   └── DarkFlag          the visual switch
//! ```
//!
//! Hosts plug in through the traits in [`host`]. The crate ships desktop
//! (`os`, default feature), browser (`web` feature) and mock
//! implementations.
//!
//! # Features
//!
//! - **`os`** (default): `dark-light` detection, JSON preference file
//! - **`web`**: `localStorage`, `matchMedia`, a class on `<html>`

pub mod bootstrap;
mod config;
mod error;
pub mod host;
mod mode;
mod resolve;
mod sync;

pub use bootstrap::{apply_initial_theme, apply_initial_theme_with, read_persisted_mode};
pub use config::{ThemeConfig, DARK_MEDIA_QUERY, DEFAULT_DARK_CLASS, DEFAULT_STORAGE_KEY};
pub use error::{ConfigError, HostError};
pub use host::{ColorSchemeSignal, DarkFlag, NoHost, PreferenceStore, SubscriptionHandle};
pub use mode::{EffectiveTheme, ParseModeError, ThemeMode};
pub use resolve::resolve;
pub use sync::{ThemeSync, WatchId};
