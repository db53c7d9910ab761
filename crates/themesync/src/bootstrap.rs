//! First-paint theme application.
//!
//! Run [`apply_initial_theme`] once, before any UI is built: it reads the
//! persisted mode and the environment, resolves them and sets the dark flag
//! synchronously, so the first frame is already in the right theme. It
//! installs no subscription; that is [`ThemeSync`](crate::ThemeSync)'s job
//! once the UI mounts.

use crate::config::{ThemeConfig, DEFAULT_STORAGE_KEY};
use crate::error::HostError;
use crate::host::{ColorSchemeSignal, DarkFlag, PreferenceStore};
use crate::mode::{EffectiveTheme, ThemeMode};
use crate::resolve::resolve;

/// Reads the persisted mode under `key`.
///
/// Read failures, absence and malformed values all yield `Unset`.
pub fn read_persisted_mode<S: PreferenceStore + ?Sized>(store: &S, key: &str) -> ThemeMode {
    match store.get(key) {
        Ok(raw) => ThemeMode::from_persisted(raw.as_deref()),
        Err(HostError::Unavailable(what)) => {
            tracing::debug!(key, store = what, "no preference store; theme is unset");
            ThemeMode::Unset
        }
        Err(err) => {
            tracing::warn!(key, error = %err, "could not read persisted theme");
            ThemeMode::Unset
        }
    }
}

/// Applies the persisted theme using the default storage key.
///
/// Returns the theme that was applied. Never fails; calling it again with
/// unchanged inputs leaves the flag as it was.
pub fn apply_initial_theme<S, E, F>(store: &S, signal: &E, flag: &F) -> EffectiveTheme
where
    S: PreferenceStore + ?Sized,
    E: ColorSchemeSignal + ?Sized,
    F: DarkFlag + ?Sized,
{
    apply_with_key(DEFAULT_STORAGE_KEY, store, signal, flag)
}

/// Like [`apply_initial_theme`], reading the key from `config`.
pub fn apply_initial_theme_with<S, E, F>(
    config: &ThemeConfig,
    store: &S,
    signal: &E,
    flag: &F,
) -> EffectiveTheme
where
    S: PreferenceStore + ?Sized,
    E: ColorSchemeSignal + ?Sized,
    F: DarkFlag + ?Sized,
{
    apply_with_key(&config.storage_key, store, signal, flag)
}

fn apply_with_key<S, E, F>(key: &str, store: &S, signal: &E, flag: &F) -> EffectiveTheme
where
    S: PreferenceStore + ?Sized,
    E: ColorSchemeSignal + ?Sized,
    F: DarkFlag + ?Sized,
{
    let mode = read_persisted_mode(store, key);
    let system_dark = signal.is_dark_preferred();
    let effective = resolve(mode, system_dark);
    flag.set_dark_flag(effective.is_dark());

    tracing::debug!(
        saved = %mode,
        system_dark,
        effective = %effective,
        "initial theme applied"
    );
    effective
}
