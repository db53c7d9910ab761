//! Desktop collaborators.
//!
//! - [`OsColorScheme`] asks the OS for its light/dark preference through the
//!   `dark-light` crate. Desktop platforms offer no portable push
//!   notification, so the host event loop calls [`OsColorScheme::poll`] and
//!   subscribers are notified when the answer changed.
//! - [`FileStore`] keeps preferences in a small JSON object on disk.
//! - [`FlagFile`] writes `dark` or `light` to a file other processes can watch.
//!
//! Detection can be overridden for tests with [`set_scheme_detector`]:
//!
//! ```rust
//! use themesync::host::os::{detect_dark_preference, reset_scheme_detector, set_scheme_detector};
//!
//! set_scheme_detector(|| true);
//! assert!(detect_dark_preference());
//! reset_scheme_detector();
//! ```

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dark_light::Mode as OsThemeMode;
use once_cell::sync::Lazy;

use super::{
    ChangeHandler, ColorSchemeSignal, DarkFlag, PreferenceStore, Subscribers, SubscriptionHandle,
};
use crate::error::HostError;

type SchemeDetector = fn() -> bool;

static SCHEME_DETECTOR: Lazy<Mutex<SchemeDetector>> = Lazy::new(|| Mutex::new(os_prefers_dark));

/// Overrides how the OS preference is detected, process-wide.
pub fn set_scheme_detector(detector: SchemeDetector) {
    let mut guard = SCHEME_DETECTOR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = detector;
}

/// Restores OS detection after [`set_scheme_detector`].
pub fn reset_scheme_detector() {
    set_scheme_detector(os_prefers_dark);
}

/// Whether the OS currently prefers dark, via the active detector.
pub fn detect_dark_preference() -> bool {
    let detector = *SCHEME_DETECTOR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    detector()
}

fn os_prefers_dark() -> bool {
    match dark_light::detect() {
        Ok(OsThemeMode::Dark) => true,
        Ok(OsThemeMode::Light) | Ok(OsThemeMode::Unspecified) => false,
        Err(err) => {
            tracing::warn!(error = ?err, "color scheme detection failed, assuming light");
            false
        }
    }
}

/// The OS color-scheme preference, observed by polling.
#[derive(Debug)]
pub struct OsColorScheme {
    last_seen: Cell<bool>,
    subscribers: Subscribers,
}

impl OsColorScheme {
    /// Captures the current preference as the baseline for [`poll`](Self::poll).
    pub fn new() -> Self {
        Self {
            last_seen: Cell::new(detect_dark_preference()),
            subscribers: Subscribers::new(),
        }
    }

    /// Re-detects the preference and notifies subscribers if it changed.
    ///
    /// Returns `true` when a change was observed.
    pub fn poll(&self) -> bool {
        let now = detect_dark_preference();
        if self.last_seen.replace(now) == now {
            return false;
        }
        tracing::debug!(dark = now, "system color scheme changed");
        self.subscribers.notify();
        true
    }

    /// Number of registered handlers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Default for OsColorScheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorSchemeSignal for OsColorScheme {
    fn is_dark_preferred(&self) -> bool {
        detect_dark_preference()
    }

    fn on_preference_change(&self, handler: ChangeHandler) -> Option<SubscriptionHandle> {
        Some(self.subscribers.add(handler))
    }

    fn cancel(&self, handle: SubscriptionHandle) {
        self.subscribers.remove(handle);
    }
}

/// Preferences stored as a flat JSON object in one file.
///
/// A missing file reads as empty. A corrupt file fails reads with
/// [`HostError::Corrupt`] and is replaced on the next write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Uses the file at `path`, which need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/themesync/preferences.json`, if the platform has a
    /// config directory.
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("themesync").join("preferences.json"))
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, HostError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, HostError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), HostError> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(HostError::Corrupt(reason)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %reason,
                    "replacing corrupt preference file"
                );
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Dark flag mirrored into a file as `dark` or `light`.
#[derive(Debug, Clone)]
pub struct FlagFile {
    path: PathBuf,
}

impl FlagFile {
    /// Writes to `path`, creating parent directories as needed.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, dark: bool) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, if dark { "dark\n" } else { "light\n" })
    }
}

impl DarkFlag for FlagFile {
    fn set_dark_flag(&self, dark: bool) {
        if let Err(err) = self.write(dark) {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to write theme flag");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_detector_override() {
        set_scheme_detector(|| true);
        assert!(detect_dark_preference());

        set_scheme_detector(|| false);
        assert!(!detect_dark_preference());

        reset_scheme_detector();
    }

    fn prefer_dark() -> bool {
        true
    }

    fn prefer_light() -> bool {
        false
    }

    #[test]
    #[serial]
    fn test_poll_notifies_only_on_change() {
        set_scheme_detector(prefer_light);
        let scheme = OsColorScheme::new();
        let calls = Rc::new(Cell::new(0));
        let handle = {
            let calls = Rc::clone(&calls);
            scheme
                .on_preference_change(Rc::new(move || calls.set(calls.get() + 1)))
                .unwrap()
        };

        assert!(!scheme.poll());
        assert_eq!(calls.get(), 0);

        set_scheme_detector(prefer_dark);
        assert!(scheme.poll());
        assert!(!scheme.poll());
        assert_eq!(calls.get(), 1);

        scheme.cancel(handle);
        set_scheme_detector(prefer_light);
        assert!(scheme.poll());
        assert_eq!(calls.get(), 1);
        assert_eq!(scheme.subscriber_count(), 0);

        reset_scheme_detector();
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("prefs.json"));
        assert_eq!(store.get("theme").unwrap(), None);
    }

    #[test]
    fn test_file_store_round_trip_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("prefs.json"));

        store.set("theme", "dark").unwrap();
        store.set("other", "value").unwrap();
        store.set("theme", "system").unwrap();

        assert_eq!(store.get("theme").unwrap(), Some("system".to_string()));
        assert_eq!(store.get("other").unwrap(), Some("value".to_string()));
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();
        let store = FileStore::new(&path);

        assert!(matches!(store.get("theme"), Err(HostError::Corrupt(_))));

        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").unwrap(), Some("light".to_string()));
    }

    #[test]
    fn test_flag_file_writes_state() {
        let dir = TempDir::new().unwrap();
        let flag = FlagFile::new(dir.path().join("flag"));

        flag.set_dark_flag(true);
        assert_eq!(fs::read_to_string(flag.path()).unwrap(), "dark\n");

        flag.set_dark_flag(false);
        assert_eq!(fs::read_to_string(flag.path()).unwrap(), "light\n");
    }
}
