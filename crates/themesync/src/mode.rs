//! Theme modes and their rendered counterparts.
//!
//! [`ThemeMode`] is what the user selected (or what was persisted), while
//! [`EffectiveTheme`] is what actually gets rendered once the system preference
//! has been taken into account. See [`crate::resolve`] for the mapping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The selected theme preference.
///
/// `Unset` means no preference has been persisted yet. It behaves exactly
/// like `System`: both defer to the environment's color-scheme signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ThemeMode {
    /// Always render light.
    Light,
    /// Always render dark.
    Dark,
    /// Follow the environment's color-scheme preference.
    System,
    /// Nothing persisted yet; follows the environment.
    #[default]
    Unset,
}

impl ThemeMode {
    /// All modes, in declaration order.
    pub const ALL: [ThemeMode; 4] = [
        ThemeMode::Light,
        ThemeMode::Dark,
        ThemeMode::System,
        ThemeMode::Unset,
    ];

    /// Returns `true` for `System` and `Unset`.
    pub fn follows_system(self) -> bool {
        matches!(self, ThemeMode::System | ThemeMode::Unset)
    }

    /// The persisted representation, or `None` for `Unset`.
    pub fn as_persisted(self) -> Option<&'static str> {
        match self {
            ThemeMode::Light => Some("light"),
            ThemeMode::Dark => Some("dark"),
            ThemeMode::System => Some("system"),
            ThemeMode::Unset => None,
        }
    }

    /// Interprets a raw persisted value.
    ///
    /// Absent, empty and unrecognized values all map to `Unset`: a corrupt
    /// entry must never keep the interface from rendering.
    pub fn from_persisted(raw: Option<&str>) -> ThemeMode {
        match raw {
            None => ThemeMode::Unset,
            Some(value) => value.parse().unwrap_or_else(|err: ParseModeError| {
                tracing::warn!(value = %err.value, "ignoring malformed persisted theme");
                ThemeMode::Unset
            }),
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_persisted().unwrap_or("unset"))
    }
}

/// Error returned when a string is not a selectable theme mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme mode '{value}' (expected light, dark or system)")]
pub struct ParseModeError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for ThemeMode {
    type Err = ParseModeError;

    /// Parses `light`, `dark` or `system`, ignoring case and surrounding
    /// whitespace. `Unset` has no textual form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "system" => Ok(ThemeMode::System),
            _ => Err(ParseModeError {
                value: s.to_string(),
            }),
        }
    }
}

/// The concrete theme that is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveTheme {
    /// Light background, dark text.
    Light,
    /// Dark background, light text.
    Dark,
}

impl EffectiveTheme {
    /// Whether the dark flag should be present.
    pub fn is_dark(self) -> bool {
        self == EffectiveTheme::Dark
    }

    /// Lowercase name, as used in diagnostics and flag files.
    pub fn as_str(self) -> &'static str {
        match self {
            EffectiveTheme::Light => "light",
            EffectiveTheme::Dark => "dark",
        }
    }
}

impl From<bool> for EffectiveTheme {
    fn from(is_dark: bool) -> Self {
        if is_dark {
            EffectiveTheme::Dark
        } else {
            EffectiveTheme::Light
        }
    }
}

impl fmt::Display for EffectiveTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follows_system() {
        assert!(ThemeMode::System.follows_system());
        assert!(ThemeMode::Unset.follows_system());
        assert!(!ThemeMode::Light.follows_system());
        assert!(!ThemeMode::Dark.follows_system());
    }

    #[test]
    fn test_default_is_unset() {
        assert_eq!(ThemeMode::default(), ThemeMode::Unset);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Dark".parse::<ThemeMode>(), Ok(ThemeMode::Dark));
        assert_eq!(" LIGHT\n".parse::<ThemeMode>(), Ok(ThemeMode::Light));
        assert_eq!("system".parse::<ThemeMode>(), Ok(ThemeMode::System));
    }

    #[test]
    fn test_parse_rejects_unset() {
        let err = "unset".parse::<ThemeMode>().unwrap_err();
        assert_eq!(err.value, "unset");
        assert!(err.to_string().contains("unknown theme mode"));
    }

    #[test]
    fn test_from_persisted_absent() {
        assert_eq!(ThemeMode::from_persisted(None), ThemeMode::Unset);
    }

    #[test]
    fn test_from_persisted_malformed() {
        assert_eq!(ThemeMode::from_persisted(Some("")), ThemeMode::Unset);
        assert_eq!(ThemeMode::from_persisted(Some("{\"x\":1}")), ThemeMode::Unset);
        assert_eq!(ThemeMode::from_persisted(Some("midnight")), ThemeMode::Unset);
    }

    #[test]
    fn test_from_persisted_valid() {
        for mode in [ThemeMode::Light, ThemeMode::Dark, ThemeMode::System] {
            assert_eq!(ThemeMode::from_persisted(mode.as_persisted()), mode);
        }
    }

    #[test]
    fn test_unset_has_no_persisted_form() {
        assert_eq!(ThemeMode::Unset.as_persisted(), None);
        assert_eq!(ThemeMode::Unset.to_string(), "unset");
    }

    #[test]
    fn test_effective_from_bool() {
        assert_eq!(EffectiveTheme::from(true), EffectiveTheme::Dark);
        assert_eq!(EffectiveTheme::from(false), EffectiveTheme::Light);
        assert!(EffectiveTheme::Dark.is_dark());
        assert!(!EffectiveTheme::Light.is_dark());
    }

    #[test]
    fn test_effective_serializes_lowercase() {
        let json = serde_json::to_string(&EffectiveTheme::Dark).unwrap();
        assert_eq!(json, "\"dark\"");
    }
}
