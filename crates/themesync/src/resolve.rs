//! The one place where a [`ThemeMode`] is turned into an [`EffectiveTheme`].
//!
//! Both the bootstrap path and [`ThemeSync`](crate::ThemeSync) call
//! [`resolve`], so first-paint state and post-mount state cannot diverge.

use crate::mode::{EffectiveTheme, ThemeMode};

/// Resolves a mode against the environment's current preference.
///
/// Explicit modes win; `System` and `Unset` use `environment_is_dark`.
///
/// ```rust
/// use themesync::{resolve, EffectiveTheme, ThemeMode};
///
/// assert_eq!(resolve(ThemeMode::Dark, false), EffectiveTheme::Dark);
/// assert_eq!(resolve(ThemeMode::System, true), EffectiveTheme::Dark);
/// assert_eq!(resolve(ThemeMode::Unset, false), EffectiveTheme::Light);
/// ```
pub fn resolve(mode: ThemeMode, environment_is_dark: bool) -> EffectiveTheme {
    match mode {
        ThemeMode::Light => EffectiveTheme::Light,
        ThemeMode::Dark => EffectiveTheme::Dark,
        ThemeMode::System | ThemeMode::Unset => EffectiveTheme::from(environment_is_dark),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_modes_ignore_environment() {
        for env in [true, false] {
            assert_eq!(resolve(ThemeMode::Light, env), EffectiveTheme::Light);
            assert_eq!(resolve(ThemeMode::Dark, env), EffectiveTheme::Dark);
        }
    }

    #[test]
    fn test_system_and_unset_are_identical() {
        for env in [true, false] {
            assert_eq!(
                resolve(ThemeMode::System, env),
                resolve(ThemeMode::Unset, env)
            );
        }
    }

    #[test]
    fn test_system_follows_environment() {
        assert_eq!(resolve(ThemeMode::System, true), EffectiveTheme::Dark);
        assert_eq!(resolve(ThemeMode::System, false), EffectiveTheme::Light);
    }
}
