//! Process-wide light/dark theme
//!
//! Initialised once on load from configuration and kept for the life of the
//! process. Later calls to [`init`] are ignored.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

static THEME: OnceLock<RwLock<Theme>> = OnceLock::new();

/// Colour scheme for terminal output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark modules on a light background
    #[default]
    Light,
    /// Light modules on a dark background
    Dark,
}

impl Theme {
    /// The opposite theme
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Identifier used in config files and on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Unsupported theme '{other}', expected light or dark")),
        }
    }
}

/// Install the initial theme. Returns the theme actually in effect.
pub fn init(initial: Theme) -> Theme {
    let lock = THEME.get_or_init(|| RwLock::new(initial));
    *lock.read().expect("theme lock poisoned")
}

/// Current theme; the default if [`init`] has not run yet
pub fn current() -> Theme {
    THEME
        .get()
        .map(|lock| *lock.read().expect("theme lock poisoned"))
        .unwrap_or_default()
}

/// Switch to `theme`
pub fn set(theme: Theme) {
    let lock = THEME.get_or_init(|| RwLock::new(theme));
    *lock.write().expect("theme lock poisoned") = theme;
    tracing::debug!(%theme, "Theme changed");
}

/// Flip between light and dark and return the new theme
pub fn toggle() -> Theme {
    let lock = THEME.get_or_init(|| RwLock::new(Theme::default()));
    let mut guard = lock.write().expect("theme lock poisoned");
    *guard = guard.toggled();
    tracing::debug!(theme = %*guard, "Theme toggled");
    *guard
}
