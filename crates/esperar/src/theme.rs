//! Light/dark theme preference.
//!
//! The preference survives page loads through a small key-value store; the
//! store is a trait so tests and headless hosts can run against memory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Storage key for the persisted theme preference
pub const THEME_KEY: &str = "theme";

/// UI theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme (the default)
    #[default]
    Light,
    /// Dark theme
    Dark,
}

impl Theme {
    /// The stored string form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The opposite theme
    #[must_use]
    pub const fn toggled(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Interpret a stored preference; anything but `"dark"` is light
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Small persisted key-value store for UI preferences
pub trait PreferenceStore {
    /// The stored value for `key`, if any
    fn get(&self, key: &str) -> Option<String>;
    /// Store `value` under `key`
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory store for tests and headless hosts
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// Manages the theme preference through a [`PreferenceStore`]
#[derive(Debug)]
pub struct ThemeManager<S> {
    store: S,
}

impl<S: PreferenceStore> ThemeManager<S> {
    /// Create a manager over the given store
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The current theme per the stored preference
    #[must_use]
    pub fn current(&self) -> Theme {
        Theme::from_stored(self.store.get(THEME_KEY).as_deref())
    }

    /// Persist and apply a theme
    pub fn set_theme(&mut self, theme: Theme) {
        self.store.set(THEME_KEY, theme.as_str());
        tracing::debug!(%theme, "theme set");
    }

    /// Flip the stored preference; returns the new theme.
    ///
    /// Re-reads the store rather than trusting cached state, so two tabs
    /// toggling the same store stay coherent.
    pub fn toggle(&mut self) -> Theme {
        let next = self.current().toggled();
        self.set_theme(next);
        next
    }

    /// Apply the stored preference at startup; returns the initial theme
    pub fn init(&mut self) -> Theme {
        let theme = self.current();
        self.set_theme(theme);
        theme
    }

    /// The underlying store
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}
