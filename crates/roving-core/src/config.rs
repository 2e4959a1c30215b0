#![forbid(unsafe_code)]

//! Resolver configuration.
//!
//! [`ResolverConfig`] carries the tunables the resolvers take as parameters:
//! the gesture drag threshold and extra global key bindings. Defaults match
//! the built-in constants, so `ResolverConfig::default()` behaves exactly like
//! passing nothing.
//!
//! # Loading
//!
//! ```toml
//! drag_threshold_px = 8.0
//!
//! [[keymap]]
//! key = "Ctrl+K"
//! command = "palette"
//!
//! [[keymap]]
//! key = "F5"
//! command = "refresh"
//! when = "navigating"
//! ```
//!
//! ```rust,ignore
//! let config = ResolverConfig::from_toml_file("roving.toml")?;
//! let keymap = config.global_keymap()?;
//! ```
//!
//! File loading needs the `config` feature. Environment overrides are always
//! available through [`ResolverConfig::from_env`].

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::error::{ConfigError, Result};
use crate::event::KeyCombo;
use crate::gesture::{DEFAULT_DRAG_THRESHOLD_PX, GestureConfig};
use crate::keymap::{KeyBinding, Keymap, When};

/// Smallest accepted drag threshold in pixels.
pub const MIN_DRAG_THRESHOLD_PX: f64 = 1.0;

/// Largest accepted drag threshold in pixels.
pub const MAX_DRAG_THRESHOLD_PX: f64 = 64.0;

/// Environment variable overriding the drag threshold.
pub const ENV_DRAG_THRESHOLD_PX: &str = "ROVING_DRAG_THRESHOLD_PX";

/// One user-declared global binding producing a [`Command::Custom`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
pub struct KeymapEntry {
    /// Key combo such as `"Ctrl+K"`.
    pub key: String,
    /// Custom command name.
    pub command: String,
    #[cfg_attr(feature = "config", serde(default))]
    pub when: When,
}

/// Tunables for the resolvers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ResolverConfig {
    /// Pointer movement beyond this many pixels on either axis starts a drag.
    pub drag_threshold_px: f64,
    /// Extra global bindings, consulted before the defaults.
    pub keymap: Vec<KeymapEntry>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
            keymap: Vec::new(),
        }
    }
}

impl ResolverConfig {
    #[must_use]
    pub fn with_drag_threshold(mut self, px: f64) -> Self {
        self.drag_threshold_px = px;
        self
    }

    /// Add a global binding for a custom command.
    #[must_use]
    pub fn with_binding(mut self, key: impl Into<String>, command: impl Into<String>) -> Self {
        self.keymap.push(KeymapEntry {
            key: key.into(),
            command: command.into(),
            when: When::Always,
        });
        self
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `ROVING_DRAG_THRESHOLD_PX` (pixels, float). Unparseable values
    /// are ignored and the result is clamped by [`validated`](Self::validated).
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup(ENV_DRAG_THRESHOLD_PX)
            && let Ok(px) = val.trim().parse::<f64>()
        {
            config.drag_threshold_px = px;
        }

        config.validated()
    }

    /// Clamp values to safe ranges.
    ///
    /// - `drag_threshold_px` is clamped to 1-64px; NaN falls back to the
    ///   default.
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.drag_threshold_px = if self.drag_threshold_px.is_nan() {
            DEFAULT_DRAG_THRESHOLD_PX
        } else {
            self.drag_threshold_px
                .clamp(MIN_DRAG_THRESHOLD_PX, MAX_DRAG_THRESHOLD_PX)
        };
        self
    }

    /// Gesture recognizer settings.
    #[must_use]
    pub fn gesture_config(&self) -> GestureConfig {
        GestureConfig {
            drag_threshold_px: self.drag_threshold_px,
        }
    }

    /// The default global keymap extended with the declared entries.
    ///
    /// Declared entries shadow the defaults.
    pub fn global_keymap(&self) -> Result<Keymap> {
        let mut keymap = Keymap::new();
        for entry in &self.keymap {
            let combo = KeyCombo::parse(&entry.key).map_err(|source| ConfigError::InvalidBinding {
                key: entry.key.clone(),
                source,
            })?;
            keymap.bind(
                KeyBinding::constant(
                    combo,
                    Command::Custom {
                        name: entry.command.clone(),
                        zone: None,
                        item: None,
                    },
                )
                .when(entry.when)
                .global(),
            );
        }
        for binding in Keymap::defaults().bindings() {
            keymap.bind(binding.clone());
        }
        Ok(keymap)
    }

    /// Load from a TOML string. The result is validated.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> std::result::Result<Self, ConfigError> {
        toml::from_str::<Self>(s)
            .map(Self::validated)
            .map_err(|err| ConfigError::Toml(err.to_string()))
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string. The result is validated.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> std::result::Result<Self, ConfigError> {
        serde_json::from_str::<Self>(s)
            .map(Self::validated)
            .map_err(|err| ConfigError::Json(err.to_string()))
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to a TOML string.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> std::result::Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|err| ConfigError::Toml(err.to_string()))
    }
}
