#![forbid(unsafe_code)]

//! Error model for the fallible edges of the crate.
//!
//! Resolution itself never fails: every resolver returns a no-op
//! [`ResolveResult`](crate::command::ResolveResult) instead. Only parsing key
//! combos and loading configuration can produce an [`Error`].

use std::fmt;

/// A key combo string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    /// The input was empty or whitespace.
    Empty,
    /// Modifiers were given but no key followed them (e.g. `"Ctrl+"`).
    MissingKey(String),
    /// A modifier name was not recognized.
    UnknownModifier(String),
    /// A key name was not recognized.
    UnknownKey(String),
}

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    Io(std::io::Error),
    /// The TOML document was malformed.
    Toml(String),
    /// The JSON document was malformed.
    Json(String),
    /// A keymap entry names a key that does not parse.
    InvalidBinding { key: String, source: KeyParseError },
}

/// Top-level error type for roving-core.
#[derive(Debug)]
pub enum Error {
    /// Key combo parsing failure.
    KeyParse(KeyParseError),
    /// Configuration failure.
    Config(ConfigError),
}

/// Standard result type for roving-core APIs.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Error type label for tracing fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::KeyParse(_) => "key_parse",
            Self::Config(ConfigError::Io(_)) => "config_io",
            Self::Config(ConfigError::Toml(_)) => "config_toml",
            Self::Config(ConfigError::Json(_)) => "config_json",
            Self::Config(ConfigError::InvalidBinding { .. }) => "config_binding",
        }
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty key combo"),
            Self::MissingKey(input) => write!(f, "no key after modifiers in {input:?}"),
            Self::UnknownModifier(name) => write!(f, "unknown modifier {name:?}"),
            Self::UnknownKey(name) => write!(f, "unknown key {name:?}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config I/O: {err}"),
            Self::Toml(msg) => write!(f, "config TOML: {msg}"),
            Self::Json(msg) => write!(f, "config JSON: {msg}"),
            Self::InvalidBinding { key, source } => {
                write!(f, "keymap entry {key:?}: {source}")
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyParse(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

// ── std::error::Error ───────────────────────────────────────────────────

impl std::error::Error for KeyParseError {}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InvalidBinding { source, .. } => Some(source),
            Self::Toml(_) | Self::Json(_) => None,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::KeyParse(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<KeyParseError> for Error {
    fn from(err: KeyParseError) -> Self {
        Self::KeyParse(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Config(ConfigError::Io(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_input() {
        let err = Error::from(KeyParseError::UnknownKey("Hyper".into()));
        assert_eq!(err.to_string(), "unknown key \"Hyper\"");
        assert_eq!(err.error_type(), "key_parse");
    }

    #[test]
    fn binding_error_chains_source() {
        let err = ConfigError::InvalidBinding {
            key: "Ctrl+".into(),
            source: KeyParseError::MissingKey("Ctrl+".into()),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("Ctrl+"));
    }

    #[test]
    fn io_converts_into_config_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert_eq!(err.error_type(), "config_io");
    }
}
