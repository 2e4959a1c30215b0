#![forbid(unsafe_code)]

//! Production log output.
//!
//! Resolvers emit `roving.keyboard`, `roving.mouse` and `roving.click` spans
//! when the `tracing` feature is on. With `tracing-json`, [`init_json`]
//! installs a global subscriber writing one JSON object per line, filtered by
//! `RUST_LOG` (e.g. `RUST_LOG=roving_core=debug`).

/// Subscriber installation failure (a global subscriber already exists).
#[derive(Debug)]
pub struct LoggingInitError(String);

impl std::fmt::Display for LoggingInitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to install log subscriber: {}", self.0)
    }
}

impl std::error::Error for LoggingInitError {}

/// Install a JSON-lines subscriber honouring `RUST_LOG`.
#[cfg(feature = "tracing-json")]
pub fn init_json() -> Result<(), LoggingInitError> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .with_current_span(true)
        .try_init()
        .map_err(|err| LoggingInitError(err.to_string()))
}

#[cfg(all(test, feature = "tracing-json"))]
mod tests {
    use super::*;

    #[test]
    fn second_install_fails() {
        let _ = init_json();
        assert!(init_json().is_err());
    }
}
