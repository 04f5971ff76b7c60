use thiserror::Error;

/// Top-level error type for the Wayfinder service.
///
/// Adapter crates define their own outcome types for external calls; this
/// enum covers the process-level failures (configuration, I/O, client
/// construction) that abort start-up or a request outright.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WayfinderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid route profile: {0}")]
    InvalidProfile(String),
}

impl From<toml::de::Error> for WayfinderError {
    fn from(err: toml::de::Error) -> Self {
        WayfinderError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for WayfinderError {
    fn from(err: toml::ser::Error) -> Self {
        WayfinderError::Config(err.to_string())
    }
}

/// A specialized `Result` type for Wayfinder operations.
pub type Result<T> = std::result::Result<T, WayfinderError>;
