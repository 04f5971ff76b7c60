use thiserror::Error;

/// Outcome of a failed geocoding lookup.
///
/// Every variant means "no coordinate"; the distinction only matters for
/// logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    #[error("No match for place: {0}")]
    NotFound(String),

    #[error("Geocoding service returned status {status}")]
    Status { status: u16 },

    #[error("Geocoding transport error: {0}")]
    Transport(String),

    #[error("Malformed geocoding response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        GeocodeError::Transport(err.to_string())
    }
}

/// Outcome of a failed directions request.
///
/// The raw provider payload is kept for diagnostics only. Anything spoken or
/// texted to a caller must go through [`RouteError::user_label`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("No route in provider response")]
    NoRoute { raw: String },

    #[error("Routing service returned status {status}")]
    Status { status: u16, raw: String },

    #[error("Routing transport error: {0}")]
    Transport(String),
}

impl RouteError {
    /// Short label safe to put in front of a caller.
    pub fn user_label(&self) -> &'static str {
        match self {
            RouteError::NoRoute { .. } => "No route found",
            RouteError::Status { .. } => "Routing service error",
            RouteError::Transport(_) => "Routing service unreachable",
        }
    }

    /// Provider payload, when one was received.
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            RouteError::NoRoute { raw } | RouteError::Status { raw, .. } => Some(raw.as_str()),
            RouteError::Transport(_) => None,
        }
    }
}

impl From<reqwest::Error> for RouteError {
    fn from(err: reqwest::Error) -> Self {
        RouteError::Transport(err.to_string())
    }
}
