//! Error types for intent extraction.

/// Why the LLM-backed extraction path produced no usable result.
///
/// Every variant triggers the rule-based fallback; none is surfaced to the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("extractor not configured: {0}")]
    NotConfigured(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("extractor returned status {status}")]
    Status { status: u16 },
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ExtractionError {
    /// Short class name for log fields.
    pub fn class(&self) -> &'static str {
        match self {
            ExtractionError::NotConfigured(_) => "not_configured",
            ExtractionError::Transport(_) => "transport",
            ExtractionError::Status { .. } => "status",
            ExtractionError::Malformed(_) => "malformed",
        }
    }
}

impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ExtractionError::Malformed(err.to_string())
        } else {
            ExtractionError::Transport(err.to_string())
        }
    }
}
