//! Error types for the dialog layer.

use thiserror::Error;
use wayfinder_geo::{GeocodeError, RouteError};
use wayfinder_nlu::ExtractionError;

use crate::state::DialogState;

/// Failures an episode can run into.
///
/// Only [`DialogError::InvalidTransition`] indicates a bug. The others are
/// expected conversational outcomes: each maps to a recovery, a re-prompt, or
/// a terminal apology, never to a transport error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DialogError {
    /// LLM extraction failed; recovered by the rule-based parser.
    #[error("Intent extraction failed: {0}")]
    IntentExtraction(#[from] ExtractionError),

    #[error("Empty utterance")]
    EmptyUtterance,

    /// Origin or destination missing after parsing.
    #[error("Incomplete parse: origin={origin:?}, destination={destination:?}")]
    IncompleteParse { origin: String, destination: String },

    #[error("Place not found: {place} ({source})")]
    PlaceNotFound {
        place: String,
        #[source]
        source: GeocodeError,
    },

    #[error("Route unavailable: {0}")]
    RouteUnavailable(#[from] RouteError),

    /// Best-effort text message could not be delivered.
    #[error("Side channel delivery failed: {0}")]
    SideChannelDelivery(String),

    #[error("Invalid dialog transition: {0} -> {1}")]
    InvalidTransition(DialogState, DialogState),
}

impl DialogError {
    /// Whether the caller is asked to try again within the same call.
    pub fn is_reprompt(&self) -> bool {
        matches!(
            self,
            DialogError::IncompleteParse { .. } | DialogError::PlaceNotFound { .. }
        )
    }
}
