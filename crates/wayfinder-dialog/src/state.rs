//! Dialog state machine with validated transitions.
//!
//! One episode walks AwaitingUtterance -> Parsed -> Resolved -> Routed ->
//! Replied. Clarification edges return to AwaitingUtterance; the next
//! inbound event starts a fresh episode from there.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DialogError;

/// Position of an episode in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogState {
    AwaitingUtterance,
    Parsed,
    Resolved,
    Routed,
    Replied,
}

impl DialogState {
    pub const ALL: [DialogState; 5] = [
        DialogState::AwaitingUtterance,
        DialogState::Parsed,
        DialogState::Resolved,
        DialogState::Routed,
        DialogState::Replied,
    ];

    /// No transition leaves this state within an episode.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DialogState::Replied)
    }
}

impl fmt::Display for DialogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DialogState::AwaitingUtterance => "awaiting_utterance",
            DialogState::Parsed => "parsed",
            DialogState::Resolved => "resolved",
            DialogState::Routed => "routed",
            DialogState::Replied => "replied",
        };
        f.write_str(name)
    }
}

/// Validate that a state transition is allowed.
///
/// Valid transitions:
/// - AwaitingUtterance -> Parsed
/// - AwaitingUtterance -> AwaitingUtterance (empty utterance, incomplete parse)
/// - Parsed -> Resolved
/// - Parsed -> AwaitingUtterance (place not found)
/// - Resolved -> Routed
/// - Resolved -> Replied (route unavailable)
/// - Routed -> Replied
pub fn validate_transition(from: DialogState, to: DialogState) -> Result<(), DialogError> {
    let valid = matches!(
        (from, to),
        (DialogState::AwaitingUtterance, DialogState::Parsed)
            | (DialogState::AwaitingUtterance, DialogState::AwaitingUtterance)
            | (DialogState::Parsed, DialogState::Resolved)
            | (DialogState::Parsed, DialogState::AwaitingUtterance)
            | (DialogState::Resolved, DialogState::Routed)
            | (DialogState::Resolved, DialogState::Replied)
            | (DialogState::Routed, DialogState::Replied)
    );

    if valid {
        Ok(())
    } else {
        Err(DialogError::InvalidTransition(from, to))
    }
}

/// A single inbound event being handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub id: Uuid,
    state: DialogState,
}

impl Episode {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: DialogState::AwaitingUtterance,
        }
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    /// Move to `to`, or fail without changing state.
    pub fn advance(&mut self, to: DialogState) -> Result<(), DialogError> {
        validate_transition(self.state, to)?;
        tracing::trace!(episode = %self.id, from = %self.state, %to, "Dialog transition");
        self.state = to;
        Ok(())
    }
}

impl Default for Episode {
    fn default() -> Self {
        Self::new()
    }
}
