//! Two-tier utterance parser.
//!
//! The LLM extractor runs first. The rule-based splitter runs only when the
//! extractor fails; a successful extraction is returned as-is even when a
//! field is empty.

use std::sync::Arc;

use wayfinder_core::ParsedLocations;

use crate::error::ExtractionError;
use crate::extractor::IntentExtractor;
use crate::fallback::split_origin_destination;

/// Which tier produced a [`ParseOutcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseSource {
    /// The LLM extractor answered.
    Llm,
    /// The extractor failed with the given error and the rules were applied.
    Fallback(ExtractionError),
}

/// Result of parsing one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub locations: ParsedLocations,
    pub source: ParseSource,
}

impl ParseOutcome {
    pub fn used_fallback(&self) -> bool {
        matches!(self.source, ParseSource::Fallback(_))
    }
}

/// Extracts `{origin, destination}` from raw utterances.
#[derive(Clone)]
pub struct UtteranceParser {
    extractor: Arc<dyn IntentExtractor>,
}

impl UtteranceParser {
    pub fn new(extractor: Arc<dyn IntentExtractor>) -> Self {
        Self { extractor }
    }

    /// Parse an utterance. Never fails; an incomplete result is signalled by
    /// empty fields.
    pub async fn parse(&self, utterance: &str) -> ParseOutcome {
        match self.extractor.extract(utterance).await {
            Ok(locations) => {
                tracing::debug!(
                    extractor = self.extractor.name(),
                    origin = %locations.origin,
                    destination = %locations.destination,
                    "Locations extracted"
                );
                ParseOutcome {
                    locations,
                    source: ParseSource::Llm,
                }
            }
            Err(err) => {
                tracing::warn!(
                    extractor = self.extractor.name(),
                    class = err.class(),
                    error = %err,
                    "Intent extraction failed, using rule-based parser"
                );
                ParseOutcome {
                    locations: split_origin_destination(utterance),
                    source: ParseSource::Fallback(err),
                }
            }
        }
    }
}
