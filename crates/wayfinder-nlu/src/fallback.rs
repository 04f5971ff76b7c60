//! Rule-based origin/destination splitting.
//!
//! Used only when the LLM extractor fails. Recognizes the two patterns
//! callers use most: "X se Y" (optionally "X se ... to Y") and "X to Y".

use wayfinder_core::ParsedLocations;

/// Hindi "from" separator.
const SE: &str = " se ";
const TO: &str = " to ";

/// Split an utterance into origin and destination.
///
/// The text is lower-cased first. With `" se "`, the left side is the origin;
/// the right side is the destination, or the part after a further `" to "`
/// when present. Otherwise `" to "` splits once. With neither separator both
/// fields come back empty.
pub fn split_origin_destination(utterance: &str) -> ParsedLocations {
    let text = utterance.to_lowercase();

    if let Some((origin, rest)) = text.split_once(SE) {
        let destination = match rest.split_once(TO) {
            Some((_, after)) => after,
            None => rest,
        };
        return ParsedLocations::new(origin.trim(), destination.trim());
    }

    if let Some((origin, destination)) = text.split_once(TO) {
        return ParsedLocations::new(origin.trim(), destination.trim());
    }

    ParsedLocations::empty()
}
