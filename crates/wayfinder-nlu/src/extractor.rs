//! LLM-backed intent extraction contract.
//!
//! Defines the [`IntentExtractor`] trait, the fixed extraction instruction,
//! recovery of the JSON object from a model reply, and a mock extractor for
//! tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};
use wayfinder_core::ParsedLocations;

use crate::error::ExtractionError;

/// Fixed instruction sent ahead of every utterance.
pub const EXTRACTION_INSTRUCTION: &str = "You are a helper that extracts origin and destination \
locations from a short spoken user query. Return ONLY valid JSON like: \
{\"origin\":\"<origin text>\", \"destination\":\"<destination text>\"}. \
If you cannot find either, return it as an empty string.\n\
User query may be in Hindi or English and might be short and informal. \
Always return origin and destination names in ENGLISH, even if the input is Hindi.";

/// Build the full prompt for one utterance.
pub fn build_prompt(utterance: &str) -> String {
    format!("{}\n\nUser utterance: '''{}'''", EXTRACTION_INSTRUCTION, utterance)
}

/// Extracts an origin/destination pair from free text.
///
/// Implementations make exactly one attempt; the caller decides what to do
/// on failure.
#[async_trait]
pub trait IntentExtractor: Send + Sync {
    /// Extract locations from a raw utterance.
    async fn extract(&self, utterance: &str) -> Result<ParsedLocations, ExtractionError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

// =============================================================================
// Reply recovery
// =============================================================================

/// Recover the locations object from a model reply.
///
/// Tolerates a markdown code fence and prose around the object: decoding
/// starts at the first `{` and stops after one JSON value.
pub fn parse_locations_reply(content: &str) -> Result<ParsedLocations, ExtractionError> {
    let content = strip_code_fence(content);
    let start = content
        .find('{')
        .ok_or_else(|| ExtractionError::Malformed("no JSON object in reply".to_string()))?;

    let value = serde_json::Deserializer::from_str(&content[start..])
        .into_iter::<Value>()
        .next()
        .ok_or_else(|| ExtractionError::Malformed("empty JSON payload".to_string()))?
        .map_err(|e| ExtractionError::Malformed(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| ExtractionError::Malformed("reply is not a JSON object".to_string()))?;

    Ok(ParsedLocations::new(
        string_field(object, "origin")?,
        string_field(object, "destination")?,
    ))
}

fn string_field(object: &Map<String, Value>, key: &str) -> Result<String, ExtractionError> {
    match object.get(key) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(other) => Err(ExtractionError::Malformed(format!(
            "field `{}` is not a string: {}",
            key, other
        ))),
    }
}

/// Remove a surrounding markdown fence such as ```` ```json ... ``` ````.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Mock extractor returning a fixed outcome.
///
/// Used by dialog and API tests in place of a real LLM.
#[derive(Debug)]
pub struct MockExtractor {
    outcome: Result<ParsedLocations, ExtractionError>,
    calls: AtomicUsize,
}

impl MockExtractor {
    /// Always succeed with the given pair.
    pub fn returning(origin: &str, destination: &str) -> Self {
        Self {
            outcome: Ok(ParsedLocations::new(origin, destination)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with the given error.
    pub fn failing(error: ExtractionError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `extract` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IntentExtractor for MockExtractor {
    async fn extract(&self, utterance: &str) -> Result<ParsedLocations, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(utterance_len = utterance.len(), "Mock extraction");
        self.outcome.clone()
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_reply() {
        let parsed =
            parse_locations_reply(r#"{"origin": "Ujjain", "destination": "Indore"}"#).unwrap();
        assert_eq!(parsed, ParsedLocations::new("Ujjain", "Indore"));
    }

    #[test]
    fn test_fenced_json_reply() {
        let reply = "```json\n{\"origin\":\"Bhopal\",\"destination\":\"Sanchi\"}\n```";
        let parsed = parse_locations_reply(reply).unwrap();
        assert_eq!(parsed, ParsedLocations::new("Bhopal", "Sanchi"));
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let reply = "Sure! Here is the result: {\"origin\": \" Dewas \", \"destination\": \"Ujjain\"} Hope this helps.";
        let parsed = parse_locations_reply(reply).unwrap();
        assert_eq!(parsed, ParsedLocations::new("Dewas", "Ujjain"));
    }

    #[test]
    fn test_missing_fields_read_as_empty() {
        let parsed = parse_locations_reply(r#"{"destination": "Indore"}"#).unwrap();
        assert_eq!(parsed.origin, "");
        assert_eq!(parsed.destination, "Indore");
    }

    #[test]
    fn test_no_object_is_malformed() {
        let err = parse_locations_reply("I could not understand.").unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed(_)));
    }

    #[test]
    fn test_truncated_object_is_malformed() {
        let err = parse_locations_reply(r#"{"origin": "Ujjain", "destin"#).unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed(_)));
    }

    #[test]
    fn test_non_string_field_is_malformed() {
        let err =
            parse_locations_reply(r#"{"origin": null, "destination": "Indore"}"#).unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed(_)));

        let err = parse_locations_reply(r#"{"origin": 5, "destination": "Indore"}"#).unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed(_)));
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("```{}```"), "{}");
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
    }

    #[test]
    fn test_prompt_contains_instruction_and_utterance() {
        let prompt = build_prompt("Ujjain se Indore");
        assert!(prompt.starts_with(EXTRACTION_INSTRUCTION));
        assert!(prompt.ends_with("User utterance: '''Ujjain se Indore'''"));
        assert!(prompt.contains("ENGLISH"));
    }

    #[tokio::test]
    async fn test_mock_extractor_counts_calls() {
        let mock = MockExtractor::returning("A", "B");
        assert_eq!(mock.call_count(), 0);
        let parsed = mock.extract("A to B").await.unwrap();
        assert_eq!(parsed, ParsedLocations::new("A", "B"));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_extractor_failing() {
        let mock = MockExtractor::failing(ExtractionError::Transport("down".to_string()));
        assert!(mock.extract("anything").await.is_err());
        assert_eq!(mock.name(), "mock");
    }
}
