//! Gemini `generateContent` client implementing [`IntentExtractor`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wayfinder_core::config::LlmConfig;
use wayfinder_core::{ParsedLocations, WayfinderError};

use crate::error::ExtractionError;
use crate::extractor::{build_prompt, parse_locations_reply, IntentExtractor};

// Generative Language API request/response shapes (subset).
#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Intent extractor backed by a Gemini model.
pub struct GeminiExtractor {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiExtractor {
    /// Build an extractor with its own HTTP client and timeout.
    pub fn new(config: &LlmConfig) -> Result<Self, WayfinderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WayfinderError::HttpClient(e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    /// Build an extractor around an existing client.
    pub fn with_client(client: reqwest::Client, config: &LlmConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.trim().to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl IntentExtractor for GeminiExtractor {
    async fn extract(&self, utterance: &str) -> Result<ParsedLocations, ExtractionError> {
        if self.api_key.is_empty() {
            return Err(ExtractionError::NotConfigured("missing API key".to_string()));
        }

        let prompt = build_prompt(utterance);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: 128,
            },
        };

        let response = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::Status {
                status: status.as_u16(),
            });
        }

        let reply: GenerateResponse = response.json().await?;
        let text = reply_text(&reply)?;
        tracing::debug!(model = %self.model, reply_len = text.len(), "Gemini reply received");
        parse_locations_reply(&text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Concatenate the text parts of the first candidate.
fn reply_text(reply: &GenerateResponse) -> Result<String, ExtractionError> {
    let content = reply
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .ok_or_else(|| ExtractionError::Malformed("no candidates in reply".to_string()))?;

    let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
    if text.trim().is_empty() {
        return Err(ExtractionError::Malformed("empty candidate text".to_string()));
    }
    Ok(text)
}
