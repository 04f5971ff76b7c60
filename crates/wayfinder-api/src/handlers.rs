//! Route handler functions for the webhook endpoints.
//!
//! Twilio posts `application/x-www-form-urlencoded` bodies. Every field is
//! optional; a missing transcript or message body is handled by the dialog
//! as an empty utterance.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::{Form, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;
use crate::twiml::{messaging_response, voice_response, TwiML};

// =============================================================================
// Form types
// =============================================================================

/// Fields of the speech gather callback.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VoiceResultForm {
    pub speech_result: Option<String>,
    /// Caller number.
    pub from: Option<String>,
    /// Called (service) number.
    pub to: Option<String>,
}

/// Fields of an inbound message callback.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SmsForm {
    pub body: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub started_at: DateTime<Utc>,
}

// =============================================================================
// Telephony webhooks
// =============================================================================

/// GET|POST /twilio/voice - greet the caller and arm speech capture.
pub async fn voice_entry(State(state): State<AppState>) -> TwiML {
    voice_response(&state.controller.voice_entry())
}

/// POST /twilio/voice/result - answer a speech transcript.
pub async fn voice_result(
    State(state): State<AppState>,
    form: Result<Form<VoiceResultForm>, FormRejection>,
) -> Result<TwiML, ApiError> {
    let Form(form) = form?;
    let speech = form.speech_result.unwrap_or_default();

    let reply = state
        .controller
        .handle_voice_result(&speech, form.from.as_deref(), form.to.as_deref())
        .await;
    Ok(voice_response(&reply))
}

/// POST /twilio/sms - answer an inbound text message.
pub async fn sms(
    State(state): State<AppState>,
    form: Result<Form<SmsForm>, FormRejection>,
) -> Result<TwiML, ApiError> {
    let Form(form) = form?;
    let body = form.body.unwrap_or_default();

    let reply = state.controller.handle_sms(&body).await;
    Ok(messaging_response(&reply))
}

// =============================================================================
// Service endpoints
// =============================================================================

/// GET /health - liveness and uptime.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        started_at: state.started_at,
    })
}

/// Fallback for unknown paths.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("No such endpoint".to_string())
}
