//! Wayfinder API crate - axum webhook server for the telephony provider.
//!
//! Exposes the voice entry, voice result and SMS webhooks, each answering
//! with TwiML, plus a JSON health check.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod twiml;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
