//! Router setup with all webhook routes and middleware.

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use wayfinder_core::WayfinderError;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
///
/// The speech result route is mounted at the configured path so that it
/// always matches the action URL written into `<Gather>`.
pub fn create_router(state: AppState) -> Router {
    let result_path = state.config.telephony.voice_result_path.clone();
    let request_timeout = Duration::from_secs(state.config.general.request_timeout_secs.max(1));

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/twilio/voice",
            get(handlers::voice_entry).post(handlers::voice_entry),
        )
        .route(&result_path, post(handlers::voice_result))
        .route("/twilio/sms", post(handlers::sms))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(64 * 1024)) // webhook forms are small
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until ctrl-c.
pub async fn start_server(state: AppState) -> Result<(), WayfinderError> {
    let addr = format!(
        "{}:{}",
        state.config.general.bind_address, state.config.general.port
    );
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| WayfinderError::Transport(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(addr = %addr, "Webhook server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| WayfinderError::Transport(format!("Server error: {}", e)))?;

    tracing::info!("Webhook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not install ctrl-c handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
