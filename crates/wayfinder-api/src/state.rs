//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use wayfinder_core::WayfinderConfig;
use wayfinder_dialog::DialogController;

/// Shared application state.
///
/// Read-only after start-up; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<WayfinderConfig>,
    /// Dialog controller with its external clients.
    pub controller: Arc<DialogController>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
    /// Wall-clock start time reported by the health check.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: WayfinderConfig, controller: DialogController) -> Self {
        Self {
            config: Arc::new(config),
            controller: Arc::new(controller),
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }
}
