//! Directions between two coordinates.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use wayfinder_core::config::RoutingConfig;
use wayfinder_core::{Coordinate, Route, RouteProfile, Step, WayfinderError};

use crate::error::RouteError;

/// Fetches a routed path for a travel profile.
///
/// Coordinates are taken latitude-first; implementations convert to whatever
/// axis order their provider expects.
#[async_trait]
pub trait RoutePlanner: Send + Sync {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        profile: RouteProfile,
    ) -> Result<Route, RouteError>;
}

// =============================================================================
// OpenRouteService
// =============================================================================

/// Route planner backed by the OpenRouteService directions API.
pub struct OpenRouteServiceClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenRouteServiceClient {
    pub fn new(config: &RoutingConfig) -> Result<Self, WayfinderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WayfinderError::HttpClient(e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: &RoutingConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
        }
    }

    fn directions_url(&self, profile: RouteProfile) -> String {
        format!("{}/v2/directions/{}", self.base_url, profile.as_str())
    }
}

/// Query parameters for a directions request, in `lon,lat` order.
fn directions_query(origin: Coordinate, destination: Coordinate) -> Vec<(&'static str, String)> {
    vec![
        ("start", origin.to_lon_lat()),
        ("end", destination.to_lon_lat()),
    ]
}

#[async_trait]
impl RoutePlanner for OpenRouteServiceClient {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        profile: RouteProfile,
    ) -> Result<Route, RouteError> {
        let response = self
            .client
            .get(self.directions_url(profile))
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .query(&directions_query(origin, destination))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RouteError::Status {
                status: status.as_u16(),
                raw: body,
            });
        }

        let route = parse_directions(&body)?;
        tracing::debug!(
            %profile,
            distance_m = route.total_distance_meters,
            duration_s = route.total_duration_seconds,
            steps = route.steps.len(),
            "Route fetched"
        );
        Ok(route)
    }
}

/// Extract the best route from a directions response.
///
/// Only `features[0].properties.segments[0]` is read; the provider already
/// ranks its alternatives. Anything short of that path is `NoRoute` with the
/// body kept verbatim.
pub fn parse_directions(body: &str) -> Result<Route, RouteError> {
    let no_route = || RouteError::NoRoute {
        raw: body.to_string(),
    };

    let value: Value = serde_json::from_str(body).map_err(|_| no_route())?;
    let segment = value
        .get("features")
        .and_then(Value::as_array)
        .and_then(|features| features.first())
        .and_then(|feature| feature.pointer("/properties/segments/0"))
        .ok_or_else(no_route)?;

    let steps = segment
        .get("steps")
        .and_then(Value::as_array)
        .map(|steps| steps.iter().map(parse_step).collect())
        .unwrap_or_default();

    Ok(Route {
        total_distance_meters: number(segment, "distance"),
        total_duration_seconds: number(segment, "duration"),
        steps,
    })
}

fn parse_step(step: &Value) -> Step {
    Step {
        instruction: step
            .get("instruction")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        distance_meters: number(step, "distance"),
        duration_seconds: number(step, "duration"),
    }
}

// The provider omits zero-valued fields.
fn number(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Mock route planner returning a fixed outcome and recording requests.
#[derive(Debug)]
pub struct MockRoutePlanner {
    outcome: Result<Route, RouteError>,
    calls: AtomicUsize,
    last_request: Mutex<Option<(Coordinate, Coordinate, RouteProfile)>>,
}

impl MockRoutePlanner {
    pub fn returning(route: Route) -> Self {
        Self::with_outcome(Ok(route))
    }

    pub fn failing(error: RouteError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<Route, RouteError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Arguments of the most recent `route` call.
    pub fn last_request(&self) -> Option<(Coordinate, Coordinate, RouteProfile)> {
        self.last_request.lock().ok().and_then(|r| *r)
    }
}

#[async_trait]
impl RoutePlanner for MockRoutePlanner {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        profile: RouteProfile,
    ) -> Result<Route, RouteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some((origin, destination, profile));
        }
        self.outcome.clone()
    }
}
