//! Place name → coordinate lookup.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use wayfinder_core::config::GeocoderConfig;
use wayfinder_core::{Coordinate, WayfinderError};

use crate::error::GeocodeError;

/// Resolves a normalized place name to a single best-guess coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, place_name: &str) -> Result<Coordinate, GeocodeError>;
}

// =============================================================================
// Nominatim
// =============================================================================

#[derive(Debug, Deserialize)]
struct Candidate {
    lat: String,
    lon: String,
}

/// Geocoder backed by a Nominatim `/search` endpoint.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, WayfinderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| WayfinderError::HttpClient(e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    /// Wrap an existing client. The client must already send a `User-Agent`.
    pub fn with_client(client: reqwest::Client, config: &GeocoderConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, place_name: &str) -> Result<Coordinate, GeocodeError> {
        let response = self
            .client
            .get(self.search_url())
            .query(&[("q", place_name), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let coordinate = parse_candidates(&body, place_name)?;
        tracing::debug!(
            place = %place_name,
            lat = coordinate.latitude,
            lon = coordinate.longitude,
            "Place geocoded"
        );
        Ok(coordinate)
    }
}

/// Take the first candidate of a `/search` response.
///
/// An empty array is `NotFound`; coordinates that do not parse as numbers
/// are `Malformed`.
pub fn parse_candidates(body: &str, place_name: &str) -> Result<Coordinate, GeocodeError> {
    let candidates: Vec<Candidate> =
        serde_json::from_str(body).map_err(|e| GeocodeError::Malformed(e.to_string()))?;

    let first = candidates
        .first()
        .ok_or_else(|| GeocodeError::NotFound(place_name.to_string()))?;

    let latitude = parse_degrees(&first.lat)?;
    let longitude = parse_degrees(&first.lon)?;
    Ok(Coordinate::new(latitude, longitude))
}

fn parse_degrees(value: &str) -> Result<f64, GeocodeError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GeocodeError::Malformed(format!("not a coordinate: {:?}", value)))
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Mock geocoder with a fixed gazetteer.
///
/// Lookups are case-insensitive; unknown names are `NotFound`. Every query is
/// recorded in call order.
#[derive(Debug, Default)]
pub struct MockGeocoder {
    places: HashMap<String, Coordinate>,
    queries: Mutex<Vec<String>>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a known place.
    pub fn with_place(mut self, name: &str, latitude: f64, longitude: f64) -> Self {
        self.places
            .insert(name.to_lowercase(), Coordinate::new(latitude, longitude));
        self
    }

    /// Names looked up so far.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, place_name: &str) -> Result<Coordinate, GeocodeError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(place_name.to_string());
        }
        self.places
            .get(&place_name.to_lowercase())
            .copied()
            .ok_or_else(|| GeocodeError::NotFound(place_name.to_string()))
    }
}
