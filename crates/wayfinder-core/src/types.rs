//! Shared data model for a single conversation episode.
//!
//! Every value here is created and consumed inside one inbound transport
//! event. Nothing is retained across events.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WayfinderError;

// =============================================================================
// Utterance
// =============================================================================

/// Channel an utterance arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Voice,
    Sms,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Voice => write!(f, "voice"),
            Channel::Sms => write!(f, "sms"),
        }
    }
}

/// One inbound natural-language input, spoken or texted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    text: String,
    channel: Channel,
    language: String,
}

impl Utterance {
    pub fn new(text: impl Into<String>, channel: Channel, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            channel,
            language: language.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// BCP-47 language hint, e.g. `hi-IN`.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// True when the utterance carries no usable text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

// =============================================================================
// ParsedLocations
// =============================================================================

/// The `{origin, destination}` pair extracted from an utterance.
///
/// An empty field means the parse is incomplete and the caller must be asked
/// again; it is never a silent failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLocations {
    pub origin: String,
    pub destination: String,
}

impl ParsedLocations {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
        }
    }

    /// Both fields empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when both origin and destination are present.
    pub fn is_complete(&self) -> bool {
        !self.origin.trim().is_empty() && !self.destination.trim().is_empty()
    }
}

// =============================================================================
// Coordinate
// =============================================================================

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Render as `lon,lat`, the axis order routing providers expect.
    pub fn to_lon_lat(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }
}

// =============================================================================
// Route
// =============================================================================

/// Travel profile understood by the routing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteProfile {
    #[serde(rename = "driving-car")]
    DrivingCar,
    #[serde(rename = "driving-hgv")]
    DrivingHgv,
    #[serde(rename = "foot-walking")]
    FootWalking,
    #[serde(rename = "foot-hiking")]
    FootHiking,
    #[serde(rename = "cycling-regular")]
    CyclingRegular,
    #[serde(rename = "cycling-road")]
    CyclingRoad,
    #[serde(rename = "cycling-mountain")]
    CyclingMountain,
    #[serde(rename = "cycling-electric")]
    CyclingElectric,
    #[serde(rename = "wheelchair")]
    Wheelchair,
}

impl RouteProfile {
    pub const ALL: [RouteProfile; 9] = [
        RouteProfile::DrivingCar,
        RouteProfile::DrivingHgv,
        RouteProfile::FootWalking,
        RouteProfile::FootHiking,
        RouteProfile::CyclingRegular,
        RouteProfile::CyclingRoad,
        RouteProfile::CyclingMountain,
        RouteProfile::CyclingElectric,
        RouteProfile::Wheelchair,
    ];

    /// Path segment used by the directions endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteProfile::DrivingCar => "driving-car",
            RouteProfile::DrivingHgv => "driving-hgv",
            RouteProfile::FootWalking => "foot-walking",
            RouteProfile::FootHiking => "foot-hiking",
            RouteProfile::CyclingRegular => "cycling-regular",
            RouteProfile::CyclingRoad => "cycling-road",
            RouteProfile::CyclingMountain => "cycling-mountain",
            RouteProfile::CyclingElectric => "cycling-electric",
            RouteProfile::Wheelchair => "wheelchair",
        }
    }
}

impl fmt::Display for RouteProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteProfile {
    type Err = WayfinderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        RouteProfile::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| WayfinderError::InvalidProfile(s.to_string()))
    }
}

/// One maneuver of a route, in provider order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub instruction: String,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// A directed path with its summary and ordered maneuver steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub total_distance_meters: f64,
    pub total_duration_seconds: f64,
    pub steps: Vec<Step>,
}

// =============================================================================
// VoiceScript
// =============================================================================

/// What a script segment carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum SegmentKind {
    /// Distance and duration summary.
    Summary,
    /// A numbered maneuver, 1-based.
    Step(usize),
    /// Notice that the remaining steps go out by text message.
    Overflow,
    /// Apology for a route that could not be fetched.
    Apology,
}

/// One independently speakable piece of a [`VoiceScript`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

/// Ordered, paced segments produced for spoken or texted delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceScript {
    pub segments: Vec<Segment>,
    /// Pause between consecutive segments, in seconds.
    pub pause_secs: u32,
}

impl VoiceScript {
    pub fn new(pause_secs: u32) -> Self {
        Self {
            segments: Vec::new(),
            pause_secs,
        }
    }

    pub fn push(&mut self, kind: SegmentKind, text: impl Into<String>) {
        self.segments.push(Segment {
            kind,
            text: text.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of step segments.
    pub fn step_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s.kind, SegmentKind::Step(_)))
            .count()
    }

    pub fn has_overflow(&self) -> bool {
        self.segments
            .iter()
            .any(|s| s.kind == SegmentKind::Overflow)
    }

    /// All segments joined into a single message body.
    pub fn to_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Wording register for user-facing text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhraseRegister {
    /// Romanized Hindi, matching the `hi-IN` recognition language.
    #[default]
    Hinglish,
    English,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_locations_completeness() {
        assert!(ParsedLocations::new("Ujjain", "Indore").is_complete());
        assert!(!ParsedLocations::new("Ujjain", "").is_complete());
        assert!(!ParsedLocations::new("", "Indore").is_complete());
        assert!(!ParsedLocations::new("  ", "Indore").is_complete());
        assert!(!ParsedLocations::empty().is_complete());
    }

    #[test]
    fn test_coordinate_lon_lat_order() {
        let c = Coordinate::new(23.1765, 75.7885);
        assert_eq!(c.to_lon_lat(), "75.7885,23.1765");
    }

    #[test]
    fn test_route_profile_round_trip_names() {
        for profile in RouteProfile::ALL {
            let parsed: RouteProfile = profile.as_str().parse().unwrap();
            assert_eq!(parsed, profile);
        }
    }

    #[test]
    fn test_route_profile_parse_is_case_insensitive() {
        let p: RouteProfile = " Foot-Walking ".parse().unwrap();
        assert_eq!(p, RouteProfile::FootWalking);
    }

    #[test]
    fn test_route_profile_rejects_unknown() {
        let err = "walking".parse::<RouteProfile>().unwrap_err();
        assert!(matches!(err, WayfinderError::InvalidProfile(_)));
    }

    #[test]
    fn test_route_profile_serde_uses_provider_names() {
        let json = serde_json::to_string(&RouteProfile::CyclingRegular).unwrap();
        assert_eq!(json, "\"cycling-regular\"");
    }

    #[test]
    fn test_utterance_blank() {
        assert!(Utterance::new("   ", Channel::Voice, "hi-IN").is_blank());
        assert!(!Utterance::new("Bhopal to Indore", Channel::Sms, "hi-IN").is_blank());
    }

    #[test]
    fn test_voice_script_counts() {
        let mut script = VoiceScript::new(1);
        script.push(SegmentKind::Summary, "Summary.");
        script.push(SegmentKind::Step(1), "Step one.");
        script.push(SegmentKind::Step(2), "Step two.");
        script.push(SegmentKind::Overflow, "More by SMS.");

        assert_eq!(script.len(), 4);
        assert_eq!(script.step_count(), 2);
        assert!(script.has_overflow());
        assert_eq!(script.to_text(), "Summary. Step one. Step two. More by SMS.");
    }

    #[test]
    fn test_channel_display() {
        assert_eq!(Channel::Voice.to_string(), "voice");
        assert_eq!(Channel::Sms.to_string(), "sms");
    }
}
