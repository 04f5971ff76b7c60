//! Geocoding and routing adapters.
//!
//! Both adapters make exactly one request per call and report failures as
//! typed outcomes. Retry and clarification policy lives in the dialog layer.

pub mod error;
pub mod geocoder;
pub mod router;

pub use error::{GeocodeError, RouteError};
pub use geocoder::{Geocoder, MockGeocoder, NominatimGeocoder};
pub use router::{MockRoutePlanner, OpenRouteServiceClient, RoutePlanner};
