//! Utterance understanding for Wayfinder.
//!
//! Turns a free-form Hindi/English travel request into an origin and a
//! destination, and normalizes place names into a script the geocoder can
//! search.

pub mod error;
pub mod extractor;
pub mod fallback;
pub mod gemini;
pub mod normalizer;
pub mod parser;

pub use error::ExtractionError;
pub use extractor::{IntentExtractor, MockExtractor};
pub use fallback::split_origin_destination;
pub use gemini::GeminiExtractor;
pub use normalizer::{contains_devanagari, normalize_place_name};
pub use parser::{ParseOutcome, ParseSource, UtteranceParser};
