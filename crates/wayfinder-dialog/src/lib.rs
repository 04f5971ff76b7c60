//! Conversation resolution for the directions assistant.
//!
//! The [`DialogController`] drives one inbound event through parse, geocode,
//! route and render, and turns the outcome into a voice or SMS reply. It
//! keeps no memory between events: where the caller is in the conversation
//! is encoded by which webhook fired.

pub mod controller;
pub mod error;
pub mod messenger;
pub mod phrasebook;
pub mod render;
pub mod reply;
pub mod state;

pub use controller::{Answer, DialogController, DialogSettings, Resolution, TurnOutcome};
pub use error::DialogError;
pub use messenger::{RecordingMessenger, SentMessage, TextMessenger, TwilioMessenger};
pub use phrasebook::Phrasebook;
pub use render::{strip_html, VoiceTextRenderer};
pub use reply::{SmsReply, VoiceDirective, VoiceReply};
pub use state::{validate_transition, DialogState, Episode};
