//! Transport-neutral replies produced by the controller.
//!
//! The webhook layer serializes these into TwiML.

use wayfinder_core::{SegmentKind, VoiceScript};

/// One instruction in a voice reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceDirective {
    /// Speak the text.
    Say(String),
    /// Stay silent for the given number of seconds.
    Pause(u32),
    /// Speak the prompt while capturing speech, then post the transcript to
    /// `action`.
    Gather {
        prompt: String,
        action: String,
        timeout_secs: u32,
    },
}

/// Ordered directives for a call, all spoken in one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceReply {
    pub language: String,
    pub directives: Vec<VoiceDirective>,
}

impl VoiceReply {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            directives: Vec::new(),
        }
    }

    pub fn say(mut self, text: impl Into<String>) -> Self {
        self.directives.push(VoiceDirective::Say(text.into()));
        self
    }

    pub fn pause(mut self, secs: u32) -> Self {
        self.directives.push(VoiceDirective::Pause(secs));
        self
    }

    pub fn gather(
        mut self,
        prompt: impl Into<String>,
        action: impl Into<String>,
        timeout_secs: u32,
    ) -> Self {
        self.directives.push(VoiceDirective::Gather {
            prompt: prompt.into(),
            action: action.into(),
            timeout_secs,
        });
        self
    }

    /// One `Say` per segment with a pause between consecutive segments.
    pub fn from_script(language: impl Into<String>, script: &VoiceScript) -> Self {
        let mut reply = Self::new(language);
        for (i, segment) in script.segments.iter().enumerate() {
            if i > 0 && script.pause_secs > 0 {
                reply = reply.pause(script.pause_secs);
            }
            reply = reply.say(segment.text.clone());
        }
        reply
    }

    /// True when the reply re-arms speech capture.
    pub fn is_reprompt(&self) -> bool {
        self.directives
            .iter()
            .any(|d| matches!(d, VoiceDirective::Gather { .. }))
    }

    /// Texts of all `Say` directives, in order.
    pub fn spoken(&self) -> Vec<&str> {
        self.directives
            .iter()
            .filter_map(|d| match d {
                VoiceDirective::Say(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// A single text message reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsReply {
    pub body: String,
}

impl SmsReply {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

/// True when `script` ends with a notice that the rest goes out by SMS.
pub(crate) fn promises_sms(script: &VoiceScript) -> bool {
    script
        .segments
        .last()
        .is_some_and(|s| s.kind == SegmentKind::Overflow)
}
