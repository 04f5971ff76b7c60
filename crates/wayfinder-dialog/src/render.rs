//! Route → speakable script and compact SMS text.

use std::sync::LazyLock;

use regex::Regex;
use wayfinder_core::{Route, SegmentKind, VoiceScript};
use wayfinder_geo::RouteError;

use crate::phrasebook::Phrasebook;

static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<]+?>").expect("Invalid HTML tag regex"));

/// Remove markup such as `<b>` from a provider instruction.
pub fn strip_html(raw: &str) -> String {
    HTML_TAG_RE.replace_all(raw, "").trim().to_string()
}

/// Compresses routes into bounded, paced text.
///
/// Rendering is pure and total: every input, including a failed route,
/// produces a script.
#[derive(Debug, Clone, Copy)]
pub struct VoiceTextRenderer {
    phrases: Phrasebook,
    pause_secs: u32,
}

impl VoiceTextRenderer {
    pub fn new(phrases: Phrasebook, pause_secs: u32) -> Self {
        Self {
            phrases,
            pause_secs,
        }
    }

    /// Build the spoken script for a route outcome.
    ///
    /// A failure renders as a single apology segment. Otherwise: a summary,
    /// up to `max_steps` numbered steps, and an overflow notice when steps
    /// were dropped.
    pub fn render(&self, route: &Result<Route, RouteError>, max_steps: usize) -> VoiceScript {
        let mut script = VoiceScript::new(self.pause_secs);

        let route = match route {
            Ok(route) => route,
            Err(err) => {
                script.push(SegmentKind::Apology, self.phrases.route_apology(err.user_label()));
                return script;
            }
        };

        script.push(
            SegmentKind::Summary,
            self.phrases
                .summary(route.total_distance_meters, route.total_duration_seconds),
        );

        for (i, step) in route.steps.iter().take(max_steps).enumerate() {
            let index = i + 1;
            script.push(
                SegmentKind::Step(index),
                self.phrases.step(
                    index,
                    &strip_html(&step.instruction),
                    step.distance_meters,
                    step.duration_seconds,
                ),
            );
        }

        if route.steps.len() > max_steps {
            script.push(SegmentKind::Overflow, self.phrases.voice_overflow());
        }

        script
    }

    /// Build the compact multi-line SMS body for a route.
    pub fn render_sms(
        &self,
        origin: &str,
        destination: &str,
        route: &Route,
        max_steps: usize,
    ) -> String {
        let mut lines = Vec::with_capacity(route.steps.len().min(max_steps) + 2);
        lines.push(self.phrases.sms_header(
            origin,
            destination,
            route.total_distance_meters,
            route.total_duration_seconds,
        ));

        for (i, step) in route.steps.iter().take(max_steps).enumerate() {
            lines.push(
                self.phrases
                    .sms_step(i + 1, &strip_html(&step.instruction), step.distance_meters),
            );
        }

        if route.steps.len() > max_steps {
            lines.push(self.phrases.sms_overflow().to_string());
        }

        lines.join("\n")
    }
}
