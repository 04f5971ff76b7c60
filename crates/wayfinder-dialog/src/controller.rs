//! Per-event dialog controller.
//!
//! Each inbound event runs one [`Episode`]: parse, normalize, geocode,
//! route. The result is a [`TurnOutcome`], which the channel adapters turn
//! into a voice or SMS reply. Nothing survives the event.

use std::sync::Arc;

use tracing::Instrument;
use wayfinder_core::{
    Channel, Coordinate, PhraseRegister, Route, RouteProfile, Utterance, WayfinderConfig,
};
use wayfinder_geo::{Geocoder, RoutePlanner};
use wayfinder_nlu::{normalize_place_name, IntentExtractor, ParseSource, UtteranceParser};

use crate::error::DialogError;
use crate::messenger::TextMessenger;
use crate::phrasebook::Phrasebook;
use crate::render::VoiceTextRenderer;
use crate::reply::{promises_sms, SmsReply, VoiceReply};
use crate::state::{DialogState, Episode};

/// Controller settings, derived from [`WayfinderConfig`].
#[derive(Debug, Clone)]
pub struct DialogSettings {
    /// Recognition and speech language, e.g. `hi-IN`.
    pub language: String,
    /// Path speech captures post back to.
    pub result_path: String,
    pub entry_gather_timeout_secs: u32,
    pub reprompt_gather_timeout_secs: u32,
    pub max_steps: usize,
    pub sms_max_steps: usize,
    pub pause_secs: u32,
    pub voice_profile: RouteProfile,
    pub sms_profile: RouteProfile,
    pub register: PhraseRegister,
}

impl DialogSettings {
    pub fn from_config(config: &WayfinderConfig) -> Self {
        Self {
            language: config.telephony.language.clone(),
            result_path: config.telephony.voice_result_path.clone(),
            entry_gather_timeout_secs: config.telephony.entry_gather_timeout_secs,
            reprompt_gather_timeout_secs: config.telephony.reprompt_gather_timeout_secs,
            max_steps: config.voice.max_steps,
            sms_max_steps: config.voice.sms_max_steps,
            pause_secs: config.voice.pause_secs,
            voice_profile: config.routing.voice_profile,
            sms_profile: config.routing.sms_profile,
            register: config.voice.register,
        }
    }

    fn profile_for(&self, channel: Channel) -> RouteProfile {
        match channel {
            Channel::Voice => self.voice_profile,
            Channel::Sms => self.sms_profile,
        }
    }
}

impl Default for DialogSettings {
    fn default() -> Self {
        Self::from_config(&WayfinderConfig::default())
    }
}

/// A successfully routed request.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Origin as parsed from the utterance.
    pub origin: String,
    /// Destination as parsed from the utterance.
    pub destination: String,
    pub route: Route,
}

/// How an episode ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Answered(Answer),
    /// Ask the caller again.
    Reprompt(DialogError),
    /// Reply once and end the turn.
    Terminated(DialogError),
}

impl Resolution {
    /// Clarification errors re-prompt; everything else ends the turn.
    pub fn from_error(err: DialogError) -> Self {
        if err.is_reprompt() {
            Resolution::Reprompt(err)
        } else {
            Resolution::Terminated(err)
        }
    }
}

/// Everything a channel adapter needs to build its reply.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub episode: Episode,
    pub resolution: Resolution,
    /// Failures absorbed along the way, such as an LLM fallback.
    pub recovered: Vec<DialogError>,
}

impl TurnOutcome {
    pub fn state(&self) -> DialogState {
        self.episode.state()
    }
}

/// Drives one inbound event to a reply.
pub struct DialogController {
    parser: UtteranceParser,
    geocoder: Arc<dyn Geocoder>,
    planner: Arc<dyn RoutePlanner>,
    messenger: Arc<dyn TextMessenger>,
    renderer: VoiceTextRenderer,
    phrases: Phrasebook,
    settings: DialogSettings,
}

impl DialogController {
    pub fn new(
        settings: DialogSettings,
        extractor: Arc<dyn IntentExtractor>,
        geocoder: Arc<dyn Geocoder>,
        planner: Arc<dyn RoutePlanner>,
        messenger: Arc<dyn TextMessenger>,
    ) -> Self {
        let phrases = Phrasebook::new(settings.register);
        Self {
            parser: UtteranceParser::new(extractor),
            geocoder,
            planner,
            messenger,
            renderer: VoiceTextRenderer::new(phrases, settings.pause_secs),
            phrases,
            settings,
        }
    }

    // =========================================================================
    // Channel entry points
    // =========================================================================

    /// Greeting for a new call: capture speech, then a closing line if the
    /// caller stays silent.
    pub fn voice_entry(&self) -> VoiceReply {
        VoiceReply::new(&self.settings.language)
            .gather(
                self.phrases.entry_prompt(),
                &self.settings.result_path,
                self.settings.entry_gather_timeout_secs,
            )
            .say(self.phrases.entry_closing())
    }

    /// Handle a speech transcript. `from` is the caller, `to` the called
    /// number; both are only needed for the follow-up text message.
    pub async fn handle_voice_result(
        &self,
        speech: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> VoiceReply {
        let utterance = Utterance::new(speech, Channel::Voice, &self.settings.language);
        let episode = Episode::new();
        let span = episode_span(&episode, &utterance);

        async move {
            let outcome = self.run_episode(episode, &utterance).await;
            self.voice_reply(outcome, from, to).await
        }
        .instrument(span)
        .await
    }

    /// Handle an inbound text message.
    pub async fn handle_sms(&self, body: &str) -> SmsReply {
        let utterance = Utterance::new(body, Channel::Sms, &self.settings.language);
        let episode = Episode::new();
        let span = episode_span(&episode, &utterance);

        async move {
            let outcome = self.run_episode(episode, &utterance).await;
            self.sms_reply(outcome)
        }
        .instrument(span)
        .await
    }

    /// Run an utterance through the pipeline without building a reply.
    pub async fn resolve(&self, utterance: &Utterance) -> TurnOutcome {
        let episode = Episode::new();
        let span = episode_span(&episode, utterance);
        self.run_episode(episode, utterance).instrument(span).await
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    async fn run_episode(&self, mut episode: Episode, utterance: &Utterance) -> TurnOutcome {
        let mut recovered = Vec::new();
        let resolution = match self
            .advance_pipeline(&mut episode, utterance, &mut recovered)
            .await
        {
            Ok(resolution) => resolution,
            Err(err) => {
                tracing::error!(state = %episode.state(), error = %err, "Episode aborted");
                Resolution::from_error(err)
            }
        };
        TurnOutcome {
            episode,
            resolution,
            recovered,
        }
    }

    async fn advance_pipeline(
        &self,
        episode: &mut Episode,
        utterance: &Utterance,
        recovered: &mut Vec<DialogError>,
    ) -> Result<Resolution, DialogError> {
        if utterance.is_blank() {
            episode.advance(DialogState::AwaitingUtterance)?;
            tracing::info!("Empty utterance");
            return Ok(Resolution::from_error(DialogError::EmptyUtterance));
        }

        let parsed = self.parser.parse(utterance.text()).await;
        if let ParseSource::Fallback(err) = &parsed.source {
            recovered.push(err.clone().into());
        }

        let used_fallback = parsed.used_fallback();
        let locations = parsed.locations;
        if !locations.is_complete() {
            episode.advance(DialogState::AwaitingUtterance)?;
            tracing::info!(
                origin = %locations.origin,
                destination = %locations.destination,
                fallback = used_fallback,
                "Incomplete parse, re-prompting"
            );
            return Ok(Resolution::from_error(DialogError::IncompleteParse {
                origin: locations.origin,
                destination: locations.destination,
            }));
        }
        episode.advance(DialogState::Parsed)?;

        let origin = match self.locate(&locations.origin).await {
            Ok(coordinate) => coordinate,
            Err(err) => {
                episode.advance(DialogState::AwaitingUtterance)?;
                return Ok(Resolution::from_error(err));
            }
        };
        let destination = match self.locate(&locations.destination).await {
            Ok(coordinate) => coordinate,
            Err(err) => {
                episode.advance(DialogState::AwaitingUtterance)?;
                return Ok(Resolution::from_error(err));
            }
        };
        episode.advance(DialogState::Resolved)?;

        let profile = self.settings.profile_for(utterance.channel());
        match self.planner.route(origin, destination, profile).await {
            Ok(route) => {
                episode.advance(DialogState::Routed)?;
                tracing::info!(
                    %profile,
                    steps = route.steps.len(),
                    distance_m = route.total_distance_meters,
                    "Route resolved"
                );
                Ok(Resolution::Answered(Answer {
                    origin: locations.origin,
                    destination: locations.destination,
                    route,
                }))
            }
            Err(err) => {
                episode.advance(DialogState::Replied)?;
                tracing::warn!(%profile, error = %err, "Route unavailable");
                if let Some(raw) = err.raw_payload() {
                    tracing::debug!(payload = %raw, "Routing provider payload");
                }
                Ok(Resolution::from_error(DialogError::RouteUnavailable(err)))
            }
        }
    }

    /// Normalize and geocode one place name.
    async fn locate(&self, place: &str) -> Result<Coordinate, DialogError> {
        let normalized = normalize_place_name(place.trim());
        self.geocoder
            .geocode(&normalized)
            .await
            .map_err(|source| {
                tracing::info!(
                    place = %place,
                    normalized = %normalized,
                    error = %source,
                    "Place not found"
                );
                DialogError::PlaceNotFound {
                    place: place.to_string(),
                    source,
                }
            })
    }

    // =========================================================================
    // Replies
    // =========================================================================

    async fn voice_reply(
        &self,
        outcome: TurnOutcome,
        from: Option<&str>,
        to: Option<&str>,
    ) -> VoiceReply {
        let TurnOutcome {
            mut episode,
            resolution,
            mut recovered,
        } = outcome;
        let language = &self.settings.language;

        let reply = match resolution {
            Resolution::Answered(answer) => {
                let script = self
                    .renderer
                    .render(&Ok(answer.route), self.settings.max_steps);
                if let Err(err) = self.send_side_channel(&script.to_text(), from, to).await {
                    if promises_sms(&script) {
                        tracing::warn!("Caller was promised a text message that was not delivered");
                    }
                    recovered.push(err);
                }
                self.finish(&mut episode);
                VoiceReply::from_script(language, &script)
            }
            Resolution::Reprompt(reason) => {
                let prompt = match reason {
                    DialogError::PlaceNotFound { .. } => self.phrases.voice_place_not_found(),
                    _ => self.phrases.voice_incomplete(),
                };
                VoiceReply::new(language).gather(
                    prompt,
                    &self.settings.result_path,
                    self.settings.reprompt_gather_timeout_secs,
                )
            }
            Resolution::Terminated(DialogError::RouteUnavailable(err)) => {
                let script = self.renderer.render(&Err(err), self.settings.max_steps);
                VoiceReply::from_script(language, &script)
            }
            Resolution::Terminated(DialogError::EmptyUtterance) => {
                VoiceReply::new(language).say(self.phrases.voice_empty())
            }
            Resolution::Terminated(_) => VoiceReply::new(language).say(self.phrases.voice_fault()),
        };

        tracing::info!(
            state = %episode.state(),
            reprompt = reply.is_reprompt(),
            recovered = recovered.len(),
            "Voice turn complete"
        );
        reply
    }

    fn sms_reply(&self, outcome: TurnOutcome) -> SmsReply {
        let TurnOutcome {
            mut episode,
            resolution,
            recovered,
        } = outcome;

        let body = match resolution {
            Resolution::Answered(answer) => {
                self.finish(&mut episode);
                self.renderer.render_sms(
                    &answer.origin,
                    &answer.destination,
                    &answer.route,
                    self.settings.sms_max_steps,
                )
            }
            Resolution::Reprompt(DialogError::PlaceNotFound { place, .. }) => {
                self.phrases.sms_place_not_found(&place)
            }
            Resolution::Reprompt(_) => self.phrases.sms_format_hint().to_string(),
            Resolution::Terminated(DialogError::EmptyUtterance) => {
                self.phrases.sms_empty().to_string()
            }
            Resolution::Terminated(DialogError::RouteUnavailable(err)) => {
                self.phrases.sms_route_error(err.user_label())
            }
            Resolution::Terminated(_) => self.phrases.sms_fault().to_string(),
        };

        tracing::info!(
            state = %episode.state(),
            recovered = recovered.len(),
            "SMS turn complete"
        );
        SmsReply::new(body)
    }

    /// Text the voice script to the caller from the called number.
    ///
    /// Never affects the spoken reply; failures are logged and returned for
    /// bookkeeping only.
    async fn send_side_channel(
        &self,
        body: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<(), DialogError> {
        let caller = from.map(str::trim).filter(|s| !s.is_empty());
        let called = to.map(str::trim).filter(|s| !s.is_empty());
        let (Some(caller), Some(called)) = (caller, called) else {
            tracing::info!("Skipping text message: caller or called number missing");
            return Err(DialogError::SideChannelDelivery(
                "caller or called number missing".to_string(),
            ));
        };

        match self.messenger.send(called, caller, body).await {
            Ok(()) => {
                tracing::info!("Directions texted to caller");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Side channel delivery failed");
                Err(err)
            }
        }
    }

    fn finish(&self, episode: &mut Episode) {
        if let Err(err) = episode.advance(DialogState::Replied) {
            tracing::error!(error = %err, "Could not mark episode replied");
        }
    }
}

fn episode_span(episode: &Episode, utterance: &Utterance) -> tracing::Span {
    tracing::info_span!(
        "episode",
        id = %episode.id,
        channel = %utterance.channel(),
        language = utterance.language()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messenger::RecordingMessenger;
    use crate::reply::VoiceDirective;
    use wayfinder_core::Step;
    use wayfinder_geo::{GeocodeError, MockGeocoder, MockRoutePlanner, RouteError};
    use wayfinder_nlu::{ExtractionError, MockExtractor};

    const CALLER: &str = "+919800000001";
    const SERVICE: &str = "+14155550100";

    #[test]
    fn test_resolution_from_error() {
        let incomplete = DialogError::IncompleteParse {
            origin: String::new(),
            destination: "Indore".to_string(),
        };
        assert!(matches!(
            Resolution::from_error(incomplete),
            Resolution::Reprompt(DialogError::IncompleteParse { .. })
        ));

        let missing = DialogError::PlaceNotFound {
            place: "Atlantis".to_string(),
            source: GeocodeError::Status { status: 503 },
        };
        assert!(matches!(
            Resolution::from_error(missing),
            Resolution::Reprompt(DialogError::PlaceNotFound { .. })
        ));

        assert_eq!(
            Resolution::from_error(DialogError::EmptyUtterance),
            Resolution::Terminated(DialogError::EmptyUtterance)
        );
        let route = DialogError::RouteUnavailable(RouteError::Transport("down".to_string()));
        assert_eq!(
            Resolution::from_error(route.clone()),
            Resolution::Terminated(route)
        );
    }

    struct Harness {
        controller: DialogController,
        extractor: Arc<MockExtractor>,
        geocoder: Arc<MockGeocoder>,
        planner: Arc<MockRoutePlanner>,
        messenger: Arc<RecordingMessenger>,
    }

    fn harness(
        extractor: MockExtractor,
        planner: MockRoutePlanner,
        messenger: RecordingMessenger,
    ) -> Harness {
        let extractor = Arc::new(extractor);
        let geocoder = Arc::new(
            MockGeocoder::new()
                .with_place("Ujjain", 23.1791, 75.7849)
                .with_place("Indore", 22.7196, 75.8577)
                .with_place("ujjaina", 23.1791, 75.7849),
        );
        let planner = Arc::new(planner);
        let messenger = Arc::new(messenger);
        let controller = DialogController::new(
            DialogSettings::default(),
            extractor.clone(),
            geocoder.clone(),
            planner.clone(),
            messenger.clone(),
        );
        Harness {
            controller,
            extractor,
            geocoder,
            planner,
            messenger,
        }
    }

    fn route_with_steps(n: usize) -> Route {
        Route {
            total_distance_meters: 55321.4,
            total_duration_seconds: 3980.6,
            steps: (1..=n)
                .map(|i| Step {
                    instruction: format!("Continue on <b>AB Road</b> {}", i),
                    distance_meters: 1000.0,
                    duration_seconds: 60.0,
                })
                .collect(),
        }
    }

    fn no_route() -> RouteError {
        RouteError::NoRoute {
            raw: r#"{"error":{"code":2010,"message":"Could not find routable point"}}"#.to_string(),
        }
    }

    fn voice(text: &str) -> Utterance {
        Utterance::new(text, Channel::Voice, "hi-IN")
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    #[tokio::test]
    async fn test_happy_path_reaches_routed() {
        let h = harness(
            MockExtractor::returning("Ujjain", "Indore"),
            MockRoutePlanner::returning(route_with_steps(3)),
            RecordingMessenger::new(),
        );

        let outcome = h.controller.resolve(&voice("Ujjain se Indore jaana hai")).await;

        assert_eq!(outcome.state(), DialogState::Routed);
        assert!(outcome.recovered.is_empty());
        match outcome.resolution {
            Resolution::Answered(answer) => {
                assert_eq!(answer.origin, "Ujjain");
                assert_eq!(answer.destination, "Indore");
                assert_eq!(answer.route.steps.len(), 3);
            }
            other => panic!("expected answer, got {:?}", other),
        }

        let (origin, destination, profile) = h.planner.last_request().unwrap();
        assert_eq!(origin, Coordinate::new(23.1791, 75.7849));
        assert_eq!(destination, Coordinate::new(22.7196, 75.8577));
        assert_eq!(profile, RouteProfile::DrivingCar);
    }

    #[tokio::test]
    async fn test_devanagari_names_are_normalized_before_geocoding() {
        let h = harness(
            MockExtractor::returning("उज्जैन", "Indore"),
            MockRoutePlanner::returning(route_with_steps(1)),
            RecordingMessenger::new(),
        );

        let outcome = h.controller.resolve(&voice("उज्जैन से इंदौर")).await;

        assert_eq!(outcome.state(), DialogState::Routed);
        assert_eq!(h.geocoder.queries(), vec!["ujjaina", "Indore"]);
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back_and_is_recorded() {
        let h = harness(
            MockExtractor::failing(ExtractionError::Transport("timed out".to_string())),
            MockRoutePlanner::returning(route_with_steps(2)),
            RecordingMessenger::new(),
        );

        let outcome = h.controller.resolve(&voice("Ujjain se Indore")).await;

        assert_eq!(outcome.state(), DialogState::Routed);
        assert_eq!(
            outcome.recovered,
            vec![DialogError::IntentExtraction(ExtractionError::Transport(
                "timed out".to_string()
            ))]
        );
        assert_eq!(h.geocoder.queries(), vec!["ujjain", "indore"]);
    }

    #[tokio::test]
    async fn test_no_separator_and_llm_failure_reprompts_without_routing() {
        let h = harness(
            MockExtractor::failing(ExtractionError::Malformed("not json".to_string())),
            MockRoutePlanner::returning(route_with_steps(2)),
            RecordingMessenger::new(),
        );

        let outcome = h.controller.resolve(&voice("mujhe Indore jaana hai")).await;

        assert_eq!(outcome.state(), DialogState::AwaitingUtterance);
        assert_eq!(
            outcome.resolution,
            Resolution::Reprompt(DialogError::IncompleteParse {
                origin: String::new(),
                destination: String::new(),
            })
        );
        assert!(h.geocoder.queries().is_empty());
        assert_eq!(h.planner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_origin_miss_reprompts_without_routing() {
        let h = harness(
            MockExtractor::returning("Atlantis", "Indore"),
            MockRoutePlanner::returning(route_with_steps(2)),
            RecordingMessenger::new(),
        );

        let outcome = h.controller.resolve(&voice("Atlantis se Indore")).await;

        assert_eq!(outcome.state(), DialogState::AwaitingUtterance);
        assert_eq!(
            outcome.resolution,
            Resolution::Reprompt(DialogError::PlaceNotFound {
                place: "Atlantis".to_string(),
                source: GeocodeError::NotFound("Atlantis".to_string()),
            })
        );
        assert_eq!(h.planner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_destination_miss_reprompts_without_routing() {
        let h = harness(
            MockExtractor::returning("Ujjain", "Atlantis"),
            MockRoutePlanner::returning(route_with_steps(2)),
            RecordingMessenger::new(),
        );

        let outcome = h.controller.resolve(&voice("Ujjain se Atlantis")).await;

        assert!(matches!(
            outcome.resolution,
            Resolution::Reprompt(DialogError::PlaceNotFound { ref place, .. })
                if place == "Atlantis"
        ));
        assert_eq!(h.planner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_route_failure_is_terminal() {
        let h = harness(
            MockExtractor::returning("Ujjain", "Indore"),
            MockRoutePlanner::failing(no_route()),
            RecordingMessenger::new(),
        );

        let outcome = h.controller.resolve(&voice("Ujjain se Indore")).await;

        assert_eq!(outcome.state(), DialogState::Replied);
        assert_eq!(
            outcome.resolution,
            Resolution::Terminated(DialogError::RouteUnavailable(no_route()))
        );
        assert_eq!(h.planner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_utterance_skips_parser() {
        let h = harness(
            MockExtractor::returning("Ujjain", "Indore"),
            MockRoutePlanner::returning(route_with_steps(2)),
            RecordingMessenger::new(),
        );

        let outcome = h.controller.resolve(&voice("   ")).await;

        assert_eq!(outcome.state(), DialogState::AwaitingUtterance);
        assert_eq!(
            outcome.resolution,
            Resolution::Terminated(DialogError::EmptyUtterance)
        );
        assert_eq!(h.extractor.call_count(), 0);
    }

    // =========================================================================
    // Voice channel
    // =========================================================================

    #[test]
    fn test_voice_entry_arms_gather_then_closes() {
        let h = harness(
            MockExtractor::returning("", ""),
            MockRoutePlanner::failing(no_route()),
            RecordingMessenger::new(),
        );

        let reply = h.controller.voice_entry();

        assert_eq!(reply.language, "hi-IN");
        assert_eq!(
            reply.directives,
            vec![
                VoiceDirective::Gather {
                    prompt: "Namaste. Kripya boliye, aap kahaan se kahaan jaana chahte hain."
                        .to_string(),
                    action: "/twilio/voice/result".to_string(),
                    timeout_secs: 5,
                },
                VoiceDirective::Say(
                    "Agar aapne bolna band kar diya hai, toh main call ko band kar dunga."
                        .to_string()
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_voice_answer_is_paced_and_texted() {
        let h = harness(
            MockExtractor::returning("Ujjain", "Indore"),
            MockRoutePlanner::returning(route_with_steps(10)),
            RecordingMessenger::new(),
        );

        let reply = h
            .controller
            .handle_voice_result("Ujjain se Indore", Some(CALLER), Some(SERVICE))
            .await;

        let spoken = reply.spoken();
        assert_eq!(spoken.len(), 8);
        assert!(spoken[0].starts_with("Rasta mil gaya."));
        assert_eq!(
            spoken[1],
            "Kadam 1: Continue on AB Road 1. Doori 1000 m, samay 60 sec."
        );
        assert_eq!(spoken[7], "Aur details ke liye SMS bheja jayega.");

        let pauses = reply
            .directives
            .iter()
            .filter(|d| matches!(d, VoiceDirective::Pause(1)))
            .count();
        assert_eq!(pauses, 7);
        assert!(matches!(reply.directives.last(), Some(VoiceDirective::Say(_))));
        assert!(!reply.is_reprompt());

        let sent = h.messenger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, SERVICE);
        assert_eq!(sent[0].to, CALLER);
        assert_eq!(sent[0].body, spoken.join(" "));
    }

    #[tokio::test]
    async fn test_side_channel_failure_does_not_change_reply() {
        let ok = harness(
            MockExtractor::returning("Ujjain", "Indore"),
            MockRoutePlanner::returning(route_with_steps(8)),
            RecordingMessenger::new(),
        );
        let failing = harness(
            MockExtractor::returning("Ujjain", "Indore"),
            MockRoutePlanner::returning(route_with_steps(8)),
            RecordingMessenger::failing(),
        );

        let expected = ok
            .controller
            .handle_voice_result("Ujjain se Indore", Some(CALLER), Some(SERVICE))
            .await;
        let actual = failing
            .controller
            .handle_voice_result("Ujjain se Indore", Some(CALLER), Some(SERVICE))
            .await;

        assert_eq!(actual, expected);
        assert_eq!(failing.messenger.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_numbers_skip_text_message() {
        let h = harness(
            MockExtractor::returning("Ujjain", "Indore"),
            MockRoutePlanner::returning(route_with_steps(2)),
            RecordingMessenger::new(),
        );

        let reply = h
            .controller
            .handle_voice_result("Ujjain se Indore", None, Some(SERVICE))
            .await;

        assert_eq!(reply.spoken().len(), 3);
        assert!(h.messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_voice_incomplete_parse_regathers() {
        let h = harness(
            MockExtractor::returning("Ujjain", ""),
            MockRoutePlanner::returning(route_with_steps(2)),
            RecordingMessenger::new(),
        );

        let reply = h
            .controller
            .handle_voice_result("Ujjain", Some(CALLER), Some(SERVICE))
            .await;

        assert_eq!(
            reply.directives,
            vec![VoiceDirective::Gather {
                prompt: "Mujhe poori jankari nahi mili. Kripya dobara kahein.".to_string(),
                action: "/twilio/voice/result".to_string(),
                timeout_secs: 6,
            }]
        );
        assert!(h.messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_voice_place_not_found_regathers_with_distinct_wording() {
        let h = harness(
            MockExtractor::returning("Atlantis", "Indore"),
            MockRoutePlanner::returning(route_with_steps(2)),
            RecordingMessenger::new(),
        );

        let reply = h
            .controller
            .handle_voice_result("Atlantis se Indore", Some(CALLER), Some(SERVICE))
            .await;

        assert!(reply.is_reprompt());
        match &reply.directives[0] {
            VoiceDirective::Gather { prompt, .. } => {
                assert_eq!(prompt, "Mujhe jagah ka pata nahi laga. Kripya acche se kahein.");
            }
            other => panic!("expected gather, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_voice_route_failure_apologizes_once() {
        let h = harness(
            MockExtractor::returning("Ujjain", "Indore"),
            MockRoutePlanner::failing(no_route()),
            RecordingMessenger::new(),
        );

        let reply = h
            .controller
            .handle_voice_result("Ujjain se Indore", Some(CALLER), Some(SERVICE))
            .await;

        assert_eq!(
            reply.directives,
            vec![VoiceDirective::Say(
                "Maaf kijiye. Route prapt karne mein problem: No route found.".to_string()
            )]
        );
        assert!(h.messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_voice_empty_speech() {
        let h = harness(
            MockExtractor::returning("Ujjain", "Indore"),
            MockRoutePlanner::returning(route_with_steps(2)),
            RecordingMessenger::new(),
        );

        let reply = h.controller.handle_voice_result("", None, None).await;

        assert_eq!(
            reply.spoken(),
            vec!["Mujhe aapki baat samajh nahi aayi. Kripya dobara call karen."]
        );
        assert!(!reply.is_reprompt());
    }

    // =========================================================================
    // SMS channel
    // =========================================================================

    #[tokio::test]
    async fn test_sms_answer_uses_sms_profile_and_compact_format() {
        let h = harness(
            MockExtractor::returning("Ujjain", "Indore"),
            MockRoutePlanner::returning(route_with_steps(7)),
            RecordingMessenger::new(),
        );

        let reply = h.controller.handle_sms("Ujjain se Indore").await;

        let lines: Vec<&str> = reply.body.lines().collect();
        assert_eq!(
            lines[0],
            "Rasta: Ujjain → Indore. Distance: 55321 m, Time: 3981 sec."
        );
        assert_eq!(lines[1], "1. Continue on AB Road 1 (1000 m)");
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[7], "Aur details ke liye call karein.");

        let (_, _, profile) = h.planner.last_request().unwrap();
        assert_eq!(profile, RouteProfile::FootWalking);
        assert!(h.messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_sms_incomplete_parse_sends_format_hint() {
        let h = harness(
            MockExtractor::returning("", ""),
            MockRoutePlanner::returning(route_with_steps(2)),
            RecordingMessenger::new(),
        );

        let reply = h.controller.handle_sms("hello").await;
        assert_eq!(
            reply,
            SmsReply::new("Kripya format: 'FROM <place> TO <place>' ya 'X se Y tak' bhejein.")
        );
    }

    #[tokio::test]
    async fn test_sms_geocodes_before_routing() {
        let h = harness(
            MockExtractor::returning("Ujjain", "Atlantis"),
            MockRoutePlanner::returning(route_with_steps(2)),
            RecordingMessenger::new(),
        );

        let reply = h.controller.handle_sms("Ujjain to Atlantis").await;

        assert_eq!(
            reply.body,
            "Jagah ka pata nahi laga: Atlantis. Kripya poora naam bhejein."
        );
        assert_eq!(h.planner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_sms_route_error_hides_payload() {
        let h = harness(
            MockExtractor::returning("Ujjain", "Indore"),
            MockRoutePlanner::failing(no_route()),
            RecordingMessenger::new(),
        );

        let reply = h.controller.handle_sms("Ujjain se Indore").await;
        assert_eq!(reply.body, "Route Error: No route found.");
    }

    #[tokio::test]
    async fn test_sms_empty_body() {
        let h = harness(
            MockExtractor::returning("Ujjain", "Indore"),
            MockRoutePlanner::returning(route_with_steps(2)),
            RecordingMessenger::new(),
        );

        let reply = h.controller.handle_sms("").await;
        assert_eq!(
            reply.body,
            "Kya aap dobara bhej sakte hain? Samajhne mein dikkat hui."
        );
        assert_eq!(h.extractor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_english_register_settings() {
        let settings = DialogSettings {
            register: PhraseRegister::English,
            language: "en-IN".to_string(),
            ..DialogSettings::default()
        };
        let controller = DialogController::new(
            settings,
            Arc::new(MockExtractor::returning("", "")),
            Arc::new(MockGeocoder::new()),
            Arc::new(MockRoutePlanner::failing(no_route())),
            Arc::new(RecordingMessenger::new()),
        );

        let reply = controller.handle_voice_result("hmm", None, None).await;
        assert_eq!(reply.language, "en-IN");
        assert!(reply.is_reprompt());
    }
}
