use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, WayfinderError};
use crate::types::{PhraseRegister, RouteProfile};

/// Top-level configuration for the Wayfinder service.
///
/// Loaded from `~/.wayfinder/config.toml` by default. Secrets are normally
/// supplied through the environment (see [`WayfinderConfig::apply_env`]).
/// The value is handed to each component at construction; nothing reads
/// configuration from globals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WayfinderConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub telephony: TelephonyConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

impl WayfinderConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: WayfinderConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| WayfinderError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Overlay secrets and overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary key lookup.
    ///
    /// Recognized keys: `GEMINI_API_KEY`, `ORS_API_KEY`, `TWILIO_ACCOUNT_SID`,
    /// `TWILIO_AUTH_TOKEN`, `WAYFINDER_PORT`. Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GEMINI_API_KEY") {
            self.llm.api_key = key;
        }
        if let Some(key) = get("ORS_API_KEY") {
            self.routing.api_key = key;
        }
        if let Some(sid) = get("TWILIO_ACCOUNT_SID") {
            self.telephony.account_sid = sid;
        }
        if let Some(token) = get("TWILIO_AUTH_TOKEN") {
            self.telephony.auth_token = token;
        }
        if let Some(port) = get("WAYFINDER_PORT") {
            match port.trim().parse::<u16>() {
                Ok(p) => self.general.port = p,
                Err(_) => warn!(value = %port, "Ignoring unparsable WAYFINDER_PORT"),
            }
        }
    }

    /// Check invariants that would otherwise surface as runtime misbehavior.
    ///
    /// Missing credentials are only warned about: the intent extractor then
    /// fails fast and the rule-based parser takes over.
    pub fn validate(&self) -> Result<()> {
        let timeouts = [
            ("llm.timeout_secs", self.llm.timeout_secs),
            ("geocoder.timeout_secs", self.geocoder.timeout_secs),
            ("routing.timeout_secs", self.routing.timeout_secs),
            ("telephony.timeout_secs", self.telephony.timeout_secs),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(WayfinderError::Config(format!("{} must be greater than 0", name)));
            }
        }
        if self.voice.max_steps == 0 {
            return Err(WayfinderError::Config(
                "voice.max_steps must be greater than 0".to_string(),
            ));
        }
        if self.voice.sms_max_steps == 0 {
            return Err(WayfinderError::Config(
                "voice.sms_max_steps must be greater than 0".to_string(),
            ));
        }
        if self.geocoder.user_agent.trim().is_empty() {
            return Err(WayfinderError::Config(
                "geocoder.user_agent is required by the geocoding service".to_string(),
            ));
        }
        if !self.telephony.voice_result_path.starts_with('/') {
            return Err(WayfinderError::Config(
                "telephony.voice_result_path must be an absolute path".to_string(),
            ));
        }

        if self.llm.api_key.is_empty() {
            warn!("llm.api_key is empty; utterances will be parsed by the rule-based fallback");
        }
        if self.routing.api_key.is_empty() {
            warn!("routing.api_key is empty; directions requests will be rejected");
        }
        if self.telephony.account_sid.is_empty() || self.telephony.auth_token.is_empty() {
            warn!("Twilio credentials are empty; follow-up text messages will fail");
        }
        Ok(())
    }
}

/// General service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Address the webhook server binds to.
    pub bind_address: String,
    /// Webhook server port.
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Upper bound on handling one inbound event, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3030,
            log_level: "info".to_string(),
            request_timeout_secs: 14,
        }
    }
}

/// Intent extraction (LLM) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the Generative Language API.
    pub endpoint: String,
    /// Model name.
    pub model: String,
    /// API key. Usually set via `GEMINI_API_KEY`.
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: String::new(),
            timeout_secs: 5,
        }
    }
}

/// Geocoding service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Base URL of the Nominatim instance.
    pub base_url: String,
    /// Client identification sent as `User-Agent`. Required by Nominatim's usage policy.
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("wayfinder/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

/// Routing service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Base URL of the OpenRouteService API.
    pub base_url: String,
    /// API key. Usually set via `ORS_API_KEY`.
    pub api_key: String,
    pub timeout_secs: u64,
    /// Profile for directions requested over a phone call.
    pub voice_profile: RouteProfile,
    /// Profile for directions requested by text message.
    pub sms_profile: RouteProfile,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openrouteservice.org".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
            voice_profile: RouteProfile::DrivingCar,
            sms_profile: RouteProfile::FootWalking,
        }
    }
}

/// Telephony transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelephonyConfig {
    /// Twilio account SID. Usually set via `TWILIO_ACCOUNT_SID`.
    pub account_sid: String,
    /// Twilio auth token. Usually set via `TWILIO_AUTH_TOKEN`.
    pub auth_token: String,
    /// Base URL of the Twilio REST API.
    pub api_base: String,
    /// Speech recognition and `<Say>` language.
    pub language: String,
    /// Path the speech gather posts its result to.
    pub voice_result_path: String,
    /// Silence timeout for the first speech gather, in seconds.
    pub entry_gather_timeout_secs: u32,
    /// Silence timeout for a clarification re-prompt, in seconds.
    pub reprompt_gather_timeout_secs: u32,
    /// Timeout for outbound text message delivery.
    pub timeout_secs: u64,
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            api_base: "https://api.twilio.com/2010-04-01".to_string(),
            language: "hi-IN".to_string(),
            voice_result_path: "/twilio/voice/result".to_string(),
            entry_gather_timeout_secs: 5,
            reprompt_gather_timeout_secs: 6,
            timeout_secs: 10,
        }
    }
}

/// Spoken and texted rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Maximum maneuver steps read out on a call.
    pub max_steps: usize,
    /// Pause between spoken segments, in seconds.
    pub pause_secs: u32,
    /// Maximum maneuver steps included in an SMS reply.
    pub sms_max_steps: usize,
    /// Wording register for user-facing text.
    pub register: PhraseRegister,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            max_steps: 6,
            pause_secs: 1,
            sms_max_steps: 6,
            register: PhraseRegister::Hinglish,
        }
    }
}
