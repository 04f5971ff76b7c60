//! Wayfinder application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Overlay secrets from the environment and validate
//! 3. Build the LLM, geocoding, routing and messaging clients
//! 4. Serve the telephony webhooks until ctrl-c

mod cli;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wayfinder_api::routes;
use wayfinder_api::state::AppState;
use wayfinder_core::WayfinderConfig;
use wayfinder_dialog::{DialogController, DialogSettings, TwilioMessenger};
use wayfinder_geo::{NominatimGeocoder, OpenRouteServiceClient};
use wayfinder_nlu::GeminiExtractor;

use crate::cli::CliArgs;

/// Copy of `config` safe to write to disk.
fn without_secrets(config: &WayfinderConfig) -> WayfinderConfig {
    let mut redacted = config.clone();
    redacted.llm.api_key.clear();
    redacted.routing.api_key.clear();
    redacted.telephony.account_sid.clear();
    redacted.telephony.auth_token.clear();
    redacted
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let config_file = args.resolve_config_path();
    let loaded = WayfinderConfig::load(&config_file);

    // Tracing.
    let config_level = loaded
        .as_ref()
        .map(|c| c.general.log_level.as_str())
        .unwrap_or("info");
    let level = args.resolve_log_level(config_level);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting Wayfinder v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let mut config = match loaded {
        Ok(config) => {
            tracing::info!(path = %config_file.display(), "Configuration loaded");
            config
        }
        Err(e) => {
            tracing::warn!(
                path = %config_file.display(),
                error = %e,
                "Using default configuration"
            );
            WayfinderConfig::default()
        }
    };
    config.apply_env();
    if let Some(port) = args.port {
        config.general.port = port;
    }
    if let Some(ref bind) = args.bind {
        config.general.bind_address = bind.clone();
    }

    if args.write_config {
        without_secrets(&config).save(&config_file)?;
        return Ok(());
    }

    config.validate()?;

    // External clients.
    let extractor = Arc::new(GeminiExtractor::new(&config.llm)?);
    let geocoder = Arc::new(NominatimGeocoder::new(&config.geocoder)?);
    let planner = Arc::new(OpenRouteServiceClient::new(&config.routing)?);
    let messenger = Arc::new(TwilioMessenger::new(&config.telephony)?);

    let settings = DialogSettings::from_config(&config);
    tracing::info!(
        model = %config.llm.model,
        voice_profile = %settings.voice_profile,
        sms_profile = %settings.sms_profile,
        register = ?settings.register,
        "Dialog controller ready"
    );
    let controller = DialogController::new(settings, extractor, geocoder, planner, messenger);

    // === Webhook server ===
    let state = AppState::new(config, controller);
    routes::start_server(state).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_secrets_clears_credentials_only() {
        let mut config = WayfinderConfig::default();
        config.llm.api_key = "g-key".to_string();
        config.routing.api_key = "ors-key".to_string();
        config.telephony.account_sid = "AC1".to_string();
        config.telephony.auth_token = "tok".to_string();
        config.general.port = 8080;

        let redacted = without_secrets(&config);
        assert!(redacted.llm.api_key.is_empty());
        assert!(redacted.routing.api_key.is_empty());
        assert!(redacted.telephony.account_sid.is_empty());
        assert!(redacted.telephony.auth_token.is_empty());
        assert_eq!(redacted.general.port, 8080);
    }
}
