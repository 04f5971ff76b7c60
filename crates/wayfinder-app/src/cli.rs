//! CLI argument definitions for the Wayfinder service.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Wayfinder - spoken and texted directions over a phone line.
#[derive(Parser, Debug)]
#[command(name = "wayfinder", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Webhook server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Address to bind the webhook server to.
    #[arg(short = 'b', long = "bind")]
    pub bind: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Write the effective configuration (secrets omitted) to the config
    /// path and exit.
    #[arg(long = "write-config")]
    pub write_config: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > WAYFINDER_CONFIG env var > ~/.wayfinder/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.resolve_config_path_with(|key| std::env::var(key).ok())
    }

    fn resolve_config_path_with<F>(&self, lookup: F) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = lookup("WAYFINDER_CONFIG").filter(|p| !p.is_empty()) {
            return PathBuf::from(p);
        }
        default_config_path(lookup("HOME"))
    }

    /// Resolve the log filter.
    ///
    /// Priority: --log-level flag > RUST_LOG env var > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        std::env::var("RUST_LOG").unwrap_or_else(|_| config_level.to_string())
    }
}

/// Default config file path under the user's home directory.
fn default_config_path(home: Option<String>) -> PathBuf {
    match home {
        Some(home) if !home.is_empty() => {
            PathBuf::from(home).join(".wayfinder").join("config.toml")
        }
        _ => PathBuf::from("config.toml"),
    }
}
