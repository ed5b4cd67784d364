//! Configuration management for Mailroom Core
//!
//! Settings come from an optional config file (any format the `config`
//! crate understands) overlaid with `MAILROOM__*` environment variables.
//! Mail accounts live under `email_services`:
//!
//! ```toml
//! [[email_services]]
//! service_key = "alerts"
//! smtp_server = "smtp.example.com"
//! port = 587
//! security = "starttls"
//! user_name = "alerts@example.com"
//! password = "secret"
//! from = "alerts@example.com"
//! from_name = "Alerts"
//! cc_email_addresses = []
//! bcc_email_addresses = ["audit@example.com"]
//! ```
//!
//! `security` defaults to `none` (plain SMTP) and `port` to the transport
//! default for the chosen security mode.

use crate::domain::EmailServiceOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mailroom.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Named mail accounts
    #[serde(default, alias = "EmailServices")]
    pub email_services: Vec<EmailServiceOptions>,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
        }
    }
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from `MAILROOM_CONFIG` (or the default file) and
    /// the environment
    pub fn from_env() -> Result<Self> {
        let path = env::var("MAILROOM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load(&path)
    }

    /// Load configuration from `path` and the environment.
    ///
    /// A missing file is not an error; the result then holds whatever the
    /// environment provides.
    pub fn load(path: &str) -> Result<Self> {
        config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("MAILROOM")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .with_context(|| format!("Invalid configuration in {}", path))
    }

    /// Parse an already-serialized JSON list of account records
    pub fn services_from_json(json: &str) -> Result<Vec<EmailServiceOptions>> {
        serde_json::from_str(json).context("Invalid email service configuration list")
    }
}
