//! Configuration management for iroiro
//!
//! This module handles loading and validating configuration from environment variables,
//! files, and command-line arguments.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::liveness::TIMEOUT_MS;
use crate::models::MAX_FAILURE_COUNT;

/// Maximum probe attempts per automatic run
pub const MAX_ATTEMPTS: usize = 10;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data file locations
    pub data: DataConfig,

    /// Liveness probe configuration
    pub probe: ProbeConfig,

    /// Selection limits
    pub selection: SelectionConfig,

    /// Publisher hand-off
    pub publish: PublishConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Where persisted state lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding all data files
    pub data_dir: PathBuf,

    /// Bookmark catalog file name
    pub sites_file: String,

    /// Status file name
    pub status_file: String,

    /// Rotation log file name
    pub rotation_file: String,
}

/// Liveness probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Deadline per probe in milliseconds (HEAD plus GET fallback)
    pub timeout_ms: u64,

    /// User agent string
    pub user_agent: String,

    /// Hosts that always count as reachable
    pub exempt_hosts: Vec<String>,

    /// URL schemes that are never probed
    pub out_of_band_schemes: Vec<String>,
}

/// Selection limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Probe attempts per automatic run
    pub max_attempts: usize,

    /// Consecutive failures before an entry goes inactive
    pub max_failure_count: u32,
}

/// How the selected entry is handed off
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    /// Print the note draft as JSON on stdout
    #[default]
    Stdout,
    /// POST the note draft to a webhook
    Webhook,
    /// Do not publish
    None,
}

impl std::str::FromStr for PublishMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "webhook" => Ok(Self::Webhook),
            "none" => Ok(Self::None),
            other => Err(format!("unknown publish mode: {other}")),
        }
    }
}

/// Publisher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Hand-off mode
    pub mode: PublishMode,

    /// Webhook endpoint (required for `webhook` mode)
    pub webhook_url: Option<String>,

    /// Optional bearer token for the webhook
    pub auth_token: Option<String>,

    /// Event kind of the published note
    pub kind: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            sites_file: String::from("iroiro.json"),
            status_file: String::from("status.json"),
            rotation_file: String::from("rotation.json"),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: TIMEOUT_MS,
            user_agent: format!("iroiro/{}", env!("CARGO_PKG_VERSION")),
            exempt_hosts: vec![
                String::from("x.com"),
                String::from("twitter.com"),
                String::from("www.amazon.co.jp"),
                String::from("www.instagram.com"),
            ],
            out_of_band_schemes: vec![String::from("nostr")],
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            max_failure_count: MAX_FAILURE_COUNT,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            mode: PublishMode::Stdout,
            webhook_url: None,
            auth_token: None,
            kind: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from `IROIRO_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("IROIRO_DATA_DIR") {
            self.data.data_dir = PathBuf::from(dir);
        }

        if let Ok(ms) = std::env::var("IROIRO_PROBE_TIMEOUT_MS") {
            self.probe.timeout_ms = ms
                .parse()
                .with_context(|| format!("Invalid IROIRO_PROBE_TIMEOUT_MS: {ms}"))?;
        }

        if let Ok(agent) = std::env::var("IROIRO_USER_AGENT") {
            self.probe.user_agent = agent;
        }

        if let Ok(hosts) = std::env::var("IROIRO_EXEMPT_HOSTS") {
            self.probe.exempt_hosts = split_list(&hosts);
        }

        if let Ok(attempts) = std::env::var("IROIRO_MAX_ATTEMPTS") {
            self.selection.max_attempts = attempts
                .parse()
                .with_context(|| format!("Invalid IROIRO_MAX_ATTEMPTS: {attempts}"))?;
        }

        if let Ok(mode) = std::env::var("IROIRO_PUBLISH_MODE") {
            self.publish.mode = mode.parse().map_err(anyhow::Error::msg)?;
        }

        if let Ok(url) = std::env::var("IROIRO_WEBHOOK_URL") {
            self.publish.webhook_url = Some(url);
        }

        if let Ok(token) = std::env::var("IROIRO_WEBHOOK_TOKEN") {
            self.publish.auth_token = Some(token);
        }

        if let Ok(level) = std::env::var("IROIRO_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("IROIRO_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.probe.timeout_ms == 0 {
            anyhow::bail!("probe.timeout_ms must be greater than 0");
        }

        if self.selection.max_attempts == 0 {
            anyhow::bail!("selection.max_attempts must be greater than 0");
        }

        if self.selection.max_failure_count == 0 {
            anyhow::bail!("selection.max_failure_count must be greater than 0");
        }

        if self.publish.mode == PublishMode::Webhook && self.publish.webhook_url.is_none() {
            anyhow::bail!("publish.webhook_url is required in webhook mode");
        }

        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
