//! Application configuration loaded from environment variables.
//!
//! Fail-fast: required variables must be present and valid or startup
//! aborts with the offending variable named. Everything here is static
//! deployment configuration; the engine itself never reads the
//! environment.

use std::env;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use oaisync_engine::EngineConfig;
use oaisync_protocol::HarvestConfig;
use oaisync_store::{ProvenanceSettings, StoreConfig};

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Everything the adapter needs for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub harvest: HarvestConfig,
    pub store: StoreConfig,
    pub engine: EngineConfig,
    /// File the run summary line is appended to.
    pub tracking_log: PathBuf,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let harvest = HarvestConfig {
            base_url: require("OAISYNC_SOURCE_URL")?,
            metadata_prefix: require("OAISYNC_METADATA_PREFIX")?,
            identifier_prefix: optional("OAISYNC_IDENTIFIER_PREFIX").unwrap_or_default(),
            contact_email: optional("OAISYNC_CONTACT_EMAIL"),
            timeout_secs: parsed_or("OAISYNC_SOURCE_TIMEOUT_SECS", 60)?,
        };

        let store = StoreConfig {
            base_url: require("OAISYNC_NODE_URL")?,
            cert_path: optional("OAISYNC_NODE_CERT"),
            key_path: optional("OAISYNC_NODE_KEY"),
            timeout_secs: parsed_or("OAISYNC_NODE_TIMEOUT_SECS", 120)?,
            provenance: ProvenanceSettings {
                submitter: require("OAISYNC_SUBMITTER")?,
                rights_holder: require("OAISYNC_RIGHTS_HOLDER")?,
                authoritative_node: require("OAISYNC_AUTHORITATIVE_NODE")?,
                origin_node: require("OAISYNC_ORIGIN_NODE")?,
                format_id: require("OAISYNC_FORMAT_ID")?,
            },
        };

        let mut engine = EngineConfig::default();
        if let Some(sentinel) = optional("OAISYNC_SENTINEL_IDENTIFIER") {
            engine.sentinel_identifier = sentinel;
        }
        if let Some(raw) = optional("OAISYNC_INITIAL_FROM") {
            engine.initial_from = parse_instant("OAISYNC_INITIAL_FROM", &raw)?;
        }

        Ok(Self {
            harvest,
            store,
            engine,
            tracking_log: optional("OAISYNC_TRACKING_LOG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("oaisync-harvest.log")),
            log_filter: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    optional(var).ok_or(ConfigError::Missing(var))
}

fn optional(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.is_empty())
}

fn parsed_or(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match optional(var) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
            var,
            message: format!("{raw:?} is not a number: {e}"),
        }),
    }
}

fn parse_instant(var: &'static str, raw: &str) -> Result<DateTime<Utc>, ConfigError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ConfigError::Invalid {
            var,
            message: format!("{raw:?} is not an RFC 3339 instant: {e}"),
        })
}
