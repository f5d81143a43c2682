//! Broadcast client configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use labcast_capture::CaptureConfig;
use labcast_transport::{IngestConfig, RtcConfiguration, DEFAULT_STUN_SERVER};

/// Prefix of environment overrides, e.g. `LABCAST_INGEST__BASE_URL`.
pub const ENV_PREFIX: &str = "LABCAST";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Ingest origin and publish endpoint.
    pub ingest: IngestConfig,

    /// Camera and microphone request.
    pub capture: CaptureConfig,

    /// STUN server URLs for the peer connection.
    pub ice_servers: Vec<String>,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            ingest: IngestConfig::default(),
            capture: CaptureConfig::default(),
            ice_servers: vec![DEFAULT_STUN_SERVER.to_string()],
        }
    }
}

impl BroadcastConfig {
    /// Load from an optional file, then `LABCAST_*` environment variables.
    ///
    /// Missing keys fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Peer connection configuration built from `ice_servers`.
    pub fn rtc_configuration(&self) -> RtcConfiguration {
        RtcConfiguration::from_urls(self.ice_servers.iter().cloned())
    }
}
