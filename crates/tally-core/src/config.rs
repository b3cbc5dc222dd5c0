//! Remote store configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Where the remote store lives and how long requests may take.
///
/// The timeout budget is an explicit parameter rather than whatever the
/// transport defaults to; the probe gets its own, shorter budget so an
/// unreachable store is detected quickly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the remote store, e.g. `http://localhost:3000`.
    pub base_url: String,
    /// Budget for data requests, in seconds.
    pub request_timeout_secs: u64,
    /// Budget for the connectivity probe, in seconds.
    pub probe_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            request_timeout_secs: 30,
            probe_timeout_secs: 3,
        }
    }
}

impl RemoteConfig {
    /// Parse a TOML document into a config.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}
