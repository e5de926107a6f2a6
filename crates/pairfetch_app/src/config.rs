//! RON configuration for the `pairfetch` binary.
//!
//! Every field is optional; anything left out keeps the engine default.

use std::fs;
use std::ops::Range;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use pairfetch_core::RetryPolicy;
use pairfetch_engine::PairFetchSettings;
use pairfetch_logging::{pf_info, pf_warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub first_endpoint: Option<String>,
    /// Half-open `(start, end)` status range for the first resource.
    pub first_status: Option<(u16, u16)>,
    pub second_endpoint: Option<String>,
    pub second_status: Option<(u16, u16)>,
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub max_bytes: Option<u64>,
    pub retry: Option<RetryConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub multiplier: f64,
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults, a malformed one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                pf_warn!("Config file {:?} not found, using defaults", path);
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read config {:?}", path))
            }
        };

        let config: AppConfig = ron::from_str(&content)
            .with_context(|| format!("failed to parse config {:?}", path))?;
        pf_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn into_settings(self) -> PairFetchSettings {
        let mut settings = PairFetchSettings::default();
        if let Some(endpoint) = self.first_endpoint {
            settings.first_endpoint = endpoint;
        }
        if let Some(range) = self.first_status {
            settings.first_status = Some(to_range(range));
        }
        if let Some(endpoint) = self.second_endpoint {
            settings.second_endpoint = endpoint;
        }
        if let Some(range) = self.second_status {
            settings.second_status = Some(to_range(range));
        }
        if let Some(ms) = self.connect_timeout_ms {
            settings.fetch.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.request_timeout_ms {
            settings.fetch.request_timeout = Duration::from_millis(ms);
        }
        if let Some(max_bytes) = self.max_bytes {
            settings.fetch.max_bytes = max_bytes;
        }
        if let Some(retry) = self.retry {
            settings.retry = RetryPolicy::new(
                retry.max_attempts,
                Duration::from_millis(retry.initial_delay_ms),
                retry.multiplier,
            );
        }
        settings
    }
}

fn to_range((start, end): (u16, u16)) -> Range<u16> {
    start..end
}
