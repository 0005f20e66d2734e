//! Service configuration

use std::path::{Path, PathBuf};

use a2p_proposals::ProposalConfig;
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

/// Top-level configuration, usually read from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct A2pConfig {
    pub proposals: ProposalConfig,
    pub retention: RetentionConfig,
    pub cache: CacheConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Resolved proposals older than this are dropped by cleanup.
    pub keep_resolved_days: i64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            keep_resolved_days: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 300 }
    }
}

/// Roughly a century.
const MAX_EXPIRY_DAYS: i64 = 36_500;

const MAX_TTL_SECONDS: u64 = (i64::MAX / 1000) as u64;

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_seconds.min(MAX_TTL_SECONDS) as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the file store. Defaults under the platform data dir.
    pub data_dir: Option<PathBuf>,
}

impl A2pConfig {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> ServiceResult<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&contents)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> ServiceResult<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ServiceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the proposal and retention logic cannot work with.
    pub fn validate(&self) -> ServiceResult<()> {
        let proposals = &self.proposals;
        if !(1..=MAX_EXPIRY_DAYS).contains(&proposals.default_expiry_days) {
            return Err(ServiceError::Config(format!(
                "proposals.default_expiry_days must be between 1 and {MAX_EXPIRY_DAYS}, got {}",
                proposals.default_expiry_days
            )));
        }
        for (key, value) in [
            ("proposals.default_confidence", proposals.default_confidence),
            ("proposals.similarity_threshold", proposals.similarity_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ServiceError::Config(format!(
                    "{key} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.retention.keep_resolved_days < 0 {
            return Err(ServiceError::Config(format!(
                "retention.keep_resolved_days must not be negative, got {}",
                self.retention.keep_resolved_days
            )));
        }
        Ok(())
    }

    /// `<config dir>/a2p/config.toml`.
    pub fn default_config_path() -> ServiceResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ServiceError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("a2p").join("config.toml"))
    }

    /// Where the file store keeps profiles.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage.data_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|d| d.join("a2p").join("profiles"))
            .unwrap_or_else(|| PathBuf::from(".a2p").join("profiles"))
    }
}
