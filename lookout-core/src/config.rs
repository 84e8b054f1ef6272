use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::db::DatabaseConfig;
use crate::error::{LookoutError, LookoutResult};
use crate::ingest::linode::LINODE_API_BASE;

/// Top-level runtime configuration, assembled from the environment.
///
/// Provider credentials are only needed by ingestion, so `provider` is
/// `None` when `LINODE_API_KEY` is unset and the server can still start;
/// triggering an ingestion run without the key fails at that point.
#[derive(Debug, Clone)]
pub struct LookoutConfig {
    pub database: DatabaseConfig,
    pub provider: Option<ProviderConfig>,
    pub watch: WatchConfig,
    pub server: ServerConfig,
}

impl LookoutConfig {
    pub fn from_env() -> LookoutResult<Self> {
        Ok(Self {
            database: DatabaseConfig::from_env()?,
            provider: ProviderConfig::from_env_optional(),
            watch: WatchConfig::from_env(),
            server: ServerConfig::from_env(),
        })
    }
}

/// Cloud provider credentials and endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl ProviderConfig {
    pub fn from_env() -> LookoutResult<Self> {
        Self::from_env_optional()
            .ok_or_else(|| LookoutError::MissingEnvVar("LINODE_API_KEY".to_string()))
    }

    /// `None` when the credential is absent, for code paths that can run
    /// without a provider.
    pub fn from_env_optional() -> Option<Self> {
        let api_key = std::env::var("LINODE_API_KEY").ok()?;
        let api_base = std::env::var("LINODE_API_BASE").unwrap_or_else(|_| default_api_base());

        Some(Self { api_key, api_base })
    }
}

/// Re-poll intervals for the subscription handles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_metrics_poll_secs")]
    pub metrics_poll_secs: u64,

    #[serde(default = "default_services_poll_secs")]
    pub services_poll_secs: u64,
}

impl WatchConfig {
    pub fn from_env() -> Self {
        Self {
            metrics_poll_secs: env_u64("LOOKOUT_METRICS_POLL_SECS", default_metrics_poll_secs()),
            services_poll_secs: env_u64("LOOKOUT_SERVICES_POLL_SECS", default_services_poll_secs()),
        }
    }

    pub fn metrics_poll(&self) -> Duration {
        Duration::from_secs(self.metrics_poll_secs)
    }

    pub fn services_poll(&self) -> Duration {
        Duration::from_secs(self.services_poll_secs)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            metrics_poll_secs: default_metrics_poll_secs(),
            services_poll_secs: default_services_poll_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind: std::env::var("LOOKOUT_BIND").unwrap_or_else(|_| default_bind()),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn default_api_base() -> String {
    LINODE_API_BASE.to_string()
}

fn default_metrics_poll_secs() -> u64 {
    10
}

fn default_services_poll_secs() -> u64 {
    30
}

fn default_bind() -> String {
    "0.0.0.0:8787".to_string()
}
