use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{LookoutError, LookoutResult};

use super::provider::InstanceStatsProvider;

pub const LINODE_API_BASE: &str = "https://api.linode.com/v4";

/// Client for the Linode v4 API.
pub struct LinodeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LinodeClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: LINODE_API_BASE.to_string(),
        }
    }

    pub fn from_env() -> LookoutResult<Self> {
        let api_key = std::env::var("LINODE_API_KEY")
            .map_err(|_| LookoutError::MissingEnvVar("LINODE_API_KEY".to_string()))?;
        let mut client = Self::new(api_key);
        if let Ok(base) = std::env::var("LINODE_API_BASE") {
            client.base_url = base;
        }
        Ok(client)
    }

    /// Point the client at a different API root. Tests aim this at a local
    /// mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> LookoutResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Linode API request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(30))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookoutError::ProviderRequestFailed(format!(
                "{} returned status {}",
                path, status
            )));
        }

        let body = response
            .json::<T>()
            .await
            .map_err(|e| LookoutError::ProviderResponseInvalid(e.to_string()))?;

        Ok(body)
    }
}

#[async_trait]
impl InstanceStatsProvider for LinodeClient {
    fn provider_name(&self) -> &str {
        "linode"
    }

    async fn list_instances(&self) -> LookoutResult<Vec<Instance>> {
        let response: InstancesResponse = self.get_json("/linode/instances").await?;
        Ok(response.data)
    }

    async fn instance_stats(&self, instance_id: i64) -> LookoutResult<InstanceStats> {
        self.get_json(&format!("/linode/instances/{}/stats", instance_id))
            .await
    }

    async fn health_check(&self) -> LookoutResult<bool> {
        let url = format!("{}/linode/instances", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(10))
            .send()
            .await;

        match response {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InstancesResponse {
    data: Vec<Instance>,
}

/// One Linode instance as returned by the instance-list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Instance {
    pub id: i64,
    pub label: String,
    pub specs: InstanceSpecs,
}

/// Provisioned capacity, in MB.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceSpecs {
    pub memory: i64,
    pub disk: i64,
}

/// Statistics time series for one instance, oldest first. The last sample
/// is the most recent observation.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceStats {
    pub data: Vec<StatsSample>,
}

impl InstanceStats {
    pub fn latest(&self) -> Option<&StatsSample> {
        self.data.last()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsSample {
    pub cpu: f64,
    pub io: IoSample,
    pub netv4: NetSample,
    pub netv6: NetSample,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IoSample {
    pub io: f64,
    #[serde(default)]
    pub swap: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetSample {
    #[serde(rename = "in")]
    pub inbound: f64,
    #[serde(rename = "out")]
    pub outbound: f64,
}

impl NetSample {
    pub fn total(&self) -> f64 {
        self.inbound + self.outbound
    }
}
