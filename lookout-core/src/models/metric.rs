use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::LookoutError;

/// The metric names the dashboard consumes, validated at the ingestion
/// boundary. The `metrics.metric_name` column itself stays free-form text,
/// so parsing from a row is fallible and unknown names stay representable
/// on the read path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricName {
    #[serde(rename = "cpu_usage")]
    Cpu,
    #[serde(rename = "memory_usage")]
    Memory,
    #[serde(rename = "storage_usage")]
    Storage,
    #[serde(rename = "network_transfer")]
    Network,
}

impl MetricName {
    pub const ALL: [MetricName; 4] = [
        MetricName::Cpu,
        MetricName::Memory,
        MetricName::Storage,
        MetricName::Network,
    ];

    /// Canonical column value for this metric name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::Cpu => "cpu_usage",
            MetricName::Memory => "memory_usage",
            MetricName::Storage => "storage_usage",
            MetricName::Network => "network_transfer",
        }
    }

    /// Unit each metric is reported in.
    pub fn unit(&self) -> &'static str {
        match self {
            MetricName::Cpu | MetricName::Memory | MetricName::Storage => "%",
            MetricName::Network => "bytes",
        }
    }
}

impl std::fmt::Display for MetricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MetricName {
    type Err = LookoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpu_usage" => Ok(MetricName::Cpu),
            "memory_usage" => Ok(MetricName::Memory),
            "storage_usage" => Ok(MetricName::Storage),
            "network_transfer" => Ok(MetricName::Network),
            other => Err(LookoutError::InvalidMetricName(other.to_string())),
        }
    }
}

/// A single timestamped numeric observation for a service, as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Metric {
    pub id: Uuid,
    pub service_id: Uuid,
    pub metric_name: String,
    pub value: f64,
    pub unit: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub labels: Option<serde_json::Value>,
}

impl Metric {
    /// Parse the stored name into the tagged form; `None` for rows written
    /// under conventions this consumer does not know.
    pub fn name(&self) -> Option<MetricName> {
        self.metric_name.parse().ok()
    }
}

/// A metric observation ready to be inserted. Ingestion produces these;
/// the database assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMetric {
    pub service_id: Uuid,
    pub metric_name: MetricName,
    pub value: f64,
    pub labels: Option<serde_json::Value>,
}

impl NewMetric {
    pub fn new(service_id: Uuid, metric_name: MetricName, value: f64) -> Self {
        Self {
            service_id,
            metric_name,
            value,
            labels: None,
        }
    }

    pub fn with_labels(mut self, labels: serde_json::Value) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn unit(&self) -> &'static str {
        self.metric_name.unit()
    }
}
