use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one ingestion invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub provider: String,
    pub instances_seen: usize,
    pub instances_failed: usize,
    pub metrics_written: usize,
    pub duration_ms: u64,
    pub finished_at: DateTime<Utc>,
    pub errors: Vec<IngestError>,
}

impl IngestReport {
    pub fn new(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            instances_seen: 0,
            instances_failed: 0,
            metrics_written: 0,
            duration_ms: 0,
            finished_at: Utc::now(),
            errors: Vec::new(),
        }
    }

    pub fn record_instance_failure(&mut self, instance_id: i64, message: impl Into<String>) {
        self.instances_failed += 1;
        self.errors.push(IngestError {
            instance_id,
            message: message.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn instances_succeeded(&self) -> usize {
        self.instances_seen - self.instances_failed
    }

    /// One-line operator summary, used in the trigger response body.
    pub fn summary(&self) -> String {
        format!(
            "Ingested {} metrics from {}/{} instances in {}ms",
            self.metrics_written,
            self.instances_succeeded(),
            self.instances_seen,
            self.duration_ms
        )
    }
}

/// A per-instance failure that did not abort the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestError {
    pub instance_id: i64,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
