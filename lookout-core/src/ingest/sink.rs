use async_trait::async_trait;

use crate::error::LookoutResult;
use crate::models::NewMetric;
use crate::repo::MetricRepository;

/// Destination for normalized metric rows. The runner writes through this
/// trait so storage is an explicit, passed-in handle rather than a global.
#[async_trait]
pub trait MetricSink: Send + Sync {
    async fn write_metric(&self, metric: &NewMetric) -> LookoutResult<()>;
}

#[async_trait]
impl MetricSink for MetricRepository {
    async fn write_metric(&self, metric: &NewMetric) -> LookoutResult<()> {
        self.insert(metric).await?;
        Ok(())
    }
}

/// In-memory sink that records every write. Test support.
#[derive(Default)]
pub struct RecordingSink {
    written: tokio::sync::Mutex<Vec<NewMetric>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn written(&self) -> Vec<NewMetric> {
        self.written.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.written.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.written.lock().await.is_empty()
    }
}

#[async_trait]
impl MetricSink for RecordingSink {
    async fn write_metric(&self, metric: &NewMetric) -> LookoutResult<()> {
        self.written.lock().await.push(metric.clone());
        Ok(())
    }
}
