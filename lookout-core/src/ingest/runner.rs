use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::Database;
use crate::error::LookoutResult;
use crate::models::Service;
use crate::repo::{MetricRepository, ServiceRepository};

use super::linode::LinodeClient;
use super::normalize::normalize_instance_stats;
use super::provider::InstanceStatsProvider;
use super::report::IngestReport;
use super::sink::MetricSink;

/// The `api_key_identifier` value marking the service that Linode
/// ingestion writes to.
pub const LINODE_SENTINEL: &str = "LINODE_API_KEY";

/// Executes one ingestion invocation: list instances, fetch each
/// instance's stats, normalize the latest sample, and append the rows.
///
/// Sequential and stateless across invocations. A failing instance is
/// skipped and counted; a failing instance list or metric insert aborts
/// the whole run. There is no retry and no idempotency key, so a re-run
/// after a partial failure appends duplicate rows for the instances that
/// had already been processed.
pub struct IngestRunner {
    provider: Arc<dyn InstanceStatsProvider>,
    sink: Arc<dyn MetricSink>,
}

impl IngestRunner {
    pub fn new(provider: Arc<dyn InstanceStatsProvider>, sink: Arc<dyn MetricSink>) -> Self {
        Self { provider, sink }
    }

    pub async fn run(&self, service: &Service) -> LookoutResult<IngestReport> {
        let start = std::time::Instant::now();
        let mut report = IngestReport::new(self.provider.provider_name());

        info!(
            provider = self.provider.provider_name(),
            service = %service.name,
            "Starting ingestion run"
        );

        let instances = self.provider.list_instances().await?;
        report.instances_seen = instances.len();

        for instance in &instances {
            let stats = match self.provider.instance_stats(instance.id).await {
                Ok(stats) => stats,
                Err(e) => {
                    warn!(
                        instance_id = instance.id,
                        instance_label = %instance.label,
                        error = %e,
                        "Skipping instance: stats fetch failed"
                    );
                    report.record_instance_failure(instance.id, e.to_string());
                    continue;
                }
            };

            let metrics = match normalize_instance_stats(service.id, instance, &stats) {
                Ok(metrics) => metrics,
                Err(e) => {
                    warn!(
                        instance_id = instance.id,
                        error = %e,
                        "Skipping instance: unusable stats payload"
                    );
                    report.record_instance_failure(instance.id, e.to_string());
                    continue;
                }
            };

            for metric in &metrics {
                self.sink.write_metric(metric).await?;
                report.metrics_written += 1;
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        report.finished_at = Utc::now();

        info!(
            instances_seen = report.instances_seen,
            instances_failed = report.instances_failed,
            metrics_written = report.metrics_written,
            duration_ms = report.duration_ms,
            "Ingestion run finished"
        );

        Ok(report)
    }
}

/// The full trigger operation: resolve the sentinel service, then run
/// Linode ingestion against the database.
pub async fn run_linode_ingest(db: &Database) -> LookoutResult<IngestReport> {
    let services = ServiceRepository::new(db.pool().clone());
    let service = services.get_by_api_key_identifier(LINODE_SENTINEL).await?;

    let provider = Arc::new(LinodeClient::from_env()?);
    let sink = Arc::new(MetricRepository::new(db.pool().clone()));

    IngestRunner::new(provider, sink).run(&service).await
}
