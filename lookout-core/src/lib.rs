//! Core library for lookout: infrastructure metrics ingestion and
//! monitoring backend.
//!
//! The pipeline: a triggered ingestion run pulls per-instance statistics
//! from the Linode API, normalizes the latest sample of each series into
//! four metric rows (cpu, memory, storage, network), and appends them to
//! the `metrics` time series in Postgres. Consumers read the series back
//! through repositories, reduce it to current values per metric name, and
//! subscribe to changes through polling watch handles.

pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod models;
pub mod repo;
pub mod watch;

pub use config::{LookoutConfig, ProviderConfig, ServerConfig, WatchConfig};
pub use db::{init_database, init_database_with_url, Database, DatabaseConfig};
pub use error::{LookoutError, LookoutResult};
pub use ingest::{
    run_linode_ingest, IngestReport, IngestRunner, InstanceStatsProvider, LinodeClient,
    MetricSink, RecordingSink, LINODE_SENTINEL,
};
pub use metrics::LatestValues;
pub use models::{
    Alert, AlertSeverity, AlertStatus, Metric, MetricName, NewMetric, Service, ServiceType,
};
pub use repo::{AlertRepository, MetricRepository, Repository, ServiceRepository};
pub use watch::{watch_latest_values, watch_service_metrics, watch_services, WatchHandle};
