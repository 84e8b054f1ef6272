pub mod linode;
pub mod normalize;
pub mod provider;
pub mod report;
pub mod runner;
pub mod sink;

pub use linode::{Instance, InstanceSpecs, InstanceStats, LinodeClient, StatsSample};
pub use normalize::normalize_instance_stats;
pub use provider::InstanceStatsProvider;
pub use report::{IngestError, IngestReport};
pub use runner::{run_linode_ingest, IngestRunner, LINODE_SENTINEL};
pub use sink::{MetricSink, RecordingSink};
