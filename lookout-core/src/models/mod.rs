mod alert;
mod metric;
mod service;

pub use alert::{Alert, AlertSeverity, AlertStatus};
pub use metric::{Metric, MetricName, NewMetric};
pub use service::{Service, ServiceType};
