use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Metric, MetricName};

/// Current value per metric name for one service, produced by a single
/// O(n) pass over an unordered metric stream.
///
/// For each recognized name the value of the row with the greatest
/// timestamp wins; equal timestamps resolve last-seen-wins in iteration
/// order. Names absent from the input stay at 0. Rows whose metric_name
/// is not one of the four known names are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestValues {
    pub cpu: f64,
    pub memory: f64,
    pub storage: f64,
    pub network: f64,
    #[serde(skip)]
    seen: [Option<DateTime<Utc>>; 4],
}

impl LatestValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold all rows of a slice. Convenience over [`LatestValues::fold`].
    pub fn from_metrics(metrics: &[Metric]) -> Self {
        let mut latest = Self::new();
        for metric in metrics {
            if let Some(name) = metric.name() {
                latest.fold(name, metric.value, metric.timestamp);
            }
        }
        latest
    }

    /// Feed one observation into the fold.
    pub fn fold(&mut self, name: MetricName, value: f64, timestamp: DateTime<Utc>) {
        let slot = name as usize;
        let newer = match self.seen[slot] {
            Some(current) => timestamp >= current,
            None => true,
        };
        if newer {
            self.seen[slot] = Some(timestamp);
            *self.value_mut(name) = value;
        }
    }

    pub fn get(&self, name: MetricName) -> f64 {
        match name {
            MetricName::Cpu => self.cpu,
            MetricName::Memory => self.memory,
            MetricName::Storage => self.storage,
            MetricName::Network => self.network,
        }
    }

    fn value_mut(&mut self, name: MetricName) -> &mut f64 {
        match name {
            MetricName::Cpu => &mut self.cpu,
            MetricName::Memory => &mut self.memory,
            MetricName::Storage => &mut self.storage,
            MetricName::Network => &mut self.network,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn row(name: &str, value: f64, timestamp: DateTime<Utc>) -> Metric {
        Metric {
            id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            metric_name: name.to_string(),
            value,
            unit: None,
            timestamp,
            labels: None,
        }
    }

    #[test]
    fn test_absent_names_default_to_zero() {
        let latest = LatestValues::from_metrics(&[row("cpu_usage", 40.0, at(0))]);

        assert_eq!(latest.cpu, 40.0);
        assert_eq!(latest.memory, 0.0);
        assert_eq!(latest.storage, 0.0);
        assert_eq!(latest.network, 0.0);
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let latest = LatestValues::from_metrics(&[]);
        for name in MetricName::ALL {
            assert_eq!(latest.get(name), 0.0);
        }
    }

    #[test]
    fn test_max_timestamp_wins() {
        let latest = LatestValues::from_metrics(&[
            row("cpu_usage", 40.0, at(1)),
            row("cpu_usage", 55.0, at(2)),
        ]);
        assert_eq!(latest.cpu, 55.0);
    }

    #[test]
    fn test_order_of_arrival_does_not_matter() {
        let latest = LatestValues::from_metrics(&[
            row("memory_usage", 90.0, at(30)),
            row("memory_usage", 10.0, at(5)),
            row("memory_usage", 50.0, at(20)),
        ]);
        assert_eq!(latest.memory, 90.0);
    }

    #[test]
    fn test_equal_timestamps_last_seen_wins() {
        let latest = LatestValues::from_metrics(&[
            row("storage_usage", 70.0, at(10)),
            row("storage_usage", 75.0, at(10)),
        ]);
        assert_eq!(latest.storage, 75.0);
    }

    #[test]
    fn test_unrecognized_names_ignored() {
        let latest = LatestValues::from_metrics(&[
            row("requests_per_second", 9000.0, at(100)),
            row("network_transfer", 1234.0, at(1)),
        ]);
        assert_eq!(latest.network, 1234.0);
        assert_eq!(latest.cpu, 0.0);
    }

    #[test]
    fn test_names_tracked_independently() {
        let latest = LatestValues::from_metrics(&[
            row("cpu_usage", 65.0, at(3)),
            row("memory_usage", 41.0, at(1)),
            row("cpu_usage", 45.0, at(2)),
            row("network_transfer", 2048.0, at(2)),
            row("storage_usage", 77.0, at(2)),
        ]);

        assert_eq!(latest.cpu, 65.0);
        assert_eq!(latest.memory, 41.0);
        assert_eq!(latest.storage, 77.0);
        assert_eq!(latest.network, 2048.0);
    }

    #[test]
    fn test_incremental_fold_matches_batch() {
        let rows = [
            row("cpu_usage", 10.0, at(1)),
            row("cpu_usage", 20.0, at(2)),
            row("memory_usage", 30.0, at(1)),
        ];

        let batch = LatestValues::from_metrics(&rows);

        let mut incremental = LatestValues::new();
        for r in &rows {
            incremental.fold(r.name().unwrap(), r.value, r.timestamp);
        }

        assert_eq!(batch.cpu, incremental.cpu);
        assert_eq!(batch.memory, incremental.memory);
    }
}
