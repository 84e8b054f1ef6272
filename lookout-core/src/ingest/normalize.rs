use serde_json::json;
use uuid::Uuid;

use crate::error::{LookoutError, LookoutResult};
use crate::models::{MetricName, NewMetric};

use super::linode::{Instance, InstanceStats};

/// Derive the four normalized metrics from the most recent sample of an
/// instance's statistics series.
///
/// The Linode stats API exposes no direct memory or disk utilization, so
/// memory_usage and storage_usage are approximations: raw I/O ops scaled
/// against the provisioned memory/disk capacity. Network transfer is the
/// sum of v4 and v6 traffic in both directions, in bytes.
///
/// An empty series is an error for this instance; a zero capacity spec
/// yields 0 rather than a non-finite ratio.
pub fn normalize_instance_stats(
    service_id: Uuid,
    instance: &Instance,
    stats: &InstanceStats,
) -> LookoutResult<Vec<NewMetric>> {
    let sample = stats.latest().ok_or_else(|| {
        LookoutError::ProviderResponseInvalid(format!(
            "empty stats series for instance {}",
            instance.id
        ))
    })?;

    let labels = json!({
        "instance_id": instance.id,
        "instance_label": instance.label,
    });

    let memory = ratio_percent(sample.io.io, instance.specs.memory);
    let storage = ratio_percent(sample.io.io, instance.specs.disk);
    let network = sample.netv4.total() + sample.netv6.total();

    Ok(vec![
        NewMetric::new(service_id, MetricName::Cpu, sample.cpu).with_labels(labels.clone()),
        NewMetric::new(service_id, MetricName::Memory, memory).with_labels(labels.clone()),
        NewMetric::new(service_id, MetricName::Network, network).with_labels(labels.clone()),
        NewMetric::new(service_id, MetricName::Storage, storage).with_labels(labels),
    ])
}

fn ratio_percent(numerator: f64, capacity: i64) -> f64 {
    if capacity > 0 {
        (numerator * 100.0) / capacity as f64
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::linode::{InstanceSpecs, IoSample, NetSample, StatsSample};

    fn instance() -> Instance {
        Instance {
            id: 7,
            label: "web-1".to_string(),
            specs: InstanceSpecs {
                memory: 4096,
                disk: 81920,
            },
        }
    }

    fn stats(samples: Vec<StatsSample>) -> InstanceStats {
        InstanceStats { data: samples }
    }

    fn sample(cpu: f64, io: f64, v4_in: f64, v4_out: f64, v6_in: f64, v6_out: f64) -> StatsSample {
        StatsSample {
            cpu,
            io: IoSample { io, swap: 0.0 },
            netv4: NetSample {
                inbound: v4_in,
                outbound: v4_out,
            },
            netv6: NetSample {
                inbound: v6_in,
                outbound: v6_out,
            },
        }
    }

    #[test]
    fn test_four_metrics_from_latest_sample() {
        let service_id = Uuid::new_v4();
        let stats = stats(vec![
            sample(10.0, 10.0, 1.0, 1.0, 0.0, 0.0),
            sample(65.0, 1024.0, 100.0, 200.0, 10.0, 20.0),
        ]);

        let metrics = normalize_instance_stats(service_id, &instance(), &stats).unwrap();
        assert_eq!(metrics.len(), 4);

        let by_name = |name: MetricName| {
            metrics
                .iter()
                .find(|m| m.metric_name == name)
                .expect("metric present")
        };

        // Only the most recent sample contributes.
        assert_eq!(by_name(MetricName::Cpu).value, 65.0);
        assert_eq!(by_name(MetricName::Memory).value, 1024.0 * 100.0 / 4096.0);
        assert_eq!(by_name(MetricName::Storage).value, 1024.0 * 100.0 / 81920.0);
        assert_eq!(by_name(MetricName::Network).value, 330.0);
    }

    #[test]
    fn test_labels_carry_instance_identity() {
        let stats = stats(vec![sample(1.0, 1.0, 0.0, 0.0, 0.0, 0.0)]);
        let metrics = normalize_instance_stats(Uuid::new_v4(), &instance(), &stats).unwrap();

        for metric in &metrics {
            let labels = metric.labels.as_ref().unwrap();
            assert_eq!(labels["instance_id"], 7);
            assert_eq!(labels["instance_label"], "web-1");
        }
    }

    #[test]
    fn test_empty_series_errors() {
        let err = normalize_instance_stats(Uuid::new_v4(), &instance(), &stats(vec![]))
            .unwrap_err();
        assert!(matches!(err, LookoutError::ProviderResponseInvalid(_)));
    }

    #[test]
    fn test_zero_capacity_clamps_to_zero() {
        let inst = Instance {
            id: 9,
            label: "broken-spec".to_string(),
            specs: InstanceSpecs { memory: 0, disk: 0 },
        };
        let stats = stats(vec![sample(50.0, 500.0, 0.0, 0.0, 0.0, 0.0)]);

        let metrics = normalize_instance_stats(Uuid::new_v4(), &inst, &stats).unwrap();
        for metric in metrics {
            match metric.metric_name {
                MetricName::Memory | MetricName::Storage => {
                    assert_eq!(metric.value, 0.0);
                    assert!(metric.value.is_finite());
                }
                MetricName::Cpu => assert_eq!(metric.value, 50.0),
                MetricName::Network => assert_eq!(metric.value, 0.0),
            }
        }
    }
}
