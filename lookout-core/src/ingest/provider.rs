use async_trait::async_trait;

use crate::error::LookoutResult;

use super::linode::{Instance, InstanceStats};

/// Boundary to a cloud provider's instance-statistics API.
///
/// Ingestion runs against this trait so the transport can be swapped out
/// in tests or extended to other providers.
#[async_trait]
pub trait InstanceStatsProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Every instance visible to the configured credential.
    async fn list_instances(&self) -> LookoutResult<Vec<Instance>>;

    /// The statistics time series for one instance.
    async fn instance_stats(&self, instance_id: i64) -> LookoutResult<InstanceStats>;

    async fn health_check(&self) -> LookoutResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::linode::{InstanceSpecs, IoSample, NetSample, StatsSample};

    struct MockProvider {
        instances: Vec<Instance>,
    }

    #[async_trait]
    impl InstanceStatsProvider for MockProvider {
        fn provider_name(&self) -> &str {
            "mock"
        }

        async fn list_instances(&self) -> LookoutResult<Vec<Instance>> {
            Ok(self.instances.clone())
        }

        async fn instance_stats(&self, _instance_id: i64) -> LookoutResult<InstanceStats> {
            Ok(InstanceStats {
                data: vec![StatsSample {
                    cpu: 12.5,
                    io: IoSample { io: 100.0, swap: 0.0 },
                    netv4: NetSample {
                        inbound: 10.0,
                        outbound: 20.0,
                    },
                    netv6: NetSample {
                        inbound: 1.0,
                        outbound: 2.0,
                    },
                }],
            })
        }
    }

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockProvider {
            instances: vec![Instance {
                id: 1,
                label: "web-1".to_string(),
                specs: InstanceSpecs {
                    memory: 4096,
                    disk: 81920,
                },
            }],
        };

        assert_eq!(provider.provider_name(), "mock");
        assert!(provider.health_check().await.unwrap());

        let instances = provider.list_instances().await.unwrap();
        assert_eq!(instances.len(), 1);

        let stats = provider.instance_stats(1).await.unwrap();
        assert_eq!(stats.data.len(), 1);
        assert_eq!(stats.data[0].cpu, 12.5);
    }
}
