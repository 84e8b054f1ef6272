pub mod alert_repo;
pub mod metric_repo;
pub mod service_repo;

pub use alert_repo::AlertRepository;
pub use metric_repo::MetricRepository;
pub use service_repo::ServiceRepository;

use crate::error::LookoutResult;
use async_trait::async_trait;

#[async_trait]
pub trait Repository {
    type Entity;
    type Id;

    async fn get_by_id(&self, id: Self::Id) -> LookoutResult<Option<Self::Entity>>;
    async fn get_all(&self) -> LookoutResult<Vec<Self::Entity>>;
    async fn delete(&self, id: Self::Id) -> LookoutResult<bool>;
}
