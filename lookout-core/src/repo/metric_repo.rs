use crate::error::LookoutResult;
use crate::models::{Metric, NewMetric};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::Repository;

pub struct MetricRepository {
    pool: PgPool,
}

impl MetricRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one observation. The database assigns id and timestamp;
    /// the unit comes from the metric name.
    pub async fn insert(&self, metric: &NewMetric) -> LookoutResult<Metric> {
        let record = sqlx::query_as::<_, Metric>(
            r#"
            INSERT INTO metrics (service_id, metric_name, value, unit, labels)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, service_id, metric_name, value, unit, timestamp, labels
            "#,
        )
        .bind(metric.service_id)
        .bind(metric.metric_name.as_str())
        .bind(metric.value)
        .bind(metric.unit())
        .bind(&metric.labels)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn recent_for_service(
        &self,
        service_id: Uuid,
        limit: i64,
    ) -> LookoutResult<Vec<Metric>> {
        let records = sqlx::query_as::<_, Metric>(
            r#"
            SELECT id, service_id, metric_name, value, unit, timestamp, labels
            FROM metrics
            WHERE service_id = $1
            ORDER BY timestamp DESC
            LIMIT $2
            "#,
        )
        .bind(service_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Chart window: ascending rows since a cutoff.
    pub async fn for_service_since(
        &self,
        service_id: Uuid,
        since: DateTime<Utc>,
    ) -> LookoutResult<Vec<Metric>> {
        let records = sqlx::query_as::<_, Metric>(
            r#"
            SELECT id, service_id, metric_name, value, unit, timestamp, labels
            FROM metrics
            WHERE service_id = $1 AND timestamp >= $2
            ORDER BY timestamp ASC
            "#,
        )
        .bind(service_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// The most recent row per metric_name for one service.
    pub async fn latest_for_service(&self, service_id: Uuid) -> LookoutResult<Vec<Metric>> {
        let records = sqlx::query_as::<_, Metric>(
            r#"
            SELECT DISTINCT ON (metric_name)
                id, service_id, metric_name, value, unit, timestamp, labels
            FROM metrics
            WHERE service_id = $1
            ORDER BY metric_name, timestamp DESC
            "#,
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn count_for_service(&self, service_id: Uuid) -> LookoutResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM metrics WHERE service_id = $1")
            .bind(service_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Retention sweep: drop observations older than the cutoff.
    pub async fn delete_before(&self, before: DateTime<Utc>) -> LookoutResult<i64> {
        let result = sqlx::query("DELETE FROM metrics WHERE timestamp < $1")
            .bind(before)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() as i64)
    }
}

#[async_trait]
impl Repository for MetricRepository {
    type Entity = Metric;
    type Id = Uuid;

    async fn get_by_id(&self, id: Uuid) -> LookoutResult<Option<Metric>> {
        let record = sqlx::query_as::<_, Metric>(
            r#"
            SELECT id, service_id, metric_name, value, unit, timestamp, labels
            FROM metrics
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn get_all(&self) -> LookoutResult<Vec<Metric>> {
        let records = sqlx::query_as::<_, Metric>(
            r#"
            SELECT id, service_id, metric_name, value, unit, timestamp, labels
            FROM metrics
            ORDER BY timestamp DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn delete(&self, id: Uuid) -> LookoutResult<bool> {
        let result = sqlx::query("DELETE FROM metrics WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
