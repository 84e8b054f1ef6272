use crate::error::LookoutResult;
use crate::models::{Alert, AlertStatus};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::Repository;

pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, alert: &Alert) -> LookoutResult<Alert> {
        let record = sqlx::query_as::<_, Alert>(
            r#"
            INSERT INTO alerts (id, service_id, severity, status, message, metadata, created_at, resolved_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, service_id, severity, status, message, metadata, created_at, resolved_at
            "#,
        )
        .bind(alert.id)
        .bind(alert.service_id)
        .bind(alert.severity)
        .bind(alert.status)
        .bind(&alert.message)
        .bind(&alert.metadata)
        .bind(alert.created_at)
        .bind(alert.resolved_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn get_open_for_service(&self, service_id: Uuid) -> LookoutResult<Vec<Alert>> {
        let records = sqlx::query_as::<_, Alert>(
            r#"
            SELECT id, service_id, severity, status, message, metadata, created_at, resolved_at
            FROM alerts
            WHERE service_id = $1 AND status = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(service_id)
        .bind(AlertStatus::Open)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn resolve(&self, id: Uuid) -> LookoutResult<Option<Alert>> {
        let record = sqlx::query_as::<_, Alert>(
            r#"
            UPDATE alerts
            SET status = $2, resolved_at = $3
            WHERE id = $1
            RETURNING id, service_id, severity, status, message, metadata, created_at, resolved_at
            "#,
        )
        .bind(id)
        .bind(AlertStatus::Resolved)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}

#[async_trait]
impl Repository for AlertRepository {
    type Entity = Alert;
    type Id = Uuid;

    async fn get_by_id(&self, id: Uuid) -> LookoutResult<Option<Alert>> {
        let record = sqlx::query_as::<_, Alert>(
            r#"
            SELECT id, service_id, severity, status, message, metadata, created_at, resolved_at
            FROM alerts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn get_all(&self) -> LookoutResult<Vec<Alert>> {
        let records = sqlx::query_as::<_, Alert>(
            r#"
            SELECT id, service_id, severity, status, message, metadata, created_at, resolved_at
            FROM alerts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn delete(&self, id: Uuid) -> LookoutResult<bool> {
        let result = sqlx::query("DELETE FROM alerts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
