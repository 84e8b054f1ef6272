use crate::error::{LookoutError, LookoutResult};
use crate::models::{Service, ServiceType};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::Repository;

pub struct ServiceRepository {
    pool: PgPool,
}

impl ServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, service: &Service) -> LookoutResult<Service> {
        let record = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (id, name, description, service_type, api_key_identifier, settings, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, description, service_type, api_key_identifier, settings, created_at, updated_at
            "#,
        )
        .bind(service.id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.service_type)
        .bind(&service.api_key_identifier)
        .bind(&service.settings)
        .bind(service.created_at)
        .bind(service.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Resolve the single service configured for a credential identifier.
    ///
    /// Exactly one matching row is expected: a miss is an error because an
    /// ingestion run has no target without it, and more than one match is
    /// a misconfiguration rather than a row to pick arbitrarily.
    pub async fn get_by_api_key_identifier(&self, identifier: &str) -> LookoutResult<Service> {
        let records = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, name, description, service_type, api_key_identifier, settings, created_at, updated_at
            FROM services
            WHERE api_key_identifier = $1
            LIMIT 2
            "#,
        )
        .bind(identifier)
        .fetch_all(&self.pool)
        .await?;

        expect_single(identifier, records)
    }

    pub async fn get_by_type(&self, service_type: ServiceType) -> LookoutResult<Vec<Service>> {
        let records = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, name, description, service_type, api_key_identifier, settings, created_at, updated_at
            FROM services
            WHERE service_type = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(service_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn count(&self) -> LookoutResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM services")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

fn expect_single(identifier: &str, mut records: Vec<Service>) -> LookoutResult<Service> {
    match records.len() {
        0 => Err(LookoutError::ServiceNotFound(identifier.to_string())),
        1 => Ok(records.remove(0)),
        _ => Err(LookoutError::ServiceAmbiguous(identifier.to_string())),
    }
}

#[async_trait]
impl Repository for ServiceRepository {
    type Entity = Service;
    type Id = Uuid;

    async fn get_by_id(&self, id: Uuid) -> LookoutResult<Option<Service>> {
        let record = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, name, description, service_type, api_key_identifier, settings, created_at, updated_at
            FROM services
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn get_all(&self) -> LookoutResult<Vec<Service>> {
        let records = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, name, description, service_type, api_key_identifier, settings, created_at, updated_at
            FROM services
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn delete(&self, id: Uuid) -> LookoutResult<bool> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
