use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kind of monitored target a service row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "service_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    LinodeServer,
    WordpressHosting,
    WindowsRdp,
    Cloudflare,
    ApiService,
    Other,
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceType::LinodeServer => write!(f, "linode_server"),
            ServiceType::WordpressHosting => write!(f, "wordpress_hosting"),
            ServiceType::WindowsRdp => write!(f, "windows_rdp"),
            ServiceType::Cloudflare => write!(f, "cloudflare"),
            ServiceType::ApiService => write!(f, "api_service"),
            ServiceType::Other => write!(f, "other"),
        }
    }
}

/// A monitored external resource tracked by the dashboard.
///
/// Services are created out-of-band; ingestion only reads them to resolve
/// which credential a run should use.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub service_type: ServiceType,
    /// Name of the environment credential this service is polled with,
    /// e.g. `LINODE_API_KEY`.
    pub api_key_identifier: Option<String>,
    pub settings: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    pub fn new(name: String, service_type: ServiceType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description: None,
            service_type,
            api_key_identifier: None,
            settings: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_api_key_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.api_key_identifier = Some(identifier.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
