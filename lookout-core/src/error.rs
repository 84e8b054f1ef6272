//! Error types for the lookout core library.
//!
//! A single unified error enum covers database access, configuration,
//! provider/ingestion failures, and general faults, each with a stable
//! error code usable in logs and API responses.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Database | Connection, query, migration errors |
//! | E2001-E2099 | Config | Environment and validation errors |
//! | E3001-E3099 | Ingest | Provider API and ingestion errors |
//! | E9001-E9099 | General | Internal, IO, serialization errors |

use thiserror::Error;
use tracing::{error, warn};

/// The main error type for the lookout core library.
#[derive(Debug, Error)]
pub enum LookoutError {
    // ========================================================================
    // Database Errors (E1001-E1099)
    // ========================================================================
    /// Failed to establish database connection
    #[error("[E1001] Database connection failed: {0}")]
    DatabaseConnectionFailed(String),

    /// Database query execution failed
    #[error("[E1002] Database query failed: {0}")]
    DatabaseQueryFailed(#[from] sqlx::Error),

    /// Database migration failed
    #[error("[E1003] Database migration failed: {0}")]
    DatabaseMigrationFailed(#[from] sqlx::migrate::MigrateError),

    // ========================================================================
    // Configuration Errors (E2001-E2099)
    // ========================================================================
    /// Required environment variable is missing
    #[error("[E2001] Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable has invalid value
    #[error("[E2002] Invalid environment variable '{name}': {message}")]
    InvalidEnvVar { name: String, message: String },

    // ========================================================================
    // Ingest Errors (E3001-E3099)
    // ========================================================================
    /// Provider API request failed or returned a non-success status
    #[error("[E3001] Provider request failed: {0}")]
    ProviderRequestFailed(String),

    /// Provider returned a payload that could not be interpreted
    #[error("[E3002] Invalid provider response: {0}")]
    ProviderResponseInvalid(String),

    /// No service row matched the ingestion sentinel
    #[error("[E3003] Service not found: {0}")]
    ServiceNotFound(String),

    /// Stats for a single instance could not be fetched
    #[error("[E3004] Stats unavailable for instance {instance_id}: {message}")]
    InstanceStatsUnavailable { instance_id: i64, message: String },

    /// A metric row failed validation at the ingestion boundary
    #[error("[E3005] Invalid metric name: {0}")]
    InvalidMetricName(String),

    /// More than one service row matched the ingestion sentinel
    #[error("[E3006] Multiple services match identifier: {0}")]
    ServiceAmbiguous(String),

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal invariant violation
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// IO operation failed
    #[error("[E9002] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed
    #[error("[E9003] Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result alias used throughout the library.
pub type LookoutResult<T> = Result<T, LookoutError>;

impl From<reqwest::Error> for LookoutError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LookoutError::ProviderResponseInvalid(err.to_string())
        } else {
            LookoutError::ProviderRequestFailed(err.to_string())
        }
    }
}

impl LookoutError {
    /// Returns the stable error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            LookoutError::DatabaseConnectionFailed(_) => "E1001",
            LookoutError::DatabaseQueryFailed(_) => "E1002",
            LookoutError::DatabaseMigrationFailed(_) => "E1003",
            LookoutError::MissingEnvVar(_) => "E2001",
            LookoutError::InvalidEnvVar { .. } => "E2002",
            LookoutError::ProviderRequestFailed(_) => "E3001",
            LookoutError::ProviderResponseInvalid(_) => "E3002",
            LookoutError::ServiceNotFound(_) => "E3003",
            LookoutError::InstanceStatsUnavailable { .. } => "E3004",
            LookoutError::InvalidMetricName(_) => "E3005",
            LookoutError::ServiceAmbiguous(_) => "E3006",
            LookoutError::Internal(_) => "E9001",
            LookoutError::Io(_) => "E9002",
            LookoutError::Serialization(_) => "E9003",
        }
    }

    /// True for database-category errors.
    pub fn is_database_error(&self) -> bool {
        matches!(
            self,
            LookoutError::DatabaseConnectionFailed(_)
                | LookoutError::DatabaseQueryFailed(_)
                | LookoutError::DatabaseMigrationFailed(_)
        )
    }

    /// True for configuration-category errors.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            LookoutError::MissingEnvVar(_) | LookoutError::InvalidEnvVar { .. }
        )
    }

    /// True for ingest-category errors.
    pub fn is_ingest_error(&self) -> bool {
        matches!(
            self,
            LookoutError::ProviderRequestFailed(_)
                | LookoutError::ProviderResponseInvalid(_)
                | LookoutError::ServiceNotFound(_)
                | LookoutError::InstanceStatsUnavailable { .. }
                | LookoutError::InvalidMetricName(_)
                | LookoutError::ServiceAmbiguous(_)
        )
    }

    /// True for errors where a later, identical invocation could succeed.
    ///
    /// There is no retry machinery anywhere in the system; this only
    /// informs log severity and operator messaging.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LookoutError::DatabaseConnectionFailed(_)
                | LookoutError::ProviderRequestFailed(_)
                | LookoutError::InstanceStatsUnavailable { .. }
        )
    }

    /// Log this error at a severity matching its transience.
    pub fn log(&self) {
        if self.is_transient() {
            warn!(code = self.error_code(), "{}", self);
        } else {
            error!(code = self.error_code(), "{}", self);
        }
    }
}
