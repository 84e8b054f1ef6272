use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use lookout_core::{
    run_linode_ingest, AlertRepository, LatestValues, LookoutError, MetricRepository, Repository,
    ServiceRepository,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ingest/linode", post(trigger_linode_ingest))
        .route("/services", get(list_services))
        .route("/services/{id}/metrics", get(service_metrics))
        .route("/services/{id}/metrics/latest", get(service_latest))
        .route("/services/{id}/alerts", get(service_alerts))
        .with_state(state)
}

/// Request-level error wrapper: every failure surfaces as a 500 with an
/// `{"error": ...}` JSON body carrying the failure reason.
pub struct ApiError(LookoutError);

impl From<LookoutError> for ApiError {
    fn from(err: LookoutError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.log();
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.health_check().await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// The ingestion trigger. Any request body is ignored; success responds
/// with a summary message, failure with a 500 and the reason.
async fn trigger_linode_ingest(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = run_linode_ingest(&state.db).await?;
    Ok(Json(json!({ "message": report.summary() })))
}

async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let repo = ServiceRepository::new(state.db.pool().clone());
    let services = repo.get_all().await?;
    Ok(Json(json!({ "data": services })))
}

#[derive(Debug, Deserialize)]
struct MetricsQuery {
    limit: Option<i64>,
}

async fn service_metrics(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let repo = MetricRepository::new(state.db.pool().clone());
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);
    let metrics = repo.recent_for_service(id, limit).await?;
    Ok(Json(json!({ "data": metrics })))
}

async fn service_latest(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LatestValues>, ApiError> {
    let repo = MetricRepository::new(state.db.pool().clone());
    let rows = repo.latest_for_service(id).await?;
    Ok(Json(LatestValues::from_metrics(&rows)))
}

async fn service_alerts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let repo = AlertRepository::new(state.db.pool().clone());
    let alerts = repo.get_open_for_service(id).await?;
    Ok(Json(json!({ "data": alerts })))
}
