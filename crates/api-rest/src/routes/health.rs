//! Health check endpoints.

use crate::{responses::ApiResponse, state::AppState};
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use utoipa::ToSchema;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// Readiness check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadinessResponse {
    /// Overall readiness status
    pub ready: bool,

    /// Individual component checks
    pub checks: ReadinessChecks,
}

/// Individual readiness checks
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessChecks {
    /// Issue store answers queries
    pub store: bool,

    /// Database pool, when persistence is PostgreSQL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<bool>,

    /// Time spent on the checks
    pub latency_ms: u64,
}

/// Health check routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/live", get(live))
        .route("/health/ready", get(ready))
}

fn healthy() -> HealthResponse {
    HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Basic health check
///
/// Returns service status and version information.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(healthy()))
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses(
        (status = 200, description = "Process is running", body = HealthResponse)
    )
)]
async fn live() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(healthy()))
}

/// Readiness check
///
/// Answers 503 while the issue store or database is unreachable.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "A dependency is unavailable", body = ReadinessResponse),
    )
)]
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<ReadinessResponse>>) {
    let start = Instant::now();

    let store = state.issues.health_check().await.is_ok();
    let database = match &state.database {
        Some(pool) => Some(pool.health_check().await.healthy),
        None => None,
    };

    let checks = ReadinessChecks {
        store,
        database,
        latency_ms: start.elapsed().as_millis() as u64,
    };
    let ready = checks.store && checks.database.unwrap_or(true);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(ReadinessResponse { ready, checks })),
    )
}
