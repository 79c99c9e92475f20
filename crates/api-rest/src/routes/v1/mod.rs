//! API v1 routes.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Router;
use uuid::Uuid;

pub mod citizens;
pub mod issues;
pub mod notifications;
pub mod offices;

/// Create all v1 API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(issues::routes())
        .merge(offices::routes())
        .merge(citizens::routes())
        .merge(notifications::routes())
}

/// Parse a path identifier, rejecting malformed values with 400
pub(crate) fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid identifier: {}", raw)))
}
