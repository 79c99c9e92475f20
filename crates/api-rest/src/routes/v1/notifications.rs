//! Pending resolution decisions of the calling citizen.

use crate::{error::ApiResult, extractors::RequestContext, responses::ApiResponse, state::AppState};
use axum::{extract::State, routing::get, Router};
use civic_issues_application::dto::NotificationDto;

/// Notification routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/notifications", get(pending_decisions))
}

/// Resolutions awaiting the citizen's confirmation
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notifications",
    responses(
        (status = 200, description = "Pending decisions"),
        (status = 401, description = "Citizen token required"),
    ),
    security(("bearer_auth" = []))
)]
async fn pending_decisions(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
) -> ApiResult<ApiResponse<Vec<NotificationDto>>> {
    let pending = state.issues.pending_decisions(&ctx).await?;
    Ok(ApiResponse::success(pending))
}
