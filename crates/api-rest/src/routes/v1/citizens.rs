//! Citizen registration endpoint.

use crate::{
    error::ApiResult,
    extractors::{RequestContext, ValidatedJson},
    responses::Created,
    state::AppState,
};
use axum::{extract::State, routing::post, Router};
use civic_issues_application::{dto::CitizenDto, validation::CreateCitizenRequest};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Register citizen request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCitizenBody {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 3, max = 32))]
    pub phone: Option<String>,
}

/// Citizen routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/citizens", post(create_citizen))
}

/// Register a citizen
#[utoipa::path(
    post,
    path = "/citizens",
    tag = "citizens",
    request_body = CreateCitizenBody,
    responses(
        (status = 201, description = "Citizen registered"),
        (status = 401, description = "Admin token required"),
    ),
    security(("bearer_auth" = []))
)]
async fn create_citizen(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    ValidatedJson(body): ValidatedJson<CreateCitizenBody>,
) -> ApiResult<Created<CitizenDto>> {
    let request = CreateCitizenRequest {
        name: body.name,
        phone: body.phone,
    };
    let citizen = state.provisioning.create_citizen(&ctx, request).await?;
    Ok(Created(citizen))
}
