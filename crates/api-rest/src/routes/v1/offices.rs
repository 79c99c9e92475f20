//! Office provisioning endpoints.

use crate::{
    error::ApiResult,
    extractors::{RequestContext, ValidatedJson},
    responses::{ApiResponse, Created},
    routes::v1::parse_id,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use civic_issues_application::{
    dto::{AuthorityDto, OfficeDto},
    validation::{CreateAuthorityRequest, CreateOfficeRequest},
};
use civic_issues_domain::OfficeId;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Create office request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOfficeBody {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl From<CreateOfficeBody> for CreateOfficeRequest {
    fn from(body: CreateOfficeBody) -> Self {
        Self {
            name: body.name,
            latitude: body.latitude,
            longitude: body.longitude,
        }
    }
}

/// Add authority request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthorityBody {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    /// `REPRESENTATIVE` makes the employee the office's representative
    #[validate(length(min = 1, max = 100))]
    pub role: String,

    #[validate(length(min = 1, max = 100))]
    pub department_name: Option<String>,
}

impl From<CreateAuthorityBody> for CreateAuthorityRequest {
    fn from(body: CreateAuthorityBody) -> Self {
        Self {
            name: body.name,
            email: body.email,
            role: body.role,
            department_name: body.department_name,
        }
    }
}

/// Office routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/offices", post(create_office).get(list_offices))
        .route("/offices/:id/authorities", post(add_authority))
}

/// Create an office
#[utoipa::path(
    post,
    path = "/offices",
    tag = "offices",
    request_body = CreateOfficeBody,
    responses(
        (status = 201, description = "Office created"),
        (status = 401, description = "Admin token required"),
        (status = 409, description = "Office name taken"),
    ),
    security(("bearer_auth" = []))
)]
async fn create_office(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    ValidatedJson(body): ValidatedJson<CreateOfficeBody>,
) -> ApiResult<Created<OfficeDto>> {
    let office = state.provisioning.create_office(&ctx, body.into()).await?;
    Ok(Created(office))
}

/// List offices with their employees
#[utoipa::path(
    get,
    path = "/offices",
    tag = "offices",
    responses(
        (status = 200, description = "All offices"),
        (status = 401, description = "Admin token required"),
    ),
    security(("bearer_auth" = []))
)]
async fn list_offices(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
) -> ApiResult<ApiResponse<Vec<OfficeDto>>> {
    let offices = state.provisioning.list_offices(&ctx).await?;
    Ok(ApiResponse::success(offices))
}

/// Add an employee to an office
#[utoipa::path(
    post,
    path = "/offices/{id}/authorities",
    tag = "offices",
    params(("id" = String, Path, description = "Office ID (UUID)")),
    request_body = CreateAuthorityBody,
    responses(
        (status = 201, description = "Authority added"),
        (status = 401, description = "Admin token required"),
        (status = 404, description = "Office not found"),
        (status = 409, description = "Role already held in this office"),
    ),
    security(("bearer_auth" = []))
)]
async fn add_authority(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<CreateAuthorityBody>,
) -> ApiResult<Created<AuthorityDto>> {
    let office_id = OfficeId::from_uuid(parse_id(&id)?);
    let authority = state
        .provisioning
        .add_authority(&ctx, office_id, body.into())
        .await?;
    Ok(Created(authority))
}
