//! Issue endpoints: intake, search, routing decisions and reporting.

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiQuery, RequestContext, ValidatedJson},
    responses::{ApiResponse, Created, PaginatedResponse},
    routes::v1::parse_id,
    state::AppState,
};
use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart, Path, State,
    },
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use civic_issues_application::{
    dto::{
        AnalyticsView, IssueDetail, IssueReport, IssueSummary, MonthlyReport, NearbyIssue,
        VoteSummary,
    },
    validation::{
        AnalyticsQuery, AttachmentSlot, AttachmentUpload, CreateIssueRequest, ForwardIssueRequest,
        ListIssuesQuery, NearbyIssuesQuery, ResolutionDecisionRequest, UpdateIssueRequest,
    },
};
use civic_issues_domain::{errors::ValidationError, IssueId, IssueStatus, NotificationId};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Nearby search parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NearbyParams {
    /// Center latitude
    pub latitude: f64,
    /// Center longitude
    pub longitude: f64,
    /// Search radius in meters
    pub radius: Option<f64>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Case-insensitive title/description filter
    pub search: Option<String>,
}

impl From<NearbyParams> for NearbyIssuesQuery {
    fn from(params: NearbyParams) -> Self {
        Self {
            latitude: params.latitude,
            longitude: params.longitude,
            radius_meters: params.radius,
            search: params.search,
            page: params.page,
            limit: params.limit,
        }
    }
}

/// Paging and search for the office listings
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

impl From<ListParams> for ListIssuesQuery {
    fn from(params: ListParams) -> Self {
        Self {
            page: params.page,
            limit: params.limit,
            search: params.search,
        }
    }
}

/// Reporting window. Accepts RFC 3339 timestamps or plain `YYYY-MM-DD`
/// dates; a plain `toDate` covers the whole day.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DateParams {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl DateParams {
    fn into_query(self) -> ApiResult<AnalyticsQuery> {
        Ok(AnalyticsQuery {
            from_date: self
                .from_date
                .as_deref()
                .map(|raw| parse_date("fromDate", raw, false))
                .transpose()?,
            to_date: self
                .to_date
                .as_deref()
                .map(|raw| parse_date("toDate", raw, true))
                .transpose()?,
        })
    }
}

fn parse_date(field: &str, raw: &str, end_of_day: bool) -> ApiResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .filter(|date| (1..=9999).contains(&date.year()))
        .ok_or_else(|| {
            ApiError::from(ValidationError::FieldValidation {
                field: field.to_string(),
                message: "Expected an RFC 3339 timestamp or a YYYY-MM-DD date".to_string(),
            })
        })?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    };
    let time = time.unwrap_or_default();
    Ok(date.and_time(time).and_utc())
}

/// Forward an issue to an office employee
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForwardIssueBody {
    pub issue_id: Uuid,

    #[validate(length(min = 1, max = 100))]
    pub department: String,

    #[validate(length(min = 1, max = 100))]
    pub role: String,
}

impl From<ForwardIssueBody> for ForwardIssueRequest {
    fn from(body: ForwardIssueBody) -> Self {
        Self {
            issue_id: IssueId::from_uuid(body.issue_id),
            department: body.department,
            role: body.role,
        }
    }
}

/// Move an issue along its lifecycle
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIssueBody {
    pub issue_id: Uuid,

    /// Target status, e.g. `IN_PROGRESS` or `RESOLVED`
    #[schema(value_type = String)]
    pub status: IssueStatus,

    #[validate(length(min = 1, max = 2000))]
    pub description: String,
}

impl From<UpdateIssueBody> for UpdateIssueRequest {
    fn from(body: UpdateIssueBody) -> Self {
        Self {
            issue_id: IssueId::from_uuid(body.issue_id),
            status: body.status,
            description: body.description,
        }
    }
}

/// Citizen decision on a resolved issue
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDecisionBody {
    pub issue_id: Uuid,

    pub notification_id: Uuid,

    #[validate(length(max = 2000))]
    pub message: Option<String>,
}

impl From<ResolutionDecisionBody> for ResolutionDecisionRequest {
    fn from(body: ResolutionDecisionBody) -> Self {
        Self {
            issue_id: IssueId::from_uuid(body.issue_id),
            notification_id: NotificationId::from_uuid(body.notification_id),
            message: body.message,
        }
    }
}

/// Issue routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/issues", post(create_issue))
        .route("/issues/nearby", get(nearby_issues))
        .route("/issues/office", get(issues_by_office))
        .route("/issues/authority", get(issues_by_authority))
        .route("/issues/forwarded", get(forwarded_issues))
        .route("/issues/conflicts", get(conflict_issues))
        .route("/issues/analytics", get(analytics))
        .route("/issues/reports/monthly", get(monthly_report))
        .route("/issues/forward", put(forward_issue))
        .route("/issues/update", put(update_issue))
        .route("/issues/confirm-resolution", put(confirm_resolution))
        .route("/issues/reject-resolution", put(reject_resolution))
        .route("/issues/:id", get(get_issue))
        .route("/issues/:id/report", get(issue_report))
        .route("/issues/:id/citizen-fault", post(citizen_fault))
        .route("/issues/:id/authority-fault", post(authority_fault))
        .route("/issues/:id/upvote", put(upvote).delete(remove_upvote))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

fn missing(field: &str) -> ApiError {
    ValidationError::FieldValidation {
        field: field.to_string(),
        message: "is required".to_string(),
    }
    .into()
}

fn parse_coordinate(field: &str, raw: Option<String>) -> ApiResult<f64> {
    let raw = raw.ok_or_else(|| missing(field))?;
    raw.trim().parse::<f64>().map_err(|_| {
        ValidationError::FieldValidation {
            field: field.to_string(),
            message: format!("'{}' is not a number", raw),
        }
        .into()
    })
}

fn parse_flag(raw: &str) -> ApiResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" | "" => Ok(false),
        other => Err(ValidationError::FieldValidation {
            field: "isAnonymous".to_string(),
            message: format!("'{}' is not a boolean", other),
        }
        .into()),
    }
}

async fn read_attachment(field: Field<'_>, slot: AttachmentSlot) -> ApiResult<AttachmentUpload> {
    let file_name = field.file_name().unwrap_or(slot.as_str()).to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await.map_err(multipart_error)?;
    Ok(AttachmentUpload::new(slot, file_name, content_type, bytes))
}

/// Collect the multipart issue form. Unknown fields are ignored.
async fn read_issue_form(mut multipart: Multipart) -> ApiResult<CreateIssueRequest> {
    let mut title = None;
    let mut description = None;
    let mut address = None;
    let mut latitude = None;
    let mut longitude = None;
    let mut is_anonymous = false;
    let mut image = None;
    let mut audio = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => image = Some(read_attachment(field, AttachmentSlot::Image).await?),
            "audio" => audio = Some(read_attachment(field, AttachmentSlot::Audio).await?),
            "title" => title = Some(field.text().await.map_err(multipart_error)?),
            "description" => description = Some(field.text().await.map_err(multipart_error)?),
            "address" => address = Some(field.text().await.map_err(multipart_error)?),
            "latitude" => latitude = Some(field.text().await.map_err(multipart_error)?),
            "longitude" => longitude = Some(field.text().await.map_err(multipart_error)?),
            "isAnonymous" => {
                is_anonymous = parse_flag(&field.text().await.map_err(multipart_error)?)?
            }
            _ => {}
        }
    }

    Ok(CreateIssueRequest {
        title: title.ok_or_else(|| missing("title"))?,
        description: description.ok_or_else(|| missing("description"))?,
        address: address.filter(|value| !value.trim().is_empty()),
        latitude: parse_coordinate("latitude", latitude)?,
        longitude: parse_coordinate("longitude", longitude)?,
        is_anonymous,
        image,
        audio,
    })
}

/// Report an issue
///
/// Multipart form with `title`, `description`, optional `address`,
/// `latitude`, `longitude`, `isAnonymous` and optional `image`/`audio` files.
/// The issue is routed to the nearest office.
#[utoipa::path(
    post,
    path = "/issues",
    tag = "issues",
    request_body(content = String, content_type = "multipart/form-data", description = "Issue form"),
    responses(
        (status = 201, description = "Issue created"),
        (status = 400, description = "Invalid form or attachment"),
        (status = 401, description = "Citizen token required"),
        (status = 404, description = "No office available"),
        (status = 413, description = "Attachment too large"),
        (status = 503, description = "Attachment upload failed"),
    ),
    security(("bearer_auth" = []))
)]
async fn create_issue(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    multipart: Multipart,
) -> ApiResult<Created<IssueDetail>> {
    let request = read_issue_form(multipart).await?;
    let issue = state.issues.create_issue(&ctx, request).await?;
    Ok(Created(issue))
}

/// Issues near a point
///
/// Ordered by distance, then newest first.
#[utoipa::path(
    get,
    path = "/issues/nearby",
    tag = "issues",
    params(NearbyParams),
    responses(
        (status = 200, description = "Nearby issues with distances in meters"),
        (status = 400, description = "Invalid coordinates or radius"),
    )
)]
async fn nearby_issues(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    ApiQuery(params): ApiQuery<NearbyParams>,
) -> ApiResult<PaginatedResponse<NearbyIssue>> {
    let page = state.issues.nearby_issues(&ctx, params.into()).await?;
    Ok(page.into())
}

/// Get an issue
#[utoipa::path(
    get,
    path = "/issues/{id}",
    tag = "issues",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Issue detail"),
        (status = 404, description = "Issue not found"),
    )
)]
async fn get_issue(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<IssueDetail>> {
    let issue_id = IssueId::from_uuid(parse_id(&id)?);
    let issue = state.issues.get_issue(&ctx, issue_id).await?;
    Ok(ApiResponse::success(issue))
}

/// Issues of the representative's office
#[utoipa::path(
    get,
    path = "/issues/office",
    tag = "issues",
    params(ListParams),
    responses(
        (status = 200, description = "Office issues, newest first"),
        (status = 401, description = "Office representative required"),
    ),
    security(("bearer_auth" = []))
)]
async fn issues_by_office(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<PaginatedResponse<IssueSummary>> {
    Ok(state.issues.issues_by_office(&ctx, params.into()).await?.into())
}

/// Issues forwarded to the calling authority
#[utoipa::path(
    get,
    path = "/issues/authority",
    tag = "issues",
    params(ListParams),
    responses(
        (status = 200, description = "Assigned issues, newest first"),
        (status = 401, description = "Authority token required"),
    ),
    security(("bearer_auth" = []))
)]
async fn issues_by_authority(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<PaginatedResponse<IssueSummary>> {
    Ok(state
        .issues
        .issues_by_authority(&ctx, params.into())
        .await?
        .into())
}

/// Issues the office has forwarded
#[utoipa::path(
    get,
    path = "/issues/forwarded",
    tag = "issues",
    params(ListParams),
    responses(
        (status = 200, description = "Forwarded issues, newest first"),
        (status = 401, description = "Office representative required"),
    ),
    security(("bearer_auth" = []))
)]
async fn forwarded_issues(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<PaginatedResponse<IssueSummary>> {
    Ok(state.issues.forwarded_issues(&ctx, params.into()).await?.into())
}

/// Disputed issues awaiting a fault ruling
#[utoipa::path(
    get,
    path = "/issues/conflicts",
    tag = "issues",
    params(ListParams),
    responses(
        (status = 200, description = "Disputed issues, newest first"),
        (status = 401, description = "Office representative required"),
    ),
    security(("bearer_auth" = []))
)]
async fn conflict_issues(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<PaginatedResponse<IssueSummary>> {
    Ok(state.issues.conflict_issues(&ctx, params.into()).await?.into())
}

/// Forward an issue
///
/// Assigns the issue to the office employee holding `department`/`role`.
#[utoipa::path(
    put,
    path = "/issues/forward",
    tag = "issues",
    request_body = ForwardIssueBody,
    responses(
        (status = 200, description = "Issue forwarded"),
        (status = 401, description = "Office representative required"),
        (status = 404, description = "Issue or employee not found"),
        (status = 409, description = "Issue is not awaiting forwarding"),
    ),
    security(("bearer_auth" = []))
)]
async fn forward_issue(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    ValidatedJson(body): ValidatedJson<ForwardIssueBody>,
) -> ApiResult<ApiResponse<IssueDetail>> {
    let issue = state.issues.forward_issue(&ctx, body.into()).await?;
    Ok(ApiResponse::success_with_message(issue, "Issue forwarded"))
}

/// Update an issue's status
#[utoipa::path(
    put,
    path = "/issues/update",
    tag = "issues",
    request_body = UpdateIssueBody,
    responses(
        (status = 200, description = "Issue updated"),
        (status = 401, description = "Authority token required"),
        (status = 404, description = "Issue not found"),
        (status = 409, description = "Transition not allowed"),
    ),
    security(("bearer_auth" = []))
)]
async fn update_issue(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    ValidatedJson(body): ValidatedJson<UpdateIssueBody>,
) -> ApiResult<ApiResponse<IssueDetail>> {
    let issue = state.issues.update_issue(&ctx, body.into()).await?;
    Ok(ApiResponse::success(issue))
}

/// Accept a resolution
#[utoipa::path(
    put,
    path = "/issues/confirm-resolution",
    tag = "issues",
    request_body = ResolutionDecisionBody,
    responses(
        (status = 200, description = "Resolution confirmed"),
        (status = 401, description = "Reporter token required"),
        (status = 404, description = "Issue or notification not found"),
    ),
    security(("bearer_auth" = []))
)]
async fn confirm_resolution(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    ValidatedJson(body): ValidatedJson<ResolutionDecisionBody>,
) -> ApiResult<ApiResponse<IssueDetail>> {
    let issue = state.issues.confirm_resolution(&ctx, body.into()).await?;
    Ok(ApiResponse::success(issue))
}

/// Dispute a resolution
#[utoipa::path(
    put,
    path = "/issues/reject-resolution",
    tag = "issues",
    request_body = ResolutionDecisionBody,
    responses(
        (status = 200, description = "Resolution disputed"),
        (status = 401, description = "Reporter token required"),
        (status = 404, description = "Issue or notification not found"),
    ),
    security(("bearer_auth" = []))
)]
async fn reject_resolution(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    ValidatedJson(body): ValidatedJson<ResolutionDecisionBody>,
) -> ApiResult<ApiResponse<IssueDetail>> {
    let issue = state.issues.reject_resolution(&ctx, body.into()).await?;
    Ok(ApiResponse::success(issue))
}

/// Rule a dispute in the authority's favour
///
/// The reporter loses reputation.
#[utoipa::path(
    post,
    path = "/issues/{id}/citizen-fault",
    tag = "issues",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Dispute closed"),
        (status = 401, description = "Office representative required"),
        (status = 409, description = "Issue is not disputed"),
    ),
    security(("bearer_auth" = []))
)]
async fn citizen_fault(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<IssueDetail>> {
    let issue_id = IssueId::from_uuid(parse_id(&id)?);
    let issue = state.issues.citizen_fault(&ctx, issue_id).await?;
    Ok(ApiResponse::success(issue))
}

/// Rule a dispute in the citizen's favour
#[utoipa::path(
    post,
    path = "/issues/{id}/authority-fault",
    tag = "issues",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Dispute acknowledged"),
        (status = 401, description = "Office representative required"),
        (status = 409, description = "Issue is not disputed"),
    ),
    security(("bearer_auth" = []))
)]
async fn authority_fault(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<IssueDetail>> {
    let issue_id = IssueId::from_uuid(parse_id(&id)?);
    let issue = state.issues.authority_fault(&ctx, issue_id).await?;
    Ok(ApiResponse::success(issue))
}

/// Upvote an issue
#[utoipa::path(
    put,
    path = "/issues/{id}/upvote",
    tag = "issues",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Vote recorded"),
        (status = 401, description = "Citizen token required"),
        (status = 409, description = "Already voted"),
    ),
    security(("bearer_auth" = []))
)]
async fn upvote(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<VoteSummary>> {
    let issue_id = IssueId::from_uuid(parse_id(&id)?);
    let votes = state.issues.upvote(&ctx, issue_id).await?;
    Ok(ApiResponse::success(votes))
}

/// Withdraw an upvote
#[utoipa::path(
    delete,
    path = "/issues/{id}/upvote",
    tag = "issues",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Vote withdrawn"),
        (status = 401, description = "Citizen token required"),
        (status = 409, description = "No vote to withdraw"),
    ),
    security(("bearer_auth" = []))
)]
async fn remove_upvote(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<VoteSummary>> {
    let issue_id = IssueId::from_uuid(parse_id(&id)?);
    let votes = state.issues.remove_upvote(&ctx, issue_id).await?;
    Ok(ApiResponse::success(votes))
}

/// Office analytics
#[utoipa::path(
    get,
    path = "/issues/analytics",
    tag = "reports",
    params(DateParams),
    responses(
        (status = 200, description = "Status, priority and daily breakdown"),
        (status = 401, description = "Authority token required"),
    ),
    security(("bearer_auth" = []))
)]
async fn analytics(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    ApiQuery(params): ApiQuery<DateParams>,
) -> ApiResult<ApiResponse<AnalyticsView>> {
    let view = state.issues.analytics(&ctx, params.into_query()?).await?;
    Ok(ApiResponse::success(view))
}

/// Monthly office report
#[utoipa::path(
    get,
    path = "/issues/reports/monthly",
    tag = "reports",
    params(DateParams),
    responses(
        (status = 200, description = "Report data"),
        (status = 401, description = "Office representative required"),
    ),
    security(("bearer_auth" = []))
)]
async fn monthly_report(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    ApiQuery(params): ApiQuery<DateParams>,
) -> ApiResult<ApiResponse<MonthlyReport>> {
    let report = state.issues.monthly_report(&ctx, params.into_query()?).await?;
    Ok(ApiResponse::success(report))
}

/// Single-issue report
#[utoipa::path(
    get,
    path = "/issues/{id}/report",
    tag = "reports",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Report data"),
        (status = 401, description = "Office authority or reporter required"),
        (status = 404, description = "Issue not found"),
    ),
    security(("bearer_auth" = []))
)]
async fn issue_report(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<IssueReport>> {
    let issue_id = IssueId::from_uuid(parse_id(&id)?);
    let report = state.issues.issue_report(&ctx, issue_id).await?;
    Ok(ApiResponse::success(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_plain_to_date_covers_the_day() {
        let end = parse_date("toDate", "2024-03-31", true).unwrap();
        assert_eq!((end.month(), end.day(), end.hour()), (3, 31, 23));

        let start = parse_date("fromDate", "2024-03-01", false).unwrap();
        assert_eq!((start.day(), start.hour()), (1, 0));
    }

    #[test]
    fn test_rfc3339_dates_are_kept() {
        let at = parse_date("fromDate", "2024-03-01T10:30:00+02:00", false).unwrap();
        assert_eq!(at.hour(), 8);
        assert!(parse_date("fromDate", "yesterday", false).is_err());
    }

    #[test]
    fn test_extended_years_are_rejected() {
        let err = parse_date("toDate", "-262143-01-01", true).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(parse_date("fromDate", "+10000-01-01", false).is_err());
        assert!(parse_date("fromDate", "0000-01-01", false).is_err());
        assert!(parse_date("toDate", "9999-12-31", true).is_ok());
    }

    #[test]
    fn test_anonymous_flag_parsing() {
        assert!(parse_flag("true").unwrap());
        assert!(parse_flag("1").unwrap());
        assert!(!parse_flag("false").unwrap());
        assert!(parse_flag("maybe").is_err());
    }
}
