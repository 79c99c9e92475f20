//! Issue request validation rules

use super::{AttachmentUpload, Validatable, ValidationResult, ValidationRules};
use chrono::{DateTime, Utc};
use civic_issues_common::{DateRange, PaginationParams};
use civic_issues_domain::{IssueId, IssueStatus, NotificationId};
use serde::{Deserialize, Serialize};

/// Report a new issue
#[derive(Debug, Clone)]
pub struct CreateIssueRequest {
    pub title: String,
    pub description: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub is_anonymous: bool,
    pub image: Option<AttachmentUpload>,
    pub audio: Option<AttachmentUpload>,
}

impl CreateIssueRequest {
    pub const MAX_TITLE_LENGTH: usize = 200;
    pub const MAX_DESCRIPTION_LENGTH: usize = 5000;
    pub const MAX_ADDRESS_LENGTH: usize = 500;

    /// Attachments in slot order
    pub fn attachments(&self) -> impl Iterator<Item = &AttachmentUpload> {
        self.image.iter().chain(self.audio.iter())
    }
}

impl Validatable for CreateIssueRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = ValidationResult::success();

        result.merge(ValidationRules::validate_length(
            &self.title,
            "title",
            Some(1),
            Some(Self::MAX_TITLE_LENGTH),
        ));
        result.merge(ValidationRules::validate_length(
            &self.description,
            "description",
            Some(1),
            Some(Self::MAX_DESCRIPTION_LENGTH),
        ));

        if let Some(ref address) = self.address {
            result.merge(ValidationRules::validate_length(
                address,
                "address",
                None,
                Some(Self::MAX_ADDRESS_LENGTH),
            ));
        }

        result
    }
}

/// Issues around a point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyIssuesQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: Option<f64>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl Validatable for NearbyIssuesQuery {
    fn validate_all(&self) -> ValidationResult {
        let mut result = ValidationResult::success();
        if let Some(radius) = self.radius_meters {
            result.merge(ValidationRules::validate_radius(radius));
        }
        if self.page == Some(0) {
            result.add_field_error("page", "Page must be greater than 0");
        }
        if self.limit == Some(0) {
            result.add_field_error("limit", "Limit must be greater than 0");
        }
        result
    }
}

/// Paging and search shared by the office-scoped listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListIssuesQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

impl ListIssuesQuery {
    /// Clamp to legal paging values, filling in `default_limit`
    pub fn pagination(&self, default_limit: u32) -> PaginationParams {
        PaginationParams::new(self.page.unwrap_or(1), self.limit.unwrap_or(default_limit))
    }
}

/// Forward an issue under review to an employee of the owning office
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardIssueRequest {
    pub issue_id: IssueId,
    pub department: String,
    pub role: String,
}

impl Validatable for ForwardIssueRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = ValidationResult::success();
        result.merge(ValidationRules::validate_required(&self.department, "department"));
        result.merge(ValidationRules::validate_length(
            &self.department,
            "department",
            None,
            Some(100),
        ));
        result.merge(ValidationRules::validate_required(&self.role, "role"));
        result
    }
}

/// Record progress on, or resolve, a forwarded issue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIssueRequest {
    pub issue_id: IssueId,
    pub status: IssueStatus,
    pub description: String,
}

impl Validatable for UpdateIssueRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = ValidationResult::success();
        result.merge(ValidationRules::validate_length(
            &self.description,
            "description",
            Some(1),
            Some(CreateIssueRequest::MAX_DESCRIPTION_LENGTH),
        ));
        result
    }
}

/// Citizen's answer to a pending resolution decision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDecisionRequest {
    pub issue_id: IssueId,
    pub notification_id: NotificationId,
    #[serde(default)]
    pub message: Option<String>,
}

impl ResolutionDecisionRequest {
    pub const DEFAULT_REJECTION_MESSAGE: &'static str = "Issue has been rejected by the user";

    /// Rejection message, falling back to the default when blank
    pub fn rejection_message(&self) -> String {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(Self::DEFAULT_REJECTION_MESSAGE)
            .to_string()
    }
}

impl Validatable for ResolutionDecisionRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = ValidationResult::success();
        if let Some(ref message) = self.message {
            result.merge(ValidationRules::validate_length(
                message,
                "message",
                None,
                Some(CreateIssueRequest::MAX_DESCRIPTION_LENGTH),
            ));
        }
        result
    }
}

/// Analytics window; open bounds default relative to now
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

impl AnalyticsQuery {
    pub fn range(&self, default_days: i64) -> DateRange {
        DateRange::resolve(self.from_date, self.to_date, default_days)
    }
}

impl Validatable for AnalyticsQuery {
    fn validate_all(&self) -> ValidationResult {
        let mut result = ValidationResult::success();
        if let (Some(from), Some(to)) = (self.from_date, self.to_date) {
            if from > to {
                result.add_field_error("fromDate", "Start date must be before or equal to end date");
            }
        }
        result
    }
}
