//! Issue read models

use chrono::{DateTime, Utc};
use civic_issues_domain::{
    AuthorityId, CitizenId, Fault, Issue, IssueId, IssueStatus, Notification, NotificationId,
    OfficeId, Priority, Update, UpdateId,
};
use serde::{Deserialize, Serialize};

/// Issue as shown in listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueSummary {
    pub id: IssueId,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub office_id: OfficeId,
    /// Absent for anonymous issues
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_id: Option<CitizenId>,
    pub is_anonymous: bool,
    pub status: IssueStatus,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<AuthorityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub resolution_confirmed: bool,
    pub dispute: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispute_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<Fault>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_resolved_at: Option<DateTime<Utc>>,
    pub upvote_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Issue> for IssueSummary {
    fn from(issue: &Issue) -> Self {
        let assignment = issue.assignment.as_ref();
        Self {
            id: issue.id,
            title: issue.title.clone(),
            description: issue.description.clone(),
            address: issue.address.clone(),
            latitude: issue.location.lat(),
            longitude: issue.location.lon(),
            office_id: issue.office_id,
            reporter_id: (!issue.is_anonymous).then_some(issue.reporter_id),
            is_anonymous: issue.is_anonymous,
            status: issue.status,
            priority: issue.priority,
            assigned_to_id: assignment.map(|a| a.assigned_to_id),
            department_name: assignment.map(|a| a.department_name.clone()),
            assigned_at: assignment.map(|a| a.assigned_at),
            image_url: issue.image_url.clone(),
            audio_url: issue.audio_url.clone(),
            resolution_confirmed: issue.resolution_confirmed,
            dispute: issue.dispute,
            dispute_message: issue.dispute_message.clone(),
            fault: issue.fault,
            resolved_at: issue.resolved_at,
            conflict_resolved_at: issue.conflict_resolved_at,
            upvote_count: issue.upvote_count(),
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        }
    }
}

/// Audit-trail entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDto {
    pub id: UpdateId,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Update> for UpdateDto {
    fn from(update: &Update) -> Self {
        Self {
            id: update.id,
            description: update.description.clone(),
            created_at: update.created_at,
        }
    }
}

/// Updates ordered oldest first
pub fn updates_ascending(issue: &Issue) -> Vec<UpdateDto> {
    let mut updates: Vec<UpdateDto> = issue.updates.iter().map(UpdateDto::from).collect();
    updates.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    updates
}

/// Full issue read model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDetail {
    #[serde(flatten)]
    pub issue: IssueSummary,
    pub updates: Vec<UpdateDto>,
    /// Whether the calling citizen has upvoted
    pub voted: bool,
}

impl IssueDetail {
    pub fn new(issue: &Issue, viewer: Option<CitizenId>) -> Self {
        Self {
            issue: IssueSummary::from(issue),
            updates: updates_ascending(issue),
            voted: viewer.is_some_and(|c| issue.has_upvote_from(c)),
        }
    }
}

/// Nearby search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyIssue {
    #[serde(flatten)]
    pub issue: IssueSummary,
    /// Haversine distance rounded to whole meters
    pub distance_in_meters: i64,
}

/// Pending resolution decision as shown to the citizen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDto {
    pub id: NotificationId,
    pub issue_id: IssueId,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationDto {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id,
            issue_id: n.issue_id,
            title: n.title.clone(),
            description: n.description.clone(),
            created_at: n.created_at,
        }
    }
}

/// Upvote state after a vote change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSummary {
    pub issue_id: IssueId,
    pub upvote_count: usize,
    pub voted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_issues_domain::{Coordinate, NewIssue};

    fn issue(is_anonymous: bool) -> Issue {
        Issue::new(NewIssue {
            title: "Fallen tree".to_string(),
            description: "Blocking the lane".to_string(),
            address: None,
            location: Coordinate::new(12.9, 77.6).unwrap(),
            office_id: OfficeId::new(),
            reporter_id: CitizenId::new(),
            is_anonymous,
            priority: Priority::Urgent,
            image_url: None,
            audio_url: None,
        })
    }

    #[test]
    fn test_anonymous_issue_hides_reporter() {
        let summary = IssueSummary::from(&issue(true));
        assert!(summary.reporter_id.is_none());
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("reporterId").is_none());

        let summary = IssueSummary::from(&issue(false));
        assert!(summary.reporter_id.is_some());
    }

    #[test]
    fn test_detail_flattens_summary() {
        let mut issue = issue(false);
        let viewer = CitizenId::new();
        issue.upvotes.insert(viewer);
        let later = issue.created_at + chrono::Duration::minutes(5);
        issue.append_update("second", later);
        issue.append_update("first", issue.created_at);

        let detail = IssueDetail::new(&issue, Some(viewer));
        assert!(detail.voted);
        assert_eq!(detail.issue.upvote_count, 1);
        assert_eq!(detail.updates[0].description, "first");

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["title"], "Fallen tree");
        assert_eq!(json["status"], "UNDER_REVIEW");
    }
}
