//! Issues, their status state machine and the records hanging off them.

use crate::geo::Coordinate;
use crate::identifiers::{AuthorityId, CitizenId, IssueId, NotificationId, OfficeId, UpdateId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Issue lifecycle status
///
/// `Pending` is a legacy initial value kept for stored data; the engine never
/// moves an issue into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    Pending,
    UnderReview,
    Forwarded,
    InProgress,
    Resolved,
}

impl IssueStatus {
    /// All statuses, in reporting order
    pub const ALL: [IssueStatus; 5] = [
        Self::Pending,
        Self::UnderReview,
        Self::Forwarded,
        Self::InProgress,
        Self::Resolved,
    ];

    /// The transition table. Self-transitions on `Forwarded` and `InProgress`
    /// record progress notes without changing the status.
    pub fn can_transition_to(&self, target: IssueStatus) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::UnderReview)
                | (Self::UnderReview, Self::Forwarded)
                | (Self::Forwarded, Self::Forwarded)
                | (Self::Forwarded, Self::InProgress)
                | (Self::Forwarded, Self::Resolved)
                | (Self::InProgress, Self::InProgress)
                | (Self::InProgress, Self::Resolved)
        )
    }

    /// Statuses an authority may set through a status update
    pub fn accepts_status_updates(&self) -> bool {
        matches!(self, Self::Forwarded | Self::InProgress)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::UnderReview => "UNDER_REVIEW",
            Self::Forwarded => "FORWARDED",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "UNDER_REVIEW" => Ok(Self::UnderReview),
            "FORWARDED" => Ok(Self::Forwarded),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "RESOLVED" => Ok(Self::Resolved),
            other => Err(format!("unknown issue status: {other}")),
        }
    }
}

/// Advisory severity label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    #[default]
    Normal,
    Urgent,
    Severe,
}

impl Priority {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Urgent => "URGENT",
            Self::Severe => "SEVERE",
        }
    }

    /// First priority label appearing as a word in free text, if any
    pub fn from_label(text: &str) -> Option<Self> {
        text.split(|c: char| !c.is_ascii_alphabetic())
            .find_map(|word| word.parse().ok())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NORMAL" => Ok(Self::Normal),
            "URGENT" => Ok(Self::Urgent),
            "SEVERE" => Ok(Self::Severe),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Party found responsible for a disputed resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fault {
    Citizen,
    Authority,
}

impl Fault {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Citizen => "citizen",
            Self::Authority => "authority",
        }
    }
}

impl FromStr for Fault {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "citizen" => Ok(Self::Citizen),
            "authority" => Ok(Self::Authority),
            other => Err(format!("unknown fault: {other}")),
        }
    }
}

/// Who the issue is forwarded to. Assignee, department and timestamp are set
/// together or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub assigned_to_id: AuthorityId,
    pub department_name: String,
    pub assigned_at: DateTime<Utc>,
}

/// Audit-trail entry; immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub id: UpdateId,
    pub issue_id: IssueId,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Update {
    pub fn new(issue_id: IssueId, description: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: UpdateId::new(),
            issue_id,
            description: description.into(),
            created_at: at,
        }
    }
}

/// One-shot "awaiting citizen decision" record created when an issue is resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub issue_id: IssueId,
    pub citizen_id: CitizenId,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when an issue is first placed
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub address: Option<String>,
    pub location: Coordinate,
    pub office_id: OfficeId,
    pub reporter_id: CitizenId,
    pub is_anonymous: bool,
    pub priority: Priority,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
}

/// A citizen-reported complaint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    pub description: String,
    pub address: Option<String>,
    pub location: Coordinate,
    pub office_id: OfficeId,
    pub reporter_id: CitizenId,
    pub is_anonymous: bool,
    pub status: IssueStatus,
    pub assignment: Option<Assignment>,
    pub priority: Priority,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub resolution_confirmed: bool,
    pub dispute: bool,
    pub dispute_message: Option<String>,
    pub fault: Option<Fault>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub conflict_resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updates: Vec<Update>,
    pub upvotes: BTreeSet<CitizenId>,
    pub pending_decision: Option<Notification>,
    pub version: i64,
}

impl Issue {
    /// Place a new issue under review
    pub fn new(new: NewIssue) -> Self {
        let now = Utc::now();
        Self {
            id: IssueId::new(),
            title: new.title,
            description: new.description,
            address: new.address,
            location: new.location,
            office_id: new.office_id,
            reporter_id: new.reporter_id,
            is_anonymous: new.is_anonymous,
            status: IssueStatus::UnderReview,
            assignment: None,
            priority: new.priority,
            image_url: new.image_url,
            audio_url: new.audio_url,
            resolution_confirmed: false,
            dispute: false,
            dispute_message: None,
            fault: None,
            resolved_at: None,
            conflict_resolved_at: None,
            created_at: now,
            updated_at: now,
            updates: Vec::new(),
            upvotes: BTreeSet::new(),
            pending_decision: None,
            version: 0,
        }
    }

    /// Append an audit entry and return a copy of it
    pub fn append_update(&mut self, description: impl Into<String>, at: DateTime<Utc>) -> Update {
        let update = Update::new(self.id, description, at);
        self.updates.push(update.clone());
        self.updated_at = at;
        update
    }

    /// Resolved and still waiting for the reporter to confirm or reject
    pub fn is_awaiting_decision(&self) -> bool {
        self.status == IssueStatus::Resolved && self.pending_decision.is_some()
    }

    pub fn is_assigned_to(&self, authority_id: AuthorityId) -> bool {
        self.assignment
            .as_ref()
            .is_some_and(|a| a.assigned_to_id == authority_id)
    }

    pub fn department_name(&self) -> Option<&str> {
        self.assignment.as_ref().map(|a| a.department_name.as_str())
    }

    pub fn upvote_count(&self) -> usize {
        self.upvotes.len()
    }

    pub fn has_upvote_from(&self, citizen_id: CitizenId) -> bool {
        self.upvotes.contains(&citizen_id)
    }

    /// Case-insensitive substring match over title, description and address
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let hit = |s: &str| s.to_lowercase().contains(&needle);
        hit(&self.title) || hit(&self.description) || self.address.as_deref().is_some_and(hit)
    }

    /// [`Issue::matches_search`] extended to the department name
    pub fn matches_search_with_department(&self, needle: &str) -> bool {
        self.matches_search(needle)
            || self
                .department_name()
                .is_some_and(|d| d.to_lowercase().contains(&needle.trim().to_lowercase()))
    }
}

/// What happens to the pending decision as part of a change
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DecisionChange {
    #[default]
    Keep,
    Open(Notification),
    Consume(NotificationId),
}

/// Reputation adjustment applied in the same unit of work as an issue change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReputationDelta {
    pub citizen_id: CitizenId,
    pub delta: i64,
}

/// A planned mutation of one issue, applied atomically by the store
///
/// `issue` is the complete desired state; the store applies it only when the
/// stored version still equals `expected_version`.
#[derive(Debug, Clone)]
pub struct IssueChange {
    pub issue: Issue,
    pub expected_version: i64,
    pub appended_update: Option<Update>,
    pub decision: DecisionChange,
    pub reputation: Option<ReputationDelta>,
}

impl IssueChange {
    /// Start a change from the state that was read
    pub fn from_snapshot(current: &Issue) -> Self {
        Self {
            issue: current.clone(),
            expected_version: current.version,
            appended_update: None,
            decision: DecisionChange::Keep,
            reputation: None,
        }
    }

    /// Append an audit entry to the planned state
    pub fn append_update(&mut self, description: impl Into<String>, at: DateTime<Utc>) {
        let update = self.issue.append_update(description, at);
        self.appended_update = Some(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue() -> Issue {
        Issue::new(NewIssue {
            title: "Broken streetlight".into(),
            description: "Pole 14 is dark".into(),
            address: Some("MG Road".into()),
            location: Coordinate::new(12.97, 77.59).unwrap(),
            office_id: OfficeId::new(),
            reporter_id: CitizenId::new(),
            is_anonymous: false,
            priority: Priority::Normal,
            image_url: None,
            audio_url: None,
        })
    }

    #[test]
    fn test_new_issue_is_under_review() {
        let issue = issue();
        assert_eq!(issue.status, IssueStatus::UnderReview);
        assert!(issue.assignment.is_none());
        assert_eq!(issue.version, 0);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let issue = issue();
        assert!(issue.matches_search("STREETLIGHT"));
        assert!(issue.matches_search("mg road"));
        assert!(issue.matches_search(""));
        assert!(!issue.matches_search("pothole"));
    }

    #[test]
    fn test_priority_from_label() {
        assert_eq!(Priority::from_label("SEVERE\n"), Some(Priority::Severe));
        assert_eq!(
            Priority::from_label("output = urgent."),
            Some(Priority::Urgent)
        );
        assert_eq!(Priority::from_label("no idea"), None);
    }

    #[test]
    fn test_change_records_appended_update() {
        let current = issue();
        let mut change = IssueChange::from_snapshot(&current);
        change.append_update("Forwarded to health", Utc::now());
        assert_eq!(change.issue.updates.len(), 1);
        assert_eq!(change.appended_update.as_ref().unwrap().issue_id, current.id);
        assert_eq!(change.expected_version, 0);
    }
}
