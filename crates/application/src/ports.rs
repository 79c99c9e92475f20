//! Ports: the capabilities the application layer consumes.
//!
//! Persistence, blob storage, messaging egress and the priority classifier are
//! injected as trait objects built once at process start.

use crate::ApplicationResult;
use async_trait::async_trait;
use bytes::Bytes;
use civic_issues_common::{DateRange, PaginatedResult, PaginationParams};
use civic_issues_domain::errors::IntegrationError;
use civic_issues_domain::{
    Authority, AuthorityId, BoundingBox, Citizen, CitizenId, Issue, IssueChange, IssueEvent,
    IssueId, Notification, Office, OfficeId, Priority,
};
use tracing::{debug, info};

/// Which assignment state a listing selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignmentState {
    #[default]
    Any,
    Unassigned,
    Assigned,
}

/// Filter over stored issues; listings are ordered newest first
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub office_id: Option<OfficeId>,
    pub assigned_to: Option<AuthorityId>,
    pub assignment: AssignmentState,
    pub disputed: Option<bool>,
    pub search: Option<String>,
    /// Also match the search term against the department name
    pub search_department: bool,
}

impl IssueFilter {
    pub fn for_office(office_id: OfficeId) -> Self {
        Self {
            office_id: Some(office_id),
            ..Self::default()
        }
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    /// Reference predicate; every store must select exactly these issues.
    pub fn matches(&self, issue: &Issue) -> bool {
        if self.office_id.is_some_and(|id| id != issue.office_id) {
            return false;
        }
        if let Some(authority) = self.assigned_to {
            if !issue.is_assigned_to(authority) {
                return false;
            }
        }
        match self.assignment {
            AssignmentState::Any => {}
            AssignmentState::Unassigned if issue.assignment.is_some() => return false,
            AssignmentState::Assigned if issue.assignment.is_none() => return false,
            _ => {}
        }
        if self.disputed.is_some_and(|d| d != issue.dispute) {
            return false;
        }
        match &self.search {
            Some(term) if self.search_department => issue.matches_search_with_department(term),
            Some(term) => issue.matches_search(term),
            None => true,
        }
    }
}

/// Durable storage for offices, principals, issues and their records
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Insert an office; duplicate names are a conflict
    async fn insert_office(&self, office: &Office) -> ApplicationResult<()>;

    async fn list_offices(&self) -> ApplicationResult<Vec<Office>>;

    async fn get_office(&self, id: OfficeId) -> ApplicationResult<Option<Office>>;

    /// Insert an authority into its office; a role already held there is a conflict
    async fn insert_authority(&self, authority: &Authority) -> ApplicationResult<()>;

    async fn get_authority(&self, id: AuthorityId) -> ApplicationResult<Option<Authority>>;

    async fn insert_citizen(&self, citizen: &Citizen) -> ApplicationResult<()>;

    async fn get_citizen(&self, id: CitizenId) -> ApplicationResult<Option<Citizen>>;

    async fn insert_issue(&self, issue: &Issue) -> ApplicationResult<()>;

    /// Issue with its updates, upvotes and pending decision
    async fn get_issue(&self, id: IssueId) -> ApplicationResult<Option<Issue>>;

    /// Unresolved issues whose location lies inside the box
    async fn open_issues_in_bounds(&self, bounds: &BoundingBox) -> ApplicationResult<Vec<Issue>>;

    /// One page of matching issues, newest first; the total uses the same filter
    async fn list_issues(
        &self,
        filter: &IssueFilter,
        page: &PaginationParams,
    ) -> ApplicationResult<PaginatedResult<Issue>>;

    /// Matching issues created inside the window, newest first
    async fn issues_created_between(
        &self,
        filter: &IssueFilter,
        range: &DateRange,
    ) -> ApplicationResult<Vec<Issue>>;

    /// Pending resolution decisions addressed to a citizen
    async fn pending_decisions(&self, citizen_id: CitizenId) -> ApplicationResult<Vec<Notification>>;

    /// Apply a planned change atomically. Fails with a concurrent-modification
    /// conflict when the stored version differs from `expected_version`.
    async fn commit(&self, change: IssueChange) -> ApplicationResult<Issue>;

    /// Add an upvote; `false` when the citizen had already voted
    async fn add_upvote(&self, issue_id: IssueId, citizen_id: CitizenId) -> ApplicationResult<bool>;

    /// Remove an upvote; `false` when the citizen had not voted
    async fn remove_upvote(
        &self,
        issue_id: IssueId,
        citizen_id: CitizenId,
    ) -> ApplicationResult<bool>;

    async fn health_check(&self) -> ApplicationResult<()> {
        Ok(())
    }
}

/// Blob storage for attachments
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store the bytes under `folder` and return a URL for them
    async fn store(
        &self,
        bytes: Bytes,
        folder: &str,
        file_name: &str,
        content_type: &str,
    ) -> Result<String, IntegrationError>;
}

/// Fire-and-forget delivery of status-change events
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, event: &IssueEvent) -> Result<(), IntegrationError>;
}

/// Best-effort severity classifier
#[async_trait]
pub trait PriorityAdvisor: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Priority, IntegrationError>;
}

/// Dispatcher that only logs, for deployments without messaging
pub struct NoOpDispatcher;

#[async_trait]
impl NotificationDispatcher for NoOpDispatcher {
    async fn dispatch(&self, event: &IssueEvent) -> Result<(), IntegrationError> {
        debug!(topic = event.topic(), issue_id = %event.issue_id(), "Notification not delivered: no dispatcher configured");
        Ok(())
    }
}

/// Advisor that always answers the same label
pub struct FixedPriorityAdvisor(pub Priority);

impl Default for FixedPriorityAdvisor {
    fn default() -> Self {
        Self(Priority::Normal)
    }
}

#[async_trait]
impl PriorityAdvisor for FixedPriorityAdvisor {
    async fn classify(&self, _text: &str) -> Result<Priority, IntegrationError> {
        Ok(self.0)
    }
}

/// Blob storage that refuses every upload
pub struct DisabledBlobStorage;

#[async_trait]
impl BlobStorage for DisabledBlobStorage {
    async fn store(
        &self,
        _bytes: Bytes,
        folder: &str,
        file_name: &str,
        _content_type: &str,
    ) -> Result<String, IntegrationError> {
        info!(folder, file_name, "Rejecting upload: blob storage disabled");
        Err(IntegrationError::UploadFailed(
            "blob storage is not configured".to_string(),
        ))
    }
}
