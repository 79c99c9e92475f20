//! Domain events emitted after issue state changes are committed.

use crate::identifiers::{AuthorityId, CitizenId, IssueId, NotificationId, OfficeId};
use crate::issue::{Fault, IssueStatus, Priority};
use serde::{Deserialize, Serialize};

/// Status-change events delivered through the notification dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueEvent {
    IssueCreated {
        issue_id: IssueId,
        office_id: OfficeId,
        reporter_id: CitizenId,
        priority: Priority,
    },
    IssueForwarded {
        issue_id: IssueId,
        office_id: OfficeId,
        reporter_id: CitizenId,
        assigned_to_id: AuthorityId,
        department_name: String,
    },
    StatusChanged {
        issue_id: IssueId,
        office_id: OfficeId,
        reporter_id: CitizenId,
        old_status: IssueStatus,
        new_status: IssueStatus,
        description: String,
    },
    IssueResolved {
        issue_id: IssueId,
        office_id: OfficeId,
        reporter_id: CitizenId,
        notification_id: NotificationId,
        title: String,
        message: String,
    },
    ResolutionConfirmed {
        issue_id: IssueId,
        office_id: OfficeId,
        reporter_id: CitizenId,
    },
    ResolutionDisputed {
        issue_id: IssueId,
        office_id: OfficeId,
        reporter_id: CitizenId,
        message: String,
    },
    DisputeRuled {
        issue_id: IssueId,
        office_id: OfficeId,
        reporter_id: CitizenId,
        fault: Fault,
        reputation_delta: i64,
    },
}

impl IssueEvent {
    /// Messaging topic for this event
    pub fn topic(&self) -> &'static str {
        match self {
            Self::IssueCreated { .. } => "issue.created",
            Self::IssueForwarded { .. } => "issue.forwarded",
            Self::StatusChanged { .. } => "issue.status_changed",
            Self::IssueResolved { .. } => "issue.resolved",
            Self::ResolutionConfirmed { .. } => "issue.resolution_confirmed",
            Self::ResolutionDisputed { .. } => "issue.disputed",
            Self::DisputeRuled { .. } => "issue.dispute_ruled",
        }
    }

    pub fn issue_id(&self) -> IssueId {
        match self {
            Self::IssueCreated { issue_id, .. }
            | Self::IssueForwarded { issue_id, .. }
            | Self::StatusChanged { issue_id, .. }
            | Self::IssueResolved { issue_id, .. }
            | Self::ResolutionConfirmed { issue_id, .. }
            | Self::ResolutionDisputed { issue_id, .. }
            | Self::DisputeRuled { issue_id, .. } => *issue_id,
        }
    }

    /// Citizen the event concerns
    pub fn recipient(&self) -> CitizenId {
        match self {
            Self::IssueCreated { reporter_id, .. }
            | Self::IssueForwarded { reporter_id, .. }
            | Self::StatusChanged { reporter_id, .. }
            | Self::IssueResolved { reporter_id, .. }
            | Self::ResolutionConfirmed { reporter_id, .. }
            | Self::ResolutionDisputed { reporter_id, .. }
            | Self::DisputeRuled { reporter_id, .. } => *reporter_id,
        }
    }
}
