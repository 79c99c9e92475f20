//! Issue lifecycle state machine.
//!
//! Every mutation is read, planned against the snapshot, then handed to
//! [`IssueStore::commit`] with the version that was read. Planning is pure and
//! produces both the change and the event to dispatch once it is committed.

use crate::ports::IssueStore;
use crate::ApplicationResult;
use chrono::{DateTime, Utc};
use civic_issues_domain::errors::{AuthorizationError, ConflictError, NotFoundError};
use civic_issues_domain::{
    AppResult, Assignment, Authority, CitizenId, DecisionChange, Fault, Issue, IssueChange,
    IssueEvent, IssueId, IssueStatus, Notification, NotificationId, Office, ReputationDelta,
    CITIZEN_FAULT_PENALTY,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A planned change together with the event announcing it
#[derive(Debug, Clone)]
pub struct Transition {
    pub change: IssueChange,
    pub event: IssueEvent,
}

fn ensure_representative_of(issue: &Issue, actor: &Authority, action: &str) -> AppResult<()> {
    if !actor.is_representative() {
        return Err(AuthorizationError::NotRepresentative {
            action: action.to_string(),
        }
        .into());
    }
    if !actor.belongs_to(issue.office_id) {
        return Err(AuthorizationError::OfficeMismatch { issue_id: issue.id }.into());
    }
    Ok(())
}

fn ensure_transition(issue: &Issue, to: IssueStatus) -> AppResult<()> {
    if issue.status.can_transition_to(to) {
        Ok(())
    } else {
        Err(ConflictError::InvalidStatusTransition {
            from: issue.status,
            to,
        }
        .into())
    }
}

/// The pending decision addressed to `citizen_id`, if it is `notification_id`
fn pending_decision<'a>(
    issue: &'a Issue,
    citizen_id: CitizenId,
    notification_id: NotificationId,
) -> AppResult<&'a Notification> {
    if issue.reporter_id != citizen_id {
        return Err(AuthorizationError::NotIssueOwner { issue_id: issue.id }.into());
    }
    let pending = issue
        .pending_decision
        .as_ref()
        .filter(|_| issue.is_awaiting_decision())
        .ok_or(ConflictError::NotAwaitingDecision(issue.id))?;
    if pending.id != notification_id {
        return Err(NotFoundError::Notification(notification_id).into());
    }
    Ok(pending)
}

/// Forward an issue under review to the office employee holding `role`
pub fn plan_forward(
    issue: &Issue,
    actor: &Authority,
    office: &Office,
    department: &str,
    role: &str,
    now: DateTime<Utc>,
) -> AppResult<Transition> {
    ensure_representative_of(issue, actor, "forward issues")?;
    if issue.status != IssueStatus::UnderReview {
        return Err(ConflictError::InvalidStatusTransition {
            from: issue.status,
            to: IssueStatus::Forwarded,
        }
        .into());
    }
    ensure_transition(issue, IssueStatus::Forwarded)?;

    let assignee = office
        .employee_with_role(role)
        .ok_or_else(|| NotFoundError::Employee {
            office_id: office.id,
            role: role.trim().to_string(),
        })?;
    let department = department.trim().to_string();

    let mut change = IssueChange::from_snapshot(issue);
    change.issue.status = IssueStatus::Forwarded;
    change.issue.assignment = Some(Assignment {
        assigned_to_id: assignee.id,
        department_name: department.clone(),
        assigned_at: now,
    });
    change.append_update(format!("Forwarded to {}", department), now);

    let event = IssueEvent::IssueForwarded {
        issue_id: issue.id,
        office_id: issue.office_id,
        reporter_id: issue.reporter_id,
        assigned_to_id: assignee.id,
        department_name: department,
    };
    Ok(Transition { change, event })
}

/// Record progress or resolve; resolving opens the reporter's pending decision
pub fn plan_status_update(
    issue: &Issue,
    actor: &Authority,
    new_status: IssueStatus,
    description: &str,
    now: DateTime<Utc>,
) -> AppResult<Transition> {
    if !actor.belongs_to(issue.office_id) {
        return Err(AuthorizationError::OfficeMismatch { issue_id: issue.id }.into());
    }
    if !issue.status.accepts_status_updates() {
        return Err(ConflictError::InvalidStatusTransition {
            from: issue.status,
            to: new_status,
        }
        .into());
    }
    ensure_transition(issue, new_status)?;
    debug!(authority_id = %actor.id, from = %issue.status, to = %new_status, "Planning status update");

    let description = description.trim().to_string();
    let mut change = IssueChange::from_snapshot(issue);
    change.issue.status = new_status;
    change.append_update(description.clone(), now);

    let event = if new_status == IssueStatus::Resolved {
        let notification = Notification {
            id: NotificationId::new(),
            issue_id: issue.id,
            citizen_id: issue.reporter_id,
            title: format!("Issue {} has been resolved", issue.title),
            description: description.clone(),
            created_at: now,
        };
        change.issue.resolved_at = Some(now);
        change.issue.pending_decision = Some(notification.clone());
        change.decision = DecisionChange::Open(notification.clone());

        IssueEvent::IssueResolved {
            issue_id: issue.id,
            office_id: issue.office_id,
            reporter_id: issue.reporter_id,
            notification_id: notification.id,
            title: notification.title,
            message: description,
        }
    } else {
        IssueEvent::StatusChanged {
            issue_id: issue.id,
            office_id: issue.office_id,
            reporter_id: issue.reporter_id,
            old_status: issue.status,
            new_status,
            description,
        }
    };

    Ok(Transition { change, event })
}

/// Reporter accepts the resolution
pub fn plan_confirmation(
    issue: &Issue,
    citizen_id: CitizenId,
    notification_id: NotificationId,
    now: DateTime<Utc>,
) -> AppResult<Transition> {
    let pending = pending_decision(issue, citizen_id, notification_id)?;

    let mut change = IssueChange::from_snapshot(issue);
    change.issue.resolution_confirmed = true;
    change.issue.dispute = false;
    change.issue.pending_decision = None;
    change.issue.updated_at = now;
    change.decision = DecisionChange::Consume(pending.id);

    let event = IssueEvent::ResolutionConfirmed {
        issue_id: issue.id,
        office_id: issue.office_id,
        reporter_id: issue.reporter_id,
    };
    Ok(Transition { change, event })
}

/// Reporter disputes the resolution
pub fn plan_rejection(
    issue: &Issue,
    citizen_id: CitizenId,
    notification_id: NotificationId,
    message: String,
    now: DateTime<Utc>,
) -> AppResult<Transition> {
    let pending = pending_decision(issue, citizen_id, notification_id)?;

    let mut change = IssueChange::from_snapshot(issue);
    change.issue.resolution_confirmed = false;
    change.issue.dispute = true;
    change.issue.dispute_message = Some(message.clone());
    change.issue.conflict_resolved_at = Some(now);
    change.issue.pending_decision = None;
    change.issue.updated_at = now;
    change.decision = DecisionChange::Consume(pending.id);

    let event = IssueEvent::ResolutionDisputed {
        issue_id: issue.id,
        office_id: issue.office_id,
        reporter_id: issue.reporter_id,
        message,
    };
    Ok(Transition { change, event })
}

/// Representative settles a dispute; a citizen fault costs the reporter reputation
pub fn plan_fault_ruling(
    issue: &Issue,
    actor: &Authority,
    fault: Fault,
    now: DateTime<Utc>,
) -> AppResult<Transition> {
    ensure_representative_of(issue, actor, "rule on disputes")?;
    if !issue.dispute {
        return Err(ConflictError::NotDisputed(issue.id).into());
    }

    let reputation_delta = match fault {
        Fault::Citizen => -CITIZEN_FAULT_PENALTY,
        Fault::Authority => 0,
    };

    let mut change = IssueChange::from_snapshot(issue);
    change.issue.dispute = false;
    change.issue.fault = Some(fault);
    change.issue.conflict_resolved_at = Some(now);
    change.issue.updated_at = now;
    if reputation_delta != 0 {
        change.reputation = Some(ReputationDelta {
            citizen_id: issue.reporter_id,
            delta: reputation_delta,
        });
    }

    let event = IssueEvent::DisputeRuled {
        issue_id: issue.id,
        office_id: issue.office_id,
        reporter_id: issue.reporter_id,
        fault,
        reputation_delta,
    };
    Ok(Transition { change, event })
}

/// Applies planned transitions through the store
#[derive(Clone)]
pub struct LifecycleEngine {
    store: Arc<dyn IssueStore>,
}

impl LifecycleEngine {
    pub fn new(store: Arc<dyn IssueStore>) -> Self {
        Self { store }
    }

    async fn load(&self, issue_id: IssueId) -> ApplicationResult<Issue> {
        self.store
            .get_issue(issue_id)
            .await?
            .ok_or_else(|| NotFoundError::Issue(issue_id).into())
    }

    async fn apply(&self, transition: Transition) -> ApplicationResult<(Issue, IssueEvent)> {
        let issue = self.store.commit(transition.change).await?;
        info!(
            issue_id = %issue.id,
            status = %issue.status,
            version = issue.version,
            topic = transition.event.topic(),
            "Issue transition committed"
        );
        Ok((issue, transition.event))
    }

    #[instrument(skip(self, actor), fields(authority_id = %actor.id))]
    pub async fn forward(
        &self,
        issue_id: IssueId,
        actor: &Authority,
        department: &str,
        role: &str,
    ) -> ApplicationResult<(Issue, IssueEvent)> {
        let issue = self.load(issue_id).await?;
        let office = self
            .store
            .get_office(issue.office_id)
            .await?
            .ok_or(NotFoundError::Office(issue.office_id))?;
        let transition = plan_forward(&issue, actor, &office, department, role, Utc::now())?;
        self.apply(transition).await
    }

    #[instrument(skip(self, actor, description), fields(authority_id = %actor.id))]
    pub async fn update_status(
        &self,
        issue_id: IssueId,
        actor: &Authority,
        new_status: IssueStatus,
        description: &str,
    ) -> ApplicationResult<(Issue, IssueEvent)> {
        let issue = self.load(issue_id).await?;
        let transition = plan_status_update(&issue, actor, new_status, description, Utc::now())?;
        self.apply(transition).await
    }

    #[instrument(skip(self))]
    pub async fn confirm_resolution(
        &self,
        issue_id: IssueId,
        citizen_id: CitizenId,
        notification_id: NotificationId,
    ) -> ApplicationResult<(Issue, IssueEvent)> {
        let issue = self.load(issue_id).await?;
        let transition = plan_confirmation(&issue, citizen_id, notification_id, Utc::now())?;
        self.apply(transition).await
    }

    #[instrument(skip(self, message))]
    pub async fn reject_resolution(
        &self,
        issue_id: IssueId,
        citizen_id: CitizenId,
        notification_id: NotificationId,
        message: String,
    ) -> ApplicationResult<(Issue, IssueEvent)> {
        let issue = self.load(issue_id).await?;
        let transition = plan_rejection(&issue, citizen_id, notification_id, message, Utc::now())?;
        self.apply(transition).await
    }

    #[instrument(skip(self, actor), fields(authority_id = %actor.id))]
    pub async fn rule_on_dispute(
        &self,
        issue_id: IssueId,
        actor: &Authority,
        fault: Fault,
    ) -> ApplicationResult<(Issue, IssueEvent)> {
        let issue = self.load(issue_id).await?;
        let transition = plan_fault_ruling(&issue, actor, fault, Utc::now())?;
        self.apply(transition).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_issues_domain::{AppError, AuthorityId, Coordinate, NewIssue, OfficeId, Priority};

    struct Scene {
        office: Office,
        representative: Authority,
        engineer: Authority,
        issue: Issue,
    }

    fn authority(office_id: OfficeId, role: &str) -> Authority {
        Authority {
            id: AuthorityId::new(),
            name: role.to_string(),
            email: "staff@ward7.gov.in".to_string(),
            office_id,
            role: role.to_string(),
            department_name: None,
            created_at: Utc::now(),
        }
    }

    fn scene() -> Scene {
        let mut office = Office::new("Ward 7", Coordinate::new(0.0, 0.0).unwrap());
        let representative = authority(office.id, "Representative authority");
        let engineer = authority(office.id, "Road Engineer");
        office.employees = vec![representative.clone(), engineer.clone()];
        let issue = Issue::new(NewIssue {
            title: "Pothole".to_string(),
            description: "Deep pothole at the junction".to_string(),
            address: None,
            location: Coordinate::new(0.001, 0.001).unwrap(),
            office_id: office.id,
            reporter_id: CitizenId::new(),
            is_anonymous: false,
            priority: Priority::Normal,
            image_url: None,
            audio_url: None,
        });
        Scene {
            office,
            representative,
            engineer,
            issue,
        }
    }

    fn resolved(scene: &Scene) -> Issue {
        let now = Utc::now();
        let forwarded = plan_forward(
            &scene.issue,
            &scene.representative,
            &scene.office,
            "engineering",
            "road engineer",
            now,
        )
        .unwrap()
        .change
        .issue;
        plan_status_update(&forwarded, &scene.engineer, IssueStatus::Resolved, "Patched", now)
            .unwrap()
            .change
            .issue
    }

    #[test]
    fn test_forward_sets_assignment_and_update() {
        let scene = scene();
        let t = plan_forward(
            &scene.issue,
            &scene.representative,
            &scene.office,
            " engineering ",
            "Road Engineer",
            Utc::now(),
        )
        .unwrap();

        let issue = &t.change.issue;
        assert_eq!(issue.status, IssueStatus::Forwarded);
        let assignment = issue.assignment.as_ref().unwrap();
        assert_eq!(assignment.assigned_to_id, scene.engineer.id);
        assert_eq!(assignment.department_name, "engineering");
        assert_eq!(issue.updates.last().unwrap().description, "Forwarded to engineering");
        assert_eq!(t.change.expected_version, scene.issue.version);
    }

    #[test]
    fn test_forward_requires_representative() {
        let scene = scene();
        let err = plan_forward(
            &scene.issue,
            &scene.engineer,
            &scene.office,
            "engineering",
            "Road Engineer",
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Authorization(AuthorizationError::NotRepresentative { .. })
        ));
    }

    #[test]
    fn test_forward_unknown_role() {
        let scene = scene();
        let err = plan_forward(
            &scene.issue,
            &scene.representative,
            &scene.office,
            "health",
            "Surgeon",
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(NotFoundError::Employee { .. })));
    }

    #[test]
    fn test_status_update_rejected_before_forward() {
        let scene = scene();
        let err = plan_status_update(
            &scene.issue,
            &scene.engineer,
            IssueStatus::InProgress,
            "Started",
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Conflict(ConflictError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_resolution_opens_decision() {
        let scene = scene();
        let issue = resolved(&scene);
        assert_eq!(issue.status, IssueStatus::Resolved);
        assert!(issue.resolved_at.is_some());
        let pending = issue.pending_decision.as_ref().unwrap();
        assert_eq!(pending.title, "Issue Pothole has been resolved");
        assert_eq!(pending.citizen_id, issue.reporter_id);
    }

    #[test]
    fn test_confirmation_consumes_decision() {
        let scene = scene();
        let issue = resolved(&scene);
        let notification_id = issue.pending_decision.as_ref().unwrap().id;

        let t = plan_confirmation(&issue, issue.reporter_id, notification_id, Utc::now()).unwrap();
        assert!(t.change.issue.resolution_confirmed);
        assert!(!t.change.issue.dispute);
        assert!(t.change.issue.pending_decision.is_none());
        assert_eq!(t.change.decision, DecisionChange::Consume(notification_id));
    }

    #[test]
    fn test_confirmation_by_other_citizen() {
        let scene = scene();
        let issue = resolved(&scene);
        let notification_id = issue.pending_decision.as_ref().unwrap().id;
        let err = plan_confirmation(&issue, CitizenId::new(), notification_id, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Authorization(AuthorizationError::NotIssueOwner { .. })
        ));
    }

    #[test]
    fn test_rejection_then_citizen_fault() {
        let scene = scene();
        let issue = resolved(&scene);
        let notification_id = issue.pending_decision.as_ref().unwrap().id;

        let disputed = plan_rejection(
            &issue,
            issue.reporter_id,
            notification_id,
            "Still broken".to_string(),
            Utc::now(),
        )
        .unwrap()
        .change
        .issue;
        assert!(disputed.dispute);
        assert_eq!(disputed.dispute_message.as_deref(), Some("Still broken"));

        let t = plan_fault_ruling(&disputed, &scene.representative, Fault::Citizen, Utc::now())
            .unwrap();
        assert!(!t.change.issue.dispute);
        assert_eq!(t.change.issue.fault, Some(Fault::Citizen));
        assert_eq!(
            t.change.reputation,
            Some(ReputationDelta {
                citizen_id: issue.reporter_id,
                delta: -10
            })
        );
    }

    #[test]
    fn test_authority_fault_has_no_penalty() {
        let scene = scene();
        let mut issue = resolved(&scene);
        issue.dispute = true;
        let t = plan_fault_ruling(&issue, &scene.representative, Fault::Authority, Utc::now())
            .unwrap();
        assert!(t.change.reputation.is_none());
        assert!(t.change.issue.conflict_resolved_at.is_some());
    }

    #[test]
    fn test_ruling_requires_dispute() {
        let scene = scene();
        let issue = resolved(&scene);
        let err = plan_fault_ruling(&issue, &scene.representative, Fault::Citizen, Utc::now())
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ConflictError::NotDisputed(_))));
    }
}
