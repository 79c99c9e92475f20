//! In-memory [`IssueStore`] for development and tests.
//!
//! All state sits behind one `RwLock`; every mutation, including the version
//! check of `commit` and the vote test-and-set, runs under the write lock.

use crate::ports::{IssueFilter, IssueStore};
use crate::ApplicationResult;
use async_trait::async_trait;
use civic_issues_common::{DateRange, PaginatedResult, PaginationParams};
use civic_issues_domain::errors::{ConflictError, NotFoundError};
use civic_issues_domain::{
    Authority, AuthorityId, BoundingBox, Citizen, CitizenId, DecisionChange, Issue, IssueChange,
    IssueId, IssueStatus, Notification, Office, OfficeId,
};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
struct State {
    offices: HashMap<OfficeId, Office>,
    authorities: HashMap<AuthorityId, Authority>,
    citizens: HashMap<CitizenId, Citizen>,
    issues: HashMap<IssueId, Issue>,
}

impl State {
    fn matching(&self, filter: &IssueFilter) -> Vec<Issue> {
        let mut issues: Vec<Issue> = self
            .issues
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        issues.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        issues
    }
}

/// Process-local store
#[derive(Default)]
pub struct InMemoryIssueStore {
    state: RwLock<State>,
}

impl InMemoryIssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored issues
    pub fn issue_count(&self) -> usize {
        self.state.read().issues.len()
    }
}

#[async_trait]
impl IssueStore for InMemoryIssueStore {
    async fn insert_office(&self, office: &Office) -> ApplicationResult<()> {
        let mut state = self.state.write();
        let name = office.name.trim();
        if state
            .offices
            .values()
            .any(|o| o.name.trim().eq_ignore_ascii_case(name))
        {
            return Err(ConflictError::DuplicateOffice(office.name.clone()).into());
        }
        if state.offices.contains_key(&office.id) {
            return Err(ConflictError::DuplicateId(office.id.to_string()).into());
        }
        let mut stored = office.clone();
        stored.name = name.to_string();
        stored.employees.clear();
        state.offices.insert(office.id, stored);
        Ok(())
    }

    async fn list_offices(&self) -> ApplicationResult<Vec<Office>> {
        let mut offices: Vec<Office> = self.state.read().offices.values().cloned().collect();
        offices.sort_by_key(|o| o.id);
        Ok(offices)
    }

    async fn get_office(&self, id: OfficeId) -> ApplicationResult<Option<Office>> {
        Ok(self.state.read().offices.get(&id).cloned())
    }

    async fn insert_authority(&self, authority: &Authority) -> ApplicationResult<()> {
        let mut state = self.state.write();
        if state.authorities.contains_key(&authority.id) {
            return Err(ConflictError::DuplicateId(authority.id.to_string()).into());
        }
        let office = state
            .offices
            .get_mut(&authority.office_id)
            .ok_or(NotFoundError::Office(authority.office_id))?;
        if office.employee_with_role(&authority.role).is_some() {
            return Err(ConflictError::DuplicateRole {
                office_id: authority.office_id,
                role: authority.role.clone(),
            }
            .into());
        }
        office.employees.push(authority.clone());
        state.authorities.insert(authority.id, authority.clone());
        Ok(())
    }

    async fn get_authority(&self, id: AuthorityId) -> ApplicationResult<Option<Authority>> {
        Ok(self.state.read().authorities.get(&id).cloned())
    }

    async fn insert_citizen(&self, citizen: &Citizen) -> ApplicationResult<()> {
        let mut state = self.state.write();
        if state.citizens.contains_key(&citizen.id) {
            return Err(ConflictError::DuplicateId(citizen.id.to_string()).into());
        }
        state.citizens.insert(citizen.id, citizen.clone());
        Ok(())
    }

    async fn get_citizen(&self, id: CitizenId) -> ApplicationResult<Option<Citizen>> {
        Ok(self.state.read().citizens.get(&id).cloned())
    }

    async fn insert_issue(&self, issue: &Issue) -> ApplicationResult<()> {
        let mut state = self.state.write();
        if state.issues.contains_key(&issue.id) {
            return Err(ConflictError::DuplicateId(issue.id.to_string()).into());
        }
        state.issues.insert(issue.id, issue.clone());
        Ok(())
    }

    async fn get_issue(&self, id: IssueId) -> ApplicationResult<Option<Issue>> {
        Ok(self.state.read().issues.get(&id).cloned())
    }

    async fn open_issues_in_bounds(&self, bounds: &BoundingBox) -> ApplicationResult<Vec<Issue>> {
        Ok(self
            .state
            .read()
            .issues
            .values()
            .filter(|i| i.status != IssueStatus::Resolved && bounds.contains(&i.location))
            .cloned()
            .collect())
    }

    async fn list_issues(
        &self,
        filter: &IssueFilter,
        page: &PaginationParams,
    ) -> ApplicationResult<PaginatedResult<Issue>> {
        Ok(page.slice(self.state.read().matching(filter)))
    }

    async fn issues_created_between(
        &self,
        filter: &IssueFilter,
        range: &DateRange,
    ) -> ApplicationResult<Vec<Issue>> {
        Ok(self
            .state
            .read()
            .matching(filter)
            .into_iter()
            .filter(|i| range.contains(&i.created_at))
            .collect())
    }

    async fn pending_decisions(&self, citizen_id: CitizenId) -> ApplicationResult<Vec<Notification>> {
        let mut pending: Vec<Notification> = self
            .state
            .read()
            .issues
            .values()
            .filter_map(|i| i.pending_decision.clone())
            .filter(|n| n.citizen_id == citizen_id)
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pending)
    }

    async fn commit(&self, change: IssueChange) -> ApplicationResult<Issue> {
        let mut state = self.state.write();
        let issue_id = change.issue.id;

        let stored = state
            .issues
            .get(&issue_id)
            .ok_or(NotFoundError::Issue(issue_id))?;
        if stored.version != change.expected_version {
            return Err(ConflictError::ConcurrentModification(issue_id).into());
        }
        if let DecisionChange::Consume(notification_id) = change.decision {
            if stored.pending_decision.as_ref().map(|n| n.id) != Some(notification_id) {
                return Err(NotFoundError::Notification(notification_id).into());
            }
        }

        // Votes are not part of the lifecycle snapshot.
        let upvotes = stored.upvotes.clone();

        if let Some(delta) = change.reputation {
            let citizen = state
                .citizens
                .get_mut(&delta.citizen_id)
                .ok_or(NotFoundError::Citizen(delta.citizen_id))?;
            citizen.reputation_points += delta.delta;
        }

        let mut next = change.issue;
        next.upvotes = upvotes;
        next.version = change.expected_version + 1;
        match change.decision {
            DecisionChange::Keep => {}
            DecisionChange::Open(notification) => next.pending_decision = Some(notification),
            DecisionChange::Consume(_) => next.pending_decision = None,
        }

        state.issues.insert(issue_id, next.clone());
        Ok(next)
    }

    async fn add_upvote(&self, issue_id: IssueId, citizen_id: CitizenId) -> ApplicationResult<bool> {
        let mut state = self.state.write();
        let issue = state
            .issues
            .get_mut(&issue_id)
            .ok_or(NotFoundError::Issue(issue_id))?;
        Ok(issue.upvotes.insert(citizen_id))
    }

    async fn remove_upvote(
        &self,
        issue_id: IssueId,
        citizen_id: CitizenId,
    ) -> ApplicationResult<bool> {
        let mut state = self.state.write();
        let issue = state
            .issues
            .get_mut(&issue_id)
            .ok_or(NotFoundError::Issue(issue_id))?;
        Ok(issue.upvotes.remove(&citizen_id))
    }
}
