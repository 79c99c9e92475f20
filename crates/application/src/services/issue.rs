//! Issue Service
//!
//! Public issue operations: placement, nearby search, office listings, the
//! lifecycle transitions, upvotes, analytics and reports.

use super::{resolve_authority, resolve_representative, Principal, ServiceConfig, ServiceContext};
use crate::dto::{
    AnalyticsView, IssueDetail, IssueReport, IssueSummary, MonthlyReport, NearbyIssue,
    NotificationDto, VoteSummary,
};
use crate::geo_index::GeoIndex;
use crate::lifecycle::LifecycleEngine;
use crate::ports::{
    AssignmentState, BlobStorage, IssueFilter, IssueStore, NotificationDispatcher,
    PriorityAdvisor,
};
use crate::reporting;
use crate::validation::{
    AnalyticsQuery, AttachmentSlot, CreateIssueRequest, ForwardIssueRequest, ListIssuesQuery,
    NearbyIssuesQuery, ResolutionDecisionRequest, UpdateIssueRequest, Validatable,
    ValidationRules,
};
use crate::ApplicationResult;
use chrono::Utc;
use civic_issues_common::{DateRange, PaginatedResult, PaginationParams};
use civic_issues_domain::errors::{AuthorizationError, ConflictError, NotFoundError};
use civic_issues_domain::{
    BoundingBox, Coordinate, Fault, Issue, IssueEvent, IssueId, NewIssue, Office, OfficeId,
    Priority,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Orchestrates issue operations over the injected ports
pub struct IssueService {
    store: Arc<dyn IssueStore>,
    storage: Arc<dyn BlobStorage>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    advisor: Arc<dyn PriorityAdvisor>,
    lifecycle: LifecycleEngine,
    config: ServiceConfig,
}

impl IssueService {
    pub fn new(
        store: Arc<dyn IssueStore>,
        storage: Arc<dyn BlobStorage>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        advisor: Arc<dyn PriorityAdvisor>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            lifecycle: LifecycleEngine::new(Arc::clone(&store)),
            store,
            storage,
            dispatcher,
            advisor,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Report a new issue; it is placed with the nearest office
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn create_issue(
        &self,
        ctx: &ServiceContext,
        request: CreateIssueRequest,
    ) -> ApplicationResult<IssueDetail> {
        let reporter_id = ctx.require_citizen("report issues")?;

        request.validate_all().ensure_valid()?;
        let location = Coordinate::new(request.latitude, request.longitude)?;
        for attachment in request.attachments() {
            attachment.validate(self.config.max_attachment_bytes)?;
        }

        self.store
            .get_citizen(reporter_id)
            .await?
            .ok_or(NotFoundError::Citizen(reporter_id))?;

        let offices = GeoIndex::new(self.store.list_offices().await?);
        let (office_id, distance) = {
            let nearest = offices.nearest_office(location)?;
            (nearest.item.id, nearest.distance_meters)
        };
        debug!(office_id = %office_id, distance_meters = distance, "Resolved owning office");

        let priority = self.classify_priority(&request.description).await;

        let mut image_url = None;
        let mut audio_url = None;
        for attachment in request.attachments() {
            let url = self
                .storage
                .store(
                    attachment.bytes.clone(),
                    attachment.slot.folder(),
                    &attachment.file_name,
                    &attachment.content_type,
                )
                .await?;
            match attachment.slot {
                AttachmentSlot::Image => image_url = Some(url),
                AttachmentSlot::Audio => audio_url = Some(url),
            }
        }

        let issue = Issue::new(NewIssue {
            title: request.title.trim().to_string(),
            description: request.description.trim().to_string(),
            address: request
                .address
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            location,
            office_id,
            reporter_id,
            is_anonymous: request.is_anonymous,
            priority,
            image_url,
            audio_url,
        });
        self.store.insert_issue(&issue).await?;

        info!(issue_id = %issue.id, office_id = %office_id, priority = %priority, "Issue created");

        self.dispatch(IssueEvent::IssueCreated {
            issue_id: issue.id,
            office_id,
            reporter_id,
            priority,
        });

        Ok(IssueDetail::new(&issue, Some(reporter_id)))
    }

    /// Unresolved issues around a point, nearest first
    #[instrument(skip(self, ctx, query), fields(correlation_id = %ctx.correlation_id))]
    pub async fn nearby_issues(
        &self,
        ctx: &ServiceContext,
        query: NearbyIssuesQuery,
    ) -> ApplicationResult<PaginatedResult<NearbyIssue>> {
        query.validate_all().ensure_valid()?;
        let center = Coordinate::new(query.latitude, query.longitude)?;
        let radius = query
            .radius_meters
            .unwrap_or(self.config.nearby_radius_meters);
        let page = PaginationParams::new(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(self.config.nearby_limit),
        );

        let candidates = self
            .store
            .open_issues_in_bounds(&BoundingBox::around(center, radius))
            .await?;
        let index = GeoIndex::new(candidates);
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let result = index
            .search_nearby(center, radius, search, &page)
            .map(|ranked| NearbyIssue {
                distance_in_meters: ranked.rounded_distance(),
                issue: IssueSummary::from(&ranked.item),
            });

        debug!(total = result.total, radius_meters = radius, "Nearby search");
        Ok(result)
    }

    /// Full read model of one issue
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn get_issue(
        &self,
        ctx: &ServiceContext,
        issue_id: IssueId,
    ) -> ApplicationResult<IssueDetail> {
        let issue = self.load_issue(issue_id).await?;
        Ok(IssueDetail::new(&issue, ctx.citizen_id()))
    }

    /// Unassigned issues of the representative's office
    #[instrument(skip(self, ctx, query), fields(correlation_id = %ctx.correlation_id))]
    pub async fn issues_by_office(
        &self,
        ctx: &ServiceContext,
        query: ListIssuesQuery,
    ) -> ApplicationResult<PaginatedResult<IssueSummary>> {
        let actor = resolve_representative(self.store.as_ref(), ctx, "list office issues").await?;
        let filter = IssueFilter {
            assignment: AssignmentState::Unassigned,
            ..IssueFilter::for_office(actor.office_id)
        }
        .with_search(query.search.clone());
        self.list(&filter, &query).await
    }

    /// Issues assigned to the acting authority
    #[instrument(skip(self, ctx, query), fields(correlation_id = %ctx.correlation_id))]
    pub async fn issues_by_authority(
        &self,
        ctx: &ServiceContext,
        query: ListIssuesQuery,
    ) -> ApplicationResult<PaginatedResult<IssueSummary>> {
        let actor = resolve_authority(self.store.as_ref(), ctx, "list assigned issues").await?;
        let filter = IssueFilter {
            assigned_to: Some(actor.id),
            ..IssueFilter::default()
        }
        .with_search(query.search.clone());
        self.list(&filter, &query).await
    }

    /// Forwarded issues of the representative's office
    #[instrument(skip(self, ctx, query), fields(correlation_id = %ctx.correlation_id))]
    pub async fn forwarded_issues(
        &self,
        ctx: &ServiceContext,
        query: ListIssuesQuery,
    ) -> ApplicationResult<PaginatedResult<IssueSummary>> {
        let actor =
            resolve_representative(self.store.as_ref(), ctx, "list forwarded issues").await?;
        let filter = IssueFilter {
            assignment: AssignmentState::Assigned,
            search_department: true,
            ..IssueFilter::for_office(actor.office_id)
        }
        .with_search(query.search.clone());
        self.list(&filter, &query).await
    }

    /// Disputed issues of the representative's office
    #[instrument(skip(self, ctx, query), fields(correlation_id = %ctx.correlation_id))]
    pub async fn conflict_issues(
        &self,
        ctx: &ServiceContext,
        query: ListIssuesQuery,
    ) -> ApplicationResult<PaginatedResult<IssueSummary>> {
        let actor =
            resolve_representative(self.store.as_ref(), ctx, "list disputed issues").await?;
        let filter = IssueFilter {
            disputed: Some(true),
            search_department: true,
            ..IssueFilter::for_office(actor.office_id)
        }
        .with_search(query.search.clone());
        self.list(&filter, &query).await
    }

    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id, issue_id = %request.issue_id))]
    pub async fn forward_issue(
        &self,
        ctx: &ServiceContext,
        request: ForwardIssueRequest,
    ) -> ApplicationResult<IssueDetail> {
        let actor = resolve_representative(self.store.as_ref(), ctx, "forward issues").await?;
        request.validate_all().ensure_valid()?;

        let (issue, event) = self
            .lifecycle
            .forward(request.issue_id, &actor, &request.department, &request.role)
            .await?;

        info!(issue_id = %issue.id, department = %request.department.trim(), "Issue forwarded");
        self.dispatch(event);
        Ok(IssueDetail::new(&issue, None))
    }

    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id, issue_id = %request.issue_id))]
    pub async fn update_issue(
        &self,
        ctx: &ServiceContext,
        request: UpdateIssueRequest,
    ) -> ApplicationResult<IssueDetail> {
        let actor = resolve_authority(self.store.as_ref(), ctx, "update issues").await?;
        request.validate_all().ensure_valid()?;

        let (issue, event) = self
            .lifecycle
            .update_status(request.issue_id, &actor, request.status, &request.description)
            .await?;

        info!(issue_id = %issue.id, status = %issue.status, "Issue status updated");
        self.dispatch(event);
        Ok(IssueDetail::new(&issue, None))
    }

    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id, issue_id = %request.issue_id))]
    pub async fn confirm_resolution(
        &self,
        ctx: &ServiceContext,
        request: ResolutionDecisionRequest,
    ) -> ApplicationResult<IssueDetail> {
        let citizen_id = ctx.require_citizen("confirm resolutions")?;
        request.validate_all().ensure_valid()?;

        let (issue, event) = self
            .lifecycle
            .confirm_resolution(request.issue_id, citizen_id, request.notification_id)
            .await?;

        info!(issue_id = %issue.id, "Resolution confirmed");
        self.dispatch(event);
        Ok(IssueDetail::new(&issue, Some(citizen_id)))
    }

    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id, issue_id = %request.issue_id))]
    pub async fn reject_resolution(
        &self,
        ctx: &ServiceContext,
        request: ResolutionDecisionRequest,
    ) -> ApplicationResult<IssueDetail> {
        let citizen_id = ctx.require_citizen("reject resolutions")?;
        request.validate_all().ensure_valid()?;

        let (issue, event) = self
            .lifecycle
            .reject_resolution(
                request.issue_id,
                citizen_id,
                request.notification_id,
                request.rejection_message(),
            )
            .await?;

        info!(issue_id = %issue.id, "Resolution disputed");
        self.dispatch(event);
        Ok(IssueDetail::new(&issue, Some(citizen_id)))
    }

    /// Settle a dispute against the reporter
    pub async fn citizen_fault(
        &self,
        ctx: &ServiceContext,
        issue_id: IssueId,
    ) -> ApplicationResult<IssueDetail> {
        self.rule_on_dispute(ctx, issue_id, Fault::Citizen).await
    }

    /// Settle a dispute against the authority
    pub async fn authority_fault(
        &self,
        ctx: &ServiceContext,
        issue_id: IssueId,
    ) -> ApplicationResult<IssueDetail> {
        self.rule_on_dispute(ctx, issue_id, Fault::Authority).await
    }

    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    async fn rule_on_dispute(
        &self,
        ctx: &ServiceContext,
        issue_id: IssueId,
        fault: Fault,
    ) -> ApplicationResult<IssueDetail> {
        let actor = resolve_representative(self.store.as_ref(), ctx, "rule on disputes").await?;
        let (issue, event) = self.lifecycle.rule_on_dispute(issue_id, &actor, fault).await?;

        info!(issue_id = %issue.id, fault = fault.as_str(), "Dispute ruled");
        self.dispatch(event);
        Ok(IssueDetail::new(&issue, None))
    }

    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn upvote(
        &self,
        ctx: &ServiceContext,
        issue_id: IssueId,
    ) -> ApplicationResult<VoteSummary> {
        let citizen_id = ctx.require_citizen("upvote issues")?;
        self.store
            .get_citizen(citizen_id)
            .await?
            .ok_or(NotFoundError::Citizen(citizen_id))?;
        if !self.store.add_upvote(issue_id, citizen_id).await? {
            return Err(ConflictError::AlreadyVoted {
                issue_id,
                citizen_id,
            }
            .into());
        }
        let issue = self.load_issue(issue_id).await?;
        debug!(issue_id = %issue_id, upvotes = issue.upvote_count(), "Upvote added");
        Ok(VoteSummary {
            issue_id,
            upvote_count: issue.upvote_count(),
            voted: true,
        })
    }

    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn remove_upvote(
        &self,
        ctx: &ServiceContext,
        issue_id: IssueId,
    ) -> ApplicationResult<VoteSummary> {
        let citizen_id = ctx.require_citizen("remove upvotes")?;
        if !self.store.remove_upvote(issue_id, citizen_id).await? {
            return Err(ConflictError::NotVoted {
                issue_id,
                citizen_id,
            }
            .into());
        }
        let issue = self.load_issue(issue_id).await?;
        debug!(issue_id = %issue_id, upvotes = issue.upvote_count(), "Upvote removed");
        Ok(VoteSummary {
            issue_id,
            upvote_count: issue.upvote_count(),
            voted: false,
        })
    }

    /// Pending resolution decisions of the calling citizen
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn pending_decisions(
        &self,
        ctx: &ServiceContext,
    ) -> ApplicationResult<Vec<NotificationDto>> {
        let citizen_id = ctx.require_citizen("list notifications")?;
        let pending = self.store.pending_decisions(citizen_id).await?;
        Ok(pending.iter().map(NotificationDto::from).collect())
    }

    /// Office analytics for representatives, assigned-issue analytics otherwise
    #[instrument(skip(self, ctx, query), fields(correlation_id = %ctx.correlation_id))]
    pub async fn analytics(
        &self,
        ctx: &ServiceContext,
        query: AnalyticsQuery,
    ) -> ApplicationResult<AnalyticsView> {
        let actor = resolve_authority(self.store.as_ref(), ctx, "view analytics").await?;
        query.validate_all().ensure_valid()?;
        let range = query.range(self.config.analytics_window_days);

        if actor.is_representative() {
            let office = self.load_office(actor.office_id).await?;
            let issues = self
                .store
                .issues_created_between(&IssueFilter::for_office(office.id), &range)
                .await?;
            Ok(AnalyticsView::Office(reporting::office_analytics(
                &office, range, &issues,
            )))
        } else {
            let filter = IssueFilter {
                assigned_to: Some(actor.id),
                ..IssueFilter::default()
            };
            let issues = self.store.issues_created_between(&filter, &range).await?;
            Ok(AnalyticsView::Assignee(reporting::assignee_analytics(
                actor.id, range, &issues,
            )))
        }
    }

    /// Weekly and monthly office report ending at `toDate` (default now)
    #[instrument(skip(self, ctx, query), fields(correlation_id = %ctx.correlation_id))]
    pub async fn monthly_report(
        &self,
        ctx: &ServiceContext,
        query: AnalyticsQuery,
    ) -> ApplicationResult<MonthlyReport> {
        let actor = resolve_representative(self.store.as_ref(), ctx, "generate reports").await?;
        query.validate_all().ensure_valid()?;

        let end = query.to_date.unwrap_or_else(Utc::now);
        let window = DateRange::last_days(end, reporting::MONTHLY_WINDOW_DAYS);
        let office = self.load_office(actor.office_id).await?;
        let issues = self
            .store
            .issues_created_between(&IssueFilter::for_office(office.id), &window)
            .await?;

        info!(office_id = %office.id, issues = issues.len(), "Monthly report generated");
        Ok(reporting::monthly_report(&office, end, &issues))
    }

    /// Report on one issue, for the owning office's staff or the reporter
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn issue_report(
        &self,
        ctx: &ServiceContext,
        issue_id: IssueId,
    ) -> ApplicationResult<IssueReport> {
        let issue = self.load_issue(issue_id).await?;

        match ctx.principal {
            Principal::Admin => {}
            Principal::Citizen(citizen_id) if citizen_id == issue.reporter_id => {}
            Principal::Authority(_) => {
                let actor = resolve_authority(self.store.as_ref(), ctx, "view reports").await?;
                if !actor.belongs_to(issue.office_id) {
                    return Err(AuthorizationError::OfficeMismatch { issue_id }.into());
                }
            }
            Principal::Citizen(_) => {
                return Err(AuthorizationError::NotIssueOwner { issue_id }.into());
            }
            Principal::Anonymous => return Err(AuthorizationError::AuthenticationRequired.into()),
        }

        let office = self.load_office(issue.office_id).await?;
        Ok(reporting::issue_report(&office, &issue))
    }

    pub async fn health_check(&self) -> ApplicationResult<()> {
        self.store.health_check().await
    }

    async fn list(
        &self,
        filter: &IssueFilter,
        query: &ListIssuesQuery,
    ) -> ApplicationResult<PaginatedResult<IssueSummary>> {
        if let Some(ref search) = query.search {
            ValidationRules::validate_length(search, "search", None, Some(200)).ensure_valid()?;
        }
        let page = query.pagination(self.config.default_page_size);
        let result = self.store.list_issues(filter, &page).await?;
        Ok(result.map(|issue| IssueSummary::from(&issue)))
    }

    async fn load_issue(&self, issue_id: IssueId) -> ApplicationResult<Issue> {
        self.store
            .get_issue(issue_id)
            .await?
            .ok_or_else(|| NotFoundError::Issue(issue_id).into())
    }

    async fn load_office(&self, office_id: OfficeId) -> ApplicationResult<Office> {
        self.store
            .get_office(office_id)
            .await?
            .ok_or_else(|| NotFoundError::Office(office_id).into())
    }

    /// Advisory priority; failures and timeouts fall back to NORMAL
    async fn classify_priority(&self, text: &str) -> Priority {
        let budget = self.config.classifier_timeout;
        match tokio::time::timeout(budget, self.advisor.classify(text)).await {
            Ok(Ok(priority)) => priority,
            Ok(Err(e)) => {
                warn!(error = %e, "Priority classification failed, using NORMAL");
                Priority::Normal
            }
            Err(_) => {
                warn!(timeout_ms = budget.as_millis() as u64, "Priority classification timed out, using NORMAL");
                Priority::Normal
            }
        }
    }

    /// Deliver an event in the background once its change is committed
    fn dispatch(&self, event: IssueEvent) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let budget = self.config.dispatch_timeout;
        tokio::spawn(async move {
            match tokio::time::timeout(budget, dispatcher.dispatch(&event)).await {
                Ok(Ok(())) => {
                    debug!(topic = event.topic(), issue_id = %event.issue_id(), "Notification dispatched")
                }
                Ok(Err(e)) => {
                    warn!(error = %e, topic = event.topic(), issue_id = %event.issue_id(), "Notification dispatch failed")
                }
                Err(_) => {
                    warn!(
                        topic = event.topic(),
                        issue_id = %event.issue_id(),
                        timeout_ms = budget.as_millis() as u64,
                        "Notification dispatch timed out"
                    )
                }
            }
        });
    }
}
