//! Tests for the issue lifecycle
//!
//! Drives issues through forwarding, status updates, the reporter's
//! resolution decision and fault rulings, plus upvotes and reports.

use chrono::{DateTime, Duration, Utc};
use civic_issues_application::dto::AnalyticsView;
use civic_issues_application::validation::{
    AnalyticsQuery, ForwardIssueRequest, ResolutionDecisionRequest, UpdateIssueRequest,
};
use civic_issues_application::ServiceContext;
use civic_issues_domain::errors::{AuthorizationError, ConflictError, NotFoundError};
use civic_issues_domain::{AppError, Fault, Issue, IssueStatus, CITIZEN_FAULT_PENALTY};
use civic_issues_testing::{builders::*, fixtures::*};

fn forward_request(issue: &Issue) -> ForwardIssueRequest {
    ForwardIssueRequest {
        issue_id: issue.id,
        department: ENGINEER_DEPARTMENT.to_string(),
        role: ENGINEER_ROLE.to_string(),
    }
}

fn status_request(issue: &Issue, status: IssueStatus, description: &str) -> UpdateIssueRequest {
    UpdateIssueRequest {
        issue_id: issue.id,
        status,
        description: description.to_string(),
    }
}

async fn reported_issue(world: &TestWorld) -> Issue {
    world
        .seed_issue(
            IssueBuilder::new()
                .in_office(world.office.id)
                .reported_by(world.citizen.id)
                .build(),
        )
        .await
}

/// Issue forwarded to the engineer and resolved, with the decision pending
async fn resolved_issue(world: &TestWorld) -> (Issue, ResolutionDecisionRequest) {
    let issue = reported_issue(world).await;
    world
        .issues
        .forward_issue(&world.representative_ctx(), forward_request(&issue))
        .await
        .unwrap();
    world
        .issues
        .update_issue(
            &world.engineer_ctx(),
            status_request(&issue, IssueStatus::Resolved, "Pothole filled"),
        )
        .await
        .unwrap();

    let pending = world.issues.pending_decisions(&world.citizen_ctx()).await.unwrap();
    assert_eq!(pending.len(), 1);
    let request = ResolutionDecisionRequest {
        issue_id: issue.id,
        notification_id: pending[0].id,
        message: None,
    };
    (world.reload(&issue).await, request)
}

#[tokio::test]
async fn test_forward_assigns_role_holder() {
    let world = TestWorld::new().await;
    let issue = reported_issue(&world).await;

    let detail = world
        .issues
        .forward_issue(&world.representative_ctx(), forward_request(&issue))
        .await
        .unwrap();

    assert_eq!(detail.issue.status, IssueStatus::Forwarded);
    assert_eq!(detail.issue.assigned_to_id, Some(world.engineer.id));
    assert_eq!(detail.issue.department_name.as_deref(), Some(ENGINEER_DEPARTMENT));
    assert_eq!(detail.updates.len(), 1);
    assert_eq!(
        detail.updates[0].description,
        format!("Forwarded to {}", ENGINEER_DEPARTMENT)
    );

    let events = world.dispatcher.wait_for(1).await;
    assert_eq!(events[0].topic(), "issue.forwarded");
}

#[tokio::test]
async fn test_forward_by_non_representative_leaves_issue_unchanged() {
    let world = TestWorld::new().await;
    let issue = reported_issue(&world).await;

    let err = world
        .issues
        .forward_issue(&world.engineer_ctx(), forward_request(&issue))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Authorization(AuthorizationError::NotRepresentative { .. })
    ));
    let stored = world.reload(&issue).await;
    assert_eq!(stored, issue);
    assert_eq!(world.dispatcher.event_count(), 0);
}

#[tokio::test]
async fn test_forward_from_another_office_is_rejected() {
    let world = TestWorld::new().await;
    let (_, other_representative) = world.add_office_at(1.0, 1.0).await;
    let issue = reported_issue(&world).await;

    let err = world
        .issues
        .forward_issue(
            &ServiceContext::authority(other_representative.id, "other-office"),
            forward_request(&issue),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Authorization(AuthorizationError::OfficeMismatch { .. })
    ));
    assert_eq!(world.reload(&issue).await.status, IssueStatus::UnderReview);
}

#[tokio::test]
async fn test_status_update_from_another_office_is_rejected() {
    let world = TestWorld::new().await;
    let (_, other_representative) = world.add_office_at(1.0, 1.0).await;
    let issue = reported_issue(&world).await;
    world
        .issues
        .forward_issue(&world.representative_ctx(), forward_request(&issue))
        .await
        .unwrap();

    let err = world
        .issues
        .update_issue(
            &ServiceContext::authority(other_representative.id, "other-office"),
            status_request(&issue, IssueStatus::Resolved, "Closed elsewhere"),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Authorization(AuthorizationError::OfficeMismatch { .. })
    ));
    let stored = world.reload(&issue).await;
    assert_eq!(stored.status, IssueStatus::Forwarded);
    assert!(!stored.is_awaiting_decision());
    assert!(world.issues.pending_decisions(&world.citizen_ctx()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_forward_to_unknown_role_is_not_found() {
    let world = TestWorld::new().await;
    let issue = reported_issue(&world).await;
    let mut request = forward_request(&issue);
    request.role = "Tree Surgeon".to_string();

    let err = world
        .issues
        .forward_issue(&world.representative_ctx(), request)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::NotFound(NotFoundError::Employee { .. })
    ));
}

#[tokio::test]
async fn test_concurrent_forward_has_exactly_one_winner() {
    let world = TestWorld::new().await;
    let issue = reported_issue(&world).await;
    let ctx = world.representative_ctx();

    let (first, second) = tokio::join!(
        world.issues.forward_issue(&ctx, forward_request(&issue)),
        world.issues.forward_issue(&ctx, forward_request(&issue)),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = outcomes.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(loser.http_status(), 409);

    let stored = world.reload(&issue).await;
    assert_eq!(stored.updates.len(), 1);
    assert_eq!(stored.version, issue.version + 1);
}

#[tokio::test]
async fn test_status_update_requires_forwarded_issue() {
    let world = TestWorld::new().await;
    let issue = reported_issue(&world).await;

    let err = world
        .issues
        .update_issue(
            &world.engineer_ctx(),
            status_request(&issue, IssueStatus::InProgress, "Crew dispatched"),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Conflict(ConflictError::InvalidStatusTransition { .. })
    ));
}

#[tokio::test]
async fn test_progress_update_appends_history() {
    let world = TestWorld::new().await;
    let issue = reported_issue(&world).await;
    world
        .issues
        .forward_issue(&world.representative_ctx(), forward_request(&issue))
        .await
        .unwrap();

    let detail = world
        .issues
        .update_issue(
            &world.engineer_ctx(),
            status_request(&issue, IssueStatus::InProgress, "Crew dispatched"),
        )
        .await
        .unwrap();

    assert_eq!(detail.issue.status, IssueStatus::InProgress);
    let history: Vec<&str> = detail.updates.iter().map(|u| u.description.as_str()).collect();
    assert_eq!(history, vec!["Forwarded to engineering", "Crew dispatched"]);
    assert!(!world.reload(&issue).await.is_awaiting_decision());
}

#[tokio::test]
async fn test_resolution_opens_pending_decision() {
    let world = TestWorld::new().await;
    let (issue, _) = resolved_issue(&world).await;

    assert_eq!(issue.status, IssueStatus::Resolved);
    assert!(issue.resolved_at.is_some());
    assert!(issue.is_awaiting_decision());

    let pending = world.issues.pending_decisions(&world.citizen_ctx()).await.unwrap();
    assert_eq!(pending[0].title, format!("Issue {} has been resolved", issue.title));
    assert_eq!(pending[0].description, "Pothole filled");

    world.dispatcher.wait_for(2).await;
    assert!(world.dispatcher.topics().contains(&"issue.resolved"));
}

#[tokio::test]
async fn test_resolved_issue_rejects_further_updates() {
    let world = TestWorld::new().await;
    let (issue, _) = resolved_issue(&world).await;

    let err = world
        .issues
        .update_issue(
            &world.engineer_ctx(),
            status_request(&issue, IssueStatus::InProgress, "Reopening"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), 409);
}

#[tokio::test]
async fn test_confirm_resolution_consumes_decision() {
    let world = TestWorld::new().await;
    let (issue, request) = resolved_issue(&world).await;

    let detail = world
        .issues
        .confirm_resolution(&world.citizen_ctx(), request.clone())
        .await
        .unwrap();

    assert!(detail.issue.resolution_confirmed);
    assert!(!detail.issue.dispute);
    assert!(world.issues.pending_decisions(&world.citizen_ctx()).await.unwrap().is_empty());

    let err = world
        .issues
        .confirm_resolution(&world.citizen_ctx(), request)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Conflict(ConflictError::NotAwaitingDecision(id)) if id == issue.id
    ));
}

#[tokio::test]
async fn test_only_reporter_may_decide() {
    let world = TestWorld::new().await;
    let (_, request) = resolved_issue(&world).await;
    let stranger = world.add_citizen().await;

    let err = world
        .issues
        .reject_resolution(&ServiceContext::citizen(stranger.id, "stranger"), request)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Authorization(AuthorizationError::NotIssueOwner { .. })
    ));
}

#[tokio::test]
async fn test_reject_resolution_opens_dispute_with_default_message() {
    let world = TestWorld::new().await;
    let (issue, request) = resolved_issue(&world).await;

    let detail = world
        .issues
        .reject_resolution(&world.citizen_ctx(), request)
        .await
        .unwrap();

    assert!(detail.issue.dispute);
    assert!(!detail.issue.resolution_confirmed);
    assert_eq!(
        detail.issue.dispute_message.as_deref(),
        Some(ResolutionDecisionRequest::DEFAULT_REJECTION_MESSAGE)
    );
    assert_eq!(detail.issue.status, IssueStatus::Resolved);

    let conflicts = world
        .issues
        .conflict_issues(&world.representative_ctx(), Default::default())
        .await
        .unwrap();
    assert_eq!(conflicts.total, 1);
    assert_eq!(conflicts.items[0].id, issue.id);
}

#[tokio::test]
async fn test_citizen_fault_costs_reputation() {
    let world = TestWorld::new().await;
    let (issue, mut request) = resolved_issue(&world).await;
    request.message = Some("Still broken".to_string());
    world
        .issues
        .reject_resolution(&world.citizen_ctx(), request)
        .await
        .unwrap();

    let detail = world
        .issues
        .citizen_fault(&world.representative_ctx(), issue.id)
        .await
        .unwrap();

    assert!(!detail.issue.dispute);
    assert_eq!(detail.issue.fault, Some(Fault::Citizen));
    assert_eq!(
        world.reload_citizen(&world.citizen).await.reputation_points,
        -CITIZEN_FAULT_PENALTY
    );
}

#[tokio::test]
async fn test_authority_fault_keeps_reputation() {
    let world = TestWorld::new().await;
    let (issue, request) = resolved_issue(&world).await;
    world
        .issues
        .reject_resolution(&world.citizen_ctx(), request)
        .await
        .unwrap();

    let detail = world
        .issues
        .authority_fault(&world.representative_ctx(), issue.id)
        .await
        .unwrap();

    assert_eq!(detail.issue.fault, Some(Fault::Authority));
    assert_eq!(world.reload_citizen(&world.citizen).await.reputation_points, 0);
}

#[tokio::test]
async fn test_fault_ruling_requires_dispute() {
    let world = TestWorld::new().await;
    let (issue, _) = resolved_issue(&world).await;

    let err = world
        .issues
        .citizen_fault(&world.representative_ctx(), issue.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(ConflictError::NotDisputed(_))));
    assert_eq!(world.reload_citizen(&world.citizen).await.reputation_points, 0);
}

#[tokio::test]
async fn test_upvote_once_per_citizen() {
    let world = TestWorld::new().await;
    let issue = reported_issue(&world).await;
    let neighbour = world.add_citizen().await;
    let neighbour_ctx = ServiceContext::citizen(neighbour.id, "neighbour");

    let first = world.issues.upvote(&neighbour_ctx, issue.id).await.unwrap();
    let again = world.issues.upvote(&neighbour_ctx, issue.id).await.unwrap_err();
    let other = world.issues.upvote(&world.citizen_ctx(), issue.id).await.unwrap();

    assert_eq!(first.upvote_count, 1);
    assert!(matches!(
        again,
        AppError::Conflict(ConflictError::AlreadyVoted { .. })
    ));
    assert_eq!(other.upvote_count, 2);

    let detail = world.issues.get_issue(&neighbour_ctx, issue.id).await.unwrap();
    assert!(detail.voted);
    assert_eq!(detail.issue.upvote_count, 2);
}

#[tokio::test]
async fn test_upvote_from_unknown_citizen_is_not_found() {
    let world = TestWorld::new().await;
    let issue = reported_issue(&world).await;
    let stranger = create_test_citizen();

    let err = world
        .issues
        .upvote(&ServiceContext::citizen(stranger.id, "stranger"), issue.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(NotFoundError::Citizen(_))));
    assert_eq!(world.reload(&issue).await.upvote_count(), 0);
}

#[tokio::test]
async fn test_remove_upvote_requires_prior_vote() {
    let world = TestWorld::new().await;
    let issue = reported_issue(&world).await;

    let err = world
        .issues
        .remove_upvote(&world.citizen_ctx(), issue.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(ConflictError::NotVoted { .. })));

    world.issues.upvote(&world.citizen_ctx(), issue.id).await.unwrap();
    let summary = world
        .issues
        .remove_upvote(&world.citizen_ctx(), issue.id)
        .await
        .unwrap();
    assert_eq!(summary.upvote_count, 0);
    assert!(!summary.voted);
}

#[tokio::test]
async fn test_upvotes_survive_lifecycle_commits() {
    let world = TestWorld::new().await;
    let issue = reported_issue(&world).await;
    world.issues.upvote(&world.citizen_ctx(), issue.id).await.unwrap();

    world
        .issues
        .forward_issue(&world.representative_ctx(), forward_request(&issue))
        .await
        .unwrap();

    assert_eq!(world.reload(&issue).await.upvote_count(), 1);
}

#[tokio::test]
async fn test_representative_analytics_cover_office() {
    let world = TestWorld::new().await;
    let (_, request) = resolved_issue(&world).await;
    world
        .issues
        .confirm_resolution(&world.citizen_ctx(), request)
        .await
        .unwrap();
    reported_issue(&world).await;

    let view = world
        .issues
        .analytics(&world.representative_ctx(), AnalyticsQuery::default())
        .await
        .unwrap();

    let AnalyticsView::Office(analytics) = view else {
        panic!("expected office analytics");
    };
    assert_eq!(analytics.office_id, world.office.id);
    assert_eq!(analytics.stats.by_status.total, 2);
    assert_eq!(analytics.stats.by_status.resolved, 1);
    assert_eq!(analytics.stats.by_status.under_review, 1);
    assert_eq!(analytics.stats.performance.resolution_rate, 50);
    assert_eq!(analytics.stats.by_department.get(ENGINEER_DEPARTMENT), Some(&1));
}

#[tokio::test]
async fn test_assignee_analytics_cover_assigned_issues() {
    let world = TestWorld::new().await;
    let issue = reported_issue(&world).await;
    reported_issue(&world).await;
    world
        .issues
        .forward_issue(&world.representative_ctx(), forward_request(&issue))
        .await
        .unwrap();

    let view = world
        .issues
        .analytics(&world.engineer_ctx(), AnalyticsQuery::default())
        .await
        .unwrap();

    let AnalyticsView::Assignee(analytics) = view else {
        panic!("expected assignee analytics");
    };
    assert_eq!(analytics.authority_id, world.engineer.id);
    assert_eq!(analytics.by_status.total, 1);
    assert_eq!(analytics.by_status.forwarded, 1);
    assert_eq!(analytics.issues[0].issue.id, issue.id);
}

#[tokio::test]
async fn test_issue_report_visibility() {
    let world = TestWorld::new().await;
    let (issue, request) = resolved_issue(&world).await;
    world
        .issues
        .reject_resolution(&world.citizen_ctx(), request)
        .await
        .unwrap();
    let (_, other_representative) = world.add_office_at(1.0, 1.0).await;
    let stranger = world.add_citizen().await;

    let report = world
        .issues
        .issue_report(&world.citizen_ctx(), issue.id)
        .await
        .unwrap();
    assert_eq!(report.office_name, world.office.name);
    assert!(report.dispute.dispute);
    assert_eq!(report.updates.len(), 2);

    assert!(world
        .issues
        .issue_report(&world.engineer_ctx(), issue.id)
        .await
        .is_ok());
    assert!(world
        .issues
        .issue_report(&world.admin_ctx(), issue.id)
        .await
        .is_ok());

    let err = world
        .issues
        .issue_report(&ServiceContext::citizen(stranger.id, "stranger"), issue.id)
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 403);

    let err = world
        .issues
        .issue_report(
            &ServiceContext::authority(other_representative.id, "other-office"),
            issue.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Authorization(AuthorizationError::OfficeMismatch { .. })
    ));
}

#[tokio::test]
async fn test_monthly_report_requires_representative() {
    let world = TestWorld::new().await;
    reported_issue(&world).await;

    let report = world
        .issues
        .monthly_report(&world.representative_ctx(), AnalyticsQuery::default())
        .await
        .unwrap();
    assert_eq!(report.office_id, world.office.id);
    assert_eq!(report.monthly.by_status.total, 1);
    assert_eq!(report.recent_issues.len(), 1);

    let err = world
        .issues
        .monthly_report(&world.engineer_ctx(), AnalyticsQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 403);
}

#[tokio::test]
async fn test_reports_near_earliest_date_return_empty_windows() {
    let world = TestWorld::new().await;
    reported_issue(&world).await;
    let query = AnalyticsQuery {
        from_date: None,
        to_date: Some(DateTime::<Utc>::MIN_UTC + Duration::days(1)),
    };

    let view = world
        .issues
        .analytics(&world.representative_ctx(), query)
        .await
        .unwrap();
    let AnalyticsView::Office(analytics) = view else {
        panic!("representative should see office analytics");
    };
    assert_eq!(analytics.stats.range.start, DateTime::<Utc>::MIN_UTC);

    let report = world
        .issues
        .monthly_report(&world.representative_ctx(), query)
        .await
        .unwrap();
    assert_eq!(report.monthly.by_status.total, 0);
}
