//! Tests for the issue status transition table

use civic_issues_domain::issue::IssueStatus;

// ============================================================================
// IssueStatus Tests
// ============================================================================

#[test]
fn test_pending_is_legacy_entry_only() {
    let pending = IssueStatus::Pending;

    assert!(pending.can_transition_to(IssueStatus::UnderReview));
    assert!(!pending.can_transition_to(IssueStatus::Forwarded));
    assert!(!pending.can_transition_to(IssueStatus::Resolved));

    // Nothing moves back into PENDING
    for status in IssueStatus::ALL {
        assert!(!status.can_transition_to(IssueStatus::Pending));
    }
}

#[test]
fn test_under_review_only_forwards() {
    let under_review = IssueStatus::UnderReview;

    assert!(under_review.can_transition_to(IssueStatus::Forwarded));
    assert!(!under_review.can_transition_to(IssueStatus::InProgress));
    assert!(!under_review.can_transition_to(IssueStatus::Resolved));
    assert!(!under_review.can_transition_to(IssueStatus::UnderReview));
    assert!(!under_review.accepts_status_updates());
}

#[test]
fn test_forwarded_transitions() {
    let forwarded = IssueStatus::Forwarded;

    assert!(forwarded.can_transition_to(IssueStatus::InProgress));
    assert!(forwarded.can_transition_to(IssueStatus::Resolved));
    assert!(forwarded.can_transition_to(IssueStatus::Forwarded));
    assert!(!forwarded.can_transition_to(IssueStatus::UnderReview));
    assert!(forwarded.accepts_status_updates());
}

#[test]
fn test_in_progress_cannot_go_backwards() {
    let in_progress = IssueStatus::InProgress;

    assert!(in_progress.can_transition_to(IssueStatus::Resolved));
    assert!(in_progress.can_transition_to(IssueStatus::InProgress));
    assert!(!in_progress.can_transition_to(IssueStatus::Forwarded));
    assert!(!in_progress.can_transition_to(IssueStatus::UnderReview));
}

#[test]
fn test_resolved_is_terminal() {
    let resolved = IssueStatus::Resolved;

    assert!(resolved.is_terminal());
    for status in IssueStatus::ALL {
        assert!(!resolved.can_transition_to(status));
    }
}

#[test]
fn test_status_wire_format() {
    for status in IssueStatus::ALL {
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, format!("\"{}\"", status.as_str()));
        assert_eq!(status.as_str().parse::<IssueStatus>().unwrap(), status);
    }
    assert_eq!(
        "in_progress".parse::<IssueStatus>().unwrap(),
        IssueStatus::InProgress
    );
    assert!("CLOSED".parse::<IssueStatus>().is_err());
}
