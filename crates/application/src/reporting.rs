//! Pure aggregation over issue snapshots.

use crate::dto::{
    updates_ascending, AssigneeAnalytics, DisputeInfo, IssueDetail, IssueReport, IssueSummary,
    MonthlyReport, OfficeAnalytics, PerformanceMetrics, PeriodStats, StatusCounts,
};
use chrono::{DateTime, Utc};
use civic_issues_common::DateRange;
use civic_issues_domain::{AuthorityId, Issue, IssueStatus, Office, UNASSIGNED_DEPARTMENT};
use std::collections::BTreeMap;

/// Issues listed in a monthly report
pub const RECENT_ISSUE_COUNT: usize = 10;

/// Days covered by the weekly section of a monthly report
pub const WEEKLY_WINDOW_DAYS: i64 = 7;

/// Days covered by the monthly section of a monthly report
pub const MONTHLY_WINDOW_DAYS: i64 = 30;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

pub fn count_by_status(issues: &[Issue]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for issue in issues {
        match issue.status {
            IssueStatus::Pending => counts.pending += 1,
            IssueStatus::UnderReview => counts.under_review += 1,
            IssueStatus::Forwarded => counts.forwarded += 1,
            IssueStatus::InProgress => counts.in_progress += 1,
            IssueStatus::Resolved => counts.resolved += 1,
        }
        if issue.dispute {
            counts.disputed += 1;
        }
        counts.total += 1;
    }
    counts
}

/// Issue counts per department; never-forwarded issues count as "Unassigned"
pub fn count_by_department(issues: &[Issue]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for issue in issues {
        let department = issue.department_name().unwrap_or(UNASSIGNED_DEPARTMENT);
        *counts.entry(department.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Mean resolution time in days rounded to one decimal; 0 when nothing resolved
pub fn average_resolution_days(issues: &[Issue]) -> f64 {
    let durations: Vec<f64> = issues
        .iter()
        .filter(|i| i.status == IssueStatus::Resolved)
        .filter_map(|i| i.resolved_at.map(|at| at - i.created_at))
        .map(|d| d.num_milliseconds() as f64 / MILLIS_PER_DAY)
        .collect();

    if durations.is_empty() {
        return 0.0;
    }
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;
    (mean * 10.0).round() / 10.0
}

fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * part as f64 / total as f64).round() as u32
}

/// Share of issues that left PENDING, as a whole percentage
pub fn response_rate(issues: &[Issue]) -> u32 {
    let responded = issues
        .iter()
        .filter(|i| i.status != IssueStatus::Pending)
        .count();
    percentage(responded, issues.len())
}

/// Share of issues that are RESOLVED, as a whole percentage
pub fn resolution_rate(issues: &[Issue]) -> u32 {
    let resolved = issues
        .iter()
        .filter(|i| i.status == IssueStatus::Resolved)
        .count();
    percentage(resolved, issues.len())
}

pub fn performance(issues: &[Issue]) -> PerformanceMetrics {
    PerformanceMetrics {
        average_resolution_days: average_resolution_days(issues),
        response_rate: response_rate(issues),
        resolution_rate: resolution_rate(issues),
    }
}

/// Statistics over the issues created inside `range`
pub fn period_stats(issues: &[Issue], range: DateRange) -> PeriodStats {
    let in_range: Vec<Issue> = issues
        .iter()
        .filter(|i| range.contains(&i.created_at))
        .cloned()
        .collect();

    PeriodStats {
        range,
        by_status: count_by_status(&in_range),
        by_department: count_by_department(&in_range),
        performance: performance(&in_range),
    }
}

fn newest_first(issues: &[Issue]) -> Vec<&Issue> {
    let mut sorted: Vec<&Issue> = issues.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    sorted
}

pub fn office_analytics(office: &Office, range: DateRange, issues: &[Issue]) -> OfficeAnalytics {
    let stats = period_stats(issues, range);
    let listed = newest_first(issues)
        .into_iter()
        .filter(|i| range.contains(&i.created_at))
        .map(IssueSummary::from)
        .collect();

    OfficeAnalytics {
        office_id: office.id,
        office_name: office.name.clone(),
        stats,
        issues: listed,
    }
}

pub fn assignee_analytics(
    authority_id: AuthorityId,
    range: DateRange,
    issues: &[Issue],
) -> AssigneeAnalytics {
    let assigned: Vec<Issue> = issues
        .iter()
        .filter(|i| i.is_assigned_to(authority_id) && range.contains(&i.created_at))
        .cloned()
        .collect();

    AssigneeAnalytics {
        authority_id,
        range,
        by_status: count_by_status(&assigned),
        issues: newest_first(&assigned)
            .into_iter()
            .map(|i| IssueDetail::new(i, None))
            .collect(),
    }
}

/// Weekly and monthly statistics ending at `end`, with the most recent issues
pub fn monthly_report(office: &Office, end: DateTime<Utc>, issues: &[Issue]) -> MonthlyReport {
    let monthly_range = DateRange::last_days(end, MONTHLY_WINDOW_DAYS);
    let recent_issues = newest_first(issues)
        .into_iter()
        .filter(|i| monthly_range.contains(&i.created_at))
        .take(RECENT_ISSUE_COUNT)
        .map(IssueSummary::from)
        .collect();

    MonthlyReport {
        office_id: office.id,
        office_name: office.name.clone(),
        generated_at: Utc::now(),
        weekly: period_stats(issues, DateRange::last_days(end, WEEKLY_WINDOW_DAYS)),
        monthly: period_stats(issues, monthly_range),
        recent_issues,
    }
}

pub fn issue_report(office: &Office, issue: &Issue) -> IssueReport {
    IssueReport {
        office_name: office.name.clone(),
        issue: IssueSummary::from(issue),
        updates: updates_ascending(issue),
        upvote_count: issue.upvote_count(),
        dispute: DisputeInfo {
            resolution_confirmed: issue.resolution_confirmed,
            dispute: issue.dispute,
            message: issue.dispute_message.clone(),
            fault: issue.fault,
            conflict_resolved_at: issue.conflict_resolved_at,
        },
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use civic_issues_domain::{Assignment, CitizenId, Coordinate, NewIssue, OfficeId, Priority};

    fn issue(status: IssueStatus, created_at: DateTime<Utc>) -> Issue {
        let mut issue = Issue::new(NewIssue {
            title: "Streetlight".to_string(),
            description: "Dark for a week".to_string(),
            address: None,
            location: Coordinate::new(0.0, 0.0).unwrap(),
            office_id: OfficeId::new(),
            reporter_id: CitizenId::new(),
            is_anonymous: false,
            priority: Priority::Normal,
            image_url: None,
            audio_url: None,
        });
        issue.status = status;
        issue.created_at = created_at;
        issue
    }

    fn resolved_after(created_at: DateTime<Utc>, hours: i64) -> Issue {
        let mut issue = issue(IssueStatus::Resolved, created_at);
        issue.resolved_at = Some(created_at + Duration::hours(hours));
        issue
    }

    #[test]
    fn test_rates_are_zero_without_issues() {
        assert_eq!(response_rate(&[]), 0);
        assert_eq!(resolution_rate(&[]), 0);
        assert_eq!(average_resolution_days(&[]), 0.0);
    }

    #[test]
    fn test_rates_round_to_whole_percent() {
        let now = Utc::now();
        let issues = vec![
            issue(IssueStatus::Pending, now),
            issue(IssueStatus::UnderReview, now),
            resolved_after(now, 1),
        ];
        assert_eq!(response_rate(&issues), 67);
        assert_eq!(resolution_rate(&issues), 33);
    }

    #[test]
    fn test_average_resolution_rounds_to_one_decimal() {
        let now = Utc::now();
        // 1 day and 2.5 days average to 1.75, shown as 1.8
        let issues = vec![resolved_after(now, 24), resolved_after(now, 60)];
        assert_eq!(average_resolution_days(&issues), 1.8);
    }

    #[test]
    fn test_unresolved_issues_do_not_count_towards_average() {
        let now = Utc::now();
        let mut in_progress = issue(IssueStatus::InProgress, now);
        in_progress.resolved_at = Some(now + Duration::days(30));
        let issues = vec![in_progress, resolved_after(now, 48)];
        assert_eq!(average_resolution_days(&issues), 2.0);
    }

    #[test]
    fn test_department_buckets() {
        let now = Utc::now();
        let mut forwarded = issue(IssueStatus::Forwarded, now);
        forwarded.assignment = Some(Assignment {
            assigned_to_id: AuthorityId::new(),
            department_name: "health".to_string(),
            assigned_at: now,
        });
        let issues = vec![forwarded, issue(IssueStatus::UnderReview, now)];

        let counts = count_by_department(&issues);
        assert_eq!(counts.get("health"), Some(&1));
        assert_eq!(counts.get(UNASSIGNED_DEPARTMENT), Some(&1));
    }

    #[test]
    fn test_status_counts_include_disputed() {
        let now = Utc::now();
        let mut disputed = resolved_after(now, 5);
        disputed.dispute = true;
        let counts = count_by_status(&[disputed, issue(IssueStatus::Forwarded, now)]);
        assert_eq!(counts.resolved, 1);
        assert_eq!(counts.forwarded, 1);
        assert_eq!(counts.disputed, 1);
        assert_eq!(counts.total, 2);
    }

    #[test]
    fn test_monthly_report_windows() {
        let office = Office::new("Ward 7", Coordinate::new(0.0, 0.0).unwrap());
        let end = Utc::now();
        let issues: Vec<Issue> = (0..15)
            .map(|d| issue(IssueStatus::UnderReview, end - Duration::days(d * 3)))
            .collect();

        let report = monthly_report(&office, end, &issues);
        // created 0, 3 and 6 days ago
        assert_eq!(report.weekly.by_status.total, 3);
        // created 0..=30 days ago
        assert_eq!(report.monthly.by_status.total, 11);
        assert_eq!(report.recent_issues.len(), RECENT_ISSUE_COUNT);
        assert_eq!(report.recent_issues[0].created_at, end);
    }
}
