//! Analytics and report read models

use super::{IssueDetail, IssueSummary, UpdateDto};
use chrono::{DateTime, Utc};
use civic_issues_common::DateRange;
use civic_issues_domain::{AuthorityId, Fault, OfficeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Issue counts per status, plus the disputed overlay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    #[serde(rename = "PENDING")]
    pub pending: u64,
    #[serde(rename = "UNDER_REVIEW")]
    pub under_review: u64,
    #[serde(rename = "FORWARDED")]
    pub forwarded: u64,
    #[serde(rename = "IN_PROGRESS")]
    pub in_progress: u64,
    #[serde(rename = "RESOLVED")]
    pub resolved: u64,
    pub disputed: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Mean days from creation to resolution, one decimal
    pub average_resolution_days: f64,
    /// Percentage of issues that left PENDING
    pub response_rate: u32,
    /// Percentage of issues that are RESOLVED
    pub resolution_rate: u32,
}

/// Statistics over one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub range: DateRange,
    pub by_status: StatusCounts,
    pub by_department: BTreeMap<String, u64>,
    pub performance: PerformanceMetrics,
}

/// Office-wide analytics for a representative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeAnalytics {
    pub office_id: OfficeId,
    pub office_name: String,
    #[serde(flatten)]
    pub stats: PeriodStats,
    pub issues: Vec<IssueSummary>,
}

/// Issues assigned to one authority inside the window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeAnalytics {
    pub authority_id: AuthorityId,
    pub range: DateRange,
    pub by_status: StatusCounts,
    pub issues: Vec<IssueDetail>,
}

/// Analytics scoped by the caller's role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum AnalyticsView {
    Office(OfficeAnalytics),
    Assignee(AssigneeAnalytics),
}

/// Office report covering the last week and the last thirty days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub office_id: OfficeId,
    pub office_name: String,
    pub generated_at: DateTime<Utc>,
    pub weekly: PeriodStats,
    pub monthly: PeriodStats,
    pub recent_issues: Vec<IssueSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeInfo {
    pub resolution_confirmed: bool,
    pub dispute: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<Fault>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_resolved_at: Option<DateTime<Utc>>,
}

/// Single-issue report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueReport {
    pub office_name: String,
    pub issue: IssueSummary,
    pub updates: Vec<UpdateDto>,
    pub upvote_count: usize,
    pub dispute: DisputeInfo,
    pub generated_at: DateTime<Utc>,
}
