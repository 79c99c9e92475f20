//! Row decoding shared by the PostgreSQL store.

use civic_issues_domain::{
    Assignment, Authority, AuthorityId, Citizen, CitizenId, Coordinate, Fault, Issue, IssueId,
    IssueStatus, Notification, NotificationId, Office, OfficeId, Priority, Update, UpdateId,
};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::collections::BTreeSet;
use std::str::FromStr;
use uuid::Uuid;

use crate::{Error, Result};

pub(crate) const ISSUE_COLUMNS: &str = r#"
    id, title, description, address, latitude, longitude, office_id, reporter_id,
    is_anonymous, status, priority, assigned_to_id, department_name, assigned_at,
    image_url, audio_url, resolution_confirmed, dispute, dispute_message, fault,
    resolved_at, conflict_resolved_at, created_at, updated_at, version
"#;

fn decode<T: FromStr<Err = String>>(value: &str) -> Result<T> {
    T::from_str(value).map_err(Error::Decode)
}

fn location(row: &PgRow) -> Result<Coordinate> {
    Coordinate::new(row.try_get("latitude")?, row.try_get("longitude")?)
        .map_err(|e| Error::Decode(e.to_string()))
}

pub(crate) fn office(row: &PgRow, employees: Vec<Authority>) -> Result<Office> {
    Ok(Office {
        id: OfficeId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        location: location(row)?,
        employees,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn authority(row: &PgRow) -> Result<Authority> {
    Ok(Authority {
        id: AuthorityId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        office_id: OfficeId::from_uuid(row.try_get("office_id")?),
        role: row.try_get("role")?,
        department_name: row.try_get("department_name")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn citizen(row: &PgRow) -> Result<Citizen> {
    Ok(Citizen {
        id: CitizenId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        reputation_points: row.try_get("reputation_points")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Issue without its updates, votes and pending decision
pub(crate) fn issue(row: &PgRow) -> Result<Issue> {
    let status: String = row.try_get("status")?;
    let priority: String = row.try_get("priority")?;
    let fault: Option<String> = row.try_get("fault")?;

    let assigned_to: Option<Uuid> = row.try_get("assigned_to_id")?;
    let department: Option<String> = row.try_get("department_name")?;
    let assigned_at: Option<DateTime<Utc>> = row.try_get("assigned_at")?;
    let assignment = match (assigned_to, department, assigned_at) {
        (Some(id), Some(department_name), Some(assigned_at)) => Some(Assignment {
            assigned_to_id: AuthorityId::from_uuid(id),
            department_name,
            assigned_at,
        }),
        (None, None, None) => None,
        _ => return Err(Error::Decode("partial assignment".to_string())),
    };

    Ok(Issue {
        id: IssueId::from_uuid(row.try_get("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        address: row.try_get("address")?,
        location: location(row)?,
        office_id: OfficeId::from_uuid(row.try_get("office_id")?),
        reporter_id: CitizenId::from_uuid(row.try_get("reporter_id")?),
        is_anonymous: row.try_get("is_anonymous")?,
        status: decode::<IssueStatus>(&status)?,
        assignment,
        priority: decode::<Priority>(&priority)?,
        image_url: row.try_get("image_url")?,
        audio_url: row.try_get("audio_url")?,
        resolution_confirmed: row.try_get("resolution_confirmed")?,
        dispute: row.try_get("dispute")?,
        dispute_message: row.try_get("dispute_message")?,
        fault: fault.as_deref().map(decode::<Fault>).transpose()?,
        resolved_at: row.try_get("resolved_at")?,
        conflict_resolved_at: row.try_get("conflict_resolved_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        updates: Vec::new(),
        upvotes: BTreeSet::new(),
        pending_decision: None,
        version: row.try_get("version")?,
    })
}

pub(crate) fn update(row: &PgRow) -> Result<Update> {
    Ok(Update {
        id: UpdateId::from_uuid(row.try_get("id")?),
        issue_id: IssueId::from_uuid(row.try_get("issue_id")?),
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn notification(row: &PgRow) -> Result<Notification> {
    Ok(Notification {
        id: NotificationId::from_uuid(row.try_get("id")?),
        issue_id: IssueId::from_uuid(row.try_get("issue_id")?),
        citizen_id: CitizenId::from_uuid(row.try_get("citizen_id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}

/// `ILIKE` pattern matching `term` literally anywhere
pub(crate) fn contains_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern(" pothole "), "%pothole%");
        assert_eq!(contains_pattern("100%_done"), "%100\\%\\_done%");
    }
}
