//! Issue store implementation.
//!
//! PostgreSQL-backed implementation of the application's `IssueStore` port.
//! Lifecycle commits run in one transaction guarded by the issue's version
//! column; votes rely on the `(issue_id, citizen_id)` primary key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use civic_issues_application::{ApplicationResult, AssignmentState, IssueFilter, IssueStore};
use civic_issues_common::{DateRange, PaginatedResult, PaginationParams};
use civic_issues_domain::errors::{ConflictError, NotFoundError};
use civic_issues_domain::{
    AppError, Authority, AuthorityId, BoundingBox, Citizen, CitizenId, DecisionChange, Issue,
    IssueChange, IssueId, IssueStatus, Notification, Office, OfficeId,
};

use super::rows::{self, ISSUE_COLUMNS};
use crate::database::{unique_violation, TransactionExt};
use crate::{Error, Result};

fn rejected(err: impl Into<AppError>) -> Error {
    Error::Rejected(err.into())
}

/// Bound parameter of a dynamically built issue query
#[derive(Debug, Clone)]
enum Bind {
    Uuid(Uuid),
    Bool(bool),
    Text(String),
    Time(DateTime<Utc>),
}

/// Applies `binds` in order to a sqlx query of any flavour.
macro_rules! bind_all {
    ($query:expr, $binds:expr) => {{
        let mut query = $query;
        for bind in $binds {
            query = match bind {
                Bind::Uuid(v) => query.bind(*v),
                Bind::Bool(v) => query.bind(*v),
                Bind::Text(v) => query.bind(v.clone()),
                Bind::Time(v) => query.bind(*v),
            };
        }
        query
    }};
}

/// WHERE clause equivalent to [`IssueFilter::matches`], optionally windowed
/// on creation time.
#[derive(Debug, Default)]
struct IssueQuery {
    conditions: Vec<String>,
    binds: Vec<Bind>,
}

impl IssueQuery {
    fn new(filter: &IssueFilter, range: Option<&DateRange>) -> Self {
        let mut query = Self::default();

        if let Some(office_id) = filter.office_id {
            query.push("office_id = {}", Bind::Uuid(office_id.into_uuid()));
        }
        if let Some(authority_id) = filter.assigned_to {
            query.push("assigned_to_id = {}", Bind::Uuid(authority_id.into_uuid()));
        }
        match filter.assignment {
            AssignmentState::Any => {}
            AssignmentState::Unassigned => query.conditions.push("assigned_to_id IS NULL".into()),
            AssignmentState::Assigned => query.conditions.push("assigned_to_id IS NOT NULL".into()),
        }
        if let Some(disputed) = filter.disputed {
            query.push("dispute = {}", Bind::Bool(disputed));
        }
        if let Some(ref search) = filter.search {
            let template = if filter.search_department {
                "(title ILIKE {} OR description ILIKE {} OR address ILIKE {} OR department_name ILIKE {})"
            } else {
                "(title ILIKE {} OR description ILIKE {} OR address ILIKE {})"
            };
            query.push(template, Bind::Text(rows::contains_pattern(search)));
        }
        if let Some(range) = range {
            query.push("created_at >= {}", Bind::Time(range.start));
            query.push("created_at <= {}", Bind::Time(range.end));
        }
        query
    }

    /// Add a condition; every `{}` in `template` refers to the same parameter
    fn push(&mut self, template: &str, bind: Bind) {
        self.binds.push(bind);
        let placeholder = format!("${}", self.binds.len());
        self.conditions.push(template.replace("{}", &placeholder));
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            "TRUE".to_string()
        } else {
            self.conditions.join(" AND ")
        }
    }
}

/// PostgreSQL implementation of IssueStore.
#[derive(Clone)]
pub struct PgIssueStore {
    pool: PgPool,
}

impl PgIssueStore {
    /// Create a new PostgreSQL issue store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn employees(&self, office_ids: &[Uuid]) -> Result<HashMap<OfficeId, Vec<Authority>>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, office_id, role, department_name, created_at
            FROM authorities
            WHERE office_id = ANY($1)
            ORDER BY created_at, id
            "#,
        )
        .bind(office_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_office: HashMap<OfficeId, Vec<Authority>> = HashMap::new();
        for row in &rows {
            let authority = rows::authority(row)?;
            by_office.entry(authority.office_id).or_default().push(authority);
        }
        Ok(by_office)
    }

    /// Attach updates, upvotes and pending decisions to bare issue rows
    async fn hydrate(&self, mut issues: Vec<Issue>) -> Result<Vec<Issue>> {
        if issues.is_empty() {
            return Ok(issues);
        }
        let ids: Vec<Uuid> = issues.iter().map(|i| i.id.into_uuid()).collect();

        let update_rows = sqlx::query(
            r#"
            SELECT id, issue_id, description, created_at
            FROM issue_updates
            WHERE issue_id = ANY($1)
            ORDER BY created_at, id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let vote_rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
            "SELECT issue_id, citizen_id FROM issue_upvotes WHERE issue_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let decision_rows = sqlx::query(
            r#"
            SELECT id, issue_id, citizen_id, title, description, created_at
            FROM notifications
            WHERE issue_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_id: HashMap<IssueId, &mut Issue> =
            issues.iter_mut().map(|i| (i.id, i)).collect();
        for row in &update_rows {
            let update = rows::update(row)?;
            if let Some(issue) = by_id.get_mut(&update.issue_id) {
                issue.updates.push(update);
            }
        }
        for (issue_id, citizen_id) in vote_rows {
            if let Some(issue) = by_id.get_mut(&IssueId::from_uuid(issue_id)) {
                issue.upvotes.insert(CitizenId::from_uuid(citizen_id));
            }
        }
        for row in &decision_rows {
            let notification = rows::notification(row)?;
            if let Some(issue) = by_id.get_mut(&notification.issue_id) {
                issue.pending_decision = Some(notification);
            }
        }

        Ok(issues)
    }

    async fn fetch_issue(&self, id: IssueId) -> Result<Option<Issue>> {
        let sql = format!("SELECT {} FROM issues WHERE id = $1", ISSUE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let issue = rows::issue(&row)?;
                Ok(self.hydrate(vec![issue]).await?.pop())
            }
            None => Ok(None),
        }
    }

    async fn select_issues(
        &self,
        query: &IssueQuery,
        page: Option<&PaginationParams>,
    ) -> Result<Vec<Issue>> {
        let window = page
            .map(|p| format!("LIMIT {} OFFSET {}", p.limit, p.offset()))
            .unwrap_or_default();
        let sql = format!(
            r#"
            SELECT {}
            FROM issues
            WHERE {}
            ORDER BY created_at DESC, id DESC
            {}
            "#,
            ISSUE_COLUMNS,
            query.where_clause(),
            window
        );

        let rows = bind_all!(sqlx::query(&sql), &query.binds)
            .fetch_all(&self.pool)
            .await?;
        let issues = rows.iter().map(rows::issue).collect::<Result<Vec<_>>>()?;
        self.hydrate(issues).await
    }

    async fn issue_exists(&self, id: IssueId) -> Result<bool> {
        let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM issues WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn write_issue(tx: &mut Transaction<'_, Postgres>, issue: &Issue) -> Result<()> {
        let assignment = issue.assignment.as_ref();
        sqlx::query(
            r#"
            INSERT INTO issues (
                id, title, description, address, latitude, longitude, office_id, reporter_id,
                is_anonymous, status, priority, assigned_to_id, department_name, assigned_at,
                image_url, audio_url, resolution_confirmed, dispute, dispute_message, fault,
                resolved_at, conflict_resolved_at, created_at, updated_at, version
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25
            )
            "#,
        )
        .bind(issue.id.as_uuid())
        .bind(&issue.title)
        .bind(&issue.description)
        .bind(&issue.address)
        .bind(issue.location.lat())
        .bind(issue.location.lon())
        .bind(issue.office_id.as_uuid())
        .bind(issue.reporter_id.as_uuid())
        .bind(issue.is_anonymous)
        .bind(issue.status.as_str())
        .bind(issue.priority.as_str())
        .bind(assignment.map(|a| a.assigned_to_id.into_uuid()))
        .bind(assignment.map(|a| a.department_name.clone()))
        .bind(assignment.map(|a| a.assigned_at))
        .bind(&issue.image_url)
        .bind(&issue.audio_url)
        .bind(issue.resolution_confirmed)
        .bind(issue.dispute)
        .bind(&issue.dispute_message)
        .bind(issue.fault.map(|f| f.as_str()))
        .bind(issue.resolved_at)
        .bind(issue.conflict_resolved_at)
        .bind(issue.created_at)
        .bind(issue.updated_at)
        .bind(issue.version)
        .execute(&mut **tx)
        .await?;

        for update in &issue.updates {
            Self::write_update(tx, update).await?;
        }
        for citizen_id in &issue.upvotes {
            sqlx::query("INSERT INTO issue_upvotes (issue_id, citizen_id) VALUES ($1, $2)")
                .bind(issue.id.as_uuid())
                .bind(citizen_id.as_uuid())
                .execute(&mut **tx)
                .await?;
        }
        if let Some(ref notification) = issue.pending_decision {
            Self::write_notification(tx, notification).await?;
        }
        Ok(())
    }

    async fn write_update(
        tx: &mut Transaction<'_, Postgres>,
        update: &civic_issues_domain::Update,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO issue_updates (id, issue_id, description, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(update.id.as_uuid())
        .bind(update.issue_id.as_uuid())
        .bind(&update.description)
        .bind(update.created_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn write_notification(
        tx: &mut Transaction<'_, Postgres>,
        notification: &Notification,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, issue_id, citizen_id, title, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(notification.id.as_uuid())
        .bind(notification.issue_id.as_uuid())
        .bind(notification.citizen_id.as_uuid())
        .bind(&notification.title)
        .bind(&notification.description)
        .bind(notification.created_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Apply one planned change; any failure aborts the whole transaction
    async fn apply_change(tx: &mut Transaction<'_, Postgres>, change: &IssueChange) -> Result<()> {
        let issue = &change.issue;
        let assignment = issue.assignment.as_ref();

        let updated = sqlx::query(
            r#"
            UPDATE issues SET
                status = $3,
                priority = $4,
                assigned_to_id = $5,
                department_name = $6,
                assigned_at = $7,
                resolution_confirmed = $8,
                dispute = $9,
                dispute_message = $10,
                fault = $11,
                resolved_at = $12,
                conflict_resolved_at = $13,
                updated_at = $14,
                version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(issue.id.as_uuid())
        .bind(change.expected_version)
        .bind(issue.status.as_str())
        .bind(issue.priority.as_str())
        .bind(assignment.map(|a| a.assigned_to_id.into_uuid()))
        .bind(assignment.map(|a| a.department_name.clone()))
        .bind(assignment.map(|a| a.assigned_at))
        .bind(issue.resolution_confirmed)
        .bind(issue.dispute)
        .bind(&issue.dispute_message)
        .bind(issue.fault.map(|f| f.as_str()))
        .bind(issue.resolved_at)
        .bind(issue.conflict_resolved_at)
        .bind(issue.updated_at)
        .execute(&mut **tx)
        .await?;

        if updated.rows_affected() == 0 {
            let current: Option<i64> = sqlx::query_scalar("SELECT version FROM issues WHERE id = $1")
                .bind(issue.id.as_uuid())
                .fetch_optional(&mut **tx)
                .await?;
            return Err(match current {
                None => rejected(NotFoundError::Issue(issue.id)),
                Some(_) => rejected(ConflictError::ConcurrentModification(issue.id)),
            });
        }

        if let Some(ref update) = change.appended_update {
            Self::write_update(tx, update).await?;
        }

        match change.decision {
            DecisionChange::Keep => {}
            DecisionChange::Open(ref notification) => {
                Self::write_notification(tx, notification).await?;
            }
            DecisionChange::Consume(notification_id) => {
                let deleted = sqlx::query("DELETE FROM notifications WHERE id = $1 AND issue_id = $2")
                    .bind(notification_id.as_uuid())
                    .bind(issue.id.as_uuid())
                    .execute(&mut **tx)
                    .await?;
                if deleted.rows_affected() == 0 {
                    return Err(rejected(NotFoundError::Notification(notification_id)));
                }
            }
        }

        if let Some(delta) = change.reputation {
            let adjusted = sqlx::query(
                "UPDATE citizens SET reputation_points = reputation_points + $1 WHERE id = $2",
            )
            .bind(delta.delta)
            .bind(delta.citizen_id.as_uuid())
            .execute(&mut **tx)
            .await?;
            if adjusted.rows_affected() == 0 {
                return Err(rejected(NotFoundError::Citizen(delta.citizen_id)));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl IssueStore for PgIssueStore {
    #[instrument(skip(self, office), fields(office_id = %office.id))]
    async fn insert_office(&self, office: &Office) -> ApplicationResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO offices (id, name, latitude, longitude, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(office.id.as_uuid())
        .bind(office.name.trim())
        .bind(office.location.lat())
        .bind(office.location.lon())
        .bind(office.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!("Office stored");
                Ok(())
            }
            Err(e) => Err(match unique_violation(&e).as_deref() {
                Some("offices_name_key") => ConflictError::DuplicateOffice(office.name.clone()).into(),
                Some(_) => ConflictError::DuplicateId(office.id.to_string()).into(),
                None => Error::from(e).into(),
            }),
        }
    }

    #[instrument(skip(self))]
    async fn list_offices(&self) -> ApplicationResult<Vec<Office>> {
        let rows = sqlx::query(
            "SELECT id, name, latitude, longitude, created_at FROM offices ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::from)?;

        let ids: Vec<Uuid> = rows
            .iter()
            .map(|row| sqlx::Row::try_get::<Uuid, _>(row, "id"))
            .collect::<std::result::Result<_, _>>()
            .map_err(Error::from)?;
        let mut employees = self.employees(&ids).await?;

        let mut offices = Vec::with_capacity(rows.len());
        for row in &rows {
            let id = OfficeId::from_uuid(sqlx::Row::try_get(row, "id").map_err(Error::from)?);
            offices.push(rows::office(row, employees.remove(&id).unwrap_or_default())?);
        }
        Ok(offices)
    }

    #[instrument(skip(self))]
    async fn get_office(&self, id: OfficeId) -> ApplicationResult<Option<Office>> {
        let row = sqlx::query(
            "SELECT id, name, latitude, longitude, created_at FROM offices WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::from)?;

        match row {
            Some(row) => {
                let mut employees = self.employees(&[id.into_uuid()]).await?;
                Ok(Some(rows::office(&row, employees.remove(&id).unwrap_or_default())?))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, authority), fields(authority_id = %authority.id, office_id = %authority.office_id))]
    async fn insert_authority(&self, authority: &Authority) -> ApplicationResult<()> {
        let office: Option<i32> = sqlx::query_scalar("SELECT 1 FROM offices WHERE id = $1")
            .bind(authority.office_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::from)?;
        if office.is_none() {
            return Err(NotFoundError::Office(authority.office_id).into());
        }

        let result = sqlx::query(
            r#"
            INSERT INTO authorities (id, name, email, office_id, role, department_name, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(authority.id.as_uuid())
        .bind(&authority.name)
        .bind(&authority.email)
        .bind(authority.office_id.as_uuid())
        .bind(&authority.role)
        .bind(&authority.department_name)
        .bind(authority.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => Err(match unique_violation(&e).as_deref() {
                Some("authorities_office_role_key") => ConflictError::DuplicateRole {
                    office_id: authority.office_id,
                    role: authority.role.clone(),
                }
                .into(),
                Some("authorities_email_key") => {
                    ConflictError::DuplicateId(authority.email.clone()).into()
                }
                Some(_) => ConflictError::DuplicateId(authority.id.to_string()).into(),
                None => Error::from(e).into(),
            }),
        }
    }

    #[instrument(skip(self))]
    async fn get_authority(&self, id: AuthorityId) -> ApplicationResult<Option<Authority>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, office_id, role, department_name, created_at
            FROM authorities
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::from)?;

        Ok(row.as_ref().map(rows::authority).transpose()?)
    }

    #[instrument(skip(self, citizen), fields(citizen_id = %citizen.id))]
    async fn insert_citizen(&self, citizen: &Citizen) -> ApplicationResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO citizens (id, name, phone, reputation_points, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(citizen.id.as_uuid())
        .bind(&citizen.name)
        .bind(&citizen.phone)
        .bind(citizen.reputation_points)
        .bind(citizen.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if unique_violation(&e).is_some() => {
                Err(ConflictError::DuplicateId(citizen.id.to_string()).into())
            }
            Err(e) => Err(Error::from(e).into()),
        }
    }

    #[instrument(skip(self))]
    async fn get_citizen(&self, id: CitizenId) -> ApplicationResult<Option<Citizen>> {
        let row = sqlx::query(
            "SELECT id, name, phone, reputation_points, created_at FROM citizens WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::from)?;

        Ok(row.as_ref().map(rows::citizen).transpose()?)
    }

    #[instrument(skip(self, issue), fields(issue_id = %issue.id, office_id = %issue.office_id))]
    async fn insert_issue(&self, issue: &Issue) -> ApplicationResult<()> {
        let mut tx = self.pool.begin().await.map_err(Error::from)?;
        let result = Self::write_issue(&mut tx, issue).await;
        match tx.commit_or_rollback(result).await {
            Ok(()) => {
                debug!("Issue stored");
                Ok(())
            }
            Err(Error::Database(e)) if unique_violation(&e).is_some() => {
                Err(ConflictError::DuplicateId(issue.id.to_string()).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn get_issue(&self, id: IssueId) -> ApplicationResult<Option<Issue>> {
        Ok(self.fetch_issue(id).await?)
    }

    #[instrument(skip(self))]
    async fn open_issues_in_bounds(&self, bounds: &BoundingBox) -> ApplicationResult<Vec<Issue>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM issues
            WHERE status <> $1
              AND latitude BETWEEN $2 AND $3
              AND longitude BETWEEN $4 AND $5
            "#,
            ISSUE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(IssueStatus::Resolved.as_str())
            .bind(bounds.min_lat)
            .bind(bounds.max_lat)
            .bind(bounds.min_lon)
            .bind(bounds.max_lon)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::from)?;

        let issues = rows.iter().map(rows::issue).collect::<Result<Vec<_>>>()?;
        debug!(candidates = issues.len(), "Bounding box prefilter");
        Ok(self.hydrate(issues).await?)
    }

    #[instrument(skip(self, filter, page))]
    async fn list_issues(
        &self,
        filter: &IssueFilter,
        page: &PaginationParams,
    ) -> ApplicationResult<PaginatedResult<Issue>> {
        let query = IssueQuery::new(filter, None);

        let count_sql = format!("SELECT COUNT(*) FROM issues WHERE {}", query.where_clause());
        let total: i64 = bind_all!(sqlx::query_scalar::<_, i64>(&count_sql), &query.binds)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::from)?;

        let items = self.select_issues(&query, Some(page)).await?;
        Ok(PaginatedResult::from_params(items, page, total.max(0) as u64))
    }

    #[instrument(skip(self, filter))]
    async fn issues_created_between(
        &self,
        filter: &IssueFilter,
        range: &DateRange,
    ) -> ApplicationResult<Vec<Issue>> {
        let query = IssueQuery::new(filter, Some(range));
        Ok(self.select_issues(&query, None).await?)
    }

    #[instrument(skip(self))]
    async fn pending_decisions(&self, citizen_id: CitizenId) -> ApplicationResult<Vec<Notification>> {
        let rows = sqlx::query(
            r#"
            SELECT id, issue_id, citizen_id, title, description, created_at
            FROM notifications
            WHERE citizen_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(citizen_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::from)?;

        Ok(rows.iter().map(rows::notification).collect::<Result<Vec<_>>>()?)
    }

    #[instrument(skip(self, change), fields(issue_id = %change.issue.id, expected_version = change.expected_version))]
    async fn commit(&self, change: IssueChange) -> ApplicationResult<Issue> {
        let issue_id = change.issue.id;
        let mut tx = self.pool.begin().await.map_err(Error::from)?;
        let result = Self::apply_change(&mut tx, &change).await;
        tx.commit_or_rollback(result).await?;

        debug!("Issue change committed");
        self.fetch_issue(issue_id)
            .await?
            .ok_or_else(|| NotFoundError::Issue(issue_id).into())
    }

    #[instrument(skip(self))]
    async fn add_upvote(&self, issue_id: IssueId, citizen_id: CitizenId) -> ApplicationResult<bool> {
        if !self.issue_exists(issue_id).await? {
            return Err(NotFoundError::Issue(issue_id).into());
        }
        let inserted = sqlx::query(
            r#"
            INSERT INTO issue_upvotes (issue_id, citizen_id)
            VALUES ($1, $2)
            ON CONFLICT (issue_id, citizen_id) DO NOTHING
            "#,
        )
        .bind(issue_id.as_uuid())
        .bind(citizen_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(Error::from)?;

        Ok(inserted.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn remove_upvote(
        &self,
        issue_id: IssueId,
        citizen_id: CitizenId,
    ) -> ApplicationResult<bool> {
        if !self.issue_exists(issue_id).await? {
            return Err(NotFoundError::Issue(issue_id).into());
        }
        let deleted = sqlx::query("DELETE FROM issue_upvotes WHERE issue_id = $1 AND citizen_id = $2")
            .bind(issue_id.as_uuid())
            .bind(citizen_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(Error::from)?;

        Ok(deleted.rows_affected() == 1)
    }

    async fn health_check(&self) -> ApplicationResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::from)?;
        Ok(())
    }
}
