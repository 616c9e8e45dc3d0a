//! Issue repository for database operations

use async_trait::async_trait;
use civic_common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::{debug, info};

use super::IssueStore;
use crate::models::{
    GeoPoint, Issue, IssueCategory, IssueFilter, IssueStatus, IssueUpdate, NewIssue, Reporter,
};

const ISSUE_COLUMNS: &str = "id, issue_id, title, details, category, status, photo_url, \
     reporter_username, reporter_email, reporter_phone, location_lat, location_lng, \
     sub_issues, rating, assigned, created_at, updated_at";

/// PostgreSQL-backed issue repository
#[derive(Clone)]
pub struct IssueRepository {
    pool: PgPool,
}

impl IssueRepository {
    /// Create a new issue repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode_error(message: String) -> DatabaseError {
    DatabaseError::Query(sqlx::Error::Decode(message.into()))
}

fn issue_from_row(row: &PgRow) -> DatabaseResult<Issue> {
    let category: String = row.try_get("category").map_err(DatabaseError::Query)?;
    let status: String = row.try_get("status").map_err(DatabaseError::Query)?;
    let lat: Option<f64> = row.try_get("location_lat").map_err(DatabaseError::Query)?;
    let lng: Option<f64> = row.try_get("location_lng").map_err(DatabaseError::Query)?;
    let rating: Option<i16> = row.try_get("rating").map_err(DatabaseError::Query)?;

    let location = match (lat, lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
        _ => None,
    };
    let rating = rating
        .map(u8::try_from)
        .transpose()
        .map_err(|e| decode_error(format!("Invalid rating: {}", e)))?;

    Ok(Issue {
        id: row.try_get("id").map_err(DatabaseError::Query)?,
        issue_id: row.try_get("issue_id").map_err(DatabaseError::Query)?,
        title: row.try_get("title").map_err(DatabaseError::Query)?,
        details: row.try_get("details").map_err(DatabaseError::Query)?,
        category: category.parse::<IssueCategory>().map_err(decode_error)?,
        status: status.parse::<IssueStatus>().map_err(decode_error)?,
        photo_url: row.try_get("photo_url").map_err(DatabaseError::Query)?,
        reporter: Reporter {
            username: row
                .try_get("reporter_username")
                .map_err(DatabaseError::Query)?,
            email: row.try_get("reporter_email").map_err(DatabaseError::Query)?,
            phone: row.try_get("reporter_phone").map_err(DatabaseError::Query)?,
        },
        location,
        sub_issues: row.try_get("sub_issues").map_err(DatabaseError::Query)?,
        rating,
        assigned: row.try_get("assigned").map_err(DatabaseError::Query)?,
        created_at: row.try_get("created_at").map_err(DatabaseError::Query)?,
        updated_at: row.try_get("updated_at").map_err(DatabaseError::Query)?,
    })
}

/// Append the filter's equality conditions to a query ending in `WHERE TRUE`
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &IssueFilter) {
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(category) = filter.category {
        builder.push(" AND category = ").push_bind(category.as_str());
    }
}

#[async_trait]
impl IssueStore for IssueRepository {
    async fn create(&self, new_issue: &NewIssue) -> DatabaseResult<Issue> {
        let sql = format!(
            r#"
            INSERT INTO issues (title, details, category, photo_url, reporter_username,
                                reporter_email, reporter_phone, location_lat, location_lng)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            ISSUE_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(&new_issue.title)
            .bind(&new_issue.details)
            .bind(new_issue.category.as_str())
            .bind(&new_issue.photo_url)
            .bind(&new_issue.reporter.username)
            .bind(&new_issue.reporter.email)
            .bind(&new_issue.reporter.phone)
            .bind(new_issue.location.map(|point| point.lat))
            .bind(new_issue.location.map(|point| point.lng))
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        let issue = issue_from_row(&row)?;
        info!("Stored issue {}", issue.issue_id);
        Ok(issue)
    }

    async fn find_by_issue_id(&self, issue_id: &str) -> DatabaseResult<Option<Issue>> {
        let sql = format!("SELECT {} FROM issues WHERE issue_id = $1", ISSUE_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(issue_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(issue_from_row).transpose()
    }

    async fn apply_updates(
        &self,
        issue_id: &str,
        updates: &[IssueUpdate],
    ) -> DatabaseResult<Option<Issue>> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE issues SET updated_at = now()");
        for update in updates {
            match update {
                IssueUpdate::SetStatus(status) => {
                    builder.push(", status = ").push_bind(status.as_str());
                }
                IssueUpdate::SetRating(rating) => {
                    builder.push(", rating = ").push_bind(i16::from(*rating));
                }
                IssueUpdate::SetAssigned(assigned) => {
                    builder.push(", assigned = ").push_bind(*assigned);
                }
            }
        }
        builder.push(" WHERE issue_id = ").push_bind(issue_id);
        builder.push(" RETURNING ").push(ISSUE_COLUMNS);

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(issue_from_row).transpose()
    }

    async fn list(&self, filter: &IssueFilter, limit: i64) -> DatabaseResult<Vec<Issue>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM issues WHERE TRUE",
            ISSUE_COLUMNS
        ));
        push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY created_at DESC, issue_id DESC LIMIT ")
            .push_bind(limit);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;
        debug!("Listed {} issues", rows.len());

        rows.iter().map(issue_from_row).collect()
    }

    async fn count(&self, filter: &IssueFilter) -> DatabaseResult<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM issues WHERE TRUE");
        push_filter(&mut builder, filter);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }
}
