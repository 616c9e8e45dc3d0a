//! In-memory issue store for tests and database-less development runs

use async_trait::async_trait;
use chrono::{Duration, Utc};
use civic_common::error::DatabaseResult;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::IssueStore;
use crate::models::{
    Issue, IssueFilter, IssueStatus, IssueUpdate, NewIssue, issue::format_issue_id,
};

/// Issues kept in insertion order
#[derive(Debug, Default)]
pub struct InMemoryIssueRepository {
    issues: RwLock<Vec<Issue>>,
    sequence: AtomicU64,
}

impl InMemoryIssueRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IssueStore for InMemoryIssueRepository {
    async fn create(&self, new_issue: &NewIssue) -> DatabaseResult<Issue> {
        let number = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();

        let issue = Issue {
            id: Uuid::new_v4(),
            issue_id: format_issue_id(number),
            title: new_issue.title.clone(),
            details: new_issue.details.clone(),
            category: new_issue.category,
            status: IssueStatus::New,
            photo_url: new_issue.photo_url.clone(),
            reporter: new_issue.reporter.clone(),
            location: new_issue.location,
            sub_issues: Vec::new(),
            rating: None,
            assigned: false,
            created_at: now,
            updated_at: now,
        };

        self.issues.write().await.push(issue.clone());
        Ok(issue)
    }

    async fn find_by_issue_id(&self, issue_id: &str) -> DatabaseResult<Option<Issue>> {
        Ok(self
            .issues
            .read()
            .await
            .iter()
            .find(|issue| issue.issue_id == issue_id)
            .cloned())
    }

    async fn apply_updates(
        &self,
        issue_id: &str,
        updates: &[IssueUpdate],
    ) -> DatabaseResult<Option<Issue>> {
        let mut issues = self.issues.write().await;
        let Some(issue) = issues.iter_mut().find(|issue| issue.issue_id == issue_id) else {
            return Ok(None);
        };

        for update in updates {
            match *update {
                IssueUpdate::SetStatus(status) => issue.status = status,
                IssueUpdate::SetRating(rating) => issue.rating = Some(rating),
                IssueUpdate::SetAssigned(assigned) => issue.assigned = assigned,
            }
        }

        // Keep updated_at strictly increasing even within one clock tick.
        let now = Utc::now();
        issue.updated_at = if now > issue.updated_at {
            now
        } else {
            issue.updated_at + Duration::microseconds(1)
        };

        Ok(Some(issue.clone()))
    }

    async fn list(&self, filter: &IssueFilter, limit: i64) -> DatabaseResult<Vec<Issue>> {
        let limit = usize::try_from(limit).unwrap_or(0);

        Ok(self
            .issues
            .read()
            .await
            .iter()
            .rev()
            .filter(|issue| filter.matches(issue))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &IssueFilter) -> DatabaseResult<i64> {
        let count = self
            .issues
            .read()
            .await
            .iter()
            .filter(|issue| filter.matches(issue))
            .count();

        Ok(count as i64)
    }
}
