//! Issue lifecycle: submission, lookup, workflow updates and listing

use std::sync::Arc;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        CreateIssueRequest, Issue, IssueCategory, IssueFilter, IssueUpdate, NewIssue, Reporter,
        issue::LIST_LIMIT,
    },
    repositories::IssueStore,
};

const ISSUE_NOT_FOUND: &str = "Issue not found";

/// Issue service
#[derive(Clone)]
pub struct IssueService {
    store: Arc<dyn IssueStore>,
}

fn present(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl IssueService {
    pub fn new(store: Arc<dyn IssueStore>) -> Self {
        Self { store }
    }

    /// Validate and store a submitted issue. New issues start in `New`.
    pub async fn create(&self, request: CreateIssueRequest) -> ApiResult<Issue> {
        let reporter = request.reporter.unwrap_or_default();

        let (
            Some(title),
            Some(details),
            Some(category),
            Some(username),
            Some(email),
            Some(phone),
        ) = (
            present(request.title),
            present(request.details),
            present(request.category),
            present(reporter.username),
            present(reporter.email),
            present(reporter.phone),
        )
        else {
            return Err(ApiError::BadRequest("Missing required fields".to_string()));
        };

        let category = category
            .parse::<IssueCategory>()
            .map_err(ApiError::BadRequest)?;

        let new_issue = NewIssue {
            title,
            details,
            category,
            photo_url: present(request.photo_url),
            reporter: Reporter {
                username,
                email: email.to_lowercase(),
                phone,
            },
            location: request.location,
        };

        let issue = self.store.create(&new_issue).await?;
        info!(
            "Issue {} reported by {} in {}",
            issue.issue_id, issue.reporter.username, issue.category
        );
        Ok(issue)
    }

    pub async fn get(&self, issue_id: &str) -> ApiResult<Issue> {
        self.store
            .find_by_issue_id(issue_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(ISSUE_NOT_FOUND.to_string()))
    }

    /// Apply allow-listed updates to an existing issue
    pub async fn update(&self, issue_id: &str, updates: &[IssueUpdate]) -> ApiResult<Issue> {
        if updates.is_empty() {
            return Err(ApiError::BadRequest(
                "No updatable fields supplied".to_string(),
            ));
        }

        let issue = self
            .store
            .apply_updates(issue_id, updates)
            .await?
            .ok_or_else(|| ApiError::NotFound(ISSUE_NOT_FOUND.to_string()))?;

        info!("Issue {} updated to status {}", issue.issue_id, issue.status);
        Ok(issue)
    }

    /// Newest first, capped at `LIST_LIMIT`
    pub async fn list(&self, filter: &IssueFilter) -> ApiResult<Vec<Issue>> {
        Ok(self.store.list(filter, LIST_LIMIT).await?)
    }

    pub async fn count(&self, filter: &IssueFilter) -> ApiResult<i64> {
        Ok(self.store.count(filter).await?)
    }
}
