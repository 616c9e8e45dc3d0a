//! Issue models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Prefix of every human-readable issue identifier
pub const ISSUE_ID_PREFIX: &str = "CIV-";

/// Maximum number of issues returned by a listing
pub const LIST_LIMIT: i64 = 200;

/// Render the human-readable identifier for the `number`-th issue
pub fn format_issue_id(number: u64) -> String {
    format!("{}{:06}", ISSUE_ID_PREFIX, number)
}

/// Issue category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueCategory {
    Roads,
    Electricity,
    #[serde(rename = "Waste Management")]
    WasteManagement,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Roads => "Roads",
            IssueCategory::Electricity => "Electricity",
            IssueCategory::WasteManagement => "Waste Management",
        }
    }
}

impl FromStr for IssueCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Roads" => Ok(IssueCategory::Roads),
            "Electricity" => Ok(IssueCategory::Electricity),
            "Waste Management" => Ok(IssueCategory::WasteManagement),
            other => Err(format!("Invalid category: {}", other)),
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow status: New → In Progress → Resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IssueStatus {
    #[default]
    New,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::New => "New",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Resolved => "Resolved",
        }
    }
}

impl FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(IssueStatus::New),
            "In Progress" => Ok(IssueStatus::InProgress),
            "Resolved" => Ok(IssueStatus::Resolved),
            other => Err(format!("Invalid status: {}", other)),
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reporter contact details, captured when the issue is submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reporter {
    pub username: String,
    pub email: String,
    pub phone: String,
}

/// Geographic position of an issue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Issue entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: Uuid,
    pub issue_id: String,
    pub title: String,
    pub details: String,
    pub category: IssueCategory,
    pub status: IssueStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub reporter: Reporter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    pub sub_issues: Vec<String>,
    pub rating: Option<u8>,
    pub assigned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated issue ready to be stored
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub details: String,
    pub category: IssueCategory,
    pub photo_url: Option<String>,
    pub reporter: Reporter,
    pub location: Option<GeoPoint>,
}

/// Reporter block of a submission; fields are checked by the service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReporterInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Issue submission payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueRequest {
    pub title: Option<String>,
    pub details: Option<String>,
    pub category: Option<String>,
    pub photo_url: Option<String>,
    pub reporter: Option<ReporterInput>,
    pub location: Option<GeoPoint>,
}

/// A single permitted change to an existing issue
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IssueUpdate {
    SetStatus(IssueStatus),
    SetRating(u8),
    SetAssigned(bool),
}

/// Body of a partial update. Only workflow fields may be changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssuePatch {
    pub status: Option<IssueStatus>,
    pub rating: Option<u8>,
    pub assigned: Option<bool>,
}

impl IssuePatch {
    /// Turn the patch into the list of updates it requests
    pub fn into_updates(self) -> Result<Vec<IssueUpdate>, String> {
        let mut updates = Vec::new();

        if let Some(status) = self.status {
            updates.push(IssueUpdate::SetStatus(status));
        }
        if let Some(rating) = self.rating {
            if !(1..=5).contains(&rating) {
                return Err("Rating must be between 1 and 5".to_string());
            }
            updates.push(IssueUpdate::SetRating(rating));
        }
        if let Some(assigned) = self.assigned {
            updates.push(IssueUpdate::SetAssigned(assigned));
        }

        if updates.is_empty() {
            return Err("No updatable fields supplied".to_string());
        }
        Ok(updates)
    }
}

/// Query parameters for issue listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueQuery {
    pub status: Option<String>,
    pub category: Option<String>,
}

/// Equality filters applied to listings and counts
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IssueFilter {
    pub status: Option<IssueStatus>,
    pub category: Option<IssueCategory>,
}

impl IssueFilter {
    pub fn matches(&self, issue: &Issue) -> bool {
        self.status.is_none_or(|status| issue.status == status)
            && self.category.is_none_or(|category| issue.category == category)
    }
}

impl TryFrom<IssueQuery> for IssueFilter {
    type Error = String;

    /// Empty parameters are treated as absent
    fn try_from(query: IssueQuery) -> Result<Self, Self::Error> {
        let status = query
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::parse::<IssueStatus>)
            .transpose()?;
        let category = query
            .category
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::parse::<IssueCategory>)
            .transpose()?;

        Ok(Self { status, category })
    }
}
