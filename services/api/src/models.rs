//! API models for request and response payloads

pub mod issue;

pub use issue::{
    CreateIssueRequest, GeoPoint, Issue, IssueCategory, IssueFilter, IssuePatch, IssueQuery,
    IssueStatus, IssueUpdate, NewIssue, Reporter, ReporterInput,
};
