//! Tool arguments and outputs

use crate::batch::{DEFAULT_CONCURRENCY, MAX_BATCH_SIZE, MAX_CONCURRENCY};
use crate::error::{Error, Result};
use crate::pagination::DEFAULT_PER_PAGE;
use crate::sentry::{IssueFilters, ProjectSelector};
use crate::types::Detail;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

const PER_PAGE_RANGE: RangeInclusive<usize> = 1..=100;
const LIMIT_RANGE: RangeInclusive<usize> = 1..=1000;
const CONCURRENCY_RANGE: RangeInclusive<usize> = 1..=MAX_CONCURRENCY;

/// Eager argument validation, run before any request is made
pub trait Validate {
    /// Reject out-of-range or contradictory arguments
    fn validate(&self) -> Result<()>;
}

// ============================================================================
// Arguments
// ============================================================================

/// Arguments of `sentry_organizations`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationsArgs {
    pub cursor: Option<String>,
    pub per_page: Option<usize>,
    pub brief_output: Option<bool>,
}

impl Validate for OrganizationsArgs {
    fn validate(&self) -> Result<()> {
        check_range("perPage", self.per_page, &PER_PAGE_RANGE)
    }
}

/// Arguments of `sentry_projects`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsArgs {
    pub org: String,
    pub query: Option<String>,
    pub cursor: Option<String>,
    pub per_page: Option<usize>,
    pub brief_output: Option<bool>,
}

impl Validate for ProjectsArgs {
    fn validate(&self) -> Result<()> {
        check_not_empty("org", &self.org)?;
        check_range("perPage", self.per_page, &PER_PAGE_RANGE)
    }
}

/// Arguments of `sentry_issues`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuesArgs {
    pub org: String,
    pub cursor: Option<String>,
    pub per_page: Option<usize>,
    /// Total item limit; enables automatic pagination
    pub limit: Option<usize>,
    pub query: Option<String>,
    pub environments: Option<Vec<String>>,
    pub stats_period: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub project: Option<ProjectSelector>,
    pub brief_output: Option<bool>,
}

impl IssuesArgs {
    /// Page size used by the walker
    pub fn items_per_page(&self) -> usize {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE)
    }

    /// Listing filters carried by these arguments
    pub fn filters(&self) -> IssueFilters {
        IssueFilters {
            query: self.query.clone(),
            environments: self.environments.clone().unwrap_or_default(),
            stats_period: self.stats_period.clone(),
            since: self.since.clone(),
            until: self.until.clone(),
            project: self.project.clone(),
        }
    }
}

impl Validate for IssuesArgs {
    fn validate(&self) -> Result<()> {
        check_not_empty("org", &self.org)?;
        check_range("perPage", self.per_page, &PER_PAGE_RANGE)?;
        check_range("limit", self.limit, &LIMIT_RANGE)?;

        let has_period = self.stats_period.as_deref().is_some_and(|p| !p.is_empty());
        if has_period && (self.since.is_some() || self.until.is_some()) {
            return Err(Error::invalid_argument(
                "statsPeriod",
                "Use either statsPeriod or since/until",
            ));
        }
        Ok(())
    }
}

/// Arguments of the two batch tools
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueBatchArgs {
    pub issue_ids: Vec<String>,
    pub concurrency: Option<usize>,
    pub brief_output: Option<bool>,
}

impl IssueBatchArgs {
    /// Concurrency ceiling, defaulted
    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }
}

impl Validate for IssueBatchArgs {
    fn validate(&self) -> Result<()> {
        if self.issue_ids.is_empty() || self.issue_ids.len() > MAX_BATCH_SIZE {
            return Err(Error::invalid_argument(
                "issueIds",
                format!("expected between 1 and {MAX_BATCH_SIZE} issue IDs, got {}", self.issue_ids.len()),
            ));
        }
        check_range("concurrency", self.concurrency, &CONCURRENCY_RANGE)
    }
}

/// Arguments of `sentry_issue_latest_event`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestEventArgs {
    pub issue_id: String,
    pub brief_output: Option<bool>,
}

impl Validate for LatestEventArgs {
    fn validate(&self) -> Result<()> {
        check_not_empty("issueId", &self.issue_id)
    }
}

/// Output detail requested by a `briefOutput` flag
pub fn output_detail(brief_output: Option<bool>) -> Detail {
    Detail::from_brief_flag(brief_output)
}

fn check_range(field: &str, value: Option<usize>, range: &RangeInclusive<usize>) -> Result<()> {
    match value {
        Some(v) if !range.contains(&v) => Err(Error::invalid_argument(
            field,
            format!("must be between {} and {}, got {v}", range.start(), range.end()),
        )),
        _ => Ok(()),
    }
}

fn check_not_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_argument(field, "must not be empty"));
    }
    Ok(())
}

// ============================================================================
// Outputs
// ============================================================================

/// One page (or one walk) of listed items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOutput<T> {
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub count: usize,
}

impl<T> ListOutput<T> {
    /// Wrap items with the cursor to resume from
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self {
            count: items.len(),
            items,
            next_cursor,
        }
    }
}

/// Output of `service_info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub name: String,
    pub sentry_url: String,
    pub token_present: bool,
    pub timezone: String,
    pub read_only: bool,
    pub use_structured_content: bool,
    pub version: String,
}

/// Name and description of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
}
