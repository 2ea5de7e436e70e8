//! CLI commands and argument parsing

use crate::error::Result;
use crate::sentry::{ProjectRef, ProjectSelector};
use crate::tools::{
    IssueBatchArgs, IssuesArgs, LatestEventArgs, OrganizationsArgs, ProjectsArgs, ISSUES,
    ISSUES_DETAILS_BATCH, ISSUES_LATEST_EVENTS_BATCH, ISSUE_LATEST_EVENT, ORGANIZATIONS, PROJECTS,
    SERVICE_INFO,
};
use crate::types::JsonValue;
use clap::{Parser, Subcommand};

/// Read-only Sentry client with bounded pagination and batching
#[derive(Parser, Debug)]
#[command(name = "sentry-fetch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show integration status and configuration
    ServiceInfo,

    /// List organizations
    Organizations {
        /// Pagination cursor
        #[arg(long)]
        cursor: Option<String>,

        /// Items per page (1..100)
        #[arg(long)]
        per_page: Option<usize>,

        /// Return every field instead of key fields
        #[arg(long)]
        full: bool,
    },

    /// List projects of an organization
    Projects {
        /// Organization slug
        org: String,

        /// Search query
        #[arg(short, long)]
        query: Option<String>,

        /// Pagination cursor
        #[arg(long)]
        cursor: Option<String>,

        /// Items per page (1..100)
        #[arg(long)]
        per_page: Option<usize>,

        /// Return every field instead of key fields
        #[arg(long)]
        full: bool,
    },

    /// List issues of an organization
    Issues {
        /// Organization slug
        org: String,

        /// Pagination cursor
        #[arg(long)]
        cursor: Option<String>,

        /// Items per page (1..100)
        #[arg(long)]
        per_page: Option<usize>,

        /// Total items to fetch across pages (1..1000)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Sentry search query
        #[arg(short, long)]
        query: Option<String>,

        /// Environment filter (repeatable)
        #[arg(short, long = "environment")]
        environments: Vec<String>,

        /// Relative period, e.g. 14d
        #[arg(long)]
        stats_period: Option<String>,

        /// ISO start datetime
        #[arg(long)]
        since: Option<String>,

        /// ISO end datetime
        #[arg(long)]
        until: Option<String>,

        /// Project ID or slug (repeatable)
        #[arg(short, long = "project")]
        projects: Vec<String>,

        /// Return every field instead of key fields
        #[arg(long)]
        full: bool,
    },

    /// Fetch details for several issues
    IssuesDetails {
        /// Issue IDs (max 50)
        #[arg(required = true)]
        issue_ids: Vec<String>,

        /// Max concurrent requests (1..10)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Return every field instead of key fields
        #[arg(long)]
        full: bool,
    },

    /// Fetch the latest event of an issue
    LatestEvent {
        /// Issue ID
        issue_id: String,

        /// Include the raw event instead of the compact form
        #[arg(long)]
        full: bool,
    },

    /// Fetch latest events for several issues
    LatestEvents {
        /// Issue IDs (max 50)
        #[arg(required = true)]
        issue_ids: Vec<String>,

        /// Max concurrent requests (1..10)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Include raw events instead of the compact form
        #[arg(long)]
        full: bool,
    },

    /// List available tools
    Tools,

    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Indented JSON
    Pretty,
}

impl Commands {
    /// Tool name and JSON arguments for commands that run a tool
    pub fn tool_call(&self) -> Result<Option<(&'static str, JsonValue)>> {
        let call = match self {
            Self::ServiceInfo => (SERVICE_INFO, JsonValue::Null),
            Self::Organizations {
                cursor,
                per_page,
                full,
            } => (
                ORGANIZATIONS,
                serde_json::to_value(OrganizationsArgs {
                    cursor: cursor.clone(),
                    per_page: *per_page,
                    brief_output: Some(!full),
                })?,
            ),
            Self::Projects {
                org,
                query,
                cursor,
                per_page,
                full,
            } => (
                PROJECTS,
                serde_json::to_value(ProjectsArgs {
                    org: org.clone(),
                    query: query.clone(),
                    cursor: cursor.clone(),
                    per_page: *per_page,
                    brief_output: Some(!full),
                })?,
            ),
            Self::Issues {
                org,
                cursor,
                per_page,
                limit,
                query,
                environments,
                stats_period,
                since,
                until,
                projects,
                full,
            } => (
                ISSUES,
                serde_json::to_value(IssuesArgs {
                    org: org.clone(),
                    cursor: cursor.clone(),
                    per_page: *per_page,
                    limit: *limit,
                    query: query.clone(),
                    environments: Some(environments.clone()).filter(|e| !e.is_empty()),
                    stats_period: stats_period.clone(),
                    since: since.clone(),
                    until: until.clone(),
                    project: project_selector(projects),
                    brief_output: Some(!full),
                })?,
            ),
            Self::IssuesDetails {
                issue_ids,
                concurrency,
                full,
            } => (ISSUES_DETAILS_BATCH, batch_args(issue_ids, *concurrency, *full)?),
            Self::LatestEvent { issue_id, full } => (
                ISSUE_LATEST_EVENT,
                serde_json::to_value(LatestEventArgs {
                    issue_id: issue_id.clone(),
                    brief_output: Some(!full),
                })?,
            ),
            Self::LatestEvents {
                issue_ids,
                concurrency,
                full,
            } => (
                ISSUES_LATEST_EVENTS_BATCH,
                batch_args(issue_ids, *concurrency, *full)?,
            ),
            Self::Tools | Self::Serve { .. } => return Ok(None),
        };
        Ok(Some(call))
    }
}

fn batch_args(issue_ids: &[String], concurrency: Option<usize>, full: bool) -> Result<JsonValue> {
    Ok(serde_json::to_value(IssueBatchArgs {
        issue_ids: issue_ids.to_vec(),
        concurrency,
        brief_output: Some(!full),
    })?)
}

/// Numeric values are project IDs, anything else a slug
fn project_selector(values: &[String]) -> Option<ProjectSelector> {
    let refs: Vec<ProjectRef> = values
        .iter()
        .map(|v| match v.parse::<u64>() {
            Ok(id) => ProjectRef::Id(id),
            Err(_) => ProjectRef::Slug(v.clone()),
        })
        .collect();

    match refs.len() {
        0 => None,
        1 => refs.into_iter().next().map(ProjectSelector::One),
        _ => Some(ProjectSelector::Many(refs)),
    }
}
