//! Tools module
//!
//! The caller-facing operations. Each tool takes camelCase JSON arguments,
//! validates them before touching the network, and returns a serialisable
//! output.
//!
//! # Tools
//!
//! - `service_info` - configuration summary
//! - `sentry_organizations` / `sentry_projects` - single-page listings
//! - `sentry_issues` - issue listing, optionally walking pages up to a limit
//! - `sentry_issue_latest_event` - latest event of one issue
//! - `sentry_issues_details_batch` / `sentry_issues_latest_events_batch` -
//!   bounded fan-out over many issue IDs

mod handlers;
mod types;

pub use handlers::{
    dispatch, issue_latest_event, issues, issues_details_batch, issues_latest_events_batch,
    organizations, projects, service_info, ToolContext, ISSUES, ISSUES_DETAILS_BATCH,
    ISSUES_LATEST_EVENTS_BATCH, ISSUE_LATEST_EVENT, ORGANIZATIONS, PROJECTS, SERVICE_INFO, TOOLS,
};
pub use types::{
    output_detail, IssueBatchArgs, IssuesArgs, LatestEventArgs, ListOutput, OrganizationsArgs,
    ProjectsArgs, ServiceInfo, ToolDescriptor, Validate,
};

#[cfg(test)]
mod tests;
