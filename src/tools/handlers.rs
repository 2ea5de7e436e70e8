//! Tool handlers
//!
//! Each handler validates its arguments, calls the Sentry API through the
//! walker or the fan-out executor, and shapes the result.

use super::types::{
    output_detail, IssueBatchArgs, IssuesArgs, LatestEventArgs, ListOutput, OrganizationsArgs,
    ProjectsArgs, ServiceInfo, ToolDescriptor, Validate,
};
use crate::batch::{run_bounded_with_cancel, BatchResult, WorkItem};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::mappers::{
    map_event, map_issue, map_organization, map_project, MappedEvent, MappedIssue,
    MappedOrganization, MappedProject,
};
use crate::pagination::{walk_with, PageRequest, WalkOptions, DEFAULT_PER_PAGE};
use crate::sentry::{SentryApi, SentryClient};
use crate::types::JsonValue;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const SERVICE_INFO: &str = "service_info";
pub const ORGANIZATIONS: &str = "sentry_organizations";
pub const PROJECTS: &str = "sentry_projects";
pub const ISSUES: &str = "sentry_issues";
pub const ISSUES_DETAILS_BATCH: &str = "sentry_issues_details_batch";
pub const ISSUE_LATEST_EVENT: &str = "sentry_issue_latest_event";
pub const ISSUES_LATEST_EVENTS_BATCH: &str = "sentry_issues_latest_events_batch";

/// Every tool this crate exposes
pub const TOOLS: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: SERVICE_INFO,
        description: "Integration status and environment configuration",
    },
    ToolDescriptor {
        name: ORGANIZATIONS,
        description: "List organizations for the current token (cursor, perPage, briefOutput)",
    },
    ToolDescriptor {
        name: PROJECTS,
        description: "List projects of an organization (org, query, cursor, perPage, briefOutput)",
    },
    ToolDescriptor {
        name: ISSUES,
        description: "List issues of an organization with filters; limit (1..1000) enables automatic pagination",
    },
    ToolDescriptor {
        name: ISSUES_DETAILS_BATCH,
        description: "Fetch details for up to 50 issues with bounded concurrency (1..10, default 5)",
    },
    ToolDescriptor {
        name: ISSUE_LATEST_EVENT,
        description: "Fetch the latest event of an issue, including its stacktrace",
    },
    ToolDescriptor {
        name: ISSUES_LATEST_EVENTS_BATCH,
        description: "Fetch latest events for up to 50 issues with bounded concurrency",
    },
];

const PROJECT_HINT: &str = "Hint: Sentry often requires 'project'. Provide project id or slug. \
    Discover projects via 'sentry_projects' and pass e.g. project: 'client-api'.";

/// Everything a tool needs to run
#[derive(Clone)]
pub struct ToolContext {
    client: Arc<dyn SentryApi>,
    config: Arc<Config>,
}

impl ToolContext {
    /// Create a context over an existing API implementation
    pub fn new(client: Arc<dyn SentryApi>, config: Arc<Config>) -> Self {
        Self { client, config }
    }

    /// Create a context talking HTTP to the configured Sentry instance
    pub fn from_config(config: Config) -> Result<Self> {
        let client = SentryClient::new(&config)?;
        Ok(Self::new(Arc::new(client), Arc::new(config)))
    }

    /// Runtime configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Run the tool called `name` with JSON arguments
///
/// `null` arguments are treated as an empty object.
pub async fn dispatch(
    ctx: &ToolContext,
    name: &str,
    args: JsonValue,
    cancel: Option<&CancellationToken>,
) -> Result<JsonValue> {
    info!(tool = name, "Running tool");
    let result = run_tool(ctx, name, args, cancel).await;
    match &result {
        Ok(_) => info!(tool = name, "Tool finished"),
        Err(e) => warn!(tool = name, error = %e, "Tool failed"),
    }
    result
}

async fn run_tool(
    ctx: &ToolContext,
    name: &str,
    args: JsonValue,
    cancel: Option<&CancellationToken>,
) -> Result<JsonValue> {
    match name {
        SERVICE_INFO => to_json(service_info(ctx)),
        ORGANIZATIONS => to_json(organizations(ctx, parse_args(args)?, cancel).await?),
        PROJECTS => to_json(projects(ctx, parse_args(args)?, cancel).await?),
        ISSUES => to_json(issues(ctx, parse_args(args)?, cancel).await?),
        ISSUES_DETAILS_BATCH => to_json(issues_details_batch(ctx, parse_args(args)?, cancel).await?),
        ISSUE_LATEST_EVENT => to_json(issue_latest_event(ctx, parse_args(args)?, cancel).await?),
        ISSUES_LATEST_EVENTS_BATCH => {
            to_json(issues_latest_events_batch(ctx, parse_args(args)?, cancel).await?)
        }
        other => Err(Error::invalid_argument("tool", format!("unknown tool '{other}'"))),
    }
}

fn parse_args<T: DeserializeOwned>(args: JsonValue) -> Result<T> {
    let args = if args.is_null() {
        JsonValue::Object(serde_json::Map::new())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| Error::invalid_argument("arguments", e.to_string()))
}

fn to_json<T: Serialize>(value: T) -> Result<JsonValue> {
    Ok(serde_json::to_value(value)?)
}

// ============================================================================
// Handlers
// ============================================================================

/// `service_info`
pub fn service_info(ctx: &ToolContext) -> ServiceInfo {
    let config = ctx.config();
    ServiceInfo {
        name: crate::NAME.to_string(),
        sentry_url: config.sentry_url.to_string(),
        token_present: config.token_present(),
        timezone: config.timezone.name().to_string(),
        read_only: config.read_only,
        use_structured_content: config.use_structured_content,
        version: crate::VERSION.to_string(),
    }
}

/// `sentry_organizations`: a single page
pub async fn organizations(
    ctx: &ToolContext,
    args: OrganizationsArgs,
    cancel: Option<&CancellationToken>,
) -> Result<ListOutput<MappedOrganization>> {
    args.validate()?;
    let request = PageRequest::new(args.cursor, args.per_page.unwrap_or(DEFAULT_PER_PAGE));
    let page = ctx.client.list_organizations(&request, cancel).await?;

    let (detail, tz) = (output_detail(args.brief_output), ctx.config.timezone);
    let page = page.map(|org| map_organization(&org, detail, tz));
    Ok(ListOutput::new(page.items, page.next_cursor))
}

/// `sentry_projects`: a single page
pub async fn projects(
    ctx: &ToolContext,
    args: ProjectsArgs,
    cancel: Option<&CancellationToken>,
) -> Result<ListOutput<MappedProject>> {
    args.validate()?;
    let request = PageRequest::new(args.cursor, args.per_page.unwrap_or(DEFAULT_PER_PAGE));
    let page = ctx
        .client
        .list_projects(&args.org, args.query.as_deref(), &request, cancel)
        .await?;

    let (detail, tz) = (output_detail(args.brief_output), ctx.config.timezone);
    let page = page.map(|project| map_project(&project, detail, tz));
    Ok(ListOutput::new(page.items, page.next_cursor))
}

/// `sentry_issues`: walks pages until `limit` is met
///
/// Without a limit a single page is fetched.
pub async fn issues(
    ctx: &ToolContext,
    args: IssuesArgs,
    cancel: Option<&CancellationToken>,
) -> Result<ListOutput<MappedIssue>> {
    args.validate()?;

    let mut options = WalkOptions::new(args.items_per_page(), args.limit);
    if let Some(token) = cancel {
        options = options.with_cancel(token.clone());
    }

    let client = ctx.client.as_ref();
    let org = args.org.as_str();
    let filters = &args.filters();
    let fetch_page = move |page: PageRequest| async move {
        client.list_issues(org, filters, &page, cancel).await
    };

    let walked = walk_with(fetch_page, args.cursor.clone(), &options)
        .await
        .map_err(with_project_hint)?;

    let (detail, tz) = (output_detail(args.brief_output), ctx.config.timezone);
    let items = walked
        .items
        .iter()
        .map(|issue| map_issue(issue, detail, tz))
        .collect::<Result<Vec<_>>>()?;

    info!(count = items.len(), pages = walked.pages, "Listed issues");
    Ok(ListOutput::new(items, walked.next_cursor))
}

/// Attach a hint about the `project` filter to 400 and 403 responses
fn with_project_hint(error: Error) -> Error {
    match error {
        Error::HttpStatus {
            status: status @ (400 | 403),
            body,
        } => Error::http_status(status, format!("{body}. {PROJECT_HINT}")),
        other => other,
    }
}

/// `sentry_issues_details_batch`
pub async fn issues_details_batch(
    ctx: &ToolContext,
    args: IssueBatchArgs,
    cancel: Option<&CancellationToken>,
) -> Result<BatchResult<MappedIssue>> {
    let (detail, tz) = (output_detail(args.brief_output), ctx.config.timezone);
    fan_out(ctx, &args, cancel, move |client, id, cancel| async move {
        let issue = client.get_issue(&id, cancel.as_ref()).await?;
        map_issue(&issue, detail, tz)
    })
    .await
}

/// `sentry_issue_latest_event`
pub async fn issue_latest_event(
    ctx: &ToolContext,
    args: LatestEventArgs,
    cancel: Option<&CancellationToken>,
) -> Result<MappedEvent> {
    args.validate()?;
    let event = ctx
        .client
        .get_issue_latest_event(&args.issue_id, cancel)
        .await?;
    Ok(map_event(&event, output_detail(args.brief_output)))
}

/// `sentry_issues_latest_events_batch`
pub async fn issues_latest_events_batch(
    ctx: &ToolContext,
    args: IssueBatchArgs,
    cancel: Option<&CancellationToken>,
) -> Result<BatchResult<MappedEvent>> {
    let detail = output_detail(args.brief_output);
    fan_out(ctx, &args, cancel, move |client, id, cancel| async move {
        let event = client.get_issue_latest_event(&id, cancel.as_ref()).await?;
        Ok::<_, Error>(map_event(&event, detail))
    })
    .await
}

/// Run `fetch` once per issue ID through the bounded executor
///
/// Empty IDs fail locally without reaching the API.
async fn fan_out<T, F, Fut>(
    ctx: &ToolContext,
    args: &IssueBatchArgs,
    cancel: Option<&CancellationToken>,
    fetch: F,
) -> Result<BatchResult<T>>
where
    T: Send + 'static,
    F: Fn(Arc<dyn SentryApi>, String, Option<CancellationToken>) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    args.validate()?;

    let items = args
        .issue_ids
        .iter()
        .map(|id| {
            if id.trim().is_empty() {
                return WorkItem::new(id.clone(), async {
                    Err::<T, Error>(Error::invalid_argument("issueIds", "issue ID must not be empty"))
                });
            }
            let task = fetch(Arc::clone(&ctx.client), id.clone(), cancel.cloned());
            WorkItem::new(id.clone(), task)
        })
        .collect();

    let result = run_bounded_with_cancel(items, args.concurrency(), cancel).await?;
    info!(
        succeeded = result.count,
        failed = result.failed.len(),
        "Batch finished"
    );
    Ok(result)
}
