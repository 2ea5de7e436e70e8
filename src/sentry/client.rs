//! Sentry REST client
//!
//! Knows the endpoints; everything else (rate limiting, timeouts,
//! cancellation) is delegated to [`HttpClient`].

use super::types::IssueFilters;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::{extract_next_cursor, PageRequest, PageResult, LINK_HEADER};
use crate::types::JsonValue;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Read operations of the Sentry API
#[async_trait]
pub trait SentryApi: Send + Sync {
    /// Fetch a single issue
    async fn get_issue(
        &self,
        issue_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<JsonValue>;

    /// Fetch the latest event of an issue
    async fn get_issue_latest_event(
        &self,
        issue_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<JsonValue>;

    /// List organizations visible to the token
    async fn list_organizations(
        &self,
        page: &PageRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<PageResult<JsonValue>>;

    /// List projects of an organization
    async fn list_projects(
        &self,
        org: &str,
        query: Option<&str>,
        page: &PageRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<PageResult<JsonValue>>;

    /// List issues of an organization
    async fn list_issues(
        &self,
        org: &str,
        filters: &IssueFilters,
        page: &PageRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<PageResult<JsonValue>>;
}

/// HTTP implementation of [`SentryApi`]
#[derive(Debug)]
pub struct SentryClient {
    http: HttpClient,
    base_url: Url,
}

impl SentryClient {
    /// Create a client from runtime configuration
    pub fn new(config: &Config) -> Result<Self> {
        let http = HttpClient::with_config(config.http_client_config())?;
        Ok(Self::with_http(config.sentry_url.clone(), http))
    }

    /// Create a client over an existing transport
    pub fn with_http(base_url: Url, http: HttpClient) -> Self {
        Self { http, base_url }
    }

    /// Build an absolute endpoint URL, percent-encoding every segment
    fn endpoint(&self, segments: &[&str]) -> Result<String> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::config(format!("Sentry URL '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "0"])
            .extend(segments)
            .push("");
        Ok(url.into())
    }

    async fn get_object(
        &self,
        segments: &[&str],
        cancel: Option<&CancellationToken>,
    ) -> Result<JsonValue> {
        let url = self.endpoint(segments)?;
        let response = self.http.get_json(&url, RequestConfig::new(), cancel).await?;
        Ok(response.body)
    }

    async fn get_page(
        &self,
        segments: &[&str],
        request: RequestConfig,
        cancel: Option<&CancellationToken>,
    ) -> Result<PageResult<JsonValue>> {
        let url = self.endpoint(segments)?;
        let response = self.http.get_json(&url, request, cancel).await?;
        let next_cursor = extract_next_cursor(response.header(LINK_HEADER));

        match response.body {
            JsonValue::Array(items) => {
                debug!(
                    items = items.len(),
                    has_next = next_cursor.is_some(),
                    "Fetched list page from {url}"
                );
                Ok(PageResult::new(items, next_cursor))
            }
            other => Err(Error::decode(format!(
                "expected a JSON array from {url}, got {}",
                json_kind(&other)
            ))),
        }
    }
}

#[async_trait]
impl SentryApi for SentryClient {
    async fn get_issue(
        &self,
        issue_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<JsonValue> {
        self.get_object(&["issues", issue_id], cancel).await
    }

    async fn get_issue_latest_event(
        &self,
        issue_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<JsonValue> {
        self.get_object(&["issues", issue_id, "events", "latest"], cancel)
            .await
    }

    async fn list_organizations(
        &self,
        page: &PageRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<PageResult<JsonValue>> {
        let request = paging(page);
        self.get_page(&["organizations"], request, cancel).await
    }

    async fn list_projects(
        &self,
        org: &str,
        query: Option<&str>,
        page: &PageRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<PageResult<JsonValue>> {
        let request = paging(page).query_opt("query", query);
        self.get_page(&["organizations", org, "projects"], request, cancel)
            .await
    }

    async fn list_issues(
        &self,
        org: &str,
        filters: &IssueFilters,
        page: &PageRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<PageResult<JsonValue>> {
        // Some endpoints read per_page, others limit
        let mut request = paging(page)
            .query("limit", page.per_page)
            .query_opt("query", filters.query.as_deref())
            .query_each("environment", &filters.environments)
            .query_opt("statsPeriod", filters.stats_period.as_deref())
            .query_opt("since", filters.since.as_deref())
            .query_opt("until", filters.until.as_deref());
        if let Some(project) = &filters.project {
            request = request.query_each("project", project.values());
        }

        self.get_page(&["organizations", org, "issues"], request, cancel)
            .await
    }
}

fn paging(page: &PageRequest) -> RequestConfig {
    RequestConfig::new()
        .query_opt("cursor", page.cursor.as_deref())
        .query("per_page", page.per_page)
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
