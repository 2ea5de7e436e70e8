//! Tests for the tool handlers

use super::*;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::pagination::{PageRequest, PageResult};
use crate::sentry::{IssueFilters, SentryApi};
use crate::types::JsonValue;
use async_trait::async_trait;
use chrono_tz::Tz;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use test_case::test_case;
use tokio_util::sync::CancellationToken;
use url::Url;

/// In-memory Sentry with scripted issue pages
#[derive(Default)]
struct FakeSentry {
    issues: HashMap<String, JsonValue>,
    events: HashMap<String, JsonValue>,
    /// Page `n` is served for cursor `c{n}`; page 0 for no cursor
    issue_pages: Vec<PageResult<JsonValue>>,
    list_status: Option<u16>,
    calls: Mutex<Vec<String>>,
    page_requests: Mutex<Vec<PageRequest>>,
}

impl FakeSentry {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn page_requests(&self) -> Vec<PageRequest> {
        self.page_requests.lock().unwrap().clone()
    }
}

fn not_found(id: &str) -> Error {
    Error::http_status(404, format!("issue {id} not found"))
}

#[async_trait]
impl SentryApi for FakeSentry {
    async fn get_issue(&self, issue_id: &str, _cancel: Option<&CancellationToken>) -> Result<JsonValue> {
        self.record(format!("issue:{issue_id}"));
        self.issues.get(issue_id).cloned().ok_or_else(|| not_found(issue_id))
    }

    async fn get_issue_latest_event(
        &self,
        issue_id: &str,
        _cancel: Option<&CancellationToken>,
    ) -> Result<JsonValue> {
        self.record(format!("event:{issue_id}"));
        self.events.get(issue_id).cloned().ok_or_else(|| not_found(issue_id))
    }

    async fn list_organizations(
        &self,
        page: &PageRequest,
        _cancel: Option<&CancellationToken>,
    ) -> Result<PageResult<JsonValue>> {
        self.record("organizations".into());
        self.page_requests.lock().unwrap().push(page.clone());
        Ok(PageResult::new(
            vec![json!({"id": "1", "slug": "acme", "name": "Acme", "status": {"id": "active"}})],
            Some("next-org".into()),
        ))
    }

    async fn list_projects(
        &self,
        org: &str,
        query: Option<&str>,
        page: &PageRequest,
        _cancel: Option<&CancellationToken>,
    ) -> Result<PageResult<JsonValue>> {
        self.record(format!("projects:{org}:{}", query.unwrap_or("")));
        self.page_requests.lock().unwrap().push(page.clone());
        Ok(PageResult::new(
            vec![json!({"id": 7, "slug": "web", "name": "Web"})],
            None,
        ))
    }

    async fn list_issues(
        &self,
        org: &str,
        _filters: &IssueFilters,
        page: &PageRequest,
        _cancel: Option<&CancellationToken>,
    ) -> Result<PageResult<JsonValue>> {
        self.record(format!("issues:{org}"));
        self.page_requests.lock().unwrap().push(page.clone());
        if let Some(status) = self.list_status {
            return Err(Error::http_status(status, "Bad request"));
        }

        let index = match page.cursor.as_deref() {
            None => 0,
            Some(cursor) => cursor.trim_start_matches('c').parse().unwrap(),
        };
        let mut result = self.issue_pages[index].clone();
        result.items.truncate(page.per_page);
        Ok(result)
    }
}

fn issue(id: usize) -> JsonValue {
    json!({"id": id.to_string(), "title": format!("Issue {id}"), "status": "unresolved"})
}

fn issue_page(ids: std::ops::Range<usize>, next: Option<&str>) -> PageResult<JsonValue> {
    PageResult::new(ids.map(issue).collect(), next.map(str::to_string))
}

fn context(fake: FakeSentry) -> (ToolContext, Arc<FakeSentry>) {
    let fake = Arc::new(fake);
    let mut config = Config::new(
        Url::parse("https://sentry.example.com").unwrap(),
        "sntrys_0123456789",
    );
    config.timezone = Tz::UTC;
    let ctx = ToolContext::new(Arc::clone(&fake) as Arc<dyn SentryApi>, Arc::new(config));
    (ctx, fake)
}

// ============================================================================
// Dispatch and simple tools
// ============================================================================

#[tokio::test]
async fn test_service_info() {
    let (ctx, _) = context(FakeSentry::default());
    let info = dispatch(&ctx, SERVICE_INFO, JsonValue::Null, None).await.unwrap();

    assert_eq!(info["sentryUrl"], "https://sentry.example.com/");
    assert_eq!(info["tokenPresent"], true);
    assert_eq!(info["timezone"], "UTC");
    assert_eq!(info["readOnly"], true);
    assert_eq!(info["name"], crate::NAME);
}

#[tokio::test]
async fn test_dispatch_unknown_tool() {
    let (ctx, _) = context(FakeSentry::default());
    let err = dispatch(&ctx, "sentry_delete_everything", json!({}), None)
        .await
        .unwrap_err();
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_dispatch_rejects_malformed_arguments() {
    let (ctx, fake) = context(FakeSentry::default());

    let err = dispatch(&ctx, PROJECTS, json!({"query": "web"}), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { ref field, .. } if field == "arguments"));

    let err = dispatch(&ctx, ORGANIZATIONS, json!({"perPage": "ten"}), None)
        .await
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_tool_list_is_complete() {
    let names: Vec<&str> = TOOLS.iter().map(|t| t.name).collect();
    assert_eq!(
        names,
        vec![
            SERVICE_INFO,
            ORGANIZATIONS,
            PROJECTS,
            ISSUES,
            ISSUES_DETAILS_BATCH,
            ISSUE_LATEST_EVENT,
            ISSUES_LATEST_EVENTS_BATCH,
        ]
    );
}

#[tokio::test]
async fn test_organizations_single_page() {
    let (ctx, fake) = context(FakeSentry::default());
    let output = dispatch(&ctx, ORGANIZATIONS, json!({}), None).await.unwrap();

    assert_eq!(
        output,
        json!({
            "items": [{"id": "1", "slug": "acme", "name": "Acme"}],
            "nextCursor": "next-org",
            "count": 1
        })
    );
    assert_eq!(fake.page_requests(), vec![PageRequest::new(None, 50)]);
}

#[tokio::test]
async fn test_organizations_full_output() {
    let (ctx, _) = context(FakeSentry::default());
    let args = OrganizationsArgs {
        brief_output: Some(false),
        ..Default::default()
    };
    let output = organizations(&ctx, args, None).await.unwrap();
    assert_eq!(output.items[0].status.as_deref(), Some("active"));
}

#[tokio::test]
async fn test_projects_forwards_query_and_cursor() {
    let (ctx, fake) = context(FakeSentry::default());
    let output = dispatch(
        &ctx,
        PROJECTS,
        json!({"org": "acme", "query": "web", "cursor": "abc", "perPage": 10}),
        None,
    )
    .await
    .unwrap();

    assert_eq!(output["count"], 1);
    assert_eq!(output["items"][0]["id"], 7);
    assert!(output.get("nextCursor").is_none());
    assert_eq!(fake.calls(), vec!["projects:acme:web"]);
    assert_eq!(
        fake.page_requests(),
        vec![PageRequest::new(Some("abc".into()), 10)]
    );
}

// ============================================================================
// Issues (walker)
// ============================================================================

#[test_case(json!({"org": "acme", "perPage": 0}) ; "per page zero")]
#[test_case(json!({"org": "acme", "perPage": 101}) ; "per page too large")]
#[test_case(json!({"org": "acme", "limit": 0}) ; "limit zero")]
#[test_case(json!({"org": "acme", "limit": 1001}) ; "limit too large")]
#[test_case(json!({"org": "acme", "statsPeriod": "14d", "since": "2024-01-01T00:00:00Z"}) ; "period with since")]
#[test_case(json!({"org": "acme", "statsPeriod": "14d", "until": "2024-01-01T00:00:00Z"}) ; "period with until")]
#[test_case(json!({"org": ""}) ; "empty org")]
#[tokio::test]
async fn test_issues_rejects_invalid_arguments(args: JsonValue) {
    let (ctx, fake) = context(FakeSentry::default());
    let err = dispatch(&ctx, ISSUES, args, None).await.unwrap_err();

    assert!(err.is_configuration());
    assert!(err.status().is_none());
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_issues_walks_until_limit() {
    let (ctx, fake) = context(FakeSentry {
        issue_pages: vec![
            issue_page(0..50, Some("c1")),
            issue_page(50..100, Some("c2")),
            issue_page(100..150, None),
        ],
        ..Default::default()
    });

    let args = IssuesArgs {
        org: "acme".into(),
        per_page: Some(50),
        limit: Some(75),
        ..Default::default()
    };
    let output = issues(&ctx, args, None).await.unwrap();

    assert_eq!(output.count, 75);
    assert_eq!(output.items[0].id, "0");
    assert_eq!(output.items[74].id, "74");
    assert_eq!(output.next_cursor.as_deref(), Some("c2"));
    assert_eq!(
        fake.page_requests(),
        vec![
            PageRequest::new(None, 50),
            PageRequest::new(Some("c1".into()), 25),
        ]
    );
}

#[tokio::test]
async fn test_issues_without_limit_fetches_one_page() {
    let (ctx, fake) = context(FakeSentry {
        issue_pages: vec![issue_page(0..3, Some("c1")), issue_page(3..6, None)],
        ..Default::default()
    });

    let output = dispatch(&ctx, ISSUES, json!({"org": "acme"}), None)
        .await
        .unwrap();

    assert_eq!(output["count"], 3);
    assert_eq!(output["nextCursor"], "c1");
    assert_eq!(fake.page_requests(), vec![PageRequest::new(None, 50)]);
}

#[tokio::test]
async fn test_issues_bad_request_carries_project_hint() {
    let (ctx, _) = context(FakeSentry {
        list_status: Some(400),
        ..Default::default()
    });

    let err = dispatch(&ctx, ISSUES, json!({"org": "acme", "limit": 10}), None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("Sentry often requires 'project'"));
}

#[tokio::test]
async fn test_issues_server_error_has_no_hint() {
    let (ctx, _) = context(FakeSentry {
        list_status: Some(500),
        ..Default::default()
    });

    let err = dispatch(&ctx, ISSUES, json!({"org": "acme"}), None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(!err.to_string().contains("Hint"));
}

#[tokio::test]
async fn test_issues_cancelled_before_first_page() {
    let (ctx, fake) = context(FakeSentry {
        issue_pages: vec![issue_page(0..50, None)],
        ..Default::default()
    });
    let token = CancellationToken::new();
    token.cancel();

    let args = IssuesArgs {
        org: "acme".into(),
        limit: Some(10),
        ..Default::default()
    };
    let err = issues(&ctx, args, Some(&token)).await.unwrap_err();

    assert!(err.is_cancelled());
    assert!(fake.calls().is_empty());
}

// ============================================================================
// Batches (fan-out)
// ============================================================================

#[test_case(json!({"issueIds": []}) ; "no ids")]
#[test_case(json!({"issueIds": (0..51).map(|i| i.to_string()).collect::<Vec<_>>()}) ; "too many ids")]
#[test_case(json!({"issueIds": ["1"], "concurrency": 0}) ; "concurrency zero")]
#[test_case(json!({"issueIds": ["1"], "concurrency": 11}) ; "concurrency too large")]
#[tokio::test]
async fn test_batch_rejects_invalid_arguments(args: JsonValue) {
    let (ctx, fake) = context(FakeSentry::default());

    for tool in [ISSUES_DETAILS_BATCH, ISSUES_LATEST_EVENTS_BATCH] {
        let err = dispatch(&ctx, tool, args.clone(), None).await.unwrap_err();
        assert!(err.is_configuration());
    }
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_details_batch_isolates_failures() {
    let fake = FakeSentry {
        issues: HashMap::from([
            ("1".to_string(), issue(1)),
            ("2".to_string(), issue(2)),
            ("3".to_string(), json!({"title": "no id"})),
        ]),
        ..Default::default()
    };
    let (ctx, fake) = context(fake);

    let args = IssueBatchArgs {
        issue_ids: vec!["2".into(), "404".into(), "".into(), "1".into(), "3".into()],
        concurrency: Some(2),
        brief_output: None,
    };
    let result = issues_details_batch(&ctx, args, None).await.unwrap();

    let ids: Vec<&str> = result.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "1"]);
    assert_eq!(result.count, 2);
    assert_eq!(result.failed.len(), 3);

    let failure = |id: &str| result.failed.iter().find(|f| f.id == id).unwrap();
    assert_eq!(failure("404").status, Some(404));
    assert_eq!(failure("").status, None);
    assert_eq!(failure("3").status, None);

    let mut calls = fake.calls();
    calls.sort();
    assert_eq!(calls, vec!["issue:1", "issue:2", "issue:3", "issue:404"]);
}

#[tokio::test]
async fn test_latest_events_batch() {
    let fake = FakeSentry {
        events: HashMap::from([(
            "1".to_string(),
            json!({"id": "e1", "title": "Boom", "entries": []}),
        )]),
        ..Default::default()
    };
    let (ctx, _) = context(fake);

    let output = dispatch(
        &ctx,
        ISSUES_LATEST_EVENTS_BATCH,
        json!({"issueIds": ["1", "2"]}),
        None,
    )
    .await
    .unwrap();

    assert_eq!(output["count"], 1);
    assert_eq!(output["items"][0]["id"], "e1");
    assert_eq!(output["items"][0]["exceptions"], json!([]));
    assert_eq!(output["failed"][0]["id"], "2");
    assert_eq!(output["failed"][0]["status"], 404);
}

#[tokio::test]
async fn test_batch_cancelled_before_dispatch() {
    let fake = FakeSentry {
        issues: HashMap::from([("1".to_string(), issue(1))]),
        ..Default::default()
    };
    let (ctx, fake) = context(fake);
    let token = CancellationToken::new();
    token.cancel();

    let args = IssueBatchArgs {
        issue_ids: vec!["1".into(), "1".into()],
        ..Default::default()
    };
    let result = issues_details_batch(&ctx, args, Some(&token)).await.unwrap();

    assert_eq!(result.count, 0);
    assert_eq!(result.failed.len(), 2);
    assert!(result.failed.iter().all(|f| f.message == "Request cancelled" && f.status.is_none()));
    assert!(fake.calls().is_empty());
}

// ============================================================================
// Latest event
// ============================================================================

#[tokio::test]
async fn test_issue_latest_event_full() {
    let raw = json!({"id": "e9", "message": "oops", "dateCreated": "2024-01-15T10:30:00Z"});
    let fake = FakeSentry {
        events: HashMap::from([("9".to_string(), raw.clone())]),
        ..Default::default()
    };
    let (ctx, _) = context(fake);

    let output = dispatch(
        &ctx,
        ISSUE_LATEST_EVENT,
        json!({"issueId": "9", "briefOutput": false}),
        None,
    )
    .await
    .unwrap();

    assert_eq!(output["title"], "oops");
    assert_eq!(output["timestamp"], "2024-01-15T10:30:00Z");
    assert_eq!(output["raw"], raw);
    assert!(output.get("exceptions").is_none());
}

#[tokio::test]
async fn test_issue_latest_event_empty_id() {
    let (ctx, fake) = context(FakeSentry::default());
    let err = dispatch(&ctx, ISSUE_LATEST_EVENT, json!({"issueId": " "}), None)
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(fake.calls().is_empty());
}
