//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: tool arguments → Sentry HTTP requests → shaped JSON output

use pretty_assertions::assert_eq;
use sentry_fetch::config::Config;
use sentry_fetch::tools::{self, ToolContext};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "sntrys_integration_token";

fn context(server: &MockServer, extra: &[(&str, &str)]) -> ToolContext {
    let mut env: HashMap<String, String> = HashMap::from([
        ("SENTRY_URL".to_string(), server.uri()),
        ("SENTRY_TOKEN".to_string(), TOKEN.to_string()),
        ("SENTRY_TIMEZONE".to_string(), "UTC".to_string()),
        ("SENTRY_RATE_LIMIT_RPS".to_string(), "1000".to_string()),
    ]);
    for (key, value) in extra {
        env.insert((*key).to_string(), (*value).to_string());
    }

    let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();
    ToolContext::from_config(config).unwrap()
}

fn link(next_cursor: &str, results: bool) -> String {
    format!(
        r#"<https://sentry.io/api/0/organizations/acme/issues/?cursor={next_cursor}>; rel="next"; results="{results}"; cursor="{next_cursor}""#
    )
}

fn issues(ids: std::ops::Range<u32>) -> Value {
    Value::Array(
        ids.map(|id| {
            json!({
                "id": id.to_string(),
                "shortId": format!("WEB-{id}"),
                "title": format!("Error {id}"),
                "status": "unresolved",
                "lastSeen": "2024-03-01T12:00:00Z"
            })
        })
        .collect(),
    )
}

// ============================================================================
// Cursor walking
// ============================================================================

#[tokio::test]
async fn test_issues_walk_follows_link_cursors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/organizations/acme/issues/"))
        .and(query_param_is_missing("cursor"))
        .and(query_param("per_page", "2"))
        .and(query_param("limit", "2"))
        .and(query_param("environment", "prod"))
        .and(header("Authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", link("0:2:0", true).as_str())
                .set_body_json(issues(0..2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/0/organizations/acme/issues/"))
        .and(query_param("cursor", "0:2:0"))
        .and(query_param("per_page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", link("0:3:0", true).as_str())
                .set_body_json(issues(2..3)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server, &[]);
    let output = tools::dispatch(
        &ctx,
        tools::ISSUES,
        json!({"org": "acme", "perPage": 2, "limit": 3, "environments": ["prod"]}),
        None,
    )
    .await
    .unwrap();

    assert_eq!(output["count"], 3);
    assert_eq!(output["nextCursor"], "0:3:0");
    assert_eq!(output["items"][2]["id"], "2");
    assert_eq!(output["items"][0]["lastSeen"], "2024-03-01 12:00:00 (UTC)");
}

#[tokio::test]
async fn test_issues_walk_stops_when_no_more_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/organizations/acme/issues/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", link("0:50:0", false).as_str())
                .set_body_json(issues(0..4)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server, &[]);
    let output = tools::dispatch(
        &ctx,
        tools::ISSUES,
        json!({"org": "acme", "limit": 100}),
        None,
    )
    .await
    .unwrap();

    assert_eq!(output["count"], 4);
    assert!(output.get("nextCursor").is_none());
}

#[tokio::test]
async fn test_issues_forbidden_adds_project_hint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/organizations/acme/issues/"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let ctx = context(&server, &[]);
    let err = tools::dispatch(&ctx, tools::ISSUES, json!({"org": "acme"}), None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(err.to_string().contains("project"));
}

// ============================================================================
// Bounded fan-out
// ============================================================================

#[tokio::test]
async fn test_details_batch_keeps_input_order_and_isolates_failures() {
    let server = MockServer::start().await;

    // The first issue answers last
    Mock::given(method("GET"))
        .and(path("/api/0/issues/1/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "1", "title": "slow"}))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/0/issues/2/"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"detail":"Not found"}"#))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/0/issues/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "3", "title": "fast"})))
        .mount(&server)
        .await;

    let ctx = context(&server, &[]);
    let output = tools::dispatch(
        &ctx,
        tools::ISSUES_DETAILS_BATCH,
        json!({"issueIds": ["1", "2", "3"], "concurrency": 3}),
        None,
    )
    .await
    .unwrap();

    assert_eq!(output["count"], 2);
    assert_eq!(output["items"][0]["id"], "1");
    assert_eq!(output["items"][1]["id"], "3");
    assert_eq!(output["failed"], json!([{"id": "2", "status": 404, "message": "HTTP 404: {\"detail\":\"Not found\"}"}]));
}

#[tokio::test]
async fn test_batch_timeout_is_failure_without_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/issues/slow/events/latest/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "e1"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/0/issues/ok/events/latest/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "e2", "title": "ok"})))
        .mount(&server)
        .await;

    let ctx = context(&server, &[("SENTRY_HTTP_TIMEOUT_MS", "200")]);
    let output = tools::dispatch(
        &ctx,
        tools::ISSUES_LATEST_EVENTS_BATCH,
        json!({"issueIds": ["slow", "ok"]}),
        None,
    )
    .await
    .unwrap();

    assert_eq!(output["count"], 1);
    assert_eq!(output["items"][0]["id"], "e2");
    assert_eq!(output["failed"][0]["id"], "slow");
    assert!(output["failed"][0].get("status").is_none());
}

// ============================================================================
// Single requests
// ============================================================================

#[tokio::test]
async fn test_latest_event_brief_stacktrace() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/issues/42/events/latest/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "evt42",
            "title": "ValueError: bad input",
            "dateCreated": "2024-03-01T12:00:00Z",
            "entries": [{
                "type": "exception",
                "data": {"values": [{
                    "type": "ValueError",
                    "value": "bad input",
                    "stacktrace": {"frames": [
                        {"function": "parse", "filename": "parser.py", "lineno": 12}
                    ]}
                }]}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server, &[]);
    let output = tools::dispatch(
        &ctx,
        tools::ISSUE_LATEST_EVENT,
        json!({"issueId": "42"}),
        None,
    )
    .await
    .unwrap();

    assert_eq!(output["exceptions"][0]["type"], "ValueError");
    assert_eq!(output["exceptions"][0]["frames"], json!(["parse (parser.py:12)"]));
    assert!(output.get("raw").is_none());
}

#[tokio::test]
async fn test_organizations_single_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/organizations/"))
        .and(query_param("cursor", "abc"))
        .and(query_param("per_page", "5"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", link("def", true).as_str())
                .set_body_json(json!([{"id": "1", "slug": "acme", "name": "Acme"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server, &[]);
    let output = tools::dispatch(
        &ctx,
        tools::ORGANIZATIONS,
        json!({"cursor": "abc", "perPage": 5}),
        None,
    )
    .await
    .unwrap();

    assert_eq!(
        output,
        json!({
            "items": [{"id": "1", "slug": "acme", "name": "Acme"}],
            "nextCursor": "def",
            "count": 1
        })
    );
}
