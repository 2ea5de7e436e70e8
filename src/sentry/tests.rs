//! Tests for the Sentry API client

use super::*;
use crate::error::Error;
use crate::http::{HttpClient, HttpClientConfig};
use crate::pagination::PageRequest;
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const NEXT_LINK: &str = concat!(
    r#"<https://sentry.io/api/0/organizations/acme/issues/?cursor=0:0:1>; rel="previous"; results="false"; cursor="0:0:1", "#,
    r#"<https://sentry.io/api/0/organizations/acme/issues/?cursor=0:50:0>; rel="next"; results="true"; cursor="0:50:0""#
);

fn client_for(server: &MockServer) -> SentryClient {
    let config = HttpClientConfig::builder()
        .bearer_token("sntrys_test_token")
        .no_rate_limit()
        .build();
    let http = HttpClient::with_config(config).unwrap();
    SentryClient::with_http(Url::parse(&server.uri()).unwrap(), http)
}

fn query_values(request: &Request, key: &str) -> Vec<String> {
    request
        .url
        .query_pairs()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .collect()
}

#[tokio::test]
async fn test_get_issue() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/issues/123/"))
        .and(header("Authorization", "Bearer sntrys_test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "123"})))
        .expect(1)
        .mount(&server)
        .await;

    let issue = client_for(&server).get_issue("123", None).await.unwrap();
    assert_eq!(issue["id"], "123");
}

#[tokio::test]
async fn test_get_issue_latest_event() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/issues/123/events/latest/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"eventID": "abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let event = client_for(&server)
        .get_issue_latest_event("123", None)
        .await
        .unwrap();
    assert_eq!(event["eventID"], "abc");
}

#[tokio::test]
async fn test_path_segments_are_encoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/issues/a%2Fb%20c/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "x"})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).get_issue("a/b c", None).await.unwrap();
}

#[tokio::test]
async fn test_base_url_with_path_prefix() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sentry/api/0/issues/7/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "7"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder().no_rate_limit().build();
    let http = HttpClient::with_config(config).unwrap();
    let base = Url::parse(&format!("{}/sentry/", server.uri())).unwrap();
    let client = SentryClient::with_http(base, http);

    client.get_issue("7", None).await.unwrap();
}

#[tokio::test]
async fn test_list_organizations_reads_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/organizations/"))
        .and(query_param("per_page", "2"))
        .and(query_param_is_missing("cursor"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", NEXT_LINK)
                .set_body_json(json!([{"slug": "a"}, {"slug": "b"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server)
        .list_organizations(&PageRequest::new(None, 2), None)
        .await
        .unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page.next_cursor.as_deref(), Some("0:50:0"));
}

#[tokio::test]
async fn test_list_projects_forwards_cursor_and_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/organizations/acme/projects/"))
        .and(query_param("cursor", "0:50:0"))
        .and(query_param("query", "web"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server)
        .list_projects(
            "acme",
            Some("web"),
            &PageRequest::new(Some("0:50:0".into()), 50),
            None,
        )
        .await
        .unwrap();

    assert!(page.is_empty());
    assert_eq!(page.next_cursor, None);
}

#[tokio::test]
async fn test_list_issues_sends_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/organizations/acme/issues/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "1"}])))
        .expect(1)
        .mount(&server)
        .await;

    let filters = IssueFilters {
        query: Some("is:unresolved".into()),
        environments: vec!["prod".into(), "stage".into()],
        stats_period: Some("14d".into()),
        project: Some(ProjectSelector::Many(vec![
            ProjectRef::Id(1),
            ProjectRef::Slug("web".into()),
        ])),
        ..Default::default()
    };

    let client = client_for(&server);
    client
        .list_issues("acme", &filters, &PageRequest::new(None, 25), None)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    assert_eq!(query_values(request, "per_page"), vec!["25"]);
    assert_eq!(query_values(request, "limit"), vec!["25"]);
    assert_eq!(query_values(request, "query"), vec!["is:unresolved"]);
    assert_eq!(query_values(request, "environment"), vec!["prod", "stage"]);
    assert_eq!(query_values(request, "statsPeriod"), vec!["14d"]);
    assert_eq!(query_values(request, "project"), vec!["1", "web"]);
    assert!(query_values(request, "since").is_empty());
}

#[tokio::test]
async fn test_list_non_array_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/organizations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"detail": "odd"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .list_organizations(&PageRequest::first(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { ref message } if message.contains("an object")));
}

#[tokio::test]
async fn test_status_errors_pass_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/issues/404/"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"detail":"Not found"}"#))
        .mount(&server)
        .await;

    let err = client_for(&server).get_issue("404", None).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}
