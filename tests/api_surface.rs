//! Error-mapper and convenience-layer tests against a mock LogHive server

mod common;

use chrono::TimeZone;
use common::*;
use loghive_client::{
    Client, Error, IngestClient, StructuredEvent, StructuredEvents, TransportConfig,
    UnstructuredEvents,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_graphql(server: &MockServer, data: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Error mapper: transport conditions to domain kinds
// ---------------------------------------------------------------------------

#[tokio::test]
async fn refused_connection_maps_to_connection_error() {
    // Nothing listens on port 9 of localhost.
    let client = Client::new("http://127.0.0.1:9", REPOSITORY, TOKEN).unwrap();

    let err = client.status().await.unwrap_err();
    assert!(matches!(err, Error::Connection(_)), "got {err:?}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn slow_response_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "OK" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = TransportConfig {
        request_timeout: Duration::from_millis(200),
        ..Default::default()
    };
    let client = Client::with_config(&server.uri(), REPOSITORY, TOKEN, &config).unwrap();

    let err = client.status().await.unwrap_err();
    assert!(matches!(err, Error::Timeout(_)), "got {err:?}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn non_2xx_maps_to_http_error_with_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(ResponseTemplate::new(503).set_body_string("rebalancing shards"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.status().await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    match err {
        Error::Http { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "rebalancing shards");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Status and request decoration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_is_decoded_and_requests_are_authenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "OK", "version": "1.142.0" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let status = client.status().await.unwrap();
    assert_eq!(status.status, "OK");
    assert_eq!(status.version.as_deref(), Some("1.142.0"));

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0].headers.get("authorization").unwrap();
    assert_eq!(auth.to_str().unwrap(), format!("Bearer {TOKEN}"));
    let agent = requests[0].headers.get("user-agent").unwrap();
    assert!(agent.to_str().unwrap().starts_with("loghive-client/"));
}

// ---------------------------------------------------------------------------
// Ingestion payload shapes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn structured_ingest_posts_tagged_event_batches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/api/v1/dataspaces/{REPOSITORY}/ingest")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let batch = StructuredEvents {
        tags: Some([("host".to_string(), "web-1".to_string())].into()),
        events: vec![StructuredEvent {
            timestamp: chrono::Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            attributes: json!({ "loglevel": "INFO" }),
        }],
    };
    client.ingest_structured(&[batch]).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body[0]["tags"]["host"], "web-1");
    assert_eq!(body[0]["events"][0]["timestamp"], "2024-03-01T12:00:00Z");
    assert_eq!(body[0]["events"][0]["attributes"]["loglevel"], "INFO");
}

#[tokio::test]
async fn unstructured_ingest_wraps_one_batch_in_a_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!(
            "/api/v1/dataspaces/{REPOSITORY}/ingest-messages"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let batch = UnstructuredEvents {
        parser: Some("accesslog".to_string()),
        ..UnstructuredEvents::new(["127.0.0.1 - GET / 200"])
    };
    client.ingest_messages(&batch).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.is_array());
    assert_eq!(body[0]["messages"][0], "127.0.0.1 - GET / 200");
    assert_eq!(body[0]["type"], "accesslog");
    assert!(
        body[0].get("fields").is_none() && body[0].get("tags").is_none(),
        "unset directives must be omitted from the payload"
    );
}

#[tokio::test]
async fn ingest_client_uses_token_scoped_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/ingest/unstructured"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/ingest/structured"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = IngestClient::new(&server.uri(), "ingest-token").unwrap();
    client
        .ingest_messages(&UnstructuredEvents::new(["a line"]))
        .await
        .unwrap();
    client
        .ingest_structured(&[StructuredEvents {
            tags: None,
            events: vec![StructuredEvent {
                timestamp: chrono::Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
                attributes: json!({}),
            }],
        }])
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0].headers.get("authorization").unwrap();
    assert_eq!(auth.to_str().unwrap(), "Bearer ingest-token");
    server.verify().await;
}

// ---------------------------------------------------------------------------
// User administration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn users_are_listed_and_found_by_email() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "userID": "u-1", "email": "ops@example.com", "isRoot": true },
            { "userID": "u-2", "email": "dev@example.com", "isRoot": false },
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let users = client.list_users().await.unwrap();
    assert_eq!(users.len(), 2);

    let found = client.get_user_by_email("dev@example.com").await.unwrap();
    assert_eq!(found.unwrap().id, "u-2");

    let absent = client.get_user_by_email("ghost@example.com").await.unwrap();
    assert!(absent.is_none());
}

#[tokio::test]
async fn delete_user_by_email_resolves_the_id_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "userID": "u-7", "email": "old@example.com" },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/users/u-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let deleted = client.delete_user_by_email("old@example.com").await.unwrap();
    assert!(deleted.is_some());

    let missed = client.delete_user_by_email("ghost@example.com").await.unwrap();
    assert!(missed.is_none(), "no DELETE should be issued for an unknown email");
    server.verify().await;
}

#[tokio::test]
async fn create_user_sends_email_and_root_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "userID": "u-9" })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.create_user("new@example.com", false).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["email"], "new@example.com");
    assert_eq!(body["isRoot"], false);
}

// ---------------------------------------------------------------------------
// GraphQL: organizations, files, saved queries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn organizations_are_listed_via_graphql() {
    let server = MockServer::start().await;
    mount_graphql(
        &server,
        json!({ "organizations": [
            { "id": "org-1", "name": "Platform", "description": "platform team" },
            { "id": "org-2", "name": "Security", "description": null },
        ]}),
    )
    .await;

    let client = client_for(&server);
    let organizations = client.list_organizations().await.unwrap();
    assert_eq!(organizations.len(), 2);
    assert_eq!(organizations[0].id, "org-1");
    assert!(organizations[1].description.is_none());
}

#[tokio::test]
async fn graphql_errors_surface_as_protocol_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "permission denied" }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.list_organizations().await.unwrap_err();
    match err {
        Error::Protocol(message) => assert!(message.contains("permission denied")),
        other => panic!("expected Protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn uploaded_files_are_sent_as_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/api/v1/dataspaces/{REPOSITORY}/files")))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("hosts.csv");
    std::fs::write(&file_path, "host,ip\nweb-1,10.0.0.1\n").unwrap();

    let client = client_for(&server);
    client.upload_file(&file_path).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0].headers.get("content-type").unwrap();
    assert!(
        content_type.to_str().unwrap().starts_with("multipart/form-data"),
        "upload should be a multipart form"
    );
    server.verify().await;
}

#[tokio::test]
async fn file_listing_unwraps_the_graphql_envelope() {
    let server = MockServer::start().await;
    mount_graphql(
        &server,
        json!({ "searchDomain": { "files": [
            { "nameAndPath": { "name": "hosts.csv", "path": "sandbox/hosts.csv" } },
        ]}}),
    )
    .await;

    let client = client_for(&server);
    let files = client.list_files().await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "hosts.csv");
    assert_eq!(files[0].path, "sandbox/hosts.csv");
}

#[tokio::test]
async fn file_content_pages_are_typed() {
    let server = MockServer::start().await;
    mount_graphql(
        &server,
        json!({ "getFileContent": {
            "totalLinesCount": 2,
            "limit": 200,
            "offset": 0,
            "headers": ["host", "ip"],
            "lines": [["web-1", "10.0.0.1"], ["web-2", "10.0.0.2"]],
        }}),
    )
    .await;

    let client = client_for(&server);
    let content = client
        .get_file_content("hosts.csv", 0, 200, Some("web"))
        .await
        .unwrap();
    assert_eq!(content.total_lines_count, 2);
    assert_eq!(content.headers, vec!["host", "ip"]);
    assert_eq!(content.lines.len(), 2);

    // The filter string travels as a GraphQL variable, not string interpolation.
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["variables"]["filterString"], "web");
    assert_eq!(body["variables"]["name"], REPOSITORY);
}

#[tokio::test]
async fn downloaded_files_come_back_as_raw_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/api/v1/dataspaces/{REPOSITORY}/files/hosts.csv"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "host,ip\nweb-1,10.0.0.1\n".as_bytes(),
            "text/csv",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let bytes = client.download_file("hosts.csv").await.unwrap();
    assert_eq!(bytes, b"host,ip\nweb-1,10.0.0.1\n");
}

#[tokio::test]
async fn saved_queries_round_trip_through_graphql() {
    let server = MockServer::start().await;
    mount_graphql(
        &server,
        json!({ "createSavedQuery": { "savedQuery": { "id": "sq-1", "name": "errors" } } }),
    )
    .await;

    let client = client_for(&server);
    let saved = client
        .create_saved_query("errors", "loglevel=ERROR")
        .await
        .unwrap();
    assert_eq!(saved.id, "sq-1");
    assert_eq!(saved.name, "errors");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(
        body["query"].as_str().unwrap().contains("createSavedQuery"),
        "mutation name should appear in the GraphQL document"
    );
    assert_eq!(body["variables"]["input"]["viewName"], REPOSITORY);
    assert_eq!(body["variables"]["input"]["queryString"], "loglevel=ERROR");
}

#[tokio::test]
async fn saved_query_listing_includes_the_stored_query_text() {
    let server = MockServer::start().await;
    mount_graphql(
        &server,
        json!({ "repository": { "savedQueries": [
            {
                "id": "sq-1",
                "name": "errors",
                "displayName": "Errors",
                "query": { "queryString": "loglevel=ERROR" }
            },
        ]}}),
    )
    .await;

    let client = client_for(&server);
    let queries = client.list_saved_queries().await.unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(
        queries[0].query.as_ref().unwrap().query_string,
        "loglevel=ERROR"
    );
}

#[tokio::test]
async fn deleting_a_saved_query_succeeds_on_a_non_empty_envelope() {
    let server = MockServer::start().await;
    mount_graphql(
        &server,
        json!({ "deleteSavedQuery": { "savedQuery": { "id": "sq-1", "name": "errors" } } }),
    )
    .await;

    let client = client_for(&server);
    client.delete_saved_query("sq-1").await.unwrap();
}
