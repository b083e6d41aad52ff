//! Common test utilities for loghive-client integration tests
//!
//! A mock LogHive instance is a wiremock server plus a handful of canned response
//! builders for the query-job endpoints. Polling scenarios are scripted by mounting
//! one-shot mocks in order: wiremock serves the earliest-mounted mock that still
//! matches, so `up_to_n_times(1)` turns mount order into response order.

use loghive_client::Client;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(dead_code)]
pub const REPOSITORY: &str = "sandbox";
#[allow(dead_code)]
pub const TOKEN: &str = "test-token";

/// Client wired to a mock server with the shared repository and token
#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> Client {
    Client::new(&server.uri(), REPOSITORY, TOKEN).expect("mock server uri should be valid")
}

/// Mount the job-creation endpoint, returning `job_id` to every request
#[allow(dead_code)]
pub async fn mount_job_creation(server: &MockServer, job_id: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/api/v1/dataspaces/{REPOSITORY}/queryjobs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": job_id })))
        .mount(server)
        .await;
}

/// Build a poll-response body in the server's wire shape
#[allow(dead_code)]
pub fn poll_body(done: bool, poll_after: u64, events: Value, meta_overrides: Value) -> Value {
    let mut body = json!({
        "done": done,
        "cancelled": false,
        "events": events,
        "metaData": {
            "pollAfter": poll_after,
            "isAggregate": false,
            "workDone": 1,
            "totalWork": 1,
            "extraData": {},
        }
    });
    if let (Some(meta), Some(overrides)) = (
        body["metaData"].as_object_mut(),
        meta_overrides.as_object(),
    ) {
        for (key, value) in overrides {
            meta.insert(key.clone(), value.clone());
        }
    }
    body
}

/// Mount a poll response served exactly once, then falling through to later mounts
#[allow(dead_code)]
pub async fn mount_poll_once(server: &MockServer, job_id: &str, response: Value) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/api/v1/dataspaces/{REPOSITORY}/queryjobs/{job_id}"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

/// Mount a poll response with no serve limit
#[allow(dead_code)]
pub async fn mount_poll(server: &MockServer, job_id: &str, response: Value) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/api/v1/dataspaces/{REPOSITORY}/queryjobs/{job_id}"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(server)
        .await;
}
