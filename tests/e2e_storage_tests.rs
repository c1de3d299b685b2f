//! End-to-end tests for the storage tools

mod common;

use common::{RecordingTransport, TestHarness};
use osdu_mcp_server::config::{MapEnv, ENV_ENABLE_DELETE_MODE, ENV_ENABLE_WRITE_MODE};
use reqwest::Method;
use serde_json::{json, Value};

const VALIDATION: i32 = -32602;
const PERMISSION_DENIED: i32 = -32002;
const UPSTREAM: i32 = -32005;

fn record(id: &str) -> Value {
    json!({
        "id": id,
        "kind": "osdu:wks:master-data--Well:1.0.0",
        "acl": {
            "viewers": ["data.default.viewers@opendes.example.org"],
            "owners": ["data.default.owners@opendes.example.org"]
        },
        "legal": {
            "legaltags": ["opendes-public"],
            "otherRelevantDataCountries": ["US"]
        },
        "data": {"FacilityName": "Well 1"}
    })
}

#[tokio::test]
async fn test_delete_record_ordering() {
    // No confirmation: rejected before anything else.
    let harness = TestHarness::new();
    let err = harness
        .call_tool("storage_delete_record", json!({"id": "opendes:well:1", "confirm": false}))
        .await
        .unwrap_err();
    assert_eq!(err.code, VALIDATION);
    assert_eq!(harness.transport.calls(), 0);

    // Confirmed, but delete mode is off.
    let harness = TestHarness::new();
    let err = harness
        .call_tool("storage_delete_record", json!({"id": "opendes:well:1", "confirm": true}))
        .await
        .unwrap_err();
    assert_eq!(err.code, PERMISSION_DENIED);
    assert_eq!(harness.transport.calls(), 0);

    // Both satisfied: exactly one call.
    let harness = TestHarness::with_env(MapEnv::new().with(ENV_ENABLE_DELETE_MODE, "true"));
    let body = harness
        .call_tool("storage_delete_record", json!({"id": "opendes:well:1", "confirm": true}))
        .await
        .unwrap();
    assert_eq!(body["deleted"], true);
    assert_eq!(harness.transport.calls(), 1);

    let request = harness.transport.last_request().unwrap();
    assert_eq!(request.method, Method::POST);
    assert_eq!(
        request.url,
        "https://osdu.test/api/storage/v2/records/opendes%3Awell%3A1:delete"
    );
}

#[tokio::test]
async fn test_purge_record_uses_delete_verb() {
    let harness = TestHarness::with_env_and_transport(
        MapEnv::new().with(ENV_ENABLE_DELETE_MODE, "true"),
        RecordingTransport::with_default(204, ""),
    );

    let body = harness
        .call_tool("storage_purge_record", json!({"id": "opendes:well:1", "confirm": true}))
        .await
        .unwrap();

    assert_eq!(body["purged"], true);
    let request = harness.transport.last_request().unwrap();
    assert_eq!(request.method, Method::DELETE);
    assert!(request.url.ends_with("/api/storage/v2/records/opendes%3Awell%3A1"));
}

#[tokio::test]
async fn test_purge_requires_confirmation_even_when_enabled() {
    let harness = TestHarness::with_env(MapEnv::new().with(ENV_ENABLE_DELETE_MODE, "true"));

    let err = harness
        .call_tool("storage_purge_record", json!({"id": "opendes:well:1"}))
        .await
        .unwrap_err();

    assert_eq!(err.code, VALIDATION);
    assert!(err.message.contains("cannot be undone"));
    assert_eq!(harness.transport.calls(), 0);
}

#[tokio::test]
async fn test_create_update_validates_before_permission() {
    let harness = TestHarness::new();
    let mut incomplete = record("opendes:well:1");
    incomplete.as_object_mut().unwrap().remove("legal");

    let err = harness
        .call_tool("storage_create_update_records", json!({"records": [incomplete]}))
        .await
        .unwrap_err();

    assert_eq!(err.code, VALIDATION);
    assert!(err.message.contains("legal"));
    assert_eq!(harness.transport.calls(), 0);
}

#[tokio::test]
async fn test_create_update_requires_write_mode() {
    let harness = TestHarness::new();

    let err = harness
        .call_tool(
            "storage_create_update_records",
            json!({"records": [record("opendes:well:1")]}),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, PERMISSION_DENIED);
    assert_eq!(harness.transport.calls(), 0);
}

#[tokio::test]
async fn test_create_update_forwards_records() {
    let harness = TestHarness::with_env_and_transport(
        MapEnv::new().with(ENV_ENABLE_WRITE_MODE, "true"),
        RecordingTransport::with_default(
            201,
            r#"{"recordCount": 1, "recordIds": ["opendes:well:1"], "skippedRecordIds": []}"#,
        ),
    );

    let body = harness
        .call_tool(
            "storage_create_update_records",
            json!({"records": [record("opendes:well:1")], "skip_dupes": true}),
        )
        .await
        .unwrap();

    assert_eq!(body["recordCount"], 1);
    assert_eq!(body["recordIds"][0], "opendes:well:1");

    let request = harness.transport.last_request().unwrap();
    assert_eq!(request.method, Method::PUT);
    assert!(request.url.ends_with("/api/storage/v2/records"));
    assert!(request
        .query
        .contains(&("skipdupes".to_string(), "true".to_string())));
    assert_eq!(request.body, Some(json!([record("opendes:well:1")])));
}

#[tokio::test]
async fn test_query_by_kind_rejects_out_of_range_limit() {
    let harness = TestHarness::new();

    let err = harness
        .call_tool(
            "storage_query_records_by_kind",
            json!({"kind": "osdu:wks:master-data--Well:1.0.0", "limit": 5000}),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, VALIDATION);
    assert_eq!(harness.transport.calls(), 0);
}

#[tokio::test]
async fn test_fetch_records_over_limit() {
    let harness = TestHarness::new();
    let ids: Vec<String> = (0..101).map(|i| format!("opendes:well:{}", i)).collect();

    let err = harness
        .call_tool("storage_fetch_records", json!({ "record_ids": ids }))
        .await
        .unwrap_err();

    assert_eq!(err.code, VALIDATION);
    assert_eq!(harness.transport.calls(), 0);
}

#[tokio::test]
async fn test_upstream_failure_is_reported() {
    let harness = TestHarness::with_env_and_transport(
        MapEnv::new(),
        RecordingTransport::with_default(500, "boom"),
    );

    let err = harness
        .call_tool("storage_get_record", json!({"id": "opendes:well:1"}))
        .await
        .unwrap_err();

    assert_eq!(err.code, UPSTREAM);
}
