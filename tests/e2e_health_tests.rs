mod common;

use common::{RecordingTransport, TestHarness, SERVER_URL};
use osdu_mcp_server::config::MapEnv;
use serde_json::json;

#[tokio::test]
async fn test_healthy_when_all_services_answer() {
    let harness = TestHarness::with_env_and_transport(
        MapEnv::new(),
        RecordingTransport::with_default(200, r#"{"version": "1.2.3"}"#),
    );

    let body = harness.call_tool("health_check", json!({})).await.unwrap();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["server_url"], SERVER_URL);
    assert_eq!(body["authentication"]["status"], "authenticated");
    assert_eq!(body["services"]["legal"]["version"], "1.2.3");
    assert_eq!(harness.transport.calls(), 5);
    assert!(harness
        .transport
        .requests()
        .iter()
        .all(|r| r.url.ends_with("/info")));
}

#[tokio::test]
async fn test_degraded_service_is_reported_not_raised() {
    let transport = RecordingTransport::with_default(200, r#"{"version": "1.0"}"#);
    transport.push_response(503, "unavailable");
    let harness = TestHarness::with_env_and_transport(MapEnv::new(), transport);

    let body = harness.call_tool("health_check", json!({})).await.unwrap();

    assert_eq!(body["status"], "degraded");
    let unhealthy = body["services"]
        .as_object()
        .unwrap()
        .values()
        .filter(|s| s["status"] == "unhealthy")
        .count();
    assert_eq!(unhealthy, 1);
}

#[tokio::test]
async fn test_services_can_be_skipped() {
    let harness = TestHarness::new();

    let body = harness
        .call_tool("health_check", json!({"include_services": false}))
        .await
        .unwrap();

    assert!(body.get("services").is_none());
    assert_eq!(harness.transport.calls(), 0);
    assert_eq!(harness.credential.fetches(), 1);
}
