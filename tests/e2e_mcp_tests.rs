//! End-to-end tests for JSON-RPC dispatch over stdio

mod common;

use common::{TestHarness, DOMAIN, PARTITION};
use osdu_mcp_server::mcp::{serve, Session};
use serde_json::{json, Value};
use tokio::io::BufReader;

#[tokio::test]
async fn test_initialize_reports_capabilities() {
    let harness = TestHarness::new();
    let mut session = Session::default();

    let response = harness
        .send(
            &mut session,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "test", "version": "1.0"}
                }
            }),
        )
        .await
        .unwrap();

    assert!(session.initialized);
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["serverInfo"]["name"], "osdu-mcp-server");
    assert!(response["result"]["capabilities"]["tools"].is_object());
    assert!(response["result"]["capabilities"]["prompts"].is_object());
}

#[tokio::test]
async fn test_requests_before_initialize_are_rejected() {
    let harness = TestHarness::new();
    let mut session = Session::default();

    let response = harness
        .send(
            &mut session,
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}),
        )
        .await
        .unwrap();

    assert_eq!(response["error"]["code"], -32600);
}

#[tokio::test]
async fn test_notifications_get_no_response() {
    let harness = TestHarness::new();
    let mut session = harness.initialized_session().await;

    let response = harness
        .send(
            &mut session,
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        )
        .await;

    assert!(response.is_none());
}

#[tokio::test]
async fn test_tools_list_is_sorted_and_complete() {
    let harness = TestHarness::new();
    let mut session = harness.initialized_session().await;

    let response = harness
        .send(
            &mut session,
            json!({"jsonrpc": "2.0", "id": "a", "method": "tools/list"}),
        )
        .await
        .unwrap();

    let names: Vec<String> = response["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tool| tool["name"].as_str().unwrap().to_string())
        .collect();

    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    for expected in [
        "health_check",
        "partition_list",
        "entitlements_mine",
        "legaltag_get",
        "legaltag_batch_retrieve",
        "legaltag_delete",
        "schema_list",
        "schema_search",
        "storage_create_update_records",
        "storage_purge_record",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {}", expected);
    }
}

#[tokio::test]
async fn test_unknown_tool_is_method_not_found() {
    let harness = TestHarness::new();
    let mut session = harness.initialized_session().await;

    let response = harness
        .send(
            &mut session,
            json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "tools/call",
                "params": {"name": "does_not_exist", "arguments": {}}
            }),
        )
        .await
        .unwrap();

    assert_eq!(response["error"]["code"], -32601);
}

#[tokio::test]
async fn test_service_errors_carry_type_and_status() {
    let harness = TestHarness::new();
    let mut session = harness.initialized_session().await;

    let response = harness
        .send(
            &mut session,
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": {
                    "name": "legaltag_create",
                    "arguments": {"name": "foo", "description": "d", "properties": {}}
                }
            }),
        )
        .await
        .unwrap();

    let error = &response["error"];
    assert_eq!(error["code"], -32002);
    assert_eq!(error["data"]["error_type"], "permission_denied");
    assert_eq!(error["data"]["status_code"], 403);
}

#[tokio::test]
async fn test_resources_read_renders_templates() {
    let harness = TestHarness::new();
    let mut session = harness.initialized_session().await;

    let response = harness
        .send(
            &mut session,
            json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "resources/read",
                "params": {"uri": "file://acl-format-examples.json"}
            }),
        )
        .await
        .unwrap();

    let text = response["result"]["contents"][0]["text"].as_str().unwrap();
    let viewers = format!("data.default.viewers@{}.{}", PARTITION, DOMAIN);
    assert!(text.contains(&viewers));
}

#[tokio::test]
async fn test_unknown_resource() {
    let harness = TestHarness::new();
    let mut session = harness.initialized_session().await;

    let response = harness
        .send(
            &mut session,
            json!({
                "jsonrpc": "2.0",
                "id": 5,
                "method": "resources/read",
                "params": {"uri": "file://nope.json"}
            }),
        )
        .await
        .unwrap();

    assert_eq!(response["error"]["code"], -32004);
}

#[tokio::test]
async fn test_list_mcp_assets_prompt() {
    let harness = TestHarness::new();
    let mut session = harness.initialized_session().await;

    let response = harness
        .send(
            &mut session,
            json!({
                "jsonrpc": "2.0",
                "id": 6,
                "method": "prompts/get",
                "params": {"name": "list_mcp_assets"}
            }),
        )
        .await
        .unwrap();

    let message = &response["result"]["messages"][0];
    assert_eq!(message["role"], "user");
    let text = message["content"]["text"].as_str().unwrap();
    assert!(text.contains("legaltag_delete"));
    assert!(text.contains("file://legal-tag-template.json"));
    assert!(text.contains("guide_record_lifecycle"));
}

#[tokio::test]
async fn test_serve_handles_lines_until_shutdown() {
    let harness = TestHarness::new();
    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "test", "version": "1.0"}
        }}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "shutdown"}),
        json!({"jsonrpc": "2.0", "id": 4, "method": "ping"}),
    ]
    .iter()
    .map(Value::to_string)
    .collect::<Vec<_>>()
    .join("\n");

    let mut output = Vec::new();
    serve(BufReader::new(input.as_bytes()), &mut output, &harness.state)
        .await
        .unwrap();

    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let ids: Vec<Value> = responses.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
    assert_eq!(harness.credential.closes(), 1);
}

#[tokio::test]
async fn test_malformed_line_gets_parse_error() {
    let harness = TestHarness::new();

    let mut output = Vec::new();
    serve(BufReader::new(&b"{not json\n"[..]), &mut output, &harness.state)
        .await
        .unwrap();

    let response: Value = serde_json::from_str(String::from_utf8(output).unwrap().trim()).unwrap();
    assert_eq!(response["error"]["code"], -32700);
    assert!(response["id"].is_null());
}
