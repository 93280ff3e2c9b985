//! Integration tests for the session over real HTTP.
//!
//! A wiremock server stands in for the MCP endpoint so the full path
//! (envelope → HTTP → classification → catalog/history) is exercised.

use std::time::Duration;

use mcp_admin_core::{Classification, McpError, McpSession, SessionConfig};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn endpoint(server: &MockServer) -> String {
    format!("{}/mcp", server.uri())
}

fn session_for(server: &MockServer) -> McpSession {
    McpSession::connect(SessionConfig::new(endpoint(server))).expect("Failed to create session")
}

async fn mount_echo_catalog(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(body_partial_json(json!({"method": "tools/list"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "tools": [{
                    "name": "echo",
                    "description": "Echo back the input",
                    "inputSchema": {"type": "object", "properties": {"msg": {"type": "string"}}}
                }]
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_end_to_end_echo() {
    let server = MockServer::start().await;
    mount_echo_catalog(&server).await;

    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": {"name": "echo"}
        })))
        .respond_with(|req: &Request| {
            let body: Value = serde_json::from_slice(&req.body).unwrap();
            ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": body["id"],
                "result": {"echoed": body["params"]["arguments"]["msg"]}
            }))
        })
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let tools = session.refresh_catalog().await.expect("Failed to list tools");
    assert_eq!(tools.len(), 1);

    // Operator accepts the scaffold, then edits it.
    let scaffold = session.default_arguments("echo").unwrap();
    assert_eq!(Value::Object(scaffold.clone()), json!({"msg": ""}));
    let mut edited = scaffold;
    edited.insert("msg".to_string(), json!("hi"));
    let edited_text = serde_json::to_string(&Value::Object(edited)).unwrap();

    let outcome = session
        .call_tool_with_text("echo", &edited_text)
        .await
        .expect("arguments should parse");

    assert_eq!(outcome.classification, Classification::Success);
    let newest = session.history().latest().unwrap();
    assert_eq!(newest.tool_name, "echo");
    assert_eq!(newest.outcome.body["result"]["echoed"], "hi");
    assert_eq!(
        newest.outcome.body["id"],
        serde_json::to_value(&newest.request.id).unwrap()
    );
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn test_bearer_header_sent_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {"ok": true}})))
        .expect(1)
        .mount(&server)
        .await;

    let config = SessionConfig::new(endpoint(&server)).with_bearer_token("tok-123");
    let mut session = McpSession::connect(config).unwrap();

    let outcome = session.call_tool("getSystemPrompt", json!({})).await;
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {"ok": true}})))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    session.call_tool("getSystemPrompt", json!({})).await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_http_error_is_protocol_error_and_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "unauthorized"})),
        )
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let outcome = session.call_tool("setKVFlag", json!({"key": "k", "value": "v"})).await;

    assert_eq!(outcome.classification, Classification::ProtocolError);
    assert_eq!(outcome.status_code, Some(401));
    assert_eq!(outcome.body["error"], "unauthorized");
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn test_non_json_body_is_kept_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let outcome = session.call_tool("aiChat", json!({"prompt": "hello"})).await;

    assert_eq!(outcome.classification, Classification::ProtocolError);
    assert_eq!(outcome.body["raw_text"], "upstream exploded");
    assert_eq!(outcome.body["status_code"], 200);
}

#[tokio::test]
async fn test_timeout_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"result": {"ok": true}}))
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&server)
        .await;

    let config =
        SessionConfig::new(endpoint(&server)).with_call_timeout(Duration::from_millis(100));
    let mut session = McpSession::connect(config).unwrap();

    let outcome = session.call_tool("createWorkerFromCode", json!({})).await;
    assert_eq!(outcome.classification, Classification::TransportFailure);
    assert_eq!(outcome.status_code, None);
    assert_eq!(
        session.history().latest().unwrap().outcome.classification,
        Classification::TransportFailure
    );
}

#[tokio::test]
async fn test_refresh_failure_keeps_previous_catalog() {
    let server = MockServer::start().await;
    mount_echo_catalog(&server).await;

    let mut session = session_for(&server);
    session.refresh_catalog().await.unwrap();
    assert_eq!(session.catalog().names(), vec!["echo"]);

    server.reset().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = session.refresh_catalog().await.unwrap_err();
    assert!(matches!(err, McpError::CatalogRefresh { .. }));
    assert_eq!(session.catalog().names(), vec!["echo"]);
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn test_malformed_arguments_never_hit_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true})))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let err = session
        .call_tool_with_text("echo", "{not json")
        .await
        .unwrap_err();

    assert!(err.is_malformed_input());
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_unreachable_endpoint_is_recorded() {
    let mut session =
        McpSession::connect(SessionConfig::new("http://127.0.0.1:9/mcp")).unwrap();

    let outcome = session.call_tool("listCronTriggers", json!({})).await;
    assert_eq!(outcome.classification, Classification::TransportFailure);
    assert_eq!(session.history().len(), 1);
}
