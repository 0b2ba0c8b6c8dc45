//! End-to-end tests for the HTTP transport against a wiremock server.
//!
//! The mock server runs on a manually created tokio runtime; the blocking
//! client stays on the test thread.

use std::time::Duration;

use pwyll_mcp::{
    HttpTransportConfig, JsonRpcNotification, JsonRpcRequest, McpClient, McpError,
    McpServerConfig, McpTransport,
};
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Wrap a JSON payload in event-stream framing.
fn sse(payload: &serde_json::Value) -> String {
    format!("event: message\ndata: {}\n\n", payload)
}

/// A successful initialize response for the given request id.
fn initialize_result(id: u64) -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": {
            "protocolVersion": "2024-11-05",
            "capabilities": { "tools": {} },
            "serverInfo": { "name": "mock-http-server", "version": "1.0.0" }
        }
    })
}

#[test]
fn test_connect_decodes_framed_handshake() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());

    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .and(body_partial_json(json!({"method": "initialize"})))
            .respond_with(ResponseTemplate::new(200).set_body_string(sse(&initialize_result(1))))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .and(body_partial_json(json!({"method": "notifications/initialized"})))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;
    });

    // The bare server URI exercises normalization: the mock only answers /mcp/.
    let mut client = McpClient::new(McpServerConfig::http("remote", server.uri()));
    let server_info = client.connect().expect("Failed to connect");

    assert_eq!(server_info.name, "mock-http-server");
    assert!(client.is_initialized());
}

#[test]
fn test_session_id_captured_and_propagated() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());

    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .and(body_partial_json(json!({"method": "initialize"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("mcp-session-id", "abc123")
                    .set_body_string(sse(&initialize_result(1))),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .and(body_partial_json(json!({"method": "notifications/initialized"})))
            .and(header("mcp-session-id", "abc123"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        // Only answers when the captured session id is presented.
        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .and(body_partial_json(json!({"method": "tools/call"})))
            .and(header("mcp-session-id", "abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                json!({
                    "jsonrpc": "2.0",
                    "id": 2,
                    "result": { "content": [{ "type": "text", "text": "ok" }] }
                })
                .to_string(),
            ))
            .expect(1)
            .mount(&server)
            .await;
    });

    let mut client = McpClient::new(McpServerConfig::http("remote", server.uri()));
    client.connect().expect("Failed to connect");

    let result = client
        .call_tool("echo", Some(json!({"message": "hi"})))
        .expect("Failed to call tool");
    assert_eq!(result.text(), Some("ok".to_string()));
}

#[test]
fn test_session_id_updates_on_any_exchange() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());

    rt.block_on(async {
        // The handshake issues no session id.
        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .and(body_partial_json(json!({"method": "initialize"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(initialize_result(1).to_string()),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .and(body_partial_json(json!({"method": "notifications/initialized"})))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        // A later response hands one out mid-session.
        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .and(body_partial_json(json!({"method": "tools/list"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("mcp-session-id", "late789")
                    .set_body_string(
                        json!({"jsonrpc": "2.0", "id": 2, "result": {"tools": []}}).to_string(),
                    ),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .and(body_partial_json(json!({"method": "resources/list"})))
            .and(header("mcp-session-id", "late789"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                json!({"jsonrpc": "2.0", "id": 3, "result": {"resources": []}}).to_string(),
            ))
            .expect(1)
            .mount(&server)
            .await;
    });

    let mut client = McpClient::new(McpServerConfig::http("remote", server.uri()));
    client.connect().expect("Failed to connect");

    let tools = client.list_tools().expect("Failed to list tools");
    assert!(tools.is_empty());

    let resources = client.list_resources().expect("Failed to list resources");
    assert!(resources.is_empty());
}

#[test]
fn test_error_status_yields_error_response_message() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());

    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .respond_with(ResponseTemplate::new(400).set_body_string(sse(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32600, "message": "bad request" }
            }))))
            .mount(&server)
            .await;
    });

    let mut transport =
        McpTransport::connect_http(HttpTransportConfig::new(server.uri())).unwrap();
    let request = JsonRpcRequest::new(1, "tools/list", None);

    // The framed error body comes back as a response carrying the error
    // field, not as a transport failure.
    let response = transport.send_request(&request).expect("Expected a response");
    assert!(response.is_error());
    let error = response.error.unwrap();
    assert_eq!(error.code, -32600);
    assert_eq!(error.message, "bad request");
}

#[test]
fn test_client_surfaces_framed_error_body() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());

    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .and(body_partial_json(json!({"method": "initialize"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(initialize_result(1).to_string()),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .and(body_partial_json(json!({"method": "notifications/initialized"})))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .and(body_partial_json(json!({"method": "tools/call"})))
            .respond_with(ResponseTemplate::new(400).set_body_string(sse(&json!({
                "jsonrpc": "2.0",
                "id": 2,
                "error": { "code": -32600, "message": "bad request" }
            }))))
            .mount(&server)
            .await;
    });

    let mut client = McpClient::new(McpServerConfig::http("remote", server.uri()));
    client.connect().expect("Failed to connect");

    match client.call_tool("echo", None) {
        Err(McpError::Server { code, message, .. }) => {
            assert_eq!(code, -32600);
            assert_eq!(message, "bad request");
        }
        other => panic!("Expected Server error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_handshake_error_leaves_session_empty() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());

    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": { "code": -32603, "message": "init refused" }
                })
                .to_string(),
            ))
            .mount(&server)
            .await;
    });

    let mut client = McpClient::new(McpServerConfig::http("remote", server.uri()));

    match client.connect() {
        Err(McpError::Handshake(msg)) => assert!(msg.contains("init refused")),
        other => panic!("Expected Handshake error, got {:?}", other.map(|_| ())),
    }
    assert!(!client.is_initialized());
    assert!(client.connection_kind().is_none());
}

#[test]
fn test_notification_with_empty_body_acks() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());

    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;
    });

    let mut transport =
        McpTransport::connect_http(HttpTransportConfig::new(server.uri())).unwrap();
    let notification = JsonRpcNotification::new("notifications/initialized", None);

    assert!(transport.send_notification(&notification).is_ok());
}

#[test]
fn test_request_timeout() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());

    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(5))
                    .set_body_string(initialize_result(1).to_string()),
            )
            .mount(&server)
            .await;
    });

    let config = HttpTransportConfig::new(server.uri()).with_timeout(Duration::from_millis(200));
    let mut transport = McpTransport::connect_http(config).unwrap();
    let request = JsonRpcRequest::new(1, "initialize", None);

    match transport.send_request(&request) {
        Err(McpError::Timeout) => {}
        other => panic!("Expected Timeout, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unreachable_server() {
    // Port 1 refuses connections; no mock needed.
    let mut client = McpClient::new(McpServerConfig::http("dead", "http://127.0.0.1:1"));

    match client.connect() {
        Err(McpError::Handshake(_)) => {}
        other => panic!("Expected Handshake error, got {:?}", other.map(|_| ())),
    }
    assert!(!client.is_initialized());
}
