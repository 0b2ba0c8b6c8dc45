//! Message codec shared by both transports.
//!
//! Encoding is a single-line JSON serialization. Decoding handles the two
//! response body shapes an MCP server may produce: an event-stream framed
//! body (`data: <json>` line) or a direct JSON body.

use serde::Serialize;

use crate::error::{McpError, Result};
use crate::protocol::JsonRpcResponse;

/// Prefix of an event-stream data line.
pub const SSE_DATA_PREFIX: &str = "data: ";

/// Encode a message as a single line of JSON.
///
/// `serde_json` never emits raw newlines, so the output is safe to write
/// line-delimited onto a stdio pipe or as an HTTP body.
pub fn encode<T: Serialize>(message: &T) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}

/// Decode one line of direct JSON (stdio framing).
pub fn decode_line(line: &str) -> Result<JsonRpcResponse> {
    serde_json::from_str(line.trim()).map_err(|_| McpError::format(line.trim()))
}

/// Decode a response body that may be event-stream framed or direct JSON.
///
/// Scans for the first `data: ` line and parses its payload; a body with no
/// data line is parsed as direct JSON. Either failure yields a
/// [`McpError::Format`] carrying the raw body.
pub fn decode_body(body: &str) -> Result<JsonRpcResponse> {
    for line in body.lines() {
        if let Some(data) = line.strip_prefix(SSE_DATA_PREFIX) {
            return serde_json::from_str(data).map_err(|_| McpError::format(body));
        }
    }

    serde_json::from_str(body.trim()).map_err(|_| McpError::format(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::JsonRpcRequest;

    #[test]
    fn test_encode_is_single_line() {
        let req = JsonRpcRequest::new(
            1,
            "tools/call",
            Some(serde_json::json!({"name": "echo", "arguments": {"message": "a\nb"}})),
        );
        let encoded = encode(&req).unwrap();
        assert!(!encoded.contains('\n'));
        assert!(encoded.contains("\\n"));
    }

    #[test]
    fn test_decode_direct_json() {
        let body = r#"{"jsonrpc":"2.0","id":1,"result":{}}"#;
        let resp = decode_body(body).unwrap();
        assert_eq!(resp.id, 1);
        assert!(resp.result.is_some());
    }

    #[test]
    fn test_decode_event_stream_framing() {
        let body = "event: message\ndata: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\n\n";
        let framed = decode_body(body).unwrap();
        let direct = decode_body(r#"{"jsonrpc":"2.0","id":1,"result":{}}"#).unwrap();

        assert_eq!(framed.id, direct.id);
        assert_eq!(framed.result, direct.result);
    }

    #[test]
    fn test_decode_takes_first_data_line() {
        let body = "data: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"first\":true}}\n\
                    data: {\"jsonrpc\":\"2.0\",\"id\":2,\"result\":{\"second\":true}}\n";
        let resp = decode_body(body).unwrap();
        assert_eq!(resp.id, 1);
    }

    #[test]
    fn test_decode_framed_error_body() {
        let body = "event: message\ndata: {\"jsonrpc\":\"2.0\",\"id\":3,\"error\":{\"code\":-32600,\"message\":\"bad\"}}\n\n";
        let resp = decode_body(body).unwrap();
        assert!(resp.is_error());
        assert_eq!(resp.error.unwrap().code, -32600);
    }

    #[test]
    fn test_decode_garbage_is_format_error() {
        let result = decode_body("not json, no data line");
        match result {
            Err(McpError::Format { body }) => assert!(body.contains("not json")),
            other => panic!("Expected Format error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_decode_invalid_data_line_is_format_error() {
        let result = decode_body("data: {broken\n");
        assert!(matches!(result, Err(McpError::Format { .. })));
    }

    #[test]
    fn test_decode_line_rejects_framing() {
        // stdio is direct JSON only
        let result = decode_line("data: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}");
        assert!(matches!(result, Err(McpError::Format { .. })));
    }
}
