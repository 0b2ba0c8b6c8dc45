//! MCP (Model Context Protocol) client for Pwyll.
//!
//! This crate provides a client implementation for the Model Context
//! Protocol, connecting to MCP servers to discover and invoke their tools
//! and read their resources over either of two transports.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  McpClient (the session)                                    │
//! │  - Runs the initialize handshake                            │
//! │  - Correlates requests/responses by monotonic id            │
//! │  - tools/list, tools/call, resources/list, resources/read   │
//! └─────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  McpTransport                                               │
//! │  - Stdio: newline-delimited JSON to a child process         │
//! │  - Http: one POST per exchange, SSE-framed or JSON bodies   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use pwyll_mcp::{McpClient, McpServerConfig};
//!
//! // Spawn a local server over stdio
//! let config = McpServerConfig::new("sqlite", "mcp-server-sqlite")
//!     .with_arg("--db")
//!     .with_arg("/path/to/database.db");
//!
//! let mut client = McpClient::new(config);
//! let server_info = client.connect()?;
//! println!("Connected to: {} v{}", server_info.name, server_info.version);
//!
//! // List and call tools
//! let tools = client.list_tools()?;
//! let result = client.call_tool("query", Some(json!({"sql": "SELECT 1"})))?;
//!
//! // Or talk to a remote server over HTTP
//! let config = McpServerConfig::http("remote", "http://localhost:8080");
//! let mut client = McpClient::new(config);
//! client.connect()?;
//! ```
//!
//! # Protocol flow
//!
//! 1. Client sends `initialize` with its capabilities
//! 2. Server responds with its capabilities and identity
//! 3. Client sends `notifications/initialized`
//! 4. Client can now call `tools/*` and `resources/*`
//!
//! Exchange is strictly synchronous: one in-flight request per session,
//! correlated by id. The only concurrent element is the stdio transport's
//! stderr drain, which forwards server diagnostics into the log and shares
//! no state with the exchange path. The stdio read has no timeout (local
//! children are trusted); the HTTP exchange is bounded at 30s.

pub mod client;
pub mod codec;
pub mod error;
pub mod protocol;
pub mod transport;

// Re-export main types
pub use client::{McpClient, McpServerConfig, TransportType};
pub use error::{McpError, Result};
pub use protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, ListResourcesResult, ListToolsResult,
    ReadResourceParams, ReadResourceResult, ResourceContents, ResourceInfo, ServerCapabilities,
    ServerInfo, ToolContent, ToolInfo, ToolsCapability,
};
pub use transport::{HttpTransportConfig, McpTransport, normalize_base_url};
