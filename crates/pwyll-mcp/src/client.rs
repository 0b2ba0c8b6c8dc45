//! MCP session for communicating with a single MCP server.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;

use crate::error::{McpError, Result};
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcNotification,
    JsonRpcRequest, ListResourcesResult, ListToolsResult, ReadResourceParams, ReadResourceResult,
    ResourceInfo, ServerInfo, ToolInfo,
};
use crate::transport::{HttpTransportConfig, McpTransport};

/// Transport type for MCP server connections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransportType {
    /// Stdio transport - spawns a child process.
    #[default]
    Stdio,
    /// HTTP transport - connects to a remote server via HTTP POST.
    Http,
}

/// Configuration for an MCP server connection.
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Unique name for this server.
    pub name: String,
    /// Transport type.
    pub transport: TransportType,
    /// Command to spawn (for stdio transport).
    pub command: String,
    /// URL for the server (for HTTP transport).
    pub url: Option<String>,
    /// Arguments to pass to the command.
    pub args: Vec<String>,
    /// Environment variables to set.
    pub env: Vec<(String, String)>,
    /// HTTP headers (for HTTP transport).
    pub headers: Vec<(String, String)>,
    /// Request timeout (for HTTP transport).
    pub timeout: Option<Duration>,
}

impl McpServerConfig {
    /// Create a new server config for stdio transport.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: TransportType::Stdio,
            command: command.into(),
            url: None,
            args: Vec::new(),
            env: Vec::new(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    /// Create a new server config for HTTP transport.
    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: TransportType::Http,
            command: String::new(),
            url: Some(url.into()),
            args: Vec::new(),
            env: Vec::new(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    /// Add arguments.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Add an argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add environment variables.
    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    /// Add an environment variable.
    pub fn with_env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Add an HTTP header (for HTTP transport).
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set request timeout (for HTTP transport).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Check if this is an HTTP transport config.
    pub fn is_http(&self) -> bool {
        self.transport == TransportType::Http
    }

    /// Check if this is a stdio transport config.
    pub fn is_stdio(&self) -> bool {
        self.transport == TransportType::Stdio
    }
}

/// An MCP session bound to a single server.
///
/// Created empty; [`connect`](McpClient::connect) establishes the configured
/// transport and runs the initialization handshake. All exchange is strictly
/// synchronous with one in-flight request at a time.
pub struct McpClient {
    /// Server configuration.
    config: McpServerConfig,
    /// Active transport; `None` while the session is empty.
    transport: Mutex<Option<McpTransport>>,
    /// Server info (after a successful handshake).
    server_info: Option<ServerInfo>,
    /// Counter for generating unique request IDs.
    request_id: AtomicU64,
    /// Whether the handshake has completed.
    initialized: bool,
}

impl McpClient {
    /// Create an empty, unconnected session for the given server config.
    pub fn new(config: McpServerConfig) -> Self {
        Self {
            config,
            transport: Mutex::new(None),
            server_info: None,
            request_id: AtomicU64::new(1),
            initialized: false,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Get the server info (after a successful connect).
    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.server_info.as_ref()
    }

    /// Check if the handshake has completed.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The kind of the active connection, or `None` for an empty session.
    pub fn connection_kind(&self) -> Option<TransportType> {
        match self.transport.lock() {
            Ok(guard) if guard.is_some() => Some(self.config.transport.clone()),
            _ => None,
        }
    }

    /// Check if the connection is still active.
    pub fn is_connected(&self) -> bool {
        match self.transport.lock() {
            Ok(mut guard) => guard.as_mut().map(|t| t.is_connected()).unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Get the next request ID.
    fn next_request_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Connect to the server and run the initialization handshake.
    ///
    /// Establishes the configured transport (spawning the child process for
    /// stdio, building the HTTP client for http), sends `initialize`, and on
    /// an error-free response marks the session initialized and fires the
    /// `notifications/initialized` notification (its outcome is ignored).
    /// A failed handshake tears the transport back down and leaves the
    /// session empty.
    pub fn connect(&mut self) -> Result<&ServerInfo> {
        if self.initialized {
            return self.server_info.as_ref().ok_or(McpError::NotInitialized);
        }

        let transport = match self.config.transport {
            TransportType::Stdio => {
                let env = if self.config.env.is_empty() {
                    None
                } else {
                    Some(self.config.env.as_slice())
                };
                let transport =
                    McpTransport::spawn_stdio(&self.config.command, &self.config.args, env)?;

                tracing::info!(
                    server = %self.config.name,
                    command = %self.config.command,
                    "connected to MCP server via stdio"
                );

                transport
            }
            TransportType::Http => {
                let url = self
                    .config
                    .url
                    .as_ref()
                    .ok_or_else(|| McpError::transport("HTTP transport requires a URL"))?;

                let mut http_config = HttpTransportConfig::new(url);
                if let Some(timeout) = self.config.timeout {
                    http_config = http_config.with_timeout(timeout);
                }
                for (key, value) in &self.config.headers {
                    http_config = http_config.with_header(key, value);
                }

                let transport = McpTransport::connect_http(http_config)?;

                tracing::info!(
                    server = %self.config.name,
                    url = %url,
                    "connected to MCP server via HTTP"
                );

                transport
            }
        };

        {
            let mut guard = self
                .transport
                .lock()
                .map_err(|_| McpError::transport("failed to acquire transport lock"))?;
            *guard = Some(transport);
        }

        let params = InitializeParams::default();
        let result = match self.exchange("initialize", Some(serde_json::to_value(&params)?)) {
            Ok(result) => result,
            Err(e) => {
                self.close();
                return Err(McpError::handshake(e.to_string()));
            }
        };

        let init_result: InitializeResult = match serde_json::from_value(result) {
            Ok(init) => init,
            Err(e) => {
                self.close();
                return Err(McpError::handshake(format!(
                    "malformed initialize result: {}",
                    e
                )));
            }
        };

        tracing::info!(
            server = %init_result.server_info.name,
            version = %init_result.server_info.version,
            protocol = %init_result.protocol_version,
            "MCP server initialized"
        );

        self.initialized = true;

        // Fire-and-forget; its outcome does not affect the session.
        let _ = self.send_notification("notifications/initialized", None);

        self.server_info = Some(init_result.server_info);
        self.server_info.as_ref().ok_or(McpError::NotInitialized)
    }

    /// Send a request through the active transport.
    ///
    /// Fails fast with [`McpError::NotInitialized`] before any I/O when the
    /// handshake has not completed.
    pub fn send_request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        if !self.initialized {
            return Err(McpError::NotInitialized);
        }
        self.exchange(method, params)
    }

    /// Exchange one request/response pair, bypassing the initialized check.
    ///
    /// Only the handshake may use this while the session is uninitialized.
    fn exchange(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let request = JsonRpcRequest::new(self.next_request_id(), method, params);

        let mut guard = self
            .transport
            .lock()
            .map_err(|_| McpError::transport("failed to acquire transport lock"))?;
        let transport = guard.as_mut().ok_or(McpError::NotInitialized)?;

        let response = transport.send_request(&request)?;

        response
            .into_result()
            .map_err(|e| McpError::server_error(e.code, e.message, e.data))
    }

    /// Send a notification (no request id, no response expected).
    fn send_notification(&self, method: &str, params: Option<Value>) -> Result<()> {
        let notification = JsonRpcNotification::new(method, params);

        let mut guard = self
            .transport
            .lock()
            .map_err(|_| McpError::transport("failed to acquire transport lock"))?;
        let transport = guard.as_mut().ok_or(McpError::NotInitialized)?;

        transport.send_notification(&notification)
    }

    /// List available tools from the server.
    pub fn list_tools(&self) -> Result<Vec<ToolInfo>> {
        if !self.initialized {
            return Err(McpError::NotInitialized);
        }

        let result = self.exchange("tools/list", None)?;
        let list_result: ListToolsResult = serde_json::from_value(result)?;

        tracing::debug!(
            server = %self.config.name,
            tool_count = list_result.tools.len(),
            "listed MCP tools"
        );

        Ok(list_result.tools)
    }

    /// Call a tool on the server.
    ///
    /// Missing arguments default to an empty parameter set.
    pub fn call_tool(&self, name: &str, arguments: Option<Value>) -> Result<CallToolResult> {
        if !self.initialized {
            return Err(McpError::NotInitialized);
        }

        let params = CallToolParams {
            name: name.to_string(),
            arguments: arguments.unwrap_or_else(|| Value::Object(serde_json::Map::new())),
        };

        let result = self.exchange("tools/call", Some(serde_json::to_value(&params)?))?;
        let call_result: CallToolResult = serde_json::from_value(result)?;

        if call_result.is_error() {
            tracing::warn!(
                server = %self.config.name,
                tool = %name,
                "tool call returned error"
            );
        } else {
            tracing::debug!(
                server = %self.config.name,
                tool = %name,
                "tool call succeeded"
            );
        }

        Ok(call_result)
    }

    /// List available resources from the server.
    pub fn list_resources(&self) -> Result<Vec<ResourceInfo>> {
        if !self.initialized {
            return Err(McpError::NotInitialized);
        }

        let result = self.exchange("resources/list", None)?;
        let list_result: ListResourcesResult = serde_json::from_value(result)?;

        tracing::debug!(
            server = %self.config.name,
            resource_count = list_result.resources.len(),
            "listed MCP resources"
        );

        Ok(list_result.resources)
    }

    /// Read a resource from the server by URI.
    pub fn read_resource(&self, uri: &str) -> Result<ReadResourceResult> {
        if !self.initialized {
            return Err(McpError::NotInitialized);
        }

        let params = ReadResourceParams {
            uri: uri.to_string(),
        };

        let result = self.exchange("resources/read", Some(serde_json::to_value(&params)?))?;
        Ok(serde_json::from_value(result)?)
    }

    /// Close the session.
    ///
    /// Idempotent: tears down the active transport (terminating a stdio
    /// child, discarding HTTP state and session id) and resets the session
    /// to its empty state. Safe on a never-connected session.
    pub fn close(&mut self) {
        if let Ok(mut guard) = self.transport.lock() {
            if let Some(mut transport) = guard.take() {
                tracing::info!(server = %self.config.name, "closing MCP session");
                let _ = transport.stop();
            }
        }
        self.initialized = false;
        self.server_info = None;
    }
}

impl Drop for McpClient {
    fn drop(&mut self) {
        self.close();
    }
}
