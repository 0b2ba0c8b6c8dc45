//! Transport layer for MCP communication.
//!
//! MCP uses newline-delimited JSON-RPC over stdio for local servers, or
//! HTTP POST with a streamable (event-stream framed) response body for
//! remote servers.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::codec;
use crate::error::{McpError, Result};
use crate::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

/// Response header carrying the server-issued session id.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Delay after spawning a stdio server before the handshake is attempted.
/// MCP offers no readiness signal on stdio, so startup is a fixed wait.
pub const STARTUP_DELAY: Duration = Duration::from_millis(200);

/// Bound on the graceful-exit wait before a stdio server is force-killed.
pub const SHUTDOWN_WAIT: Duration = Duration::from_secs(5);

/// Normalize a base URL so it ends with the canonical `/mcp/` mount path.
///
/// Handles all four caller shapes: `host`, `host/`, `host/mcp`, `host/mcp/`.
pub fn normalize_base_url(url: &str) -> String {
    if url.ends_with("/mcp/") {
        url.to_string()
    } else if url.ends_with("/mcp") {
        format!("{url}/")
    } else if url.ends_with('/') {
        format!("{url}mcp/")
    } else {
        format!("{url}/mcp/")
    }
}

/// Configuration for HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Base URL of the MCP server.
    pub url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Optional authentication headers.
    pub headers: Vec<(String, String)>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout: Duration::from_secs(30),
            headers: Vec::new(),
        }
    }
}

impl HttpTransportConfig {
    /// Create a new HTTP transport config with the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// Transport for communicating with an MCP server.
pub enum McpTransport {
    /// Stdio transport - communicates with a child process via stdin/stdout.
    Stdio {
        /// The child process.
        child: Child,
        /// Buffered writer to stdin. Taken on stop so the child sees EOF.
        stdin: Option<BufWriter<ChildStdin>>,
        /// Buffered reader from stdout.
        stdout: BufReader<ChildStdout>,
        /// Detached stderr drain, joined on stop.
        stderr_drain: Option<JoinHandle<()>>,
    },
    /// HTTP transport - communicates via HTTP POST requests.
    Http {
        /// HTTP client.
        client: reqwest::blocking::Client,
        /// Transport configuration with the normalized base URL.
        config: HttpTransportConfig,
        /// Session id issued by the server, propagated on every request.
        session_id: Option<String>,
    },
}

impl McpTransport {
    /// Create a new HTTP transport.
    ///
    /// Normalizes the base URL to the `/mcp/` mount path and validates it.
    pub fn connect_http(config: HttpTransportConfig) -> Result<Self> {
        let base_url = normalize_base_url(&config.url);

        let _parsed = url::Url::parse(&base_url)
            .map_err(|e| McpError::transport(format!("invalid URL: {}", e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| McpError::transport(format!("failed to build HTTP client: {}", e)))?;

        tracing::info!(
            url = %base_url,
            timeout_secs = config.timeout.as_secs(),
            "created HTTP transport"
        );

        Ok(Self::Http {
            client,
            config: HttpTransportConfig {
                url: base_url,
                ..config
            },
            session_id: None,
        })
    }

    /// Spawn a new stdio transport.
    ///
    /// # Arguments
    /// * `command` - The command to spawn (e.g., "mcp-server-sqlite")
    /// * `args` - Arguments to pass to the command
    /// * `env` - Optional environment variables to set
    pub fn spawn_stdio(
        command: &str,
        args: &[String],
        env: Option<&[(String, String)]>,
    ) -> Result<Self> {
        let mut cmd = Command::new(command);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Add environment variables if provided
        if let Some(env_vars) = env {
            for (key, value) in env_vars {
                cmd.env(key, value);
            }
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| McpError::spawn_failed(format!("failed to spawn '{}': {}", command, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::spawn_failed("failed to capture stdin"))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::spawn_failed("failed to capture stdout"))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| McpError::spawn_failed("failed to capture stderr"))?;

        let stderr_drain = spawn_stderr_drain(command.to_string(), stderr);

        // Let the server come up before the handshake is attempted.
        thread::sleep(STARTUP_DELAY);

        Ok(Self::Stdio {
            child,
            stdin: Some(BufWriter::new(stdin)),
            stdout: BufReader::new(stdout),
            stderr_drain: Some(stderr_drain),
        })
    }

    /// Send a JSON-RPC request and wait for the response.
    ///
    /// The stdio read blocks without a timeout; the HTTP exchange is bounded
    /// by the configured timeout.
    pub fn send_request(&mut self, request: &JsonRpcRequest) -> Result<JsonRpcResponse> {
        match self {
            Self::Stdio {
                child,
                stdin,
                stdout,
                ..
            } => {
                if !matches!(child.try_wait(), Ok(None)) {
                    return Err(McpError::ConnectionClosed);
                }

                let stdin = stdin.as_mut().ok_or(McpError::ConnectionClosed)?;
                let line = codec::encode(request)?;
                writeln!(stdin, "{}", line)?;
                stdin.flush()?;

                tracing::trace!(id = request.id, method = %request.method, "sent MCP request");

                let mut response_line = String::new();
                if stdout.read_line(&mut response_line)? == 0 {
                    return Err(McpError::ConnectionClosed);
                }

                tracing::trace!(json = %response_line.trim(), "received MCP response");

                codec::decode_line(&response_line)
            }
            Self::Http {
                client,
                config,
                session_id,
            } => {
                let body = codec::encode(request)?;
                let response = Self::build_http_request(client, config, session_id.as_deref(), body)
                    .send()
                    .map_err(|e| {
                        if e.is_timeout() {
                            McpError::Timeout
                        } else {
                            McpError::transport(format!("HTTP request failed: {}", e))
                        }
                    })?;

                capture_session_id(session_id, &response);

                let status = response.status();
                let text = response.text().map_err(|e| {
                    McpError::transport(format!("failed to read response body: {}", e))
                })?;

                tracing::trace!(status = %status, json = %text, "received MCP HTTP response");

                if status.is_success() {
                    if text.trim().is_empty() {
                        // Empty body means the server accepted without payload.
                        Ok(JsonRpcResponse::ack(request.id))
                    } else {
                        codec::decode_body(&text)
                    }
                } else {
                    // Error bodies may still carry a structured JSON-RPC error.
                    match codec::decode_body(&text) {
                        Ok(decoded) => Ok(decoded),
                        Err(_) => Err(McpError::transport(format!(
                            "HTTP error {}: {}",
                            status, text
                        ))),
                    }
                }
            }
        }
    }

    /// Send a JSON-RPC notification (no response expected).
    ///
    /// Never blocks waiting for a peer payload; a successful write (or POST)
    /// is the acknowledgment.
    pub fn send_notification(&mut self, notification: &JsonRpcNotification) -> Result<()> {
        match self {
            Self::Stdio { stdin, .. } => {
                let stdin = stdin.as_mut().ok_or(McpError::ConnectionClosed)?;
                let line = codec::encode(notification)?;
                writeln!(stdin, "{}", line)?;
                stdin.flush()?;

                tracing::trace!(method = %notification.method, "sent MCP notification");

                Ok(())
            }
            Self::Http {
                client,
                config,
                session_id,
            } => {
                let body = codec::encode(notification)?;
                let response = Self::build_http_request(client, config, session_id.as_deref(), body)
                    .send()
                    .map_err(|e| McpError::transport(format!("notification failed: {}", e)))?;

                capture_session_id(session_id, &response);

                if !response.status().is_success() {
                    tracing::warn!(
                        status = %response.status(),
                        method = %notification.method,
                        "notification returned non-success status"
                    );
                }

                Ok(())
            }
        }
    }

    /// Build an HTTP request with the protocol headers.
    fn build_http_request(
        client: &reqwest::blocking::Client,
        config: &HttpTransportConfig,
        session_id: Option<&str>,
        body: String,
    ) -> reqwest::blocking::RequestBuilder {
        let mut req = client
            .post(&config.url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json, text/event-stream")
            .body(body);

        for (key, value) in &config.headers {
            req = req.header(key, value);
        }

        if let Some(id) = session_id {
            req = req.header(SESSION_HEADER, id);
        }

        req
    }

    /// Shutdown the transport gracefully.
    ///
    /// Idempotent. For stdio: closes stdin (the exit request), waits up to
    /// [`SHUTDOWN_WAIT`] for the child to exit, then force-kills it.
    pub fn stop(&mut self) -> Result<()> {
        match self {
            Self::Stdio {
                child,
                stdin,
                stderr_drain,
                ..
            } => {
                drop(stdin.take());

                let deadline = Instant::now() + SHUTDOWN_WAIT;
                let mut exited = false;
                loop {
                    match child.try_wait() {
                        Ok(Some(_)) => {
                            exited = true;
                            break;
                        }
                        Ok(None) => {
                            if Instant::now() >= deadline {
                                break;
                            }
                            thread::sleep(Duration::from_millis(50));
                        }
                        Err(_) => break,
                    }
                }

                if !exited {
                    let _ = child.kill();
                    let _ = child.wait();
                }

                if let Some(handle) = stderr_drain.take() {
                    let _ = handle.join();
                }

                Ok(())
            }
            Self::Http { .. } => {
                // Nothing persistent to tear down; the session id dies with us.
                Ok(())
            }
        }
    }

    /// Check if the transport is still connected.
    pub fn is_connected(&mut self) -> bool {
        match self {
            Self::Stdio { child, .. } => matches!(child.try_wait(), Ok(None)),
            Self::Http { .. } => true,
        }
    }

    /// Get the captured session id (HTTP transport only).
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::Http { session_id, .. } => session_id.as_deref(),
            Self::Stdio { .. } => None,
        }
    }

    /// Check if this is an HTTP transport.
    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// Check if this is a stdio transport.
    pub fn is_stdio(&self) -> bool {
        matches!(self, Self::Stdio { .. })
    }
}

impl Drop for McpTransport {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Start the detached stderr drain for a spawned server.
///
/// Reads lines until the stream closes and forwards each to the log. Shares
/// no state with the exchange path.
fn spawn_stderr_drain(command: String, stderr: ChildStderr) -> JoinHandle<()> {
    thread::spawn(move || {
        let reader = BufReader::new(stderr);
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        tracing::warn!(command = %command, line = %line, "server stderr");
                    }
                }
                Err(_) => break,
            }
        }
    })
}

/// Capture or refresh the session id from a response header.
fn capture_session_id(session_id: &mut Option<String>, response: &reqwest::blocking::Response) {
    if let Some(value) = response
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        if session_id.as_deref() != Some(value) {
            tracing::debug!(session = %value, "captured MCP session id");
            *session_id = Some(value.to_string());
        }
    }
}
