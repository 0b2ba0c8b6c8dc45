//! Configuration types.

use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

/// Top-level Pwyll configuration.
///
/// ```toml
/// [[servers]]
/// name = "filesystem"
/// command = "mcp-server-filesystem"
/// args = ["--allowed-dirs", "/home/user/projects"]
/// env = [["DEBUG", "1"]]
///
/// [[servers]]
/// name = "remote"
/// transport = "http"
/// url = "http://localhost:8080"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configured MCP servers.
    pub servers: Vec<ServerEntry>,
}

impl Config {
    /// Find a server entry by name.
    pub fn server(&self, name: &str) -> Option<&ServerEntry> {
        self.servers.iter().find(|s| s.name == name)
    }
}

/// Transport type for MCP server connections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Stdio transport - spawns a child process.
    #[default]
    Stdio,
    /// HTTP transport - connects to a remote server via HTTP POST.
    Http,
}

/// Configuration for a single MCP server.
///
/// Defines how to spawn or reach an MCP server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerEntry {
    /// Unique name for this server.
    pub name: String,
    /// Transport type (stdio or http). Defaults to stdio.
    #[serde(default)]
    pub transport: TransportKind,
    /// Command to execute to start the server (for stdio transport).
    #[serde(default)]
    pub command: String,
    /// URL for the server (for HTTP transport).
    pub url: Option<String>,
    /// Arguments to pass to the command (for stdio transport).
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment variables to set (as [key, value] pairs, for stdio transport).
    #[serde(default)]
    pub env: Vec<[String; 2]>,
    /// HTTP headers to set (as [key, value] pairs, for HTTP transport).
    #[serde(default)]
    pub headers: Vec<[String; 2]>,
    /// Request timeout in seconds (for HTTP transport). Defaults to 30.
    pub timeout_secs: Option<u64>,
    /// Whether this server is enabled. Defaults to true.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl ServerEntry {
    /// Create a new MCP server entry for stdio transport.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: TransportKind::Stdio,
            command: command.into(),
            url: None,
            args: Vec::new(),
            env: Vec::new(),
            headers: Vec::new(),
            timeout_secs: None,
            enabled: true,
        }
    }

    /// Create a new MCP server entry for HTTP transport.
    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: TransportKind::Http,
            command: String::new(),
            url: Some(url.into()),
            args: Vec::new(),
            env: Vec::new(),
            headers: Vec::new(),
            timeout_secs: None,
            enabled: true,
        }
    }

    /// Add an argument (for stdio transport).
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add arguments (for stdio transport).
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Add an environment variable (for stdio transport).
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push([key.into(), value.into()]);
        self
    }

    /// Add an HTTP header (for HTTP transport).
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push([key.into(), value.into()]);
        self
    }

    /// Set request timeout in seconds (for HTTP transport).
    pub fn with_timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = Some(timeout);
        self
    }

    /// Set enabled state.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Check if this is an HTTP transport.
    pub fn is_http(&self) -> bool {
        matches!(self.transport, TransportKind::Http)
    }

    /// Check if this is a stdio transport.
    pub fn is_stdio(&self) -> bool {
        matches!(self.transport, TransportKind::Stdio)
    }

    /// Environment variables as tuples.
    pub fn env_tuples(&self) -> Vec<(String, String)> {
        self.env
            .iter()
            .map(|[k, v]| (k.clone(), v.clone()))
            .collect()
    }

    /// HTTP headers as tuples.
    pub fn header_tuples(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|[k, v]| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_empty() {
        let cfg = Config::default();
        assert!(cfg.servers.is_empty());
        assert!(cfg.server("anything").is_none());
    }

    #[test]
    fn test_stdio_entry_builder() {
        let entry = ServerEntry::new("sqlite", "mcp-server-sqlite")
            .with_arg("--db")
            .with_arg("/path/to/db.sqlite")
            .with_env("DEBUG", "1");

        assert_eq!(entry.name, "sqlite");
        assert_eq!(entry.command, "mcp-server-sqlite");
        assert_eq!(entry.args, vec!["--db", "/path/to/db.sqlite"]);
        assert_eq!(
            entry.env_tuples(),
            vec![("DEBUG".to_string(), "1".to_string())]
        );
        assert!(entry.is_stdio());
        assert!(!entry.is_http());
        assert!(entry.enabled);
    }

    #[test]
    fn test_http_entry_builder() {
        let entry = ServerEntry::http("remote", "http://localhost:8080")
            .with_header("Authorization", "Bearer token")
            .with_timeout_secs(60)
            .with_enabled(false);

        assert_eq!(entry.url.as_deref(), Some("http://localhost:8080"));
        assert!(entry.is_http());
        assert_eq!(entry.timeout_secs, Some(60));
        assert!(!entry.enabled);
        assert_eq!(
            entry.header_tuples(),
            vec![("Authorization".to_string(), "Bearer token".to_string())]
        );
    }

    #[test]
    fn test_toml_round_trip() {
        let mut cfg = Config::default();
        cfg.servers
            .push(ServerEntry::new("fs", "mcp-server-filesystem").with_arg("--root"));
        cfg.servers.push(ServerEntry::http("remote", "http://localhost:8080"));

        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.servers, cfg.servers);
    }

    #[test]
    fn test_transport_defaults_to_stdio() {
        let toml_str = r#"
            [[servers]]
            name = "fs"
            command = "mcp-server-filesystem"
        "#;
        let parsed: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(parsed.servers.len(), 1);
        assert!(parsed.servers[0].is_stdio());
        assert!(parsed.servers[0].enabled);
    }

    #[test]
    fn test_http_transport_parses() {
        let toml_str = r#"
            [[servers]]
            name = "remote"
            transport = "http"
            url = "http://localhost:8080"
            headers = [["X-Api-Key", "secret"]]
            timeout_secs = 45
        "#;
        let parsed: Config = toml::from_str(toml_str).unwrap();
        let entry = parsed.server("remote").unwrap();
        assert!(entry.is_http());
        assert_eq!(entry.timeout_secs, Some(45));
        assert_eq!(
            entry.header_tuples(),
            vec![("X-Api-Key".to_string(), "secret".to_string())]
        );
    }
}
