//! CLI command handlers.

use std::time::Duration;

use anyhow::Result;
use clap::Args;

use pwyll_config::ServerEntry;
use pwyll_mcp::{McpClient, McpServerConfig};

pub mod add;
pub mod call;
pub mod demo;
pub mod list;
pub mod remove;
pub mod resources;
pub mod tools;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

/// Connection target shared by the session commands.
///
/// Either a configured server name, or an ad-hoc stdio command / HTTP URL.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Name of a configured server (see `pwyll add`)
    #[arg(long, short = 's')]
    pub server: Option<String>,

    /// Spawn this command as a stdio server
    #[arg(long, conflicts_with = "server")]
    pub cmd: Option<String>,

    /// Argument for --cmd (repeatable)
    #[arg(long = "cmd-arg", requires = "cmd")]
    pub cmd_args: Vec<String>,

    /// Connect to this URL over HTTP
    #[arg(long, conflicts_with_all = ["server", "cmd"])]
    pub url: Option<String>,

    /// Request timeout in seconds (http only)
    #[arg(long, default_value = "30")]
    pub timeout: u64,
}

impl TargetArgs {
    /// Resolve the target to an MCP server config.
    pub fn to_server_config(&self) -> Result<McpServerConfig> {
        if let Some(name) = &self.server {
            let config = pwyll_config::load_config(None)?;
            let entry = config.server(name).ok_or_else(|| {
                anyhow::anyhow!(
                    "MCP server '{}' not found. Use 'pwyll list' to see configured servers.",
                    name
                )
            })?;
            return entry_to_config(entry);
        }

        if let Some(cmd) = &self.cmd {
            return Ok(McpServerConfig::new("cli", cmd).with_args(self.cmd_args.clone()));
        }

        if let Some(url) = &self.url {
            return Ok(McpServerConfig::http("cli", url)
                .with_timeout(Duration::from_secs(self.timeout)));
        }

        Err(anyhow::anyhow!(
            "no target: pass --server <name>, --cmd <command>, or --url <url>"
        ))
    }
}

/// Convert a ServerEntry to an McpServerConfig.
pub fn entry_to_config(entry: &ServerEntry) -> Result<McpServerConfig> {
    if entry.is_http() {
        let url = entry
            .url
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("HTTP server '{}' missing URL", entry.name))?;

        let mut config = McpServerConfig::http(&entry.name, url);

        for (key, value) in entry.header_tuples() {
            config = config.with_header(key, value);
        }

        if let Some(timeout) = entry.timeout_secs {
            config = config.with_timeout(Duration::from_secs(timeout));
        }

        Ok(config)
    } else {
        let mut config = McpServerConfig::new(&entry.name, &entry.command);
        config = config.with_args(entry.args.clone());
        config = config.with_env(entry.env_tuples());
        Ok(config)
    }
}

/// Connect a session to the resolved target.
pub fn connect(target: &TargetArgs) -> Result<McpClient> {
    let config = target.to_server_config()?;
    let mut client = McpClient::new(config);
    client.connect()?;
    Ok(client)
}

/// Truncate a string to a maximum length.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}

/// Simple text wrapping helper.
pub fn textwrap_simple(text: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            result.push_str(&current_line);
            result.push('\n');
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        result.push_str(&current_line);
    }

    result
}
