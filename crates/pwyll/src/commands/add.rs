//! `pwyll add` - add an MCP server configuration.

use anyhow::Result;
use clap::Args;

use pwyll_config::{ServerEntry, TransportKind, load_config, save_config};

use super::Context;

/// Arguments for `pwyll add`.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Unique name for this MCP server
    pub name: String,

    /// Command to spawn (for stdio transport) or URL (for http transport)
    pub target: String,

    /// Use HTTP transport instead of stdio
    #[arg(long)]
    pub http: bool,

    /// Arguments to pass to the command (stdio only)
    #[arg(last = true)]
    pub args: Vec<String>,

    /// Environment variables in KEY=VALUE format
    #[arg(long = "env", short = 'e')]
    pub env_vars: Vec<String>,

    /// HTTP header in KEY=VALUE format (http only)
    #[arg(long = "header", short = 'H')]
    pub headers: Vec<String>,

    /// Request timeout in seconds (http only)
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Add the server disabled
    #[arg(long)]
    pub disabled: bool,
}

/// Run `pwyll add`.
pub fn run(args: AddArgs, ctx: &Context) -> Result<()> {
    let mut config = load_config(None)?;

    if config.servers.iter().any(|s| s.name == args.name) {
        return Err(anyhow::anyhow!(
            "MCP server '{}' already exists. Use 'pwyll remove {}' first.",
            args.name,
            args.name
        ));
    }

    // Parse environment variables as [key, value] pairs
    let mut env: Vec<[String; 2]> = Vec::new();
    for var in &args.env_vars {
        if let Some((key, value)) = var.split_once('=') {
            env.push([key.to_string(), value.to_string()]);
        } else {
            return Err(anyhow::anyhow!(
                "Invalid environment variable format: '{}'. Use KEY=VALUE.",
                var
            ));
        }
    }

    let entry = if args.http {
        let mut headers: Vec<[String; 2]> = Vec::new();
        for header in &args.headers {
            if let Some((key, value)) = header.split_once('=') {
                headers.push([key.to_string(), value.to_string()]);
            } else {
                return Err(anyhow::anyhow!(
                    "Invalid header format: '{}'. Use KEY=VALUE.",
                    header
                ));
            }
        }

        ServerEntry {
            name: args.name.clone(),
            transport: TransportKind::Http,
            command: String::new(),
            url: Some(args.target.clone()),
            args: Vec::new(),
            env,
            headers,
            timeout_secs: Some(args.timeout),
            enabled: !args.disabled,
        }
    } else {
        ServerEntry {
            name: args.name.clone(),
            transport: TransportKind::Stdio,
            command: args.target.clone(),
            url: None,
            args: args.args.clone(),
            env,
            headers: Vec::new(),
            timeout_secs: None,
            enabled: !args.disabled,
        }
    };

    if ctx.verbose {
        println!("Adding MCP server: {}", args.name);
        if args.http {
            println!("  Transport: HTTP");
            println!("  URL: {}", args.target);
        } else {
            println!("  Transport: stdio");
            println!("  Command: {}", args.target);
            if !args.args.is_empty() {
                println!("  Args: {}", args.args.join(" "));
            }
        }
    }

    config.servers.push(entry);

    let config_path = pwyll_config::config_path()
        .ok_or_else(|| anyhow::anyhow!("no config directory available"))?;
    save_config(&config, &config_path)?;

    if ctx.json_output {
        use serde_json::json;
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "status": "added",
                "name": args.name,
                "config_path": config_path.display().to_string(),
            }))?
        );
    } else {
        println!("Added MCP server: {}", args.name);
        println!("Config saved to: {}", config_path.display());
        println!();
        println!("Test connection with:");
        println!("  pwyll tools --server {}", args.name);
    }

    Ok(())
}
