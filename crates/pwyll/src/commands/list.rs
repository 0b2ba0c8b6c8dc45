//! `pwyll list` - list configured MCP servers and their tools.

use anyhow::Result;
use clap::Args;

use pwyll_config::{ServerEntry, TransportKind, load_config};
use pwyll_mcp::McpClient;

use super::{Context, entry_to_config, truncate};

/// Arguments for `pwyll list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show tools available from each server (requires connecting)
    #[arg(long)]
    pub tools: bool,
}

/// Run `pwyll list`.
pub fn run(args: ListArgs, ctx: &Context) -> Result<()> {
    let config = load_config(None)?;

    if config.servers.is_empty() {
        if ctx.json_output {
            println!("[]");
        } else {
            println!("No MCP servers configured.");
            println!();
            println!("Add a server with:");
            println!("  pwyll add <name> <command> [-- args...]");
            println!("  pwyll add <name> <url> --http");
        }
        return Ok(());
    }

    if ctx.json_output {
        print_list_json(&config.servers, args.tools)?;
    } else {
        print_list_table(&config.servers, args.tools, ctx.verbose)?;
    }

    Ok(())
}

/// Print server list as JSON.
fn print_list_json(servers: &[ServerEntry], show_tools: bool) -> Result<()> {
    use serde_json::json;

    let mut output = Vec::new();

    for server in servers {
        let mut entry = json!({
            "name": server.name,
            "enabled": server.enabled,
            "transport": match server.transport {
                TransportKind::Stdio => "stdio",
                TransportKind::Http => "http",
            },
        });

        if server.is_http() {
            entry["url"] = json!(server.url);
        } else {
            entry["command"] = json!(server.command);
            if !server.args.is_empty() {
                entry["args"] = json!(server.args);
            }
        }

        if show_tools {
            match connect_and_list_tools(server) {
                Ok(tools) => {
                    entry["status"] = json!("connected");
                    entry["tools"] = json!(tools);
                }
                Err(e) => {
                    entry["status"] = json!("error");
                    entry["error"] = json!(e.to_string());
                }
            }
        }

        output.push(entry);
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Print server list as a table.
fn print_list_table(servers: &[ServerEntry], show_tools: bool, verbose: bool) -> Result<()> {
    println!(
        "{:<20} {:<10} {:<10} {:<40}",
        "NAME", "TRANSPORT", "STATUS", "TARGET"
    );
    println!("{}", "-".repeat(80));

    for server in servers {
        let transport = match server.transport {
            TransportKind::Stdio => "stdio",
            TransportKind::Http => "http",
        };

        let status = if server.enabled { "enabled" } else { "disabled" };

        let target = if server.is_http() {
            server.url.clone().unwrap_or_default()
        } else {
            let mut cmd = server.command.clone();
            if !server.args.is_empty() {
                cmd.push(' ');
                cmd.push_str(&server.args.join(" "));
            }
            cmd
        };

        println!(
            "{:<20} {:<10} {:<10} {:<40}",
            truncate(&server.name, 20),
            transport,
            status,
            truncate(&target, 40)
        );

        if verbose {
            if !server.env.is_empty() {
                println!("  Environment:");
                for kv in &server.env {
                    println!("    {}={}", kv[0], kv[1]);
                }
            }
            if server.is_http() {
                if !server.headers.is_empty() {
                    println!("  Headers:");
                    for kv in &server.headers {
                        println!("    {}: {}", kv[0], kv[1]);
                    }
                }
                if let Some(timeout) = server.timeout_secs {
                    println!("  Timeout: {}s", timeout);
                }
            }
        }

        if show_tools {
            match connect_and_list_tools(server) {
                Ok(tools) => {
                    if tools.is_empty() {
                        println!("  Tools: (none)");
                    } else {
                        println!("  Tools ({}):", tools.len());
                        for tool in tools {
                            println!("    - {}", tool);
                        }
                    }
                }
                Err(e) => {
                    println!("  Error: {}", e);
                }
            }
        }
    }

    Ok(())
}

/// Connect to an MCP server and list its tool names.
fn connect_and_list_tools(server: &ServerEntry) -> Result<Vec<String>> {
    let config = entry_to_config(server)?;
    let mut client = McpClient::new(config);
    client.connect()?;

    let tools = client.list_tools()?;
    let tool_names: Vec<String> = tools.into_iter().map(|t| t.name).collect();

    client.close();

    Ok(tool_names)
}
