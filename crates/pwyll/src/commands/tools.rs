//! `pwyll tools` - connect to a server and list its tools.

use anyhow::Result;
use clap::Args;

use super::{Context, TargetArgs, connect, textwrap_simple};

/// Arguments for `pwyll tools`.
#[derive(Args, Debug)]
pub struct ToolsArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Show full tool schemas
    #[arg(long)]
    pub full: bool,
}

/// Run `pwyll tools`.
pub fn run(args: ToolsArgs, ctx: &Context) -> Result<()> {
    let mut client = connect(&args.target)?;

    let server_info = client
        .server_info()
        .map(|info| (info.name.clone(), info.version.clone()));

    let tools = client.list_tools()?;
    client.close();

    if ctx.json_output {
        use serde_json::json;

        let tools_json: Vec<_> = tools
            .iter()
            .map(|t| {
                if args.full {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "schema": t.input_schema,
                    })
                } else {
                    json!({
                        "name": t.name,
                        "description": t.description,
                    })
                }
            })
            .collect();

        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "server": server_info.map(|(name, version)| json!({
                    "name": name,
                    "version": version,
                })),
                "tools": tools_json,
            }))?
        );
    } else {
        if let Some((name, version)) = server_info {
            println!("Server: {} v{}", name, version);
            println!();
        }

        if tools.is_empty() {
            println!("No tools available.");
        } else {
            println!("Available tools ({}):", tools.len());
            for tool in &tools {
                println!("  • {}", tool.name);
                if let Some(desc) = &tool.description {
                    let wrapped = textwrap_simple(desc, 70);
                    for line in wrapped.lines() {
                        println!("      {}", line);
                    }
                }
                if args.full {
                    println!(
                        "      Schema: {}",
                        serde_json::to_string(&tool.input_schema)?
                    );
                }
            }
        }
    }

    Ok(())
}
