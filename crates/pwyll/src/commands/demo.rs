//! `pwyll demo` - scripted walkthrough of a server's surface.
//!
//! Connects, then lists the server's tools and resources in one pass.

use anyhow::Result;
use clap::Args;

use super::{Context, TargetArgs, connect, textwrap_simple};

/// Arguments for `pwyll demo`.
#[derive(Args, Debug)]
pub struct DemoArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Run `pwyll demo`.
pub fn run(args: DemoArgs, ctx: &Context) -> Result<()> {
    let mut client = connect(&args.target)?;

    let server_info = client
        .server_info()
        .map(|info| (info.name.clone(), info.version.clone()));

    let tools = client.list_tools().unwrap_or_default();
    let resources = client.list_resources().unwrap_or_default();

    client.close();

    if ctx.json_output {
        use serde_json::json;

        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "server": server_info.map(|(name, version)| json!({
                    "name": name,
                    "version": version,
                })),
                "tools": tools,
                "resources": resources,
            }))?
        );
        return Ok(());
    }

    if let Some((name, version)) = server_info {
        println!("Connected: {} v{}", name, version);
    }
    println!();

    if tools.is_empty() {
        println!("No tools available.");
    } else {
        println!("Tools ({}):", tools.len());
        for tool in &tools {
            match &tool.description {
                Some(desc) => {
                    let wrapped = textwrap_simple(desc, 60);
                    let mut lines = wrapped.lines();
                    println!(
                        "  {:<24} {}",
                        tool.name,
                        lines.next().unwrap_or_default()
                    );
                    for line in lines {
                        println!("  {:<24} {}", "", line);
                    }
                }
                None => println!("  {}", tool.name),
            }
        }
    }
    println!();

    if resources.is_empty() {
        println!("No resources available.");
    } else {
        println!("Resources ({}):", resources.len());
        for resource in &resources {
            match &resource.description {
                Some(desc) => println!("  {:<32} {}", resource.uri, desc),
                None => println!("  {}", resource.uri),
            }
        }
    }

    Ok(())
}
