//! `pwyll resources` / `pwyll read` - list and read server resources.

use anyhow::Result;
use clap::Args;

use super::{Context, TargetArgs, connect, textwrap_simple};

/// Arguments for `pwyll resources`.
#[derive(Args, Debug)]
pub struct ResourcesArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for `pwyll read`.
#[derive(Args, Debug)]
pub struct ReadArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// URI of the resource to read
    pub uri: String,
}

/// Run `pwyll resources`.
pub fn run_list(args: ResourcesArgs, ctx: &Context) -> Result<()> {
    let mut client = connect(&args.target)?;
    let resources = client.list_resources()?;
    client.close();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&resources)?);
    } else if resources.is_empty() {
        println!("No resources available.");
    } else {
        println!("Available resources ({}):", resources.len());
        for resource in &resources {
            println!("  • {}", resource.uri);
            if let Some(name) = &resource.name {
                println!("      Name: {}", name);
            }
            if let Some(desc) = &resource.description {
                let wrapped = textwrap_simple(desc, 70);
                for line in wrapped.lines() {
                    println!("      {}", line);
                }
            }
            if let Some(mime) = &resource.mime_type {
                println!("      Type: {}", mime);
            }
        }
    }

    Ok(())
}

/// Run `pwyll read`.
pub fn run_read(args: ReadArgs, ctx: &Context) -> Result<()> {
    let mut client = connect(&args.target)?;
    let result = client.read_resource(&args.uri)?;
    client.close();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        match result.text() {
            Some(text) => println!("{}", text),
            None => println!("(no text content)"),
        }
    }

    Ok(())
}
