//! `pwyll remove` - remove an MCP server configuration.

use anyhow::Result;
use clap::Args;

use pwyll_config::{load_config, save_config};

use super::Context;

/// Arguments for `pwyll remove`.
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Name of the MCP server to remove
    pub name: String,
}

/// Run `pwyll remove`.
pub fn run(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let mut config = load_config(None)?;

    let original_len = config.servers.len();
    config.servers.retain(|s| s.name != args.name);

    if config.servers.len() == original_len {
        return Err(anyhow::anyhow!(
            "MCP server '{}' not found. Use 'pwyll list' to see configured servers.",
            args.name
        ));
    }

    let config_path = pwyll_config::config_path()
        .ok_or_else(|| anyhow::anyhow!("no config directory available"))?;
    save_config(&config, &config_path)?;

    if ctx.json_output {
        use serde_json::json;
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "status": "removed",
                "name": args.name,
                "config_path": config_path.display().to_string(),
            }))?
        );
    } else {
        println!("Removed MCP server: {}", args.name);
        println!("Config saved to: {}", config_path.display());
    }

    Ok(())
}
