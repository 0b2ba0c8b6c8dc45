//! `pwyll call` - call a tool on a server.

use anyhow::Result;
use clap::Args;

use super::{Context, TargetArgs, connect};

/// Arguments for `pwyll call`.
#[derive(Args, Debug)]
pub struct CallArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Name of the tool to call
    pub tool: String,

    /// Tool arguments as a JSON object (defaults to {})
    pub arguments: Option<String>,
}

/// Run `pwyll call`.
pub fn run(args: CallArgs, ctx: &Context) -> Result<()> {
    let arguments = match &args.arguments {
        Some(raw) => Some(
            serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("Invalid JSON arguments: {}", e))?,
        ),
        None => None,
    };

    let mut client = connect(&args.target)?;
    let result = client.call_tool(&args.tool, arguments)?;
    client.close();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.is_error() {
        return Err(anyhow::anyhow!(
            "tool '{}' returned an error: {}",
            args.tool,
            result.text().unwrap_or_default()
        ));
    } else {
        match result.text() {
            Some(text) if !text.is_empty() => println!("{}", text),
            _ => println!("(no text content)"),
        }
    }

    Ok(())
}
