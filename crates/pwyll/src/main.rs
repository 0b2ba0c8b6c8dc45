//! Pwyll - MCP client for the command line
//!
//! Main entry point for the Pwyll CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{add, call, demo, list, remove, resources, tools};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Pwyll - MCP client for the command line
#[derive(Parser)]
#[command(name = "pwyll")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add an MCP server configuration
    Add(add::AddArgs),

    /// Remove an MCP server configuration
    Remove(remove::RemoveArgs),

    /// List configured MCP servers
    List(list::ListArgs),

    /// Connect to a server and list its tools
    Tools(tools::ToolsArgs),

    /// Call a tool on a server
    Call(call::CallArgs),

    /// List resources exposed by a server
    Resources(resources::ResourcesArgs),

    /// Read a resource from a server by URI
    Read(resources::ReadArgs),

    /// Connect and walk through a server's tools and resources
    Demo(demo::DemoArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing — console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "pwyll=debug,pwyll_mcp=debug,pwyll_config=debug,info"
    } else {
        "pwyll=info,pwyll_mcp=warn,pwyll_config=warn,warn"
    };

    let log_dir = pwyll_config::config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "pwyll.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "pwyll=trace,pwyll_mcp=trace,pwyll_config=trace,info",
                )),
        )
        .init();

    // Create context for commands
    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Add(args) => add::run(args, &ctx),
        Commands::Remove(args) => remove::run(args, &ctx),
        Commands::List(args) => list::run(args, &ctx),
        Commands::Tools(args) => tools::run(args, &ctx),
        Commands::Call(args) => call::run(args, &ctx),
        Commands::Resources(args) => resources::run_list(args, &ctx),
        Commands::Read(args) => resources::run_read(args, &ctx),
        Commands::Demo(args) => demo::run(args, &ctx),
    }
}
