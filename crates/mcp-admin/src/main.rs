//! mcp-admin - interactive client for JSON-RPC tool servers
//!
//! Main entry point for the mcp-admin CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{call, config, preset, repl, tools};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// mcp-admin - list and call tools on an MCP server
#[derive(Parser)]
#[command(name = "mcp-admin")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Endpoint URL (default: current context, then http://localhost:8787/mcp)
    #[arg(long, global = true, env = "MCP_ADMIN_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Bearer token sent as `Authorization: Bearer <token>`
    #[arg(long, global = true, env = "MCP_ADMIN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Named context from the config file (default: current-context)
    #[arg(long, global = true)]
    pub context: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and list the server's tools (tools/list)
    Tools(tools::ToolsArgs),

    /// Show a tool's input schema and synthesized default arguments
    Schema(tools::SchemaArgs),

    /// Call a tool once (tools/call)
    Call(call::CallArgs),

    /// Run or list saved tool calls from the config file
    Preset(preset::PresetArgs),

    /// Enter interactive mode (REPL) with a session-wide catalog and history
    Repl(repl::ReplArgs),

    /// Connection context management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console layer on stderr plus a daily JSON log file
    let filter = if cli.verbose {
        "mcp_admin=debug,mcp_admin_core=debug,mcp_admin_config=debug,info"
    } else {
        "mcp_admin=warn,mcp_admin_core=warn,mcp_admin_config=warn,error"
    };

    let file_appender = tracing_appender::rolling::daily(mcp_admin_config::log_dir(), "mcp-admin.log");
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
                    "mcp_admin=trace,mcp_admin_core=trace,mcp_admin_config=debug,info",
                )),
        )
        .init();

    // Create context for commands
    let ctx = commands::Context {
        endpoint: cli.endpoint,
        token: cli.token,
        context: cli.context,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Tools(args) => tools::run(args, &ctx).await,
        Commands::Schema(args) => tools::run_schema(args, &ctx).await,
        Commands::Call(args) => call::run(args, &ctx).await,
        Commands::Preset(args) => preset::run(args, &ctx).await,
        Commands::Repl(args) => repl::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
