//! Tool discovery commands.
//!
//! - `mcp-admin tools` - fetch `tools/list` and print the catalog
//! - `mcp-admin schema <tool>` - show a tool's schema and default arguments

use anyhow::Result;
use clap::Args;
use serde_json::json;

use mcp_admin_core::{McpError, McpSession, render_defaults};

use super::Context;
use super::output::{self, print_dim, print_error};

/// Arguments for `mcp-admin tools`.
#[derive(Args, Debug)]
pub struct ToolsArgs {
    /// Show full input schemas
    #[arg(long)]
    pub full: bool,
}

/// Arguments for `mcp-admin schema`.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Tool name as reported by tools/list
    pub tool: String,
}

/// Refresh the catalog, printing the server's answer when it fails.
///
/// Shared with `call --defaults` and the REPL.
pub async fn refresh(session: &mut McpSession, ctx: &Context) -> Result<()> {
    let spinner = if ctx.json_output {
        indicatif::ProgressBar::hidden()
    } else {
        output::spinner(format!("Listing tools at {}", session.endpoint()))
    };
    let result = session.refresh_catalog().await.map(|tools| tools.len());
    spinner.finish_and_clear();

    match result {
        Ok(count) => {
            tracing::debug!(count, "tool catalog refreshed");
            Ok(())
        }
        Err(McpError::CatalogRefresh { outcome }) => {
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                output::print_outcome("tools/list", &outcome);
            }
            anyhow::bail!("tools/list failed: {}", outcome.summary())
        }
        Err(e) => Err(e.into()),
    }
}

/// Run `mcp-admin tools`.
pub async fn run(args: ToolsArgs, ctx: &Context) -> Result<()> {
    let (mut session, _) = ctx.open_session()?;
    refresh(&mut session, ctx).await?;

    let tools = session.catalog().tools();
    if ctx.json_output {
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
        println!("{}", serde_json::to_string_pretty(&tools_json)?);
    } else {
        output::print_tools(tools, args.full);
    }

    Ok(())
}

/// Run `mcp-admin schema <tool>`.
pub async fn run_schema(args: SchemaArgs, ctx: &Context) -> Result<()> {
    let (mut session, _) = ctx.open_session()?;
    refresh(&mut session, ctx).await?;

    let tool = match session.tool(&args.tool) {
        Ok(tool) => tool,
        Err(e) => {
            if !ctx.json_output {
                print_error(&e.to_string());
                let names = session.catalog().names();
                if !names.is_empty() {
                    print_dim(&format!("Available: {}", names.join(", ")));
                }
            }
            return Err(e.into());
        }
    };

    if ctx.json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "name": tool.name,
                "description": tool.description,
                "schema": tool.input_schema,
                "defaults": session.default_arguments(&tool.name)?,
            }))?
        );
        return Ok(());
    }

    println!("{}", console::style(&tool.name).cyan().bold());
    if !tool.description.is_empty() {
        println!("{}", output::textwrap_simple(&tool.description, 76));
    }
    println!();
    println!("Input schema:");
    println!("{}", output::pretty(&tool.input_schema));
    println!();
    println!("Default arguments:");
    println!("{}", render_defaults(&tool.input_schema));

    Ok(())
}
