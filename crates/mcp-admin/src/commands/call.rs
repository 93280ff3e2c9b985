//! One-shot `tools/call`.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use mcp_admin_core::RpcOutcome;

use super::Context;
use super::output::{self, print_error};
use super::tools::refresh;

/// Arguments for `mcp-admin call`.
#[derive(Args, Debug)]
pub struct CallArgs {
    /// Tool name
    pub tool: String,

    /// Arguments as a JSON object
    #[arg(long, short = 'a', conflicts_with_all = ["args_file", "defaults"])]
    pub args: Option<String>,

    /// Read the arguments object from a file
    #[arg(long, value_name = "PATH", conflicts_with = "defaults")]
    pub args_file: Option<PathBuf>,

    /// Fetch the catalog and send the tool's synthesized default arguments
    #[arg(long)]
    pub defaults: bool,
}

/// Run `mcp-admin call`.
pub async fn run(args: CallArgs, ctx: &Context) -> Result<()> {
    let (mut session, _) = ctx.open_session()?;

    let text = if args.defaults {
        refresh(&mut session, ctx).await?;
        session.default_arguments_text(&args.tool)?
    } else if let Some(path) = &args.args_file {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading arguments from {}", path.display()))?
    } else {
        args.args.clone().unwrap_or_default()
    };

    let spinner = if ctx.json_output {
        indicatif::ProgressBar::hidden()
    } else {
        output::spinner(format!("Calling {}", args.tool))
    };
    let result = session.call_tool_with_text(&args.tool, &text).await;
    spinner.finish_and_clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) if e.is_malformed_input() => {
            if !ctx.json_output {
                print_error(&e.to_string());
                output::print_dim("Nothing was sent.");
            }
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    report(&args.tool, &outcome, ctx)
}

/// Print an outcome and turn anything but success into a non-zero exit.
pub(super) fn report(tool: &str, outcome: &RpcOutcome, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        output::print_outcome(tool, outcome);
    }

    if outcome.is_success() {
        Ok(())
    } else {
        anyhow::bail!("{}", outcome.summary())
    }
}
