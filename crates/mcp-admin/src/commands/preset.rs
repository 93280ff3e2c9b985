//! `mcp-admin preset` - run or list saved tool calls.

use anyhow::{Context as _, Result};
use clap::Args;
use serde_json::Value;

use mcp_admin_config::{AdminConfig, parse_override};

use super::Context;
use super::call::report;
use super::output::{self, print_dim, print_error};

/// Arguments for `mcp-admin preset`.
#[derive(Args, Debug)]
pub struct PresetArgs {
    /// Preset name; lists presets when omitted
    pub name: Option<String>,

    /// Override an argument (value read as JSON, else as text; `@path` reads a file)
    #[arg(long = "set", short = 's', value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Set the preset's confirmation flag
    #[arg(long)]
    pub confirm: bool,
}

/// Run `mcp-admin preset`.
pub async fn run(args: PresetArgs, ctx: &Context) -> Result<()> {
    let admin = mcp_admin_config::load_config().context("loading config")?;

    let Some(name) = args.name else {
        return list(&admin, ctx);
    };

    let preset = admin.preset(&name)?;
    let overrides = args
        .overrides
        .iter()
        .map(|text| read_override(text))
        .collect::<Result<Vec<_>>>()?;

    let arguments = match preset.resolve(&overrides, args.confirm) {
        Ok(arguments) => arguments,
        Err(e) => {
            if !ctx.json_output {
                print_error(&e.to_string());
                if e.is_confirmation_required() {
                    print_dim("Re-run with --confirm to send it. Nothing was sent.");
                } else {
                    print_dim("Nothing was sent.");
                }
            }
            return Err(e.into());
        }
    };

    let (mut session, _) = ctx.open_session()?;

    let spinner = if ctx.json_output {
        indicatif::ProgressBar::hidden()
    } else {
        output::spinner(format!("Calling {} ({})", preset.tool, preset.name))
    };
    let outcome = session.call_tool(&preset.tool, Value::Object(arguments)).await;
    spinner.finish_and_clear();

    report(&preset.tool, &outcome, ctx)
}

/// Parse `KEY=VALUE`, reading the value from a file when it is `@path`.
pub fn read_override(text: &str) -> Result<(String, Value)> {
    let (key, value) = parse_override(text)?;
    if let Value::String(raw) = &value
        && let Some(path) = raw.strip_prefix('@')
    {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading value for '{}' from {}", key, path))?;
        return Ok((key, Value::String(contents)));
    }
    Ok((key, value))
}

fn list(admin: &AdminConfig, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&admin.presets)?);
        return Ok(());
    }

    if admin.presets.is_empty() {
        println!("No presets configured.");
        println!();
        println!("Add them under 'presets:' in {}", config_location());
        return Ok(());
    }

    output::print_presets(&admin.presets);
    Ok(())
}

fn config_location() -> String {
    mcp_admin_config::config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "the config file".to_string())
}
