//! Config command - connection context management.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use mcp_admin_config::{AdminConfig, AuthConfig, Context as AdminContext};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the settings a session would use right now
    Show,

    /// Show configuration file path
    Path,

    /// Show the current context name
    CurrentContext,

    /// List available contexts
    GetContexts,

    /// Switch to a different context
    UseContext {
        /// Context name to switch to
        name: String,
    },

    /// Create or update a context
    SetContext {
        /// Context name
        name: String,

        /// Endpoint URL (e.g., http://localhost:8787/mcp)
        #[arg(long)]
        endpoint: Option<String>,

        /// Environment variable holding the bearer token
        #[arg(long, value_name = "VAR")]
        token_env: Option<String>,

        /// File holding the bearer token
        #[arg(long, value_name = "PATH")]
        token_file: Option<PathBuf>,

        /// Remove any configured authentication
        #[arg(long, conflicts_with_all = ["token_env", "token_file"])]
        no_auth: bool,

        /// tools/call timeout in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        call_timeout: Option<u64>,

        /// tools/list timeout in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        list_timeout: Option<u64>,
    },

    /// Delete a context
    DeleteContext {
        /// Context name to delete
        name: String,
    },
}

/// Options for `set-context`, gathered from the command line.
#[derive(Debug, Default)]
struct ContextUpdate {
    endpoint: Option<String>,
    token_env: Option<String>,
    token_file: Option<PathBuf>,
    no_auth: bool,
    call_timeout: Option<u64>,
    list_timeout: Option<u64>,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(ctx),
        ConfigCommand::CurrentContext => cmd_current_context(),
        ConfigCommand::GetContexts => cmd_get_contexts(ctx),
        ConfigCommand::UseContext { name } => cmd_use_context(&name),
        ConfigCommand::SetContext {
            name,
            endpoint,
            token_env,
            token_file,
            no_auth,
            call_timeout,
            list_timeout,
        } => cmd_set_context(
            &name,
            ContextUpdate {
                endpoint,
                token_env,
                token_file,
                no_auth,
                call_timeout,
                list_timeout,
            },
        ),
        ConfigCommand::DeleteContext { name } => cmd_delete_context(&name),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let resolved = ctx.resolve()?;
    let config = &resolved.config;

    if ctx.json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "context": resolved.context_name,
                "endpoint": config.endpoint,
                "bearer_token": config.bearer_token.is_some(),
                "call_timeout_secs": config.call_timeout.as_secs(),
                "list_timeout_secs": config.list_timeout.as_secs(),
                "history_retention": config.history_retention,
                "history_display": resolved.history_display,
            }))?
        );
        return Ok(());
    }

    println!(
        "Context:         {}",
        resolved.context_name.as_deref().unwrap_or("(none)")
    );
    println!("Endpoint:        {}", config.endpoint);
    println!(
        "Bearer token:    {}",
        if config.bearer_token.is_some() {
            "set"
        } else {
            "not set"
        }
    );
    println!("Call timeout:    {}s", config.call_timeout.as_secs());
    println!("List timeout:    {}s", config.list_timeout.as_secs());
    match config.history_retention {
        Some(max) => println!("History retain:  {} entries", max),
        None => println!("History retain:  unbounded"),
    }
    println!("History display: {} entries", resolved.history_display);

    Ok(())
}

fn cmd_path(ctx: &Context) -> Result<()> {
    let path = mcp_admin_config::config_path()
        .ok_or_else(|| anyhow::anyhow!("could not determine a config directory"))?;

    if ctx.json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "path": path.display().to_string(),
                "exists": path.exists(),
            }))?
        );
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

fn cmd_current_context() -> Result<()> {
    let config = mcp_admin_config::load_config()?;

    match &config.current_context {
        Some(name) => {
            println!("{}", name);
        }
        None => {
            println!(
                "No current context set. Use 'mcp-admin config use-context <name>' to set one."
            );
        }
    }

    Ok(())
}

fn cmd_get_contexts(ctx: &Context) -> Result<()> {
    let config = mcp_admin_config::load_config()?;

    if ctx.json_output {
        let contexts: Vec<_> = config
            .contexts
            .iter()
            .map(|c| {
                json!({
                    "name": c.name,
                    "endpoint": c.endpoint,
                    "auth": auth_label(c),
                    "current": config.current_context.as_deref() == Some(c.name.as_str()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&contexts)?);
        return Ok(());
    }

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!();
        println!("Create one with:");
        println!("  mcp-admin config set-context local --endpoint=http://localhost:8787/mcp");
        return Ok(());
    }

    let current = config.current_context.as_deref();

    println!("CURRENT   NAME            ENDPOINT                                  AUTH");
    for c in &config.contexts {
        let marker = if current == Some(c.name.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{}         {:<15} {:<41} {}",
            marker,
            c.name,
            c.endpoint,
            auth_label(c)
        );
    }

    Ok(())
}

fn auth_label(context: &AdminContext) -> String {
    context
        .auth
        .as_ref()
        .map(AuthConfig::describe)
        .unwrap_or_else(|| "none".to_string())
}

fn cmd_use_context(name: &str) -> Result<()> {
    let mut config = mcp_admin_config::load_config()?;

    config.use_context(name)?;
    mcp_admin_config::save_config(&config)?;

    println!("Switched to context \"{}\".", name);

    Ok(())
}

fn cmd_set_context(name: &str, update: ContextUpdate) -> Result<()> {
    let mut config = mcp_admin_config::load_config()?;

    let created = apply_update(&mut config, name, update)?;
    if created {
        println!("Context \"{}\" created.", name);
    } else {
        println!("Context \"{}\" modified.", name);
    }

    // The first context becomes current.
    if config.current_context.is_none() && config.contexts.len() == 1 {
        config.current_context = Some(name.to_string());
        println!("Context \"{}\" set as current context.", name);
    }

    mcp_admin_config::save_config(&config)?;

    Ok(())
}

/// Create or modify a context in place. Returns true when it was created.
///
/// A token source given on its own is merged into an existing bearer
/// reference; the other source is kept.
fn apply_update(config: &mut AdminConfig, name: &str, update: ContextUpdate) -> Result<bool> {
    let token_given = update.token_env.is_some() || update.token_file.is_some();

    match config.get_context_mut(name) {
        Some(existing) => {
            if let Some(endpoint) = update.endpoint {
                existing.endpoint = endpoint;
            }
            if update.no_auth {
                existing.auth = Some(AuthConfig::None);
            } else if token_given {
                existing.auth = Some(merge_bearer(
                    existing.auth.take(),
                    update.token_file,
                    update.token_env,
                ));
            }
            if let Some(t) = update.call_timeout {
                existing.call_timeout = Some(t);
            }
            if let Some(t) = update.list_timeout {
                existing.list_timeout = Some(t);
            }
            Ok(false)
        }
        None => {
            let endpoint = update.endpoint.ok_or_else(|| {
                anyhow::anyhow!("--endpoint is required when creating a new context")
            })?;

            let mut context = AdminContext::new(name, endpoint);
            if update.no_auth {
                context = context.with_auth(AuthConfig::None);
            } else if token_given {
                context = context.with_auth(AuthConfig::Bearer {
                    token_file: update.token_file,
                    token_env: update.token_env,
                });
            }
            if let Some(t) = update.call_timeout {
                context = context.with_call_timeout(t);
            }
            if let Some(t) = update.list_timeout {
                context = context.with_list_timeout(t);
            }

            config.set_context(context);
            Ok(true)
        }
    }
}

fn merge_bearer(
    current: Option<AuthConfig>,
    token_file: Option<PathBuf>,
    token_env: Option<String>,
) -> AuthConfig {
    let (old_file, old_env) = match current {
        Some(AuthConfig::Bearer {
            token_file,
            token_env,
        }) => (token_file, token_env),
        _ => (None, None),
    };
    AuthConfig::Bearer {
        token_file: token_file.or(old_file),
        token_env: token_env.or(old_env),
    }
}

fn cmd_delete_context(name: &str) -> Result<()> {
    let mut config = mcp_admin_config::load_config()?;

    match config.remove_context(name) {
        Some(_) => {
            mcp_admin_config::save_config(&config)?;
            println!("Context \"{}\" deleted.", name);
            if config.current_context.is_none() {
                println!(
                    "Note: No current context. Use 'mcp-admin config use-context <name>' to set one."
                );
            }
        }
        None => {
            anyhow::bail!("context \"{}\" not found", name);
        }
    }

    Ok(())
}
