//! CLI command handlers.

use std::time::Duration;

use anyhow::{Context as _, Result};
use mcp_admin_config::AdminConfig;
use mcp_admin_core::{DISPLAY_WINDOW, McpSession, SessionConfig};

pub mod call;
pub mod config;
pub mod output;
pub mod preset;
pub mod repl;
pub mod tools;

/// Endpoint used when neither a flag nor a context provides one.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8787/mcp";

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Endpoint URL from the command line or environment.
    pub endpoint: Option<String>,
    /// Bearer token from the command line or environment.
    pub token: Option<String>,
    /// Context name to use instead of current-context.
    pub context: Option<String>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

/// Everything needed to open a session, after flags and config are merged.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub config: SessionConfig,
    pub context_name: Option<String>,
    pub history_display: usize,
}

impl Context {
    /// Merge flags with the config file.
    ///
    /// Endpoint: flag, then context, then [`DEFAULT_ENDPOINT`].
    /// Token: flag, then the context's auth reference, then none.
    pub fn resolve(&self) -> Result<ResolvedSession> {
        let admin = mcp_admin_config::load_config().context("loading config")?;
        self.resolve_with(&admin)
    }

    fn resolve_with(&self, admin: &AdminConfig) -> Result<ResolvedSession> {
        let selected = match &self.context {
            Some(name) => Some(
                admin
                    .get_context(name)
                    .ok_or_else(|| mcp_admin_config::ConfigError::ContextNotFound(name.clone()))?,
            ),
            None => admin.current(),
        };

        let endpoint = self
            .endpoint
            .clone()
            .or_else(|| selected.map(|c| c.endpoint.clone()))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let token = match &self.token {
            Some(token) => Some(token.clone()),
            None => match selected {
                Some(c) => c
                    .resolve_token()
                    .with_context(|| format!("resolving token for context '{}'", c.name))?,
                None => None,
            },
        };

        let call_timeout = timeout_from_secs("call-timeout", admin.call_timeout_secs(selected))?;
        let list_timeout = timeout_from_secs("list-timeout", admin.list_timeout_secs(selected))?;

        let mut config = SessionConfig::new(endpoint)
            .with_call_timeout(call_timeout)
            .with_list_timeout(list_timeout);
        if let Some(token) = token {
            config = config.with_bearer_token(token);
        }
        if let Some(max) = admin.defaults.history_retain {
            config = config.with_history_retention(max);
        }

        Ok(ResolvedSession {
            config,
            context_name: selected.map(|c| c.name.clone()),
            history_display: admin.defaults.history_display.unwrap_or(DISPLAY_WINDOW),
        })
    }

    /// Resolve settings and open an HTTP session.
    pub fn open_session(&self) -> Result<(McpSession, ResolvedSession)> {
        let resolved = self.resolve()?;
        if self.verbose && !self.json_output {
            output::print_dim(&format!(
                "Endpoint: {}{}",
                resolved.config.endpoint,
                resolved
                    .context_name
                    .as_deref()
                    .map(|n| format!(" (context: {})", n))
                    .unwrap_or_default()
            ));
        }
        let session = McpSession::connect(resolved.config.clone())?;
        Ok((session, resolved))
    }
}

/// A zero timeout would fail every call before it is sent.
fn timeout_from_secs(name: &str, secs: u64) -> Result<Duration> {
    if secs == 0 {
        anyhow::bail!("{} must be at least 1 second", name);
    }
    Ok(Duration::from_secs(secs))
}
