//! Named connection contexts.
//!
//! ```yaml
//! api-version: v1
//! kind: AdminConfig
//!
//! current-context: local
//!
//! contexts:
//!   - name: local
//!     endpoint: http://localhost:8787/mcp
//!   - name: prod
//!     endpoint: https://tools.example.workers.dev/mcp
//!     auth:
//!       type: bearer
//!       token-env: MCP_SERVER_AUTH_TOKEN
//!     call-timeout: 120
//!
//! defaults:
//!   call-timeout: 60
//!   list-timeout: 20
//!   history-display: 50
//!
//! presets:
//!   - name: system-prompt
//!     tool: getSystemPrompt
//! ```
//!
//! See [`crate::preset`] for the preset rules.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::preset::Preset;
use crate::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Admin Config
// ─────────────────────────────────────────────────────────────────────────────

/// API version for the config file format.
pub const API_VERSION: &str = "v1";

/// Kind identifier for config files.
pub const KIND: &str = "AdminConfig";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdminConfig {
    /// API version (always "v1" currently).
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Config kind (always "AdminConfig").
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Name of the current/default context.
    #[serde(default)]
    pub current_context: Option<String>,

    /// Named connection contexts.
    #[serde(default)]
    pub contexts: Vec<Context>,

    /// Default settings applied to all contexts.
    #[serde(default)]
    pub defaults: AdminDefaults,

    /// Saved tool calls.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<Preset>,
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_kind() -> String {
    KIND.to_string()
}

impl AdminConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            ..Default::default()
        }
    }

    /// Parse from a YAML string.
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        serde_yaml::from_str(yaml_str).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Serialize to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Get the current context, if set and valid.
    pub fn current(&self) -> Option<&Context> {
        self.current_context
            .as_ref()
            .and_then(|name| self.get_context(name))
    }

    /// Get a context by name.
    pub fn get_context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Get a mutable context by name.
    pub fn get_context_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Add or update a context.
    pub fn set_context(&mut self, context: Context) {
        if let Some(existing) = self.get_context_mut(&context.name) {
            *existing = context;
        } else {
            self.contexts.push(context);
        }
    }

    /// Remove a context by name.
    pub fn remove_context(&mut self, name: &str) -> Option<Context> {
        let pos = self.contexts.iter().position(|c| c.name == name)?;
        if self.current_context.as_deref() == Some(name) {
            self.current_context = None;
        }
        Some(self.contexts.remove(pos))
    }

    /// Set the current context by name.
    ///
    /// Returns an error if the context doesn't exist.
    pub fn use_context(&mut self, name: &str) -> Result<()> {
        if self.get_context(name).is_some() {
            self.current_context = Some(name.to_string());
            Ok(())
        } else {
            Err(ConfigError::ContextNotFound(name.to_string()))
        }
    }

    /// List all context names.
    pub fn context_names(&self) -> Vec<&str> {
        self.contexts.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get a preset by name.
    pub fn preset(&self, name: &str) -> Result<&Preset> {
        self.presets
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))
    }

    /// Effective `tools/call` timeout in seconds for a context.
    pub fn call_timeout_secs(&self, context: Option<&Context>) -> u64 {
        context
            .and_then(|c| c.call_timeout)
            .unwrap_or(self.defaults.call_timeout)
    }

    /// Effective `tools/list` timeout in seconds for a context.
    pub fn list_timeout_secs(&self, context: Option<&Context>) -> u64 {
        context
            .and_then(|c| c.list_timeout)
            .unwrap_or(self.defaults.list_timeout)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Context
// ─────────────────────────────────────────────────────────────────────────────

/// A named connection context (endpoint + auth bundle).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Context {
    /// Unique name for this context.
    pub name: String,

    /// JSON-RPC endpoint URL (e.g. "http://localhost:8787/mcp").
    pub endpoint: String,

    /// Authentication configuration.
    #[serde(default)]
    pub auth: Option<AuthConfig>,

    /// `tools/call` timeout override (seconds).
    #[serde(default)]
    pub call_timeout: Option<u64>,

    /// `tools/list` timeout override (seconds).
    #[serde(default)]
    pub list_timeout: Option<u64>,
}

impl Context {
    /// Create a new context with just a name and endpoint.
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            auth: None,
            call_timeout: None,
            list_timeout: None,
        }
    }

    /// Set the auth configuration.
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the `tools/call` timeout.
    pub fn with_call_timeout(mut self, secs: u64) -> Self {
        self.call_timeout = Some(secs);
        self
    }

    /// Set the `tools/list` timeout.
    pub fn with_list_timeout(mut self, secs: u64) -> Self {
        self.list_timeout = Some(secs);
        self
    }

    /// Resolve the bearer token for this context, if any.
    pub fn resolve_token(&self) -> Result<Option<String>> {
        match &self.auth {
            Some(auth) => auth.resolve(),
            None => Ok(None),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication configuration for a context.
///
/// Only references to a credential are stored; the token itself stays in
/// a file or the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AuthConfig {
    /// No authentication.
    None,

    /// Bearer token authentication.
    #[serde(rename_all = "kebab-case")]
    Bearer {
        /// Path to file containing the bearer token.
        token_file: Option<PathBuf>,
        /// Environment variable containing the token.
        token_env: Option<String>,
    },
}

impl AuthConfig {
    /// Bearer auth reading the token from a file.
    pub fn bearer_file(path: impl Into<PathBuf>) -> Self {
        Self::Bearer {
            token_file: Some(path.into()),
            token_env: None,
        }
    }

    /// Bearer auth reading the token from an environment variable.
    pub fn bearer_env(var: impl Into<String>) -> Self {
        Self::Bearer {
            token_file: None,
            token_env: Some(var.into()),
        }
    }

    /// Resolve the actual credential value.
    ///
    /// Tries the file first, then the environment variable. Empty values
    /// count as absent.
    pub fn resolve(&self) -> Result<Option<String>> {
        match self {
            AuthConfig::None => Ok(None),

            AuthConfig::Bearer {
                token_file,
                token_env,
            } => {
                if let Some(path) = token_file {
                    let expanded = expand_path(path);
                    if expanded.exists() {
                        let token = std::fs::read_to_string(&expanded)
                            .map_err(|e| ConfigError::ReadFile {
                                path: expanded.display().to_string(),
                                source: e,
                            })?
                            .trim()
                            .to_string();
                        if !token.is_empty() {
                            return Ok(Some(token));
                        }
                    } else {
                        tracing::warn!(path = %expanded.display(), "bearer token file not found");
                    }
                }
                if let Some(var) = token_env
                    && let Ok(token) = std::env::var(var)
                    && !token.is_empty()
                {
                    return Ok(Some(token));
                }
                Ok(None)
            }
        }
    }

    /// Short description for listings, without the secret.
    pub fn describe(&self) -> String {
        match self {
            AuthConfig::None => "none".to_string(),
            AuthConfig::Bearer {
                token_file,
                token_env,
            } => {
                let mut sources = Vec::new();
                if let Some(path) = token_file {
                    sources.push(format!("file:{}", path.display()));
                }
                if let Some(var) = token_env {
                    sources.push(format!("env:{}", var));
                }
                if sources.is_empty() {
                    "bearer".to_string()
                } else {
                    format!("bearer ({})", sources.join(", "))
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Default settings applied to all contexts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AdminDefaults {
    /// `tools/call` timeout in seconds.
    pub call_timeout: u64,

    /// `tools/list` timeout in seconds.
    pub list_timeout: u64,

    /// How many history entries a listing shows; the client's own window
    /// when unset.
    pub history_display: Option<usize>,

    /// Cap on stored history entries per session; unbounded when unset.
    pub history_retain: Option<usize>,
}

impl Default for AdminDefaults {
    fn default() -> Self {
        Self {
            call_timeout: 60,
            list_timeout: 20,
            history_display: None,
            history_retain: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading / Saving
// ─────────────────────────────────────────────────────────────────────────────

/// Load the configuration from the default location.
///
/// Returns an empty config if the file doesn't exist.
pub fn load_config() -> Result<AdminConfig> {
    load_config_from(crate::config_path().as_deref())
}

/// Load config from a specific path.
pub fn load_config_from(path: Option<&Path>) -> Result<AdminConfig> {
    let Some(path) = path else {
        return Ok(AdminConfig::new());
    };

    if !path.exists() {
        return Ok(AdminConfig::new());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;

    AdminConfig::from_yaml(&contents)
}

/// Save the configuration to the default location.
pub fn save_config(config: &AdminConfig) -> Result<PathBuf> {
    let path = crate::config_path().ok_or(ConfigError::NoConfigDir)?;
    save_config_to(config, &path)?;
    Ok(path)
}

/// Save config to a specific path.
///
/// Creates parent directories if they don't exist.
pub fn save_config_to(config: &AdminConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_yaml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Expand ~ to home directory in paths.
fn expand_path(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/"))
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
