//! Configuration for the mcp-admin client.
//!
//! Kubeconfig-style YAML with named connection contexts:
//! - endpoint URL per context
//! - bearer credential *reference* (token file or env var), never the token
//! - per-context timeouts with global defaults
//! - `current-context` for default selection
//! - saved tool calls (presets) with generic argument rules
//!
//! The file lives in the user config directory (`MCP_ADMIN_CONFIG_DIR`
//! overrides the platform default). A missing file is an empty config.

pub mod context;
pub mod discovery;
pub mod error;
pub mod preset;

pub use context::{
    AdminConfig, AdminDefaults, AuthConfig, Context, load_config, load_config_from, save_config,
    save_config_to,
};
pub use discovery::{config_dir, config_path, log_dir};
pub use error::{ConfigError, Result};
pub use preset::{ConfirmGuard, Preset, parse_override};
