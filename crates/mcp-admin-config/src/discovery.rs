//! Config directory resolution.
//!
//! Resolution order:
//! 1. `MCP_ADMIN_CONFIG_DIR` environment variable
//! 2. Platform config dir + `mcp-admin` (`~/.config/mcp-admin` on Linux)

use std::path::PathBuf;

/// Default config filename within the config directory.
const CONFIG_FILE: &str = "config.yaml";

/// Application name for directory resolution.
const APP_NAME: &str = "mcp-admin";

/// Environment variable to override the config directory.
///
/// Useful for testing and for keeping several independent setups.
pub const CONFIG_DIR_ENV: &str = "MCP_ADMIN_CONFIG_DIR";

/// Get the config directory for mcp-admin.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the path of the config file.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CONFIG_FILE))
}

/// Directory for rolling log files, falling back to `./logs`.
pub fn log_dir() -> PathBuf {
    config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}
