//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading, saving or editing the config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a file.
    #[error("failed to read '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to write a config file.
    #[error("failed to write config file '{path}': {source}")]
    WriteFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse or emit YAML.
    #[error("failed to parse YAML config: {0}")]
    ParseYaml(String),

    /// Context not found.
    #[error("context '{0}' not found")]
    ContextNotFound(String),

    /// No config directory could be determined.
    #[error("could not determine config directory - set MCP_ADMIN_CONFIG_DIR")]
    NoConfigDir,

    /// Preset not found.
    #[error("preset '{0}' not found")]
    PresetNotFound(String),

    /// A required preset argument is missing or blank.
    #[error("preset '{preset}' needs a value for '{argument}'")]
    PresetArgumentMissing { preset: String, argument: String },

    /// The preset's confirmation guard blocked the call.
    #[error("preset '{preset}' with {when}={equals} is only sent when {flag}=true")]
    ConfirmationRequired {
        preset: String,
        when: String,
        equals: String,
        flag: String,
    },

    /// A `KEY=VALUE` override could not be read.
    #[error("invalid override: {0}")]
    InvalidOverride(String),
}

impl ConfigError {
    /// Whether this error only needs the operator's confirmation.
    pub fn is_confirmation_required(&self) -> bool {
        matches!(self, Self::ConfirmationRequired { .. })
    }
}
