//! Error types for session operations.

use thiserror::Error;

use crate::outcome::RpcOutcome;

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, McpError>;

/// Error type for session operations.
///
/// Transport failures and protocol errors from a dispatched call are not
/// errors at this level: they are classified into an [`RpcOutcome`] and
/// recorded. Only the catalog refresh lifts a failed outcome into an error,
/// since its caller needs the tool list itself.
#[derive(Debug, Error)]
pub enum McpError {
    /// Operator-supplied argument text is not a usable JSON object.
    ///
    /// Raised before any envelope is built; nothing was sent.
    #[error("malformed arguments: {0}")]
    MalformedInput(String),

    /// The HTTP client could not be constructed.
    #[error("transport error: {0}")]
    Transport(String),

    /// `tools/list` did not come back as a success.
    #[error("tools/list failed: {}", .outcome.summary())]
    CatalogRefresh {
        /// The classified outcome, kept for display.
        outcome: Box<RpcOutcome>,
    },

    /// `tools/list` succeeded but `result.tools` is not a list.
    #[error("malformed tool list: {0}")]
    MalformedCatalog(String),

    /// The named tool is not in the cached catalog.
    #[error("tool '{0}' not found in catalog - refresh the tool list first")]
    ToolNotFound(String),
}

impl McpError {
    /// Create a malformed input error.
    pub fn malformed_input(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a catalog refresh error from a failed outcome.
    pub fn catalog_refresh(outcome: RpcOutcome) -> Self {
        Self::CatalogRefresh {
            outcome: Box::new(outcome),
        }
    }

    /// Whether this error means no request was ever sent.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MalformedInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = McpError::malformed_input("expected value at line 1 column 1");
        assert!(err.to_string().contains("malformed arguments"));
        assert!(err.to_string().contains("line 1"));

        let err = McpError::ToolNotFound("echo".to_string());
        assert!(err.to_string().contains("'echo'"));
    }

    #[test]
    fn test_catalog_refresh_display_uses_summary() {
        let outcome = RpcOutcome::transport_failure("connection refused");
        let err = McpError::catalog_refresh(outcome);
        assert!(err.to_string().contains("tools/list failed"));
        assert!(err.to_string().contains("connection refused"));
        assert!(!err.is_malformed_input());
    }
}
