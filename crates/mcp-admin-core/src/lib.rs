//! Core of the mcp-admin client: JSON-RPC tool invocation over HTTP.
//!
//! This crate talks to a server that follows the MCP tool convention
//! (`tools/list` to enumerate tools, `tools/call` to invoke one by name)
//! and keeps the per-session state an operator needs to drive it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  McpSession                                                 │
//! │  - owns the ToolCatalog and CallHistory                     │
//! │  - refresh_catalog, call_tool, default_arguments            │
//! └─────────────────────────────────────────────────────────────┘
//!          │ EnvelopeBuilder          ▲ classify()
//!          ▼                          │
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Transport (HttpTransport)                                  │
//! │  - one HTTP POST per call, bearer header, fixed timeout     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use mcp_admin_core::{McpSession, SessionConfig};
//!
//! let config = SessionConfig::new("http://localhost:8787/mcp").with_bearer_token("secret");
//! let mut session = McpSession::connect(config)?;
//!
//! let tools = session.refresh_catalog().await?;
//! println!("{} tools", tools.len());
//!
//! let defaults = session.default_arguments_text("echo")?;
//! let outcome = session.call_tool_with_text("echo", r#"{"msg": "hi"}"#).await?;
//! println!("{:?}: {}", outcome.classification, outcome.body);
//!
//! for entry in session.history().recent(5) {
//!     println!("{} {}", entry.timestamp, entry.tool_name);
//! }
//! ```
//!
//! Every dispatched call lands in the history exactly once, whatever its
//! classification. Argument text that fails to parse is rejected before an
//! envelope is built, so it never reaches the transport or the history.

pub mod catalog;
pub mod error;
pub mod history;
pub mod outcome;
pub mod protocol;
pub mod schema;
pub mod session;
pub mod transport;

pub use catalog::ToolCatalog;
pub use error::{McpError, Result};
pub use history::{CallHistory, DISPLAY_WINDOW, HistoryEntry};
pub use outcome::{Classification, RpcOutcome, classify, is_truthy};
pub use protocol::{
    CallToolParams, EnvelopeBuilder, JSONRPC_VERSION, JsonRpcError, RequestId, RpcRequest,
    TOOLS_CALL, TOOLS_LIST, ToolDescriptor,
};
pub use schema::{PropertyKind, parse_arguments, render_defaults, synthesize};
pub use session::{McpSession, SessionConfig};
pub use transport::{HttpTransport, RawResponse, Transport, TransportFailure};
