//! JSON-RPC 2.0 envelope types for the MCP tool convention.
//!
//! Requests are plain JSON objects POSTed to a single endpoint; responses
//! are read back as untyped JSON and handed to [`crate::outcome::classify`],
//! so only the request side and the catalog payload are typed here.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// JSON-RPC version string.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method that enumerates callable tools.
pub const TOOLS_LIST: &str = "tools/list";

/// Method that invokes one tool by name.
pub const TOOLS_CALL: &str = "tools/call";

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

/// A JSON-RPC request id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric id, as produced by [`EnvelopeBuilder`].
    Number(u64),
    /// String id.
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::String(s) => f.write_str(s),
        }
    }
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        RequestId::Number(id)
    }
}

/// A JSON-RPC request envelope. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version (always "2.0").
    pub jsonrpc: String,
    /// Request id for correlating the response.
    pub id: RequestId,
    /// Method name to call.
    pub method: String,
    /// Method parameters, omitted for `tools/list`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcRequest {
    /// Create a new request with an explicit id.
    pub fn new(id: impl Into<RequestId>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }

    /// Serialize the envelope as the JSON body to send.
    pub fn to_value(&self) -> Value {
        let mut body = json!({
            "jsonrpc": self.jsonrpc,
            "id": self.id,
            "method": self.method,
        });
        if let Some(params) = &self.params {
            body["params"] = params.clone();
        }
        body
    }

    /// The `tools/call` parameters, if this is a tool call.
    pub fn call_params(&self) -> Option<CallToolParams> {
        if self.method != TOOLS_CALL {
            return None;
        }
        self.params
            .clone()
            .and_then(|p| serde_json::from_value(p).ok())
    }
}

/// Parameters for the `tools/call` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments to pass to the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Builds request envelopes with fresh ids.
///
/// Ids come from a monotonic counter starting at 1. They are unique within
/// one builder, which is all a session needs to tell calls apart.
#[derive(Debug)]
pub struct EnvelopeBuilder {
    next_id: AtomicU64,
}

impl Default for EnvelopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeBuilder {
    /// Create a builder whose first id is 1.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    fn next_request_id(&self) -> RequestId {
        RequestId::Number(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Wrap a method and its parameters into a request with a fresh id.
    pub fn build(&self, method: impl Into<String>, params: Option<Value>) -> RpcRequest {
        RpcRequest::new(self.next_request_id(), method, params)
    }

    /// A `tools/list` request. Carries no params.
    pub fn tools_list(&self) -> RpcRequest {
        self.build(TOOLS_LIST, None)
    }

    /// A `tools/call` request nesting `{ name, arguments }`.
    pub fn tools_call(&self, name: &str, arguments: Value) -> RpcRequest {
        self.build(
            TOOLS_CALL,
            Some(json!({
                "name": name,
                "arguments": arguments,
            })),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

/// A JSON-RPC error object, as found under `error` in a response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Error message.
    pub message: String,
    /// Optional additional data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// Standard JSON-RPC error codes
impl JsonRpcError {
    /// Parse error - Invalid JSON.
    pub const PARSE_ERROR: i64 = -32700;
    /// Invalid Request - Not a valid Request object.
    pub const INVALID_REQUEST: i64 = -32600;
    /// Method not found.
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Invalid params.
    pub const INVALID_PARAMS: i64 = -32602;
    /// Internal error.
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// A tool definition from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Tool name, unique within a catalog.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// JSON-Schema-like description of the tool's arguments.
    #[serde(default = "empty_schema")]
    pub input_schema: Value,
}

fn empty_schema() -> Value {
    json!({})
}

impl ToolDescriptor {
    /// Create a descriptor.
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}
