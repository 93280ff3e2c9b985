//! The operator's session: one endpoint, its tool catalog, its call history.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::catalog::ToolCatalog;
use crate::error::{McpError, Result};
use crate::history::{CallHistory, HistoryEntry};
use crate::outcome::{RpcOutcome, classify};
use crate::protocol::{EnvelopeBuilder, RpcRequest, TOOLS_LIST, ToolDescriptor};
use crate::schema::{parse_arguments, render_defaults, synthesize};
use crate::transport::{HttpTransport, Transport};

/// Default timeout for `tools/call`.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Default timeout for `tools/list`.
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(20);

/// Connection settings for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Endpoint URL every call is POSTed to. Not validated here.
    pub endpoint: String,
    /// Bearer credential, carried verbatim.
    pub bearer_token: Option<String>,
    /// Timeout for tool invocations.
    pub call_timeout: Duration,
    /// Timeout for catalog listing.
    pub list_timeout: Duration,
    /// Optional cap on stored history entries.
    pub history_retention: Option<usize>,
}

impl SessionConfig {
    /// Create a config for the given endpoint with default timeouts.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            bearer_token: None,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            list_timeout: DEFAULT_LIST_TIMEOUT,
            history_retention: None,
        }
    }

    /// Set the bearer token. An empty token means unauthenticated.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.bearer_token = if token.is_empty() { None } else { Some(token) };
        self
    }

    /// Set the tool invocation timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Set the catalog listing timeout.
    pub fn with_list_timeout(mut self, timeout: Duration) -> Self {
        self.list_timeout = timeout;
        self
    }

    /// Cap the stored history.
    pub fn with_history_retention(mut self, max: usize) -> Self {
        self.history_retention = Some(max);
        self
    }
}

/// A single operator session.
///
/// Owns the tool catalog and call history; both change only through the
/// methods here, which take `&mut self`, so one call is in flight at a time.
pub struct McpSession {
    config: SessionConfig,
    transport: Arc<dyn Transport>,
    envelopes: EnvelopeBuilder,
    catalog: ToolCatalog,
    history: CallHistory,
}

impl std::fmt::Debug for McpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpSession")
            .field("endpoint", &self.config.endpoint)
            .field("authenticated", &self.config.bearer_token.is_some())
            .field("tools", &self.catalog.len())
            .field("history", &self.history.len())
            .finish()
    }
}

impl McpSession {
    /// Create a session over HTTP.
    pub fn connect(config: SessionConfig) -> Result<Self> {
        let transport = HttpTransport::new()?;

        tracing::info!(
            endpoint = %config.endpoint,
            authenticated = config.bearer_token.is_some(),
            call_timeout_secs = config.call_timeout.as_secs(),
            list_timeout_secs = config.list_timeout.as_secs(),
            "created MCP session"
        );

        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a session over an arbitrary transport.
    pub fn with_transport(config: SessionConfig, transport: Arc<dyn Transport>) -> Self {
        let history = match config.history_retention {
            Some(max) => CallHistory::with_retention(max),
            None => CallHistory::new(),
        };

        Self {
            config,
            transport,
            envelopes: EnvelopeBuilder::new(),
            catalog: ToolCatalog::new(),
            history,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn history(&self) -> &CallHistory {
        &self.history
    }

    /// Headers sent with every call.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = &self.config.bearer_token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        headers
    }

    /// Send one envelope, classify the result, and record it.
    async fn dispatch(
        &mut self,
        label: &str,
        request: RpcRequest,
        timeout: Duration,
    ) -> &HistoryEntry {
        let headers = self.headers();
        let body = request.to_value();

        tracing::debug!(
            method = %request.method,
            id = %request.id,
            tool = %label,
            timeout_secs = timeout.as_secs(),
            "dispatching request"
        );

        let outcome = match self
            .transport
            .send(&self.config.endpoint, &headers, &body, timeout)
            .await
        {
            Ok(raw) => classify(raw.status, &raw.body),
            Err(failure) => {
                tracing::warn!(
                    tool = %label,
                    timed_out = failure.timed_out,
                    error = %failure.message,
                    "request failed before a response"
                );
                RpcOutcome::transport_failure(failure.to_string())
            }
        };

        tracing::info!(
            method = %request.method,
            id = %request.id,
            tool = %label,
            status = ?outcome.status_code,
            classification = %outcome.classification,
            "call completed"
        );

        self.history.record(label, request, outcome)
    }

    /// Fetch `tools/list` and replace the catalog on success.
    ///
    /// The call is recorded in history under `tools/list`. On failure the
    /// previous catalog is kept and the failed outcome is returned inside
    /// the error.
    pub async fn refresh_catalog(&mut self) -> Result<&[ToolDescriptor]> {
        let request = self.envelopes.tools_list();
        let timeout = self.config.list_timeout;
        let outcome = self.dispatch(TOOLS_LIST, request, timeout).await.outcome.clone();

        let tools = self.catalog.apply(&outcome)?;
        tracing::debug!(tool_count = tools.len(), "refreshed tool catalog");
        Ok(tools)
    }

    /// Invoke a tool with already-parsed arguments.
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> RpcOutcome {
        let request = self.envelopes.tools_call(name, arguments);
        let timeout = self.config.call_timeout;
        self.dispatch(name, request, timeout).await.outcome.clone()
    }

    /// Invoke a tool with operator-edited argument text.
    ///
    /// Text that does not parse to a JSON object is rejected with
    /// [`McpError::MalformedInput`] before anything is sent or recorded.
    pub async fn call_tool_with_text(&mut self, name: &str, arguments: &str) -> Result<RpcOutcome> {
        let arguments = parse_arguments(arguments)?;
        Ok(self.call_tool(name, arguments).await)
    }

    /// Look up a cached tool.
    pub fn tool(&self, name: &str) -> Result<&ToolDescriptor> {
        self.catalog
            .get(name)
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))
    }

    /// Placeholder arguments for a cached tool.
    pub fn default_arguments(&self, name: &str) -> Result<Map<String, Value>> {
        Ok(synthesize(&self.tool(name)?.input_schema))
    }

    /// Placeholder arguments for a cached tool, pretty-printed for editing.
    pub fn default_arguments_text(&self, name: &str) -> Result<String> {
        Ok(render_defaults(&self.tool(name)?.input_schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Classification;
    use crate::transport::{RawResponse, TransportFailure};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Transport that replays canned responses and records what it was sent.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<Vec<std::result::Result<RawResponse, TransportFailure>>>,
        sent: Mutex<Vec<(Vec<(String, String)>, Value, Duration)>>,
    }

    impl ScriptedTransport {
        fn new(
            responses: Vec<std::result::Result<RawResponse, TransportFailure>>,
        ) -> Arc<Self> {
            let mut responses = responses;
            responses.reverse();
            Arc::new(Self {
                responses: Mutex::new(responses),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            _url: &str,
            headers: &[(String, String)],
            body: &Value,
            timeout: Duration,
        ) -> std::result::Result<RawResponse, TransportFailure> {
            self.sent
                .lock()
                .unwrap()
                .push((headers.to_vec(), body.clone(), timeout));
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(TransportFailure::new("no scripted response")))
        }
    }

    fn ok(body: Value) -> std::result::Result<RawResponse, TransportFailure> {
        Ok(RawResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    fn tools_body(names: &[&str]) -> Value {
        let tools: Vec<Value> = names
            .iter()
            .map(|n| json!({"name": n, "description": "", "inputSchema": {}}))
            .collect();
        json!({"jsonrpc": "2.0", "id": 1, "result": {"tools": tools}})
    }

    fn session(transport: Arc<ScriptedTransport>) -> McpSession {
        McpSession::with_transport(SessionConfig::new("http://localhost:8787/mcp"), transport)
    }

    #[test]
    fn test_headers_without_token() {
        let s = session(ScriptedTransport::new(vec![]));
        let headers = s.headers();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].0, "Content-Type");
        assert_eq!(headers[0].1, "application/json");
    }

    #[test]
    fn test_headers_with_token() {
        let config = SessionConfig::new("http://x/mcp").with_bearer_token("s3cret");
        let s = McpSession::with_transport(config, ScriptedTransport::new(vec![]));
        assert!(
            s.headers()
                .contains(&("Authorization".to_string(), "Bearer s3cret".to_string()))
        );
    }

    #[test]
    fn test_empty_token_is_unauthenticated() {
        let config = SessionConfig::new("http://x/mcp").with_bearer_token("");
        assert!(config.bearer_token.is_none());
    }

    #[tokio::test]
    async fn test_refresh_uses_list_timeout_and_records() {
        let transport = ScriptedTransport::new(vec![ok(tools_body(&["a", "b"]))]);
        let mut s = session(transport.clone());

        let tools = s.refresh_catalog().await.unwrap();
        assert_eq!(tools.len(), 2);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[0].1["method"], "tools/list");
        assert!(sent[0].1.get("params").is_none());
        assert_eq!(sent[0].2, DEFAULT_LIST_TIMEOUT);
        drop(sent);

        assert_eq!(s.history().len(), 1);
        assert_eq!(s.history().latest().unwrap().tool_name, "tools/list");
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_catalog() {
        let transport = ScriptedTransport::new(vec![
            ok(tools_body(&["a", "b", "c"])),
            Ok(RawResponse {
                status: 200,
                body: json!({"error": {"code": -32603, "message": "boom"}}).to_string(),
            }),
            Err(TransportFailure::timeout("deadline elapsed")),
        ]);
        let mut s = session(transport);

        s.refresh_catalog().await.unwrap();
        let err = s.refresh_catalog().await.unwrap_err();
        assert!(matches!(err, McpError::CatalogRefresh { .. }));
        assert_eq!(s.catalog().names(), vec!["a", "b", "c"]);

        let err = s.refresh_catalog().await.unwrap_err();
        match err {
            McpError::CatalogRefresh { outcome } => {
                assert_eq!(outcome.classification, Classification::TransportFailure)
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(s.catalog().len(), 3);
        assert_eq!(s.history().len(), 3);
    }

    #[tokio::test]
    async fn test_call_tool_uses_call_timeout() {
        let transport = ScriptedTransport::new(vec![ok(json!({"result": {"value": "x"}}))]);
        let mut s = session(transport.clone());

        let outcome = s.call_tool("getKVFlag", json!({"key": "SYSTEM_PROMPT"})).await;
        assert!(outcome.is_success());

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[0].1["params"]["name"], "getKVFlag");
        assert_eq!(sent[0].1["params"]["arguments"]["key"], "SYSTEM_PROMPT");
        assert_eq!(sent[0].2, DEFAULT_CALL_TIMEOUT);
    }

    #[tokio::test]
    async fn test_malformed_input_never_sends_or_records() {
        let transport = ScriptedTransport::new(vec![ok(json!({"result": true}))]);
        let mut s = session(transport.clone());

        let err = s
            .call_tool_with_text("setKVFlag", r#"{"key": "a", "value": "#)
            .await
            .unwrap_err();

        assert!(err.is_malformed_input());
        assert_eq!(transport.sent_count(), 0);
        assert!(s.history().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_recorded() {
        let transport =
            ScriptedTransport::new(vec![Err(TransportFailure::new("connection refused"))]);
        let mut s = session(transport);

        let outcome = s.call_tool("listCronTriggers", json!({})).await;
        assert_eq!(outcome.classification, Classification::TransportFailure);

        let entry = s.history().latest().unwrap();
        assert_eq!(entry.tool_name, "listCronTriggers");
        assert_eq!(entry.outcome, outcome);
    }

    #[tokio::test]
    async fn test_every_dispatch_gets_fresh_id() {
        let transport = ScriptedTransport::new(vec![
            ok(json!({"result": 1})),
            ok(json!({"result": 2})),
        ]);
        let mut s = session(transport);
        s.call_tool("a", json!({})).await;
        s.call_tool("a", json!({})).await;

        let ids: Vec<_> = s.history().iter().map(|e| e.request.id.clone()).collect();
        assert_ne!(ids[0], ids[1]);
    }

    #[tokio::test]
    async fn test_default_arguments_from_catalog() {
        let body = json!({"result": {"tools": [
            {"name": "aiChat", "inputSchema": {"properties": {
                "prompt": {"type": "string"}, "model": {"type": "string"}
            }}}
        ]}});
        let mut s = session(ScriptedTransport::new(vec![ok(body)]));
        s.refresh_catalog().await.unwrap();

        let defaults = s.default_arguments("aiChat").unwrap();
        assert_eq!(Value::Object(defaults), json!({"prompt": "", "model": ""}));

        let err = s.default_arguments("missing").unwrap_err();
        assert!(matches!(err, McpError::ToolNotFound(_)));
    }

    #[test]
    fn test_history_retention_from_config() {
        let config = SessionConfig::new("http://x/mcp").with_history_retention(5);
        let s = McpSession::with_transport(config, ScriptedTransport::new(vec![]));
        assert!(s.history().is_empty());
        assert_eq!(s.config().history_retention, Some(5));
    }
}
