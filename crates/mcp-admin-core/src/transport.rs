//! Transport layer: one HTTP POST per call.
//!
//! The transport only moves bytes. It reports either a status code with the
//! raw response text, or a [`TransportFailure`] when no HTTP response was
//! obtained. Deciding what the response means is left to
//! [`crate::outcome::classify`].

use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{McpError, Result};

/// A raw HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text, unparsed.
    pub body: String,
}

/// A call that produced no HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    /// Underlying error text.
    pub message: String,
    /// Whether the fixed timeout expired.
    pub timed_out: bool,
}

impl TransportFailure {
    /// Create a failure that is not a timeout.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    /// Create a timeout failure.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }
}

impl std::fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.timed_out {
            write!(f, "timed out: {}", self.message)
        } else {
            f.write_str(&self.message)
        }
    }
}

/// Sends a JSON body to an endpoint.
///
/// Implementations must not retry: a call is attempted once and either
/// yields a response or a failure.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `url` with the given headers, bounded by `timeout`.
    async fn send(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
        timeout: Duration,
    ) -> std::result::Result<RawResponse, TransportFailure>;
}

/// HTTP transport backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build the HTTP client.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| McpError::transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
        timeout: Duration,
    ) -> std::result::Result<RawResponse, TransportFailure> {
        let json = serde_json::to_string(body)
            .map_err(|e| TransportFailure::new(format!("failed to encode request: {}", e)))?;

        tracing::trace!(url = %url, json = %json, "sending HTTP request");

        let mut req = self.client.post(url).timeout(timeout).body(json);
        for (key, value) in headers {
            req = req.header(key, value);
        }

        let resp = req.send().await.map_err(failure_from)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(failure_from)?;

        tracing::trace!(status, json = %body, "received HTTP response");

        Ok(RawResponse { status, body })
    }
}

/// Flatten a reqwest error and its source chain into one message.
fn failure_from(err: reqwest::Error) -> TransportFailure {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    if err.is_timeout() {
        TransportFailure::timeout(message)
    } else {
        TransportFailure::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_creation() {
        assert!(HttpTransport::new().is_ok());
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(TransportFailure::new("refused").to_string(), "refused");
        assert_eq!(
            TransportFailure::timeout("operation timed out").to_string(),
            "timed out: operation timed out"
        );
        assert!(TransportFailure::timeout("x").timed_out);
        assert!(!TransportFailure::new("x").timed_out);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_failure() {
        let transport = HttpTransport::new().unwrap();
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let result = transport
            .send(
                "http://127.0.0.1:9/mcp",
                &[],
                &serde_json::json!({}),
                Duration::from_secs(2),
            )
            .await;

        let failure = result.unwrap_err();
        assert!(!failure.message.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_url_is_failure_not_panic() {
        let transport = HttpTransport::new().unwrap();
        let result = transport
            .send("not a url", &[], &serde_json::json!({}), Duration::from_secs(1))
            .await;
        assert!(result.is_err());
    }
}
