//! Response classification.
//!
//! Every dispatched call ends in exactly one [`RpcOutcome`]. The raw
//! payload is never thrown away: bodies that do not parse as JSON are kept
//! verbatim in a fallback object.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::protocol::JsonRpcError;

/// The three-way outcome bucket assigned to every dispatched call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// 2xx response whose body is an object with a truthy `result`.
    Success,
    /// The server answered, but not with a usable `result`.
    ProtocolError,
    /// No HTTP response at all (DNS, refused connection, timeout).
    TransportFailure,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Classification::Success => "success",
            Classification::ProtocolError => "protocol error",
            Classification::TransportFailure => "transport failure",
        };
        f.write_str(s)
    }
}

/// A classified call result. Derived once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcOutcome {
    /// HTTP status; absent for transport failures.
    pub status_code: Option<u16>,
    /// Parsed response body, the raw-text fallback object, or the
    /// transport error message.
    pub body: Value,
    /// Outcome bucket.
    pub classification: Classification,
}

impl RpcOutcome {
    /// Outcome for a call that never got an HTTP response.
    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            body: Value::String(message.into()),
            classification: Classification::TransportFailure,
        }
    }

    /// Check if the call succeeded.
    pub fn is_success(&self) -> bool {
        self.classification == Classification::Success
    }

    /// The `result` member of the body, if any.
    pub fn result(&self) -> Option<&Value> {
        self.body.as_object().and_then(|obj| obj.get("result"))
    }

    /// The JSON-RPC `error` member of the body, if it is well-formed.
    pub fn rpc_error(&self) -> Option<JsonRpcError> {
        self.body
            .as_object()
            .and_then(|obj| obj.get("error"))
            .and_then(|err| serde_json::from_value(err.clone()).ok())
    }

    /// One-line description for status displays.
    pub fn summary(&self) -> String {
        match self.classification {
            Classification::Success => match self.status_code {
                Some(status) => format!("success (HTTP {})", status),
                None => "success".to_string(),
            },
            Classification::TransportFailure => match &self.body {
                Value::String(message) => format!("transport failure: {}", message),
                other => format!("transport failure: {}", other),
            },
            Classification::ProtocolError => {
                let status = self
                    .status_code
                    .map(|s| format!("HTTP {}", s))
                    .unwrap_or_else(|| "no status".to_string());
                if let Some(err) = self.rpc_error() {
                    format!("protocol error ({}): {} {}", status, err.code, err.message)
                } else if self.result().is_some() {
                    format!("protocol error ({}): falsy result", status)
                } else {
                    format!("protocol error ({}): no result", status)
                }
            }
        }
    }
}

/// Classify a raw HTTP status and body.
///
/// Success requires a 2xx status, a JSON object body, and a truthy
/// `result`. A tool that legitimately returns `false`, `0`, `""` or an empty
/// container as its result therefore classifies as a protocol error.
pub fn classify(status: u16, raw_text: &str) -> RpcOutcome {
    let body = match serde_json::from_str::<Value>(raw_text) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(status, error = %e, "response body is not JSON");
            json!({
                "raw_text": raw_text,
                "status_code": status,
            })
        }
    };

    let http_ok = (200..300).contains(&status);
    let has_result = body
        .as_object()
        .and_then(|obj| obj.get("result"))
        .is_some_and(is_truthy);

    let classification = if http_ok && has_result {
        Classification::Success
    } else {
        Classification::ProtocolError
    };

    RpcOutcome {
        status_code: Some(status),
        body,
        classification,
    }
}

/// JSON truthiness: `null`, `false`, zero, `""`, `[]` and `{}` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_with_object_result() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"result":{"echoed":"hi"}}"#;
        let outcome = classify(200, raw);

        assert_eq!(outcome.classification, Classification::Success);
        assert_eq!(outcome.status_code, Some(200));
        assert_eq!(outcome.body, serde_json::from_str::<Value>(raw).unwrap());
        assert_eq!(outcome.result().unwrap()["echoed"], "hi");
    }

    #[test]
    fn test_success_across_2xx_range() {
        for status in [200u16, 201, 204, 299] {
            let outcome = classify(status, r#"{"result": [1]}"#);
            assert!(outcome.is_success(), "status {} should succeed", status);
        }
    }

    #[test]
    fn test_error_status_is_protocol_error_regardless_of_body() {
        for status in [300u16, 302, 400, 401, 404, 500, 503] {
            for body in [r#"{"result": {"ok": true}}"#, "[]", "not json", ""] {
                let outcome = classify(status, body);
                assert_eq!(
                    outcome.classification,
                    Classification::ProtocolError,
                    "status {} body {:?}",
                    status,
                    body
                );
                assert_eq!(outcome.status_code, Some(status));
            }
        }
    }

    #[test]
    fn test_non_json_body_keeps_raw_text() {
        let outcome = classify(200, "<html>Bad Gateway</html>");

        assert_eq!(outcome.classification, Classification::ProtocolError);
        assert_eq!(outcome.body["raw_text"], "<html>Bad Gateway</html>");
        assert_eq!(outcome.body["status_code"], 200);
    }

    #[test]
    fn test_json_rpc_error_response() {
        let raw = r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32601,"message":"Method not found"}}"#;
        let outcome = classify(200, raw);

        assert_eq!(outcome.classification, Classification::ProtocolError);
        let err = outcome.rpc_error().unwrap();
        assert_eq!(err.code, JsonRpcError::METHOD_NOT_FOUND);
        assert!(outcome.summary().contains("Method not found"));
    }

    #[test]
    fn test_2xx_without_result_is_protocol_error() {
        let outcome = classify(200, r#"{"jsonrpc":"2.0","id":1}"#);
        assert_eq!(outcome.classification, Classification::ProtocolError);
        assert!(outcome.summary().contains("no result"));
    }

    #[test]
    fn test_2xx_non_object_body_is_protocol_error() {
        for body in ["[1, 2, 3]", "42", "\"result\"", "true", "null"] {
            let outcome = classify(200, body);
            assert_eq!(outcome.classification, Classification::ProtocolError, "{}", body);
            assert!(outcome.result().is_none());
        }
    }

    #[test]
    fn test_falsy_result_is_protocol_error() {
        for result in ["false", "0", "0.0", "\"\"", "[]", "{}", "null"] {
            let raw = format!(r#"{{"result": {}}}"#, result);
            let outcome = classify(200, &raw);
            assert_eq!(
                outcome.classification,
                Classification::ProtocolError,
                "result {}",
                result
            );
        }
        assert!(classify(200, r#"{"result": false}"#)
            .summary()
            .contains("falsy result"));
    }

    #[test]
    fn test_truthy_scalars() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!(-0.5)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!([null])));
        assert!(is_truthy(&json!({"a": null})));
    }

    #[test]
    fn test_transport_failure_has_no_status() {
        let outcome = RpcOutcome::transport_failure("connection refused");
        assert_eq!(outcome.classification, Classification::TransportFailure);
        assert_eq!(outcome.status_code, None);
        assert_eq!(outcome.body, json!("connection refused"));
        assert_eq!(outcome.summary(), "transport failure: connection refused");
    }

    #[test]
    fn test_classification_serializes_snake_case() {
        let json = serde_json::to_string(&Classification::ProtocolError).unwrap();
        assert_eq!(json, "\"protocol_error\"");
    }
}
