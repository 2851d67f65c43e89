//! Error types for the RPC gateway.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// JSON-RPC code the daemon uses for application errors.
pub const APPLICATION_ERROR: i64 = -32500;

/// JSON-RPC code for an unknown method.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// An error payload returned by the daemon under the `"error"` key.
///
/// The daemon sends
/// `{"code": -32500, "message": "...", "data": {"name": "InsufficientFundsError", ...}}`.
/// The interesting parts are lifted into fields; the whole payload is kept
/// in `raw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonError {
    pub code: Option<i64>,
    pub message: String,
    /// Exception name from `data.name`, when present.
    pub name: Option<String>,
    pub raw: Value,
}

impl DaemonError {
    /// Build an application error the way the daemon shapes one.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        let message = message.into();
        Self {
            code: Some(APPLICATION_ERROR),
            raw: json!({
                "code": APPLICATION_ERROR,
                "message": message,
                "data": {"name": name},
            }),
            message,
            name: Some(name),
        }
    }

    /// Lift the fields out of a raw `"error"` value.
    ///
    /// Older daemons send a bare string; anything else is rendered as JSON.
    pub fn from_value(raw: Value) -> Self {
        match &raw {
            Value::Object(map) => {
                let message = map
                    .get("message")
                    .or_else(|| map.get("text"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| raw.to_string());
                let name = map
                    .get("data")
                    .and_then(|data| data.get("name"))
                    .or_else(|| map.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Self {
                    code: map.get("code").and_then(Value::as_i64),
                    message,
                    name,
                    raw,
                }
            }
            Value::String(s) => Self {
                code: None,
                message: s.clone(),
                name: None,
                raw,
            },
            other => Self {
                code: None,
                message: other.to_string(),
                name: None,
                raw,
            },
        }
    }
}

impl fmt::Display for DaemonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}: {}", name, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Errors that can occur while talking to the daemon.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Connection refused, timed out, or dropped. Not retried here.
    #[error("daemon unreachable: {0}")]
    Unreachable(String),

    /// The daemon answered with an `"error"` payload.
    #[error("daemon error: {0}")]
    Daemon(DaemonError),

    /// The response was not JSON, had neither `result` nor `error`, or did
    /// not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Request parameters could not be encoded.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The HTTP client could not be built.
    #[error("gateway configuration error: {0}")]
    Config(String),
}

impl RpcError {
    /// The daemon's payload when this is a daemon-reported error.
    pub fn daemon_error(&self) -> Option<&DaemonError> {
        match self {
            Self::Daemon(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, RpcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_structured_error() {
        let err = DaemonError::from_value(json!({
            "code": -32500,
            "message": "Not enough funds to cover this transaction.",
            "data": {"name": "InsufficientFundsError", "traceback": []}
        }));
        assert_eq!(err.code, Some(-32500));
        assert_eq!(err.name.as_deref(), Some("InsufficientFundsError"));
        assert_eq!(
            err.to_string(),
            "InsufficientFundsError: Not enough funds to cover this transaction."
        );
    }

    #[test]
    fn test_from_resolve_error() {
        let err = DaemonError::from_value(json!({
            "name": "NOT_FOUND",
            "text": "Could not find claim at \"lbry://nothing\"."
        }));
        assert_eq!(err.code, None);
        assert_eq!(err.name.as_deref(), Some("NOT_FOUND"));
        assert!(err.message.starts_with("Could not find claim"));
    }

    #[test]
    fn test_from_string_error() {
        let err = DaemonError::from_value(json!("boom"));
        assert_eq!(err.message, "boom");
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_new_matches_daemon_shape() {
        let err = DaemonError::new("InsufficientFundsError", "no money");
        assert_eq!(DaemonError::from_value(err.raw.clone()), err);
    }
}
