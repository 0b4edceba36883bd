//! Client error types.
//!
//! Every failure mode a caller needs to distinguish gets its own variant;
//! a dispatching layer can render them without parsing message text.

use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required argument was absent from every source (call args, config).
    /// Raised before any network activity.
    #[error("{0}")]
    MissingArgument(String),

    /// Configuration could not be loaded or failed validation.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The safety gate refused the statement. Raised before submission.
    #[error(transparent)]
    Rejected(#[from] lakegate_security::SqlRejected),

    /// The remote operation reached a terminal-failure state. `payload` is
    /// the raw status response for caller inspection.
    #[error("{message}")]
    OperationFailed { message: String, payload: Value },

    /// The local deadline expired while the operation was still pending.
    /// The remote operation keeps running; the message embeds the
    /// identifiers needed to resume polling manually.
    #[error("{operation} timed out after {waited_secs} seconds")]
    Timeout {
        operation: String,
        waited_secs: u64,
    },

    /// The request/response exchange itself failed: connect error, non-2xx
    /// status, or an undecodable body.
    #[error("API request failed: {method} {url}: {message}")]
    Http {
        method: String,
        url: String,
        status: Option<u16>,
        message: String,
        body: Option<Value>,
    },

    /// The remote answered 2xx but the payload was missing a field the
    /// protocol requires (e.g. no statement_id on a submit response).
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timeout_message_embeds_identifiers() {
        let err = Error::Timeout {
            operation: "Genie message (conversation_id=c1, message_id=m1)".to_string(),
            waited_secs: 300,
        };
        let text = err.to_string();
        assert!(text.contains("c1"));
        assert!(text.contains("m1"));
        assert!(text.contains("300"));
    }

    #[test]
    fn operation_failed_keeps_raw_payload() {
        let payload = json!({"status": {"state": "FAILED"}});
        let err = Error::OperationFailed {
            message: "Query execution failed: syntax error".to_string(),
            payload: payload.clone(),
        };
        assert!(err.to_string().contains("syntax error"));
        match err {
            Error::OperationFailed { payload: p, .. } => assert_eq!(p, payload),
            _ => unreachable!(),
        }
    }
}
