//! Error types for the ibwire crate.

use thiserror::Error;

use crate::protocol::client_errors::ClientError;

/// Top-level error type for the TWS wire client.
#[derive(Debug, Error)]
pub enum IBApiError {
    /// Failed to encode a request message.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Failed to decode a response message.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Protocol-level error (bad handshake, redirect, framing).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A catalogued client-side error (UPDATE_TWS, NOT_CONNECTED, ...).
    #[error("Client error (id={req_id}, code={code}): {message}")]
    Client {
        req_id: i32,
        code: i32,
        message: String,
    },

    /// The outbound queue is at capacity; nothing was queued.
    #[error("Outbound queue full")]
    QueueFull,

    /// Connection was closed.
    #[error("Disconnected: {0}")]
    Disconnected(String),

    /// I/O error from the underlying socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IBApiError {
    /// Build a client error from a catalog entry, appending `detail` to the
    /// catalog message when it is non-empty.
    pub fn client(req_id: i32, err: ClientError, detail: &str) -> Self {
        let message = if detail.is_empty() {
            err.message.to_string()
        } else {
            format!("{}  {}", err.message, detail)
        };
        IBApiError::Client {
            req_id,
            code: err.code,
            message,
        }
    }

    /// The catalogued code for client errors, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            IBApiError::Client { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Convenience Result type for this crate.
pub type Result<T> = std::result::Result<T, IBApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::client_errors::{NOT_CONNECTED, UPDATE_TWS};

    #[test]
    fn client_error_appends_detail() {
        let err = IBApiError::client(7, UPDATE_TWS, "It does not support PnL requests.");
        match &err {
            IBApiError::Client { req_id, code, message } => {
                assert_eq!(*req_id, 7);
                assert_eq!(*code, 503);
                assert!(message.starts_with(UPDATE_TWS.message));
                assert!(message.ends_with("PnL requests."));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.code(), Some(503));
    }

    #[test]
    fn client_error_without_detail() {
        let err = IBApiError::client(-1, NOT_CONNECTED, "");
        assert_eq!(err.to_string(), "Client error (id=-1, code=504): Not connected");
    }

    #[test]
    fn only_client_errors_carry_a_code() {
        assert_eq!(IBApiError::Decoding("x".into()).code(), None);
        assert_eq!(IBApiError::Disconnected("eof".into()).code(), None);
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        assert_eq!(IBApiError::from(io).code(), None);
    }
}
