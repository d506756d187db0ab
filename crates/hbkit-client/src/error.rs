//! Error types for the client library.

use std::fmt;
use std::str::Utf8Error;
use thiserror::Error;

use hbkit_common::{InvalidName, StoreError};

/// Client error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Arguments rejected before reaching the store.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Namespace does not exist.
    #[error("namespace '{0}' does not exist")]
    NamespaceNotFound(String),

    /// Namespace already exists.
    #[error("namespace '{0}' already exists")]
    NamespaceExists(String),

    /// Table does not exist.
    #[error("table '{0}' does not exist")]
    TableNotFound(String),

    /// Could not open a connection to the cluster.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// The store rejected or failed the operation.
    #[error("{operation} failed: {source}")]
    OperationFailed {
        /// The facade operation that failed.
        operation: &'static str,
        /// The store error.
        #[source]
        source: StoreError,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A value could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ClientError {
    /// Wraps a store error raised while running `operation`.
    pub(crate) fn store(operation: &'static str, source: StoreError) -> Self {
        match source {
            StoreError::ConnectionClosed => ClientError::ConnectionClosed,
            source => ClientError::OperationFailed { operation, source },
        }
    }

    /// Returns true if the error reports a missing namespace or table.
    pub fn is_not_found(&self) -> bool {
        match self {
            ClientError::NamespaceNotFound(_) | ClientError::TableNotFound(_) => true,
            ClientError::OperationFailed { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Returns true if the arguments were rejected before reaching the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    /// Returns the underlying store error, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            ClientError::OperationFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<InvalidName> for ClientError {
    fn from(e: InvalidName) -> Self {
        ClientError::Validation(e.to_string())
    }
}

impl From<Utf8Error> for ClientError {
    fn from(e: Utf8Error) -> Self {
        ClientError::Decode(format!("value is not valid UTF-8: {e}"))
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection has been opened yet.
    Disconnected,
    /// Connected and ready.
    Connected,
    /// The last connection attempt failed.
    Failed,
    /// Connection closed.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Failed => write!(f, "failed"),
            ConnectionState::Closed => write!(f, "closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_store_error_keeps_cause() {
        let err = ClientError::store(
            "put",
            StoreError::NoSuchColumnFamily {
                table: "test:t".to_string(),
                family: "cf".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "put failed: column family 'cf' does not exist in table 'test:t'"
        );
        assert!(err.source().is_some());
        assert!(err.store_error().is_some());
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let bytes = vec![b'z', 0xff];
        let err = ClientError::from(std::str::from_utf8(&bytes).unwrap_err());
        assert!(matches!(err, ClientError::Decode(_)));
        assert!(err.to_string().starts_with("decode error: value is not valid UTF-8"));
    }

    #[test]
    fn test_closed_connection_is_not_wrapped() {
        let err = ClientError::store("get", StoreError::ConnectionClosed);
        assert!(matches!(err, ClientError::ConnectionClosed));
    }

    #[test]
    fn test_classification() {
        assert!(ClientError::TableNotFound("t".to_string()).is_not_found());
        assert!(ClientError::Validation("x".to_string()).is_validation());
        let wrapped = ClientError::store(
            "create_table",
            StoreError::NamespaceNotFound {
                namespace: "ns".to_string(),
            },
        );
        assert!(wrapped.is_not_found());
        assert!(!wrapped.is_validation());
    }

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
        assert_eq!(ConnectionState::Closed.to_string(), "closed");
    }
}
