//! Store error types.
//!
//! Errors raised by a wide-column store backend, with stable codes for
//! programmatic handling.

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing store errors.
///
/// These codes are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Invalid argument provided.
    InvalidArgument = 0x0003,

    // I/O errors (0x0100 - 0x01FF)
    /// General I/O error.
    Io = 0x0100,
    /// Connection to the cluster was closed.
    ConnectionClosed = 0x0101,
    /// Cluster could not be reached.
    Unavailable = 0x0102,

    // Namespace errors (0x0200 - 0x02FF)
    /// Namespace already exists.
    NamespaceExists = 0x0200,
    /// Namespace not found.
    NamespaceNotFound = 0x0201,

    // Table errors (0x0300 - 0x03FF)
    /// Table already exists.
    TableExists = 0x0300,
    /// Table not found.
    TableNotFound = 0x0301,
    /// Table must be disabled for this operation.
    TableNotDisabled = 0x0302,
    /// Table must be enabled for this operation.
    TableNotEnabled = 0x0303,
    /// Column family not part of the table schema.
    NoSuchColumnFamily = 0x0304,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "I/O",
            0x02 => "Namespace",
            0x03 => "Table",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// An error raised by a store backend.
///
/// # Example
///
/// ```rust
/// use hbkit_common::error::{ErrorCode, StoreError};
///
/// let err = StoreError::TableNotFound { table: "test:t".to_string() };
/// assert_eq!(err.code(), ErrorCode::TableNotFound);
/// assert!(err.is_not_found());
/// ```
#[derive(Debug, Error)]
pub enum StoreError {
    /// Invalid argument passed to the store.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Error message.
        message: String,
    },

    /// I/O error talking to the cluster.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The connection was closed before or during the call.
    #[error("connection is closed")]
    ConnectionClosed,

    /// The cluster could not be reached.
    #[error("cluster unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },

    /// Namespace already exists.
    #[error("namespace '{namespace}' already exists")]
    NamespaceExists {
        /// The existing namespace.
        namespace: String,
    },

    /// Namespace not found.
    #[error("namespace '{namespace}' not found")]
    NamespaceNotFound {
        /// The missing namespace.
        namespace: String,
    },

    /// Table already exists.
    #[error("table '{table}' already exists")]
    TableExists {
        /// The existing table.
        table: String,
    },

    /// Table not found.
    #[error("table '{table}' not found")]
    TableNotFound {
        /// The missing table.
        table: String,
    },

    /// Table is enabled but the operation requires it to be disabled.
    #[error("table '{table}' is not disabled")]
    TableNotDisabled {
        /// The enabled table.
        table: String,
    },

    /// Table is disabled but the operation requires it to be enabled.
    #[error("table '{table}' is not enabled")]
    TableNotEnabled {
        /// The disabled table.
        table: String,
    },

    /// Column family is not part of the table schema.
    #[error("column family '{family}' does not exist in table '{table}'")]
    NoSuchColumnFamily {
        /// The table.
        table: String,
        /// The unknown family.
        family: String,
    },
}

impl StoreError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::Io { .. } => ErrorCode::Io,
            Self::ConnectionClosed => ErrorCode::ConnectionClosed,
            Self::Unavailable { .. } => ErrorCode::Unavailable,
            Self::NamespaceExists { .. } => ErrorCode::NamespaceExists,
            Self::NamespaceNotFound { .. } => ErrorCode::NamespaceNotFound,
            Self::TableExists { .. } => ErrorCode::TableExists,
            Self::TableNotFound { .. } => ErrorCode::TableNotFound,
            Self::TableNotDisabled { .. } => ErrorCode::TableNotDisabled,
            Self::TableNotEnabled { .. } => ErrorCode::TableNotEnabled,
            Self::NoSuchColumnFamily { .. } => ErrorCode::NoSuchColumnFamily,
        }
    }

    /// Returns true if this error reports a missing namespace or table.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NamespaceNotFound { .. } | Self::TableNotFound { .. }
        )
    }

    /// Returns true if this error means the cluster link itself failed.
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionClosed | Self::Unavailable { .. } | Self::Io { .. }
        )
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates an I/O error from a message.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            source: std::io::Error::new(std::io::ErrorKind::Other, message.into()),
        }
    }
}
