//! Error handling for hbkit.
//!
//! This module provides the error type raised by store backends and the
//! result alias used across the backend traits.

mod store;

pub use store::{ErrorCode, StoreError};

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
