//! # hbkit-common
//!
//! Common types and errors shared by the hbkit crates.
//!
//! This crate provides the foundational types used at the boundary between
//! the client facade and a wide-column store backend:
//!
//! - **Types**: byte-backed row keys, qualifiers and cell values, validated
//!   namespace/table/family names, and cell timestamps
//! - **Errors**: the `StoreError` raised by store backends, with stable codes
//! - **Constants**: store-wide names and defaults
//!
//! ## Example
//!
//! ```rust
//! use hbkit_common::types::{CellValue, RowKey, TableName};
//!
//! let table = TableName::parse("test:users").unwrap();
//! assert_eq!(table.namespace().as_str(), "test");
//!
//! let row = RowKey::from("1000");
//! let value = CellValue::from("zs");
//! assert!(row < RowKey::from("2000"));
//! assert_eq!(value.as_str(), Some("zs"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod constants;
pub mod error;
pub mod types;

pub use constants::*;
pub use error::{ErrorCode, StoreError, StoreResult};
pub use types::{
    CellValue, FamilyName, InvalidName, NamespaceName, Qualifier, RowKey, TableName, Timestamp,
};
