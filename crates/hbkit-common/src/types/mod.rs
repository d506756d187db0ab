//! Type definitions for hbkit.
//!
//! This module contains the core types exchanged between the client facade
//! and store backends.

mod keys;
mod names;
mod timestamps;

pub use keys::{CellValue, Qualifier, RowKey};
pub use names::{FamilyName, InvalidName, NamespaceName, TableName};
pub use timestamps::Timestamp;
