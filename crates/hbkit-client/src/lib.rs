//! # hbkit-client
//!
//! Client facade for HBase-style wide-column stores.
//!
//! This crate wraps a store's admin and table APIs in one synchronous
//! [`Client`]. It includes:
//!
//! - **Connection Management**: a shared connection reopened on demand, or
//!   one connection per call
//! - **DDL**: namespaces, table creation, version limits, table deletion
//! - **Rows**: puts, versioned gets, cell and row deletes, range scans with
//!   an optional column-value filter
//! - **In-Memory Store**: [`MemoryStore`], a complete in-process backend
//!   with fault injection for tests
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use hbkit_client::{Client, ClientConfig, MemoryStore};
//! use hbkit_common::TableName;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientConfig::default(), Arc::new(MemoryStore::new()))?;
//!
//! let users = TableName::parse("test:users")?;
//! client.create_table(&users, &["info"])?;
//! client.modify_table(&users, "info", 3)?;
//!
//! client.put(&users, "1000", "info", "name", "zs")?;
//! client.put(&users, "1000", "info", "name", "ls")?;
//!
//! let names = client.get(&users, "1000", "info", "name")?;
//! assert_eq!(names[0].as_str(), Some("ls"));
//! assert_eq!(names.len(), 2);
//!
//! client.delete_table(&users)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use hbkit_client::{ClientConfig, ConnectionMode};
//!
//! let config = ClientConfig::from_toml_str(r#"
//!     quorum = ["zk1", "zk2"]
//!     connection_mode = "per_call"
//!     operation_timeout = "5s"
//! "#).unwrap();
//!
//! assert_eq!(config.quorum_string(), "zk1:2181,zk2:2181");
//! assert_eq!(config.connection_mode, ConnectionMode::PerCall);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error types.
pub mod error;

/// Client configuration.
pub mod config;

/// Table schemas.
pub mod descriptor;

/// Row operations and results.
pub mod operation;

/// Store backend traits.
pub mod backend;

/// In-process store.
pub mod memory;

/// Connection provisioning.
pub mod connection;

/// Client facade.
pub mod client;

// Re-exports
pub use backend::{Admin, StoreConnection, StoreConnector, Table};
pub use client::{Client, ClientStats};
pub use config::{ClientConfig, ConnectionMode};
pub use connection::{ConnectionLease, ConnectionProvider};
pub use descriptor::{ColumnFamilyDescriptor, TableDescriptor};
pub use error::{ClientError, ClientResult, ConnectionState};
pub use memory::{MemoryStore, StoreOp};
pub use operation::{Cell, ColumnSelector, CompareOperator, Delete, Filter, Get, Put, RowResult, Scan};
