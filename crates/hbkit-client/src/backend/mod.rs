//! Store backend traits.
//!
//! The facade never talks to a cluster directly. It goes through these
//! traits, which a store client implements:
//!
//! - [`StoreConnector`] opens connections from a [`ClientConfig`]
//! - [`StoreConnection`] is one live link to the cluster
//! - [`Admin`] and [`Table`] are short-lived handles opened per operation
//!
//! Handles release whatever they hold when dropped, so every exit path of
//! a facade operation gives them back.

use std::fmt;
use std::sync::Arc;

use hbkit_common::{NamespaceName, StoreResult, TableName};

use crate::config::ClientConfig;
use crate::descriptor::TableDescriptor;
use crate::operation::{Delete, Get, Put, RowResult, Scan};

/// Opens connections to a cluster.
pub trait StoreConnector: Send + Sync {
    /// Opens a new connection using `config`.
    fn connect(&self, config: &ClientConfig) -> StoreResult<Arc<dyn StoreConnection>>;
}

/// A live connection to a cluster.
pub trait StoreConnection: Send + Sync + fmt::Debug {
    /// Opens an administrative handle.
    fn admin(&self) -> StoreResult<Box<dyn Admin>>;

    /// Opens a data handle on one table.
    fn table(&self, name: &TableName) -> StoreResult<Box<dyn Table>>;

    /// Returns true once the connection has been closed.
    fn is_closed(&self) -> bool;

    /// Closes the connection. Closing twice is a no-op.
    fn close(&self) -> StoreResult<()>;
}

/// Namespace and table DDL.
pub trait Admin: Send {
    /// Returns true if the namespace exists.
    fn namespace_exists(&self, namespace: &NamespaceName) -> StoreResult<bool>;

    /// Creates a namespace.
    fn create_namespace(&mut self, namespace: &NamespaceName) -> StoreResult<()>;

    /// Lists the tables of a namespace in name order.
    fn list_tables(&self, namespace: &NamespaceName) -> StoreResult<Vec<TableName>>;

    /// Returns true if the table exists.
    fn table_exists(&self, table: &TableName) -> StoreResult<bool>;

    /// Returns true if the table is enabled.
    fn is_table_enabled(&self, table: &TableName) -> StoreResult<bool>;

    /// Creates a table from its descriptor. The table starts enabled.
    fn create_table(&mut self, descriptor: &TableDescriptor) -> StoreResult<()>;

    /// Returns the current descriptor of a table.
    fn descriptor(&self, table: &TableName) -> StoreResult<TableDescriptor>;

    /// Replaces the descriptor of an existing table.
    fn modify_table(&mut self, descriptor: &TableDescriptor) -> StoreResult<()>;

    /// Disables a table.
    fn disable_table(&mut self, table: &TableName) -> StoreResult<()>;

    /// Enables a table.
    fn enable_table(&mut self, table: &TableName) -> StoreResult<()>;

    /// Drops a disabled table.
    fn delete_table(&mut self, table: &TableName) -> StoreResult<()>;
}

/// Row-level reads and writes on one table.
pub trait Table: Send {
    /// Returns the table this handle is bound to.
    fn name(&self) -> &TableName;

    /// Writes the cells of a put atomically within the row.
    fn put(&mut self, put: &Put) -> StoreResult<()>;

    /// Reads cells of one row.
    fn get(&self, get: &Get) -> StoreResult<RowResult>;

    /// Deletes cells, families or the whole row.
    fn delete(&mut self, delete: &Delete) -> StoreResult<()>;

    /// Reads the rows of a scan range in key order.
    fn scan(&self, scan: &Scan) -> StoreResult<Vec<RowResult>>;
}
