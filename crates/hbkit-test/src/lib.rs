//! # hbkit-test
//!
//! End-to-end tests for the hbkit client facade.
//!
//! This crate contains fixtures shared by the tests under `tests/`: an
//! in-memory cluster paired with a client, and helpers for seeding and
//! decoding rows.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::sync::Arc;

use hbkit_client::{Client, ClientConfig, ClientResult, ConnectionMode, MemoryStore};
use hbkit_common::{CellValue, TableName};

/// An in-memory cluster and a client connected to it.
pub struct TestCluster {
    /// The backing store, kept for inspection and fault injection.
    pub store: MemoryStore,
    /// The client under test.
    pub client: Client,
}

impl TestCluster {
    /// Starts a cluster with a shared-connection client.
    pub fn start() -> Self {
        Self::with_mode(ConnectionMode::Shared)
    }

    /// Starts a cluster with a client using the given provisioning mode.
    pub fn with_mode(mode: ConnectionMode) -> Self {
        let store = MemoryStore::new();
        let config = ClientConfig::new().connection_mode(mode);
        let client = Client::new(config, Arc::new(store.clone()))
            .expect("default configuration is valid");
        Self { store, client }
    }

    /// Creates `table` with the given families.
    pub fn create_table(&self, table: &TableName, families: &[&str]) -> ClientResult<()> {
        self.client.create_table(table, families)
    }

    /// Writes `info:name = <value>` for every `(row, value)` pair.
    pub fn seed_names(&self, table: &TableName, rows: &[(&str, &str)]) -> ClientResult<()> {
        for (row, name) in rows {
            self.client.put(table, *row, "info", "name", *name)?;
        }
        Ok(())
    }
}

/// Returns a table name in the `test` namespace.
pub fn test_table(name: &str) -> TableName {
    TableName::new("test", name).expect("valid table name")
}

/// Decodes values as UTF-8, panicking on invalid text.
pub fn decode(values: &[CellValue]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.to_utf8().expect("value is UTF-8"))
        .collect()
}
