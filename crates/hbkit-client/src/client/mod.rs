//! The storage client facade.
//!
//! Provides the main `Client` struct: namespace and table DDL plus row-level
//! reads and writes, each delegated to the store through a short-lived
//! admin or table handle.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use hbkit_common::{
    CellValue, FamilyName, NamespaceName, Qualifier, RowKey, StoreError, StoreResult, TableName,
};

use crate::backend::{Admin, StoreConnection, StoreConnector, Table};
use crate::config::ClientConfig;
use crate::connection::ConnectionProvider;
use crate::descriptor::{ColumnFamilyDescriptor, TableDescriptor};
use crate::error::{ClientError, ClientResult, ConnectionState};
use crate::operation::{Delete, Filter, Get, Put, RowResult, Scan};

/// Statistics about client usage.
#[derive(Debug, Clone, Default)]
pub struct ClientStats {
    /// Store round trips attempted.
    pub operations: u64,
    /// Store round trips that failed.
    pub failed_operations: u64,
    /// Connections opened.
    pub connections_opened: u64,
    /// Connections closed.
    pub connections_closed: u64,
}

/// Client facade for a wide-column store.
///
/// `Client` is `Send + Sync`; share it by reference or behind an `Arc`.
/// Dropping it closes the shared connection.
pub struct Client {
    /// Connection provisioning.
    provider: ConnectionProvider,
    /// Statistics.
    stats: RwLock<ClientStats>,
}

impl Client {
    /// Creates a client. No connection is opened until the first operation.
    pub fn new(config: ClientConfig, connector: Arc<dyn StoreConnector>) -> ClientResult<Self> {
        config.validate()?;
        Ok(Self {
            provider: ConnectionProvider::new(config, connector),
            stats: RwLock::new(ClientStats::default()),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        self.provider.config()
    }

    /// Returns the state of the shared connection.
    pub fn state(&self) -> ConnectionState {
        self.provider.state()
    }

    /// Returns how long the shared connection has been open.
    pub fn connection_duration(&self) -> Option<Duration> {
        self.provider.connection_age()
    }

    /// Returns client statistics.
    pub fn stats(&self) -> ClientStats {
        let mut stats = self.stats.read().clone();
        stats.connections_opened = self.provider.connections_opened();
        stats.connections_closed = self.provider.connections_closed();
        stats
    }

    // =========================================================================
    // Connection
    // =========================================================================

    /// Returns a live connection.
    ///
    /// In shared mode this is the shared connection, opened if absent or
    /// closed. In per-call mode it is a new connection owned by the caller.
    pub fn connection(&self) -> ClientResult<Arc<dyn StoreConnection>> {
        self.provider.connection()
    }

    /// Closes the shared connection. The next operation reopens it.
    pub fn close(&self) -> ClientResult<()> {
        self.provider.close()
    }

    // =========================================================================
    // Namespaces
    // =========================================================================

    /// Returns true if the namespace exists.
    pub fn namespace_exists(&self, namespace: &NamespaceName) -> ClientResult<bool> {
        let exists = self.with_admin("namespace_exists", |admin| {
            admin.namespace_exists(namespace)
        })?;
        tracing::debug!("Namespace {} exists: {}", namespace, exists);
        Ok(exists)
    }

    /// Creates a namespace.
    pub fn create_namespace(&self, namespace: &NamespaceName) -> ClientResult<()> {
        self.with_admin("create_namespace", |admin| admin.create_namespace(namespace))
            .map_err(|e| match e {
                ClientError::OperationFailed {
                    source: StoreError::NamespaceExists { namespace },
                    ..
                } => ClientError::NamespaceExists(namespace),
                e => e,
            })?;
        tracing::info!("Created namespace {}", namespace);
        Ok(())
    }

    /// Lists the tables of a namespace in name order.
    pub fn list_tables(&self, namespace: &NamespaceName) -> ClientResult<Vec<TableName>> {
        self.with_admin("list_tables", |admin| admin.list_tables(namespace))
            .map_err(|e| match e {
                ClientError::OperationFailed {
                    source: StoreError::NamespaceNotFound { namespace },
                    ..
                } => ClientError::NamespaceNotFound(namespace),
                e => e,
            })
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// Returns true if the table exists.
    pub fn table_exists(&self, table: &TableName) -> ClientResult<bool> {
        let exists = self.with_admin("table_exists", |admin| admin.table_exists(table))?;
        tracing::debug!("Table {} exists: {}", table, exists);
        Ok(exists)
    }

    /// Creates a table with one default column family per name.
    ///
    /// The namespace is created first if it does not exist.
    pub fn create_table<S: AsRef<str>>(&self, table: &TableName, families: &[S]) -> ClientResult<()> {
        if families.is_empty() {
            return Err(ClientError::Validation(format!(
                "table '{table}' needs at least one column family"
            )));
        }

        let mut descriptor = TableDescriptor::new(table.clone());
        for name in families {
            let family = FamilyName::new(name.as_ref())?;
            if descriptor.has_family(&family) {
                return Err(ClientError::Validation(format!(
                    "column family '{family}' listed twice"
                )));
            }
            descriptor = descriptor.column_family(ColumnFamilyDescriptor::new(family));
        }

        self.create_table_with(descriptor)
    }

    /// Creates a table from a full descriptor.
    ///
    /// The namespace is created first if it does not exist.
    pub fn create_table_with(&self, descriptor: TableDescriptor) -> ClientResult<()> {
        descriptor.validate().map_err(ClientError::Validation)?;

        let namespace = descriptor.name().namespace();
        self.with_admin("create_table", |admin| {
            if !admin.namespace_exists(namespace)? {
                match admin.create_namespace(namespace) {
                    Ok(()) => tracing::info!("Created namespace {}", namespace),
                    // Lost a race with another creator
                    Err(StoreError::NamespaceExists { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
            admin.create_table(&descriptor)
        })?;

        tracing::info!(
            "Created table {} with {} column families",
            descriptor.name(),
            descriptor.family_count()
        );
        Ok(())
    }

    /// Returns the current descriptor of a table.
    pub fn describe_table(&self, table: &TableName) -> ClientResult<TableDescriptor> {
        self.ensure_table(table)?;
        self.with_admin("describe_table", |admin| admin.descriptor(table))
    }

    /// Sets the maximum number of versions kept by one column family.
    ///
    /// Other families and settings are left unchanged.
    pub fn modify_table(&self, table: &TableName, family: &str, max_versions: u32) -> ClientResult<()> {
        let family = FamilyName::new(family)?;
        if max_versions == 0 {
            return Err(ClientError::Validation(
                "max_versions must be at least 1".to_string(),
            ));
        }
        self.ensure_table(table)?;

        self.with_admin("modify_table", |admin| {
            let mut descriptor = admin.descriptor(table)?;
            let cf = descriptor
                .family_mut(&family)
                .ok_or_else(|| StoreError::NoSuchColumnFamily {
                    table: table.to_string(),
                    family: family.to_string(),
                })?;
            cf.max_versions = max_versions;
            cf.min_versions = cf.min_versions.min(max_versions);
            admin.modify_table(&descriptor)
        })
        .map_err(|e| match e {
            ClientError::OperationFailed {
                source: StoreError::NoSuchColumnFamily { table, family },
                ..
            } => ClientError::Validation(format!(
                "table '{table}' has no column family '{family}'"
            )),
            e => e,
        })?;

        tracing::info!(
            "Modified table {}: {} keeps {} versions",
            table,
            family,
            max_versions
        );
        Ok(())
    }

    /// Disables and drops a table.
    pub fn delete_table(&self, table: &TableName) -> ClientResult<()> {
        self.ensure_table(table)?;
        self.drop_table(table)
    }

    /// Disables and drops a table, reporting disable/drop failures as
    /// `Ok(false)` instead of an error.
    ///
    /// A missing table and a lost or unreachable connection are still errors.
    pub fn try_delete_table(&self, table: &TableName) -> ClientResult<bool> {
        self.ensure_table(table)?;
        match self.drop_table(table) {
            Ok(()) => Ok(true),
            Err(e @ (ClientError::ConnectionFailed(_) | ClientError::ConnectionClosed)) => Err(e),
            Err(e) => {
                tracing::warn!("Failed to delete table {}: {}", table, e);
                Ok(false)
            }
        }
    }

    fn drop_table(&self, table: &TableName) -> ClientResult<()> {
        self.with_admin("delete_table", |admin| {
            if admin.is_table_enabled(table)? {
                admin.disable_table(table)?;
            }
            admin.delete_table(table)
        })?;
        tracing::info!("Deleted table {}", table);
        Ok(())
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Writes one cell at the current time.
    pub fn put(
        &self,
        table: &TableName,
        row: impl Into<RowKey>,
        family: &str,
        qualifier: impl Into<Qualifier>,
        value: impl Into<CellValue>,
    ) -> ClientResult<()> {
        let family = FamilyName::new(family)?;
        self.ensure_table(table)?;

        let put = Put::new(row).add_column(family, qualifier, value);
        self.with_table("put", table, |t| t.put(&put))
    }

    /// Writes several cells of one family into a row, atomically and with a
    /// single timestamp.
    pub fn put_fields<I, K, V>(
        &self,
        table: &TableName,
        row: impl Into<RowKey>,
        family: &str,
        fields: I,
    ) -> ClientResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Qualifier>,
        V: Into<CellValue>,
    {
        let family = FamilyName::new(family)?;
        self.ensure_table(table)?;

        let put = fields
            .into_iter()
            .fold(Put::new(row), |put, (qualifier, value)| {
                put.add_column(family.clone(), qualifier, value)
            });
        if put.is_empty() {
            return Ok(());
        }
        self.with_table("put", table, |t| t.put(&put))
    }

    /// Returns every retained version of a cell, newest first.
    ///
    /// An absent cell yields an empty list.
    pub fn get(
        &self,
        table: &TableName,
        row: impl Into<RowKey>,
        family: &str,
        qualifier: impl Into<Qualifier>,
    ) -> ClientResult<Vec<CellValue>> {
        let family = FamilyName::new(family)?;
        let qualifier = qualifier.into();
        self.ensure_table(table)?;

        let get = Get::new(row)
            .add_column(family.clone(), qualifier.clone())
            .read_all_versions();
        let result = self.with_table("get", table, |t| t.get(&get))?;
        Ok(result.versions(&family, &qualifier).cloned().collect())
    }

    /// Like [`get`](Self::get), decoding every version as UTF-8.
    ///
    /// Fails with `Decode` if any version is not valid UTF-8.
    pub fn get_strings(
        &self,
        table: &TableName,
        row: impl Into<RowKey>,
        family: &str,
        qualifier: impl Into<Qualifier>,
    ) -> ClientResult<Vec<String>> {
        let values = self.get(table, row, family, qualifier)?;
        let strings = values
            .iter()
            .map(CellValue::to_utf8)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(strings)
    }

    /// Deletes every version of one cell.
    pub fn delete_cell(
        &self,
        table: &TableName,
        row: impl Into<RowKey>,
        family: &str,
        qualifier: impl Into<Qualifier>,
    ) -> ClientResult<()> {
        let family = FamilyName::new(family)?;
        self.ensure_table(table)?;

        let delete = Delete::new(row).add_column(family, qualifier);
        self.with_table("delete", table, |t| t.delete(&delete))
    }

    /// Deletes an entire row.
    pub fn delete_row(&self, table: &TableName, row: impl Into<RowKey>) -> ClientResult<()> {
        self.ensure_table(table)?;

        let delete = Delete::new(row);
        self.with_table("delete", table, |t| t.delete(&delete))
    }

    /// Returns the first column's newest value of every row in
    /// `[start_row, stop_row)`, in key order.
    pub fn scan(
        &self,
        table: &TableName,
        start_row: impl Into<RowKey>,
        stop_row: impl Into<RowKey>,
    ) -> ClientResult<Vec<CellValue>> {
        let rows = self.scan_rows(table, &Scan::range(start_row, stop_row))?;
        Ok(rows.iter().filter_map(RowResult::value).cloned().collect())
    }

    /// Like [`scan`](Self::scan), restricted to rows whose
    /// `family:qualifier` cell equals `value`.
    pub fn filter_scan(
        &self,
        table: &TableName,
        family: &str,
        qualifier: impl Into<Qualifier>,
        value: impl Into<CellValue>,
        start_row: impl Into<RowKey>,
        stop_row: impl Into<RowKey>,
    ) -> ClientResult<Vec<CellValue>> {
        let family = FamilyName::new(family)?;
        let scan = Scan::range(start_row, stop_row)
            .with_filter(Filter::column_value_eq(family, qualifier, value));

        let rows = self.scan_rows(table, &scan)?;
        Ok(rows.iter().filter_map(RowResult::value).cloned().collect())
    }

    /// Runs a scan and returns whole rows.
    pub fn scan_rows(&self, table: &TableName, scan: &Scan) -> ClientResult<Vec<RowResult>> {
        self.ensure_table(table)?;
        self.with_table("scan", table, |t| t.scan(scan))
    }

    // =========================================================================
    // Helper Methods
    // =========================================================================

    /// Fails with `TableNotFound` unless the table exists.
    fn ensure_table(&self, table: &TableName) -> ClientResult<()> {
        if self.table_exists(table)? {
            Ok(())
        } else {
            Err(ClientError::TableNotFound(table.to_string()))
        }
    }

    /// Runs `f` against an admin handle opened for this call only.
    fn with_admin<T, F>(&self, operation: &'static str, f: F) -> ClientResult<T>
    where
        F: FnOnce(&mut dyn Admin) -> StoreResult<T>,
    {
        let lease = self.provider.acquire()?;
        let result = lease.admin().and_then(|mut admin| f(admin.as_mut()));
        lease.finish(&self.provider);
        self.record(operation, result)
    }

    /// Runs `f` against a table handle opened for this call only.
    fn with_table<T, F>(&self, operation: &'static str, table: &TableName, f: F) -> ClientResult<T>
    where
        F: FnOnce(&mut dyn Table) -> StoreResult<T>,
    {
        let lease = self.provider.acquire()?;
        let result = lease.table(table).and_then(|mut handle| f(handle.as_mut()));
        lease.finish(&self.provider);
        self.record(operation, result)
    }

    fn record<T>(&self, operation: &'static str, result: StoreResult<T>) -> ClientResult<T> {
        let mut stats = self.stats.write();
        stats.operations += 1;
        result.map_err(|e| {
            stats.failed_operations += 1;
            tracing::debug!("{} failed: {}", operation, e);
            ClientError::store(operation, e)
        })
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("quorum", &self.config().quorum_string())
            .field("mode", &self.config().connection_mode)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionMode;
    use crate::memory::{MemoryStore, StoreOp};

    fn client(store: &MemoryStore) -> Client {
        Client::new(ClientConfig::default(), Arc::new(store.clone())).unwrap()
    }

    fn table() -> TableName {
        TableName::new("test", "testTable").unwrap()
    }

    fn strings(values: &[CellValue]) -> Vec<&str> {
        values.iter().filter_map(CellValue::as_str).collect()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let store = MemoryStore::new();
        let config = ClientConfig::new().client_port(0);
        let err = Client::new(config, Arc::new(store)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)));
    }

    #[test]
    fn test_create_table_creates_namespace() {
        let store = MemoryStore::new();
        let client = client(&store);

        assert!(!client.namespace_exists(table().namespace()).unwrap());
        client.create_table(&table(), &["info"]).unwrap();
        assert!(client.namespace_exists(table().namespace()).unwrap());
        assert!(client.table_exists(&table()).unwrap());

        // A second table in the now existing namespace
        let other = TableName::new("test", "other").unwrap();
        client.create_table(&other, &["info", "meta"]).unwrap();
        assert_eq!(
            client.list_tables(table().namespace()).unwrap(),
            vec![other, table()]
        );
    }

    #[test]
    fn test_create_table_validation_touches_nothing() {
        let store = MemoryStore::new();
        let client = client(&store);

        let empty: [&str; 0] = [];
        let err = client.create_table(&table(), &empty).unwrap_err();
        assert!(err.is_validation());

        assert!(client.create_table(&table(), &["info", "info"]).unwrap_err().is_validation());
        assert!(client.create_table(&table(), &["a:b"]).unwrap_err().is_validation());

        assert_eq!(store.total_calls(), 0);
        assert_eq!(store.connections_opened(), 0);
    }

    #[test]
    fn test_create_existing_table_fails() {
        let store = MemoryStore::new();
        let client = client(&store);
        client.create_table(&table(), &["info"]).unwrap();

        let err = client.create_table(&table(), &["info"]).unwrap_err();
        assert!(matches!(
            err.store_error(),
            Some(StoreError::TableExists { .. })
        ));
    }

    #[test]
    fn test_create_namespace_twice() {
        let store = MemoryStore::new();
        let client = client(&store);
        let ns = NamespaceName::new("test").unwrap();

        client.create_namespace(&ns).unwrap();
        let err = client.create_namespace(&ns).unwrap_err();
        assert!(matches!(err, ClientError::NamespaceExists(name) if name == "test"));
    }

    #[test]
    fn test_list_tables_missing_namespace() {
        let store = MemoryStore::new();
        let client = client(&store);
        let err = client
            .list_tables(&NamespaceName::new("absent").unwrap())
            .unwrap_err();
        assert!(matches!(err, ClientError::NamespaceNotFound(_)));
    }

    #[test]
    fn test_data_ops_on_missing_table_fail_fast() {
        let store = MemoryStore::new();
        let client = client(&store);
        let t = table();

        assert!(matches!(
            client.put(&t, "1000", "info", "name", "zs"),
            Err(ClientError::TableNotFound(_))
        ));
        assert!(matches!(
            client.get(&t, "1000", "info", "name"),
            Err(ClientError::TableNotFound(_))
        ));
        assert!(client.delete_row(&t, "1000").unwrap_err().is_not_found());
        assert!(client.scan(&t, "0", "1").unwrap_err().is_not_found());
        assert!(client.modify_table(&t, "info", 3).unwrap_err().is_not_found());
        assert!(client.delete_table(&t).unwrap_err().is_not_found());
        assert!(client.try_delete_table(&t).unwrap_err().is_not_found());

        // Only existence checks reached the store
        assert_eq!(store.call_count(StoreOp::Put), 0);
        assert_eq!(store.call_count(StoreOp::Get), 0);
        assert_eq!(store.call_count(StoreOp::DeleteTable), 0);
    }

    #[test]
    fn test_put_get_versions() {
        let store = MemoryStore::new();
        let client = client(&store);
        client.create_table(&table(), &["info"]).unwrap();
        client.modify_table(&table(), "info", 3).unwrap();

        for name in ["a", "b", "c", "d"] {
            client.put(&table(), "1000", "info", "name", name).unwrap();
        }

        let values = client.get(&table(), "1000", "info", "name").unwrap();
        assert_eq!(strings(&values), vec!["d", "c", "b"]);
        assert!(client.get(&table(), "1000", "info", "age").unwrap().is_empty());
        assert!(client.get(&table(), "9999", "info", "name").unwrap().is_empty());
    }

    #[test]
    fn test_modify_table_only_touches_named_family() {
        let store = MemoryStore::new();
        let client = client(&store);
        client.create_table(&table(), &["info", "meta"]).unwrap();
        client.modify_table(&table(), "meta", 5).unwrap();

        let descriptor = client.describe_table(&table()).unwrap();
        let info = FamilyName::new("info").unwrap();
        let meta = FamilyName::new("meta").unwrap();
        assert_eq!(descriptor.family(&info).unwrap().max_versions, 1);
        assert_eq!(descriptor.family(&meta).unwrap().max_versions, 5);

        assert!(client.modify_table(&table(), "meta", 0).unwrap_err().is_validation());
        assert!(client.modify_table(&table(), "absent", 2).unwrap_err().is_validation());
    }

    #[test]
    fn test_put_unknown_family() {
        let store = MemoryStore::new();
        let client = client(&store);
        client.create_table(&table(), &["info"]).unwrap();

        let err = client.put(&table(), "1000", "meta", "x", "y").unwrap_err();
        assert!(matches!(
            err,
            ClientError::OperationFailed {
                operation: "put",
                source: StoreError::NoSuchColumnFamily { .. }
            }
        ));
    }

    #[test]
    fn test_put_fields() {
        let store = MemoryStore::new();
        let client = client(&store);
        client.create_table(&table(), &["info"]).unwrap();

        client
            .put_fields(&table(), "1000", "info", [("name", "zs"), ("age", "18")])
            .unwrap();
        client
            .put_fields(&table(), "1000", "info", Vec::<(String, String)>::new())
            .unwrap();

        let get = Get::new("1000");
        let conn = client.connection().unwrap();
        let row = conn.table(&table()).unwrap().get(&get).unwrap();
        assert_eq!(row.cells.len(), 2);
        assert_eq!(row.cells[0].timestamp, row.cells[1].timestamp);
        assert_eq!(store.call_count(StoreOp::Put), 1);
    }

    #[test]
    fn test_delete_table_then_recreate() {
        let store = MemoryStore::new();
        let client = client(&store);
        client.create_table(&table(), &["info"]).unwrap();
        client.put(&table(), "1000", "info", "name", "zs").unwrap();

        client.delete_table(&table()).unwrap();
        assert!(!client.table_exists(&table()).unwrap());

        client.create_table(&table(), &["info"]).unwrap();
        assert!(client.get(&table(), "1000", "info", "name").unwrap().is_empty());
    }

    #[test]
    fn test_delete_table_failure_conventions() {
        let store = MemoryStore::new();
        let client = client(&store);
        client.create_table(&table(), &["info"]).unwrap();

        store.fail_next(StoreOp::DeleteTable);
        let err = client.delete_table(&table()).unwrap_err();
        assert!(matches!(
            err,
            ClientError::OperationFailed {
                operation: "delete_table",
                ..
            }
        ));

        // The table was left disabled; the retry skips the disable step
        store.fail_next(StoreOp::DeleteTable);
        assert!(!client.try_delete_table(&table()).unwrap());
        assert!(client.table_exists(&table()).unwrap());

        assert!(client.try_delete_table(&table()).unwrap());
        assert!(!client.table_exists(&table()).unwrap());
    }

    #[test]
    fn test_try_delete_table_raises_lost_connection() {
        let store = MemoryStore::new();
        let client = client(&store);
        client.create_table(&table(), &["info"]).unwrap();

        store.disconnect_next(StoreOp::DeleteTable);
        assert!(matches!(
            client.try_delete_table(&table()),
            Err(ClientError::ConnectionClosed)
        ));
        assert!(client.table_exists(&table()).unwrap());

        // The next call reopens the shared connection
        assert!(client.try_delete_table(&table()).unwrap());
        assert_eq!(store.connections_opened(), 2);
    }

    #[test]
    fn test_get_strings_decodes_strictly() {
        let store = MemoryStore::new();
        let client = client(&store);
        client.create_table(&table(), &["info"]).unwrap();
        client.modify_table(&table(), "info", 2).unwrap();

        client.put(&table(), "1000", "info", "name", "zs").unwrap();
        assert_eq!(
            client.get_strings(&table(), "1000", "info", "name").unwrap(),
            vec!["zs".to_string()]
        );

        let binary: &[u8] = &[0xff, 0xfe];
        client.put(&table(), "1000", "info", "name", binary).unwrap();
        let err = client
            .get_strings(&table(), "1000", "info", "name")
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn test_handles_released_on_every_path() {
        let store = MemoryStore::new();
        let client = client(&store);
        client.create_table(&table(), &["info"]).unwrap();

        store.fail_next(StoreOp::Get);
        assert!(client.get(&table(), "1000", "info", "name").is_err());
        assert!(client.put(&table(), "1000", "meta", "x", "y").is_err());
        assert!(client.put(&table(), "", "info", "x", "y").is_err());
        assert_eq!(store.open_handles(), 0);
    }

    #[test]
    fn test_connection_is_reopened_after_close() {
        let store = MemoryStore::new();
        let client = client(&store);

        let first = client.connection().unwrap();
        client.close().unwrap();
        assert!(first.is_closed());
        assert_eq!(client.state(), ConnectionState::Closed);

        client.create_table(&table(), &["info"]).unwrap();
        assert_eq!(client.state(), ConnectionState::Connected);
        assert_eq!(store.connections_opened(), 2);
        assert_eq!(store.live_connections(), 1);
    }

    #[test]
    fn test_per_call_mode() {
        let store = MemoryStore::new();
        let config = ClientConfig::new().connection_mode(ConnectionMode::PerCall);
        let client = Client::new(config, Arc::new(store.clone())).unwrap();

        client.create_table(&table(), &["info"]).unwrap();
        client.put(&table(), "1000", "info", "name", "zs").unwrap();

        assert_eq!(store.live_connections(), 0);
        // create_table: 1 round trip; put: existence check + write
        assert_eq!(store.connections_opened(), 3);
        let stats = client.stats();
        assert_eq!(stats.connections_opened, 3);
        assert_eq!(stats.connections_closed, 3);
    }

    #[test]
    fn test_unreachable_cluster() {
        let store = MemoryStore::new();
        store.set_online(false);
        let client = client(&store);

        let err = client.table_exists(&table()).unwrap_err();
        assert!(matches!(err, ClientError::ConnectionFailed(_)));
        assert_eq!(client.state(), ConnectionState::Failed);

        store.set_online(true);
        assert!(!client.table_exists(&table()).unwrap());
    }

    #[test]
    fn test_stats() {
        let store = MemoryStore::new();
        let client = client(&store);
        client.create_table(&table(), &["info"]).unwrap();
        store.fail_next(StoreOp::TableExists);
        assert!(client.table_exists(&table()).is_err());

        let stats = client.stats();
        assert_eq!(stats.operations, 2);
        assert_eq!(stats.failed_operations, 1);
        assert_eq!(stats.connections_opened, 1);
    }
}
