//! In-process wide-column store.
//!
//! [`MemoryStore`] implements the backend traits entirely in memory. It
//! follows the store rules the facade relies on (namespaces before tables,
//! disable before drop, schema-checked families, bounded cell versions) and
//! adds hooks for tests: an offline switch, one-shot fault injection per
//! operation (an I/O error or a dropped connection), and counters for calls,
//! connections and open handles.

mod region;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use hbkit_common::{NamespaceName, StoreError, StoreResult, TableName, Timestamp};

use crate::backend::{Admin, StoreConnection, StoreConnector, Table};
use crate::config::ClientConfig;
use crate::descriptor::TableDescriptor;
use crate::operation::{Delete, Get, Put, RowResult, Scan};

use region::Region;

/// A store operation, used for fault injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// Opening a connection.
    Connect,
    /// Namespace existence check.
    NamespaceExists,
    /// Namespace creation.
    CreateNamespace,
    /// Table listing.
    ListTables,
    /// Table existence check.
    TableExists,
    /// Table enabled check.
    IsTableEnabled,
    /// Table creation.
    CreateTable,
    /// Descriptor fetch.
    Descriptor,
    /// Descriptor replacement.
    ModifyTable,
    /// Table disable.
    DisableTable,
    /// Table enable.
    EnableTable,
    /// Table drop.
    DeleteTable,
    /// Cell write.
    Put,
    /// Row read.
    Get,
    /// Cell or row delete.
    Delete,
    /// Range read.
    Scan,
}

/// How an injected fault fails a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    Io,
    Disconnect,
}

/// Namespaces and tables of the cluster.
#[derive(Debug)]
struct ClusterState {
    namespaces: BTreeSet<NamespaceName>,
    tables: BTreeMap<TableName, Region>,
}

impl ClusterState {
    fn region(&self, table: &TableName) -> StoreResult<&Region> {
        self.tables.get(table).ok_or_else(|| StoreError::TableNotFound {
            table: table.to_string(),
        })
    }

    fn region_mut(&mut self, table: &TableName) -> StoreResult<&mut Region> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound {
                table: table.to_string(),
            })
    }

    fn enabled_region(&self, table: &TableName) -> StoreResult<&Region> {
        let region = self.region(table)?;
        if !region.enabled {
            return Err(StoreError::TableNotEnabled {
                table: table.to_string(),
            });
        }
        Ok(region)
    }

    fn enabled_region_mut(&mut self, table: &TableName) -> StoreResult<&mut Region> {
        let region = self.region_mut(table)?;
        if !region.enabled {
            return Err(StoreError::TableNotEnabled {
                table: table.to_string(),
            });
        }
        Ok(region)
    }
}

/// Shared state behind a [`MemoryStore`] and every connection it opened.
struct StoreInner {
    state: RwLock<ClusterState>,
    online: AtomicBool,
    faults: Mutex<HashMap<StoreOp, Fault>>,
    calls: Mutex<HashMap<StoreOp, u64>>,
    clock: Mutex<Timestamp>,
    connections_opened: AtomicU64,
    live_connections: AtomicUsize,
    open_handles: AtomicUsize,
}

impl StoreInner {
    /// Records a call to `op` and fails it if the cluster is offline or a
    /// fault was armed for it.
    fn enter(&self, op: StoreOp) -> StoreResult<()> {
        *self.calls.lock().entry(op).or_insert(0) += 1;
        if !self.online.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("cluster is offline"));
        }
        match self.faults.lock().remove(&op) {
            Some(Fault::Io) => Err(StoreError::io(format!("injected failure in {op:?}"))),
            Some(Fault::Disconnect) => Err(StoreError::ConnectionClosed),
            None => Ok(()),
        }
    }

    /// Returns a strictly increasing timestamp close to wall-clock time.
    fn tick(&self) -> Timestamp {
        let mut last = self.clock.lock();
        let next = Timestamp::now().max(last.next());
        *last = next;
        next
    }
}

/// An in-process wide-column store.
///
/// Cloning a `MemoryStore` shares the same cluster.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use hbkit_client::{Client, ClientConfig, MemoryStore};
/// use hbkit_common::TableName;
///
/// let store = MemoryStore::new();
/// let client = Client::new(ClientConfig::default(), Arc::new(store.clone())).unwrap();
///
/// let table = TableName::new("test", "users").unwrap();
/// client.create_table(&table, &["info"]).unwrap();
/// assert!(store.contains_table(&table));
/// ```
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates a store holding only the `default` and `hbase` namespaces.
    pub fn new() -> Self {
        let namespaces = [
            NamespaceName::default_namespace(),
            NamespaceName::system_namespace(),
        ]
        .into_iter()
        .collect();

        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(ClusterState {
                    namespaces,
                    tables: BTreeMap::new(),
                }),
                online: AtomicBool::new(true),
                faults: Mutex::new(HashMap::new()),
                calls: Mutex::new(HashMap::new()),
                clock: Mutex::new(Timestamp::ZERO),
                connections_opened: AtomicU64::new(0),
                live_connections: AtomicUsize::new(0),
                open_handles: AtomicUsize::new(0),
            }),
        }
    }

    /// Takes the cluster offline or brings it back. While offline, new
    /// connections and every handle call fail with `Unavailable`.
    pub fn set_online(&self, online: bool) {
        self.inner.online.store(online, Ordering::SeqCst);
    }

    /// Makes the next call of `op` fail with an I/O error.
    pub fn fail_next(&self, op: StoreOp) {
        self.inner.faults.lock().insert(op, Fault::Io);
    }

    /// Makes the next call of `op` fail as if the server dropped the
    /// connection. The connection the call went through is closed.
    pub fn disconnect_next(&self, op: StoreOp) {
        self.inner.faults.lock().insert(op, Fault::Disconnect);
    }

    /// Returns how many times `op` was attempted.
    pub fn call_count(&self, op: StoreOp) -> u64 {
        self.inner.calls.lock().get(&op).copied().unwrap_or(0)
    }

    /// Returns the total number of store calls attempted.
    pub fn total_calls(&self) -> u64 {
        self.inner.calls.lock().values().sum()
    }

    /// Returns how many connections were ever opened.
    pub fn connections_opened(&self) -> u64 {
        self.inner.connections_opened.load(Ordering::SeqCst)
    }

    /// Returns how many connections are open right now.
    pub fn live_connections(&self) -> usize {
        self.inner.live_connections.load(Ordering::SeqCst)
    }

    /// Returns how many admin/table handles are open right now.
    pub fn open_handles(&self) -> usize {
        self.inner.open_handles.load(Ordering::SeqCst)
    }

    /// Returns true if the table exists, without going through a connection.
    pub fn contains_table(&self, table: &TableName) -> bool {
        self.inner.state.read().tables.contains_key(table)
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("MemoryStore")
            .field("namespaces", &state.namespaces.len())
            .field("tables", &state.tables.len())
            .field("live_connections", &self.live_connections())
            .finish()
    }
}

impl StoreConnector for MemoryStore {
    fn connect(&self, _config: &ClientConfig) -> StoreResult<Arc<dyn StoreConnection>> {
        self.inner.enter(StoreOp::Connect)?;
        let id = self.inner.connections_opened.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.live_connections.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MemoryConnection {
            id,
            store: Arc::clone(&self.inner),
            closed: Arc::new(AtomicBool::new(false)),
        }))
    }
}

/// A connection to a [`MemoryStore`].
struct MemoryConnection {
    id: u64,
    store: Arc<StoreInner>,
    closed: Arc<AtomicBool>,
}

impl MemoryConnection {
    fn lease(&self) -> StoreResult<HandleLease> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectionClosed);
        }
        self.store.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(HandleLease {
            store: Arc::clone(&self.store),
            closed: Arc::clone(&self.closed),
        })
    }

    fn release(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.store.live_connections.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl StoreConnection for MemoryConnection {
    fn admin(&self) -> StoreResult<Box<dyn Admin>> {
        Ok(Box::new(MemoryAdmin {
            lease: self.lease()?,
        }))
    }

    fn table(&self, name: &TableName) -> StoreResult<Box<dyn Table>> {
        Ok(Box::new(MemoryTable {
            name: name.clone(),
            lease: self.lease()?,
        }))
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn close(&self) -> StoreResult<()> {
        self.release();
        Ok(())
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for MemoryConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryConnection")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Counts an open handle for as long as it lives.
struct HandleLease {
    store: Arc<StoreInner>,
    closed: Arc<AtomicBool>,
}

impl HandleLease {
    fn enter(&self, op: StoreOp) -> StoreResult<&StoreInner> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectionClosed);
        }
        if let Err(e) = self.store.enter(op) {
            let dropped = matches!(e, StoreError::ConnectionClosed);
            if dropped && !self.closed.swap(true, Ordering::SeqCst) {
                self.store.live_connections.fetch_sub(1, Ordering::SeqCst);
            }
            return Err(e);
        }
        Ok(self.store.as_ref())
    }
}

impl Drop for HandleLease {
    fn drop(&mut self) {
        self.store.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

struct MemoryAdmin {
    lease: HandleLease,
}

impl Admin for MemoryAdmin {
    fn namespace_exists(&self, namespace: &NamespaceName) -> StoreResult<bool> {
        let store = self.lease.enter(StoreOp::NamespaceExists)?;
        Ok(store.state.read().namespaces.contains(namespace))
    }

    fn create_namespace(&mut self, namespace: &NamespaceName) -> StoreResult<()> {
        let store = self.lease.enter(StoreOp::CreateNamespace)?;
        if !store.state.write().namespaces.insert(namespace.clone()) {
            return Err(StoreError::NamespaceExists {
                namespace: namespace.to_string(),
            });
        }
        Ok(())
    }

    fn list_tables(&self, namespace: &NamespaceName) -> StoreResult<Vec<TableName>> {
        let store = self.lease.enter(StoreOp::ListTables)?;
        let state = store.state.read();
        if !state.namespaces.contains(namespace) {
            return Err(StoreError::NamespaceNotFound {
                namespace: namespace.to_string(),
            });
        }
        Ok(state
            .tables
            .keys()
            .filter(|t| t.namespace() == namespace)
            .cloned()
            .collect())
    }

    fn table_exists(&self, table: &TableName) -> StoreResult<bool> {
        let store = self.lease.enter(StoreOp::TableExists)?;
        Ok(store.state.read().tables.contains_key(table))
    }

    fn is_table_enabled(&self, table: &TableName) -> StoreResult<bool> {
        let store = self.lease.enter(StoreOp::IsTableEnabled)?;
        Ok(store.state.read().region(table)?.enabled)
    }

    fn create_table(&mut self, descriptor: &TableDescriptor) -> StoreResult<()> {
        let store = self.lease.enter(StoreOp::CreateTable)?;
        descriptor.validate().map_err(StoreError::invalid_argument)?;

        let mut state = store.state.write();
        let name = descriptor.name();
        if !state.namespaces.contains(name.namespace()) {
            return Err(StoreError::NamespaceNotFound {
                namespace: name.namespace().to_string(),
            });
        }
        if state.tables.contains_key(name) {
            return Err(StoreError::TableExists {
                table: name.to_string(),
            });
        }
        state
            .tables
            .insert(name.clone(), Region::new(descriptor.clone()));
        Ok(())
    }

    fn descriptor(&self, table: &TableName) -> StoreResult<TableDescriptor> {
        let store = self.lease.enter(StoreOp::Descriptor)?;
        Ok(store.state.read().region(table)?.descriptor.clone())
    }

    fn modify_table(&mut self, descriptor: &TableDescriptor) -> StoreResult<()> {
        let store = self.lease.enter(StoreOp::ModifyTable)?;
        descriptor.validate().map_err(StoreError::invalid_argument)?;
        store
            .state
            .write()
            .region_mut(descriptor.name())?
            .set_descriptor(descriptor.clone());
        Ok(())
    }

    fn disable_table(&mut self, table: &TableName) -> StoreResult<()> {
        let store = self.lease.enter(StoreOp::DisableTable)?;
        let mut state = store.state.write();
        let region = state.region_mut(table)?;
        if !region.enabled {
            return Err(StoreError::TableNotEnabled {
                table: table.to_string(),
            });
        }
        region.enabled = false;
        Ok(())
    }

    fn enable_table(&mut self, table: &TableName) -> StoreResult<()> {
        let store = self.lease.enter(StoreOp::EnableTable)?;
        let mut state = store.state.write();
        let region = state.region_mut(table)?;
        if region.enabled {
            return Err(StoreError::TableNotDisabled {
                table: table.to_string(),
            });
        }
        region.enabled = true;
        Ok(())
    }

    fn delete_table(&mut self, table: &TableName) -> StoreResult<()> {
        let store = self.lease.enter(StoreOp::DeleteTable)?;
        let mut state = store.state.write();
        if state.region(table)?.enabled {
            return Err(StoreError::TableNotDisabled {
                table: table.to_string(),
            });
        }
        state.tables.remove(table);
        Ok(())
    }
}

struct MemoryTable {
    name: TableName,
    lease: HandleLease,
}

impl Table for MemoryTable {
    fn name(&self) -> &TableName {
        &self.name
    }

    fn put(&mut self, put: &Put) -> StoreResult<()> {
        let store = self.lease.enter(StoreOp::Put)?;
        let timestamp = if put.timestamp.is_latest() {
            store.tick()
        } else {
            put.timestamp
        };
        store
            .state
            .write()
            .enabled_region_mut(&self.name)?
            .put(put, timestamp)
    }

    fn get(&self, get: &Get) -> StoreResult<RowResult> {
        let store = self.lease.enter(StoreOp::Get)?;
        store.state.read().enabled_region(&self.name)?.get(get)
    }

    fn delete(&mut self, delete: &Delete) -> StoreResult<()> {
        let store = self.lease.enter(StoreOp::Delete)?;
        store
            .state
            .write()
            .enabled_region_mut(&self.name)?
            .delete(delete)
    }

    fn scan(&self, scan: &Scan) -> StoreResult<Vec<RowResult>> {
        let store = self.lease.enter(StoreOp::Scan)?;
        store.state.read().enabled_region(&self.name)?.scan(scan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ColumnFamilyDescriptor;
    use hbkit_common::FamilyName;

    fn table() -> TableName {
        TableName::new("test", "testTable").unwrap()
    }

    fn descriptor() -> TableDescriptor {
        TableDescriptor::new(table())
            .column_family(ColumnFamilyDescriptor::new(FamilyName::new("info").unwrap()))
    }

    fn connect(store: &MemoryStore) -> Arc<dyn StoreConnection> {
        store.connect(&ClientConfig::default()).unwrap()
    }

    #[test]
    fn test_builtin_namespaces() {
        let store = MemoryStore::new();
        let conn = connect(&store);
        let admin = conn.admin().unwrap();
        assert!(admin
            .namespace_exists(&NamespaceName::default_namespace())
            .unwrap());
        assert!(admin
            .namespace_exists(&NamespaceName::system_namespace())
            .unwrap());
        assert!(!admin
            .namespace_exists(&NamespaceName::new("test").unwrap())
            .unwrap());
    }

    #[test]
    fn test_create_table_requires_namespace() {
        let store = MemoryStore::new();
        let conn = connect(&store);
        let mut admin = conn.admin().unwrap();

        let err = admin.create_table(&descriptor()).unwrap_err();
        assert!(matches!(err, StoreError::NamespaceNotFound { .. }));

        admin.create_namespace(table().namespace()).unwrap();
        admin.create_table(&descriptor()).unwrap();
        assert!(matches!(
            admin.create_table(&descriptor()),
            Err(StoreError::TableExists { .. })
        ));
        assert!(matches!(
            admin.create_namespace(table().namespace()),
            Err(StoreError::NamespaceExists { .. })
        ));
    }

    #[test]
    fn test_delete_requires_disable() {
        let store = MemoryStore::new();
        let conn = connect(&store);
        let mut admin = conn.admin().unwrap();
        admin.create_namespace(table().namespace()).unwrap();
        admin.create_table(&descriptor()).unwrap();

        assert!(matches!(
            admin.delete_table(&table()),
            Err(StoreError::TableNotDisabled { .. })
        ));
        admin.disable_table(&table()).unwrap();
        assert!(!admin.is_table_enabled(&table()).unwrap());
        assert!(matches!(
            admin.disable_table(&table()),
            Err(StoreError::TableNotEnabled { .. })
        ));
        admin.delete_table(&table()).unwrap();
        assert!(!admin.table_exists(&table()).unwrap());
    }

    #[test]
    fn test_disabled_table_rejects_data_ops() {
        let store = MemoryStore::new();
        let conn = connect(&store);
        let mut admin = conn.admin().unwrap();
        admin.create_namespace(table().namespace()).unwrap();
        admin.create_table(&descriptor()).unwrap();
        admin.disable_table(&table()).unwrap();

        let handle = conn.table(&table()).unwrap();
        assert!(matches!(
            handle.get(&Get::new("r1")),
            Err(StoreError::TableNotEnabled { .. })
        ));

        admin.enable_table(&table()).unwrap();
        assert!(handle.get(&Get::new("r1")).unwrap().is_empty());
    }

    #[test]
    fn test_handles_are_counted_and_released() {
        let store = MemoryStore::new();
        let conn = connect(&store);
        {
            let _admin = conn.admin().unwrap();
            let _table = conn.table(&table()).unwrap();
            assert_eq!(store.open_handles(), 2);
        }
        assert_eq!(store.open_handles(), 0);
    }

    #[test]
    fn test_closed_connection_rejects_handles() {
        let store = MemoryStore::new();
        let conn = connect(&store);
        let admin = conn.admin().unwrap();
        assert_eq!(store.live_connections(), 1);

        conn.close().unwrap();
        conn.close().unwrap();
        assert!(conn.is_closed());
        assert_eq!(store.live_connections(), 0);
        assert!(matches!(conn.admin(), Err(StoreError::ConnectionClosed)));
        assert!(matches!(
            admin.table_exists(&table()),
            Err(StoreError::ConnectionClosed)
        ));
    }

    #[test]
    fn test_offline_and_fault_injection() {
        let store = MemoryStore::new();
        store.set_online(false);
        assert!(matches!(
            store.connect(&ClientConfig::default()),
            Err(StoreError::Unavailable { .. })
        ));
        store.set_online(true);

        let conn = connect(&store);
        let admin = conn.admin().unwrap();
        store.fail_next(StoreOp::TableExists);
        assert!(matches!(
            admin.table_exists(&table()),
            Err(StoreError::Io { .. })
        ));
        assert!(!admin.table_exists(&table()).unwrap());
        assert_eq!(store.call_count(StoreOp::TableExists), 2);
        assert_eq!(store.call_count(StoreOp::Connect), 2);
    }

    #[test]
    fn test_injected_disconnect_closes_connection() {
        let store = MemoryStore::new();
        let conn = connect(&store);
        let admin = conn.admin().unwrap();

        store.disconnect_next(StoreOp::TableExists);
        assert!(matches!(
            admin.table_exists(&table()),
            Err(StoreError::ConnectionClosed)
        ));
        assert!(conn.is_closed());
        assert_eq!(store.live_connections(), 0);

        // Closing afterwards does not release it twice
        conn.close().unwrap();
        assert_eq!(store.live_connections(), 0);
        assert!(matches!(conn.admin(), Err(StoreError::ConnectionClosed)));
    }

    #[test]
    fn test_server_timestamps_increase() {
        let store = MemoryStore::new();
        let a = store.inner.tick();
        let b = store.inner.tick();
        let c = store.inner.tick();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_dropping_connection_releases_it() {
        let store = MemoryStore::new();
        let conn = connect(&store);
        assert_eq!(store.live_connections(), 1);
        drop(conn);
        assert_eq!(store.live_connections(), 0);
        assert_eq!(store.connections_opened(), 1);
    }
}
