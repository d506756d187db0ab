//! Connection provisioning.
//!
//! A [`ConnectionProvider`] hands out connections according to the
//! configured [`ConnectionMode`]:
//!
//! - `Shared`: one connection, opened on first use and reopened if it was
//!   closed. Opening and closing take the slot for writing. A lease holds it
//!   for reading until dropped, so `close()` waits for operations in flight
//!   and at most one shared connection is live.
//! - `PerCall`: a fresh connection per lease, closed when the lease drops.

use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::backend::{StoreConnection, StoreConnector};
use crate::config::{ClientConfig, ConnectionMode};
use crate::error::{ClientError, ClientResult, ConnectionState};

/// The shared connection slot.
struct Slot {
    connection: Option<Arc<dyn StoreConnection>>,
    state: ConnectionState,
    connected_at: Option<Instant>,
}

impl Slot {
    fn live(&self) -> Option<Arc<dyn StoreConnection>> {
        self.connection.as_ref().filter(|c| !c.is_closed()).cloned()
    }
}

/// Hands out connections to the facade.
pub struct ConnectionProvider {
    config: ClientConfig,
    connector: Arc<dyn StoreConnector>,
    slot: RwLock<Slot>,
    opened: AtomicU64,
    closed: AtomicU64,
}

impl ConnectionProvider {
    /// Creates a provider. No connection is opened until first use.
    pub fn new(config: ClientConfig, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            config,
            connector,
            slot: RwLock::new(Slot {
                connection: None,
                state: ConnectionState::Disconnected,
                connected_at: None,
            }),
            opened: AtomicU64::new(0),
            closed: AtomicU64::new(0),
        }
    }

    /// Returns the provisioning mode.
    pub fn mode(&self) -> ConnectionMode {
        self.config.connection_mode
    }

    /// Returns the configuration connections are opened with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Acquires a connection for one operation.
    ///
    /// A shared lease keeps the connection from being closed until it drops.
    /// Do not call [`close`](Self::close) while holding one on the same thread.
    pub fn acquire(&self) -> ClientResult<ConnectionLease<'_>> {
        match self.config.connection_mode {
            ConnectionMode::Shared => {
                let (slot, connection) = self.shared()?;
                Ok(ConnectionLease {
                    connection,
                    close_on_drop: false,
                    _slot: Some(slot),
                })
            }
            ConnectionMode::PerCall => Ok(ConnectionLease {
                connection: self.open()?,
                close_on_drop: true,
                _slot: None,
            }),
        }
    }

    /// Returns the live shared connection, opening one if none is live.
    ///
    /// In `PerCall` mode this opens a connection owned by the caller.
    pub fn connection(&self) -> ClientResult<Arc<dyn StoreConnection>> {
        match self.config.connection_mode {
            ConnectionMode::Shared => self.shared().map(|(_, connection)| connection),
            ConnectionMode::PerCall => self.open(),
        }
    }

    /// Returns the live shared connection together with the slot held for
    /// reading.
    fn shared(&self) -> ClientResult<(RwLockReadGuard<'_, Slot>, Arc<dyn StoreConnection>)> {
        let slot = self.slot.read();
        let live = slot.live();
        if let Some(connection) = live {
            tracing::debug!("Reusing shared connection to {}", self.config.quorum_string());
            return Ok((slot, connection));
        }
        drop(slot);

        let mut slot = self.slot.write();
        // Another caller may have reopened it while the slot was released
        let connection = match slot.live() {
            Some(connection) => connection,
            None => {
                if slot.connection.take().is_some() {
                    tracing::info!("Shared connection was closed, reopening");
                }
                match self.open() {
                    Ok(connection) => {
                        slot.connection = Some(Arc::clone(&connection));
                        slot.state = ConnectionState::Connected;
                        slot.connected_at = Some(Instant::now());
                        connection
                    }
                    Err(e) => {
                        slot.state = ConnectionState::Failed;
                        slot.connected_at = None;
                        return Err(e);
                    }
                }
            }
        };
        Ok((RwLockWriteGuard::downgrade(slot), connection))
    }

    fn open(&self) -> ClientResult<Arc<dyn StoreConnection>> {
        let quorum = self.config.quorum_string();
        match self.connector.connect(&self.config) {
            Ok(connection) => {
                self.opened.fetch_add(1, Ordering::Relaxed);
                tracing::info!("Opened connection to {}", quorum);
                Ok(connection)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to {}: {}", quorum, e);
                Err(ClientError::ConnectionFailed(format!("{quorum}: {e}")))
            }
        }
    }

    /// Closes the shared connection if one is open. Closing again is a no-op.
    ///
    /// Blocks until every shared lease has been dropped.
    pub fn close(&self) -> ClientResult<()> {
        let mut slot = self.slot.write();
        let Some(connection) = slot.connection.take() else {
            return Ok(());
        };
        slot.state = ConnectionState::Closed;
        slot.connected_at = None;

        if connection.is_closed() {
            return Ok(());
        }
        connection
            .close()
            .map_err(|e| ClientError::store("close_connection", e))?;
        self.closed.fetch_add(1, Ordering::Relaxed);
        tracing::info!("Closed connection to {}", self.config.quorum_string());
        Ok(())
    }

    /// Returns the state of the shared connection.
    pub fn state(&self) -> ConnectionState {
        let slot = self.slot.read();
        match (&slot.connection, slot.state) {
            (Some(connection), ConnectionState::Connected) if connection.is_closed() => {
                ConnectionState::Closed
            }
            (_, state) => state,
        }
    }

    /// Returns how long the shared connection has been open.
    pub fn connection_age(&self) -> Option<std::time::Duration> {
        self.slot.read().connected_at.map(|t| t.elapsed())
    }

    /// Returns how many connections this provider opened.
    pub fn connections_opened(&self) -> u64 {
        self.opened.load(Ordering::Relaxed)
    }

    /// Returns how many connections this provider closed.
    pub fn connections_closed(&self) -> u64 {
        self.closed.load(Ordering::Relaxed)
    }

    fn release(&self, connection: &Arc<dyn StoreConnection>) {
        if connection.is_closed() {
            return;
        }
        match connection.close() {
            Ok(()) => {
                self.closed.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => tracing::warn!("Failed to close per-call connection: {}", e),
        }
    }
}

impl Drop for ConnectionProvider {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Failed to close shared connection on drop: {}", e);
        }
    }
}

impl std::fmt::Debug for ConnectionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProvider")
            .field("quorum", &self.config.quorum_string())
            .field("mode", &self.config.connection_mode)
            .field("state", &self.state())
            .finish()
    }
}

/// A connection borrowed for one operation.
///
/// Per-call connections are closed when the lease drops; shared ones stay
/// open, and cannot be closed while the lease lives.
pub struct ConnectionLease<'a> {
    connection: Arc<dyn StoreConnection>,
    close_on_drop: bool,
    _slot: Option<RwLockReadGuard<'a, Slot>>,
}

impl ConnectionLease<'_> {
    /// Closes a per-call connection now, through the provider's accounting.
    pub(crate) fn finish(mut self, provider: &ConnectionProvider) {
        if self.close_on_drop {
            provider.release(&self.connection);
            self.close_on_drop = false;
        }
    }
}

impl Deref for ConnectionLease<'_> {
    type Target = dyn StoreConnection;

    fn deref(&self) -> &Self::Target {
        self.connection.as_ref()
    }
}

impl Drop for ConnectionLease<'_> {
    fn drop(&mut self) {
        if self.close_on_drop && !self.connection.is_closed() {
            if let Err(e) = self.connection.close() {
                tracing::warn!("Failed to close per-call connection: {}", e);
            }
        }
    }
}
