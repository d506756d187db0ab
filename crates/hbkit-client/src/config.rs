//! Client configuration.
//!
//! Loads and saves client configuration from TOML files.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use hbkit_common::{DEFAULT_CLIENT_PORT, DEFAULT_ZNODE_PARENT};

use crate::error::{ClientError, ClientResult};

/// How the facade provisions connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionMode {
    /// One connection, created lazily and reused by every operation.
    #[default]
    Shared,
    /// A fresh connection per operation, closed when the operation ends.
    PerCall,
}

/// Client configuration.
///
/// # Example
///
/// ```rust
/// use hbkit_client::{ClientConfig, ConnectionMode};
///
/// let config = ClientConfig::new()
///     .quorum(["zk1", "zk2"])
///     .connection_mode(ConnectionMode::PerCall);
/// assert_eq!(config.quorum_string(), "zk1:2181,zk2:2181");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Coordinator hosts of the cluster.
    #[serde(default = "default_quorum")]
    pub quorum: Vec<String>,

    /// Coordinator client port.
    #[serde(default = "default_client_port")]
    pub client_port: u16,

    /// Root node of the cluster in the coordinator.
    #[serde(default = "default_znode_parent")]
    pub znode_parent: String,

    /// Connection provisioning strategy.
    #[serde(default)]
    pub connection_mode: ConnectionMode,

    /// Per-operation timeout handed to the backend.
    #[serde(default = "default_operation_timeout", with = "humantime_serde")]
    pub operation_timeout: Duration,

    /// Connect timeout handed to the backend.
    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,
}

fn default_quorum() -> Vec<String> {
    vec!["localhost".to_string()]
}

fn default_client_port() -> u16 {
    DEFAULT_CLIENT_PORT
}

fn default_znode_parent() -> String {
    DEFAULT_ZNODE_PARENT.to_string()
}

fn default_operation_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            quorum: default_quorum(),
            client_port: default_client_port(),
            znode_parent: default_znode_parent(),
            connection_mode: ConnectionMode::default(),
            operation_timeout: default_operation_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl ClientConfig {
    /// Creates a new client configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the coordinator hosts.
    pub fn quorum<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.quorum = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the coordinator client port.
    pub fn client_port(mut self, port: u16) -> Self {
        self.client_port = port;
        self
    }

    /// Sets the root node of the cluster.
    pub fn znode_parent(mut self, parent: impl Into<String>) -> Self {
        self.znode_parent = parent.into();
        self
    }

    /// Sets the connection provisioning strategy.
    pub fn connection_mode(mut self, mode: ConnectionMode) -> Self {
        self.connection_mode = mode;
        self
    }

    /// Sets the operation timeout.
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Returns the coordinator connection string, `host:port` per quorum member.
    ///
    /// Hosts that already carry a port keep it.
    pub fn quorum_string(&self) -> String {
        self.quorum
            .iter()
            .map(|host| {
                if host.contains(':') {
                    host.clone()
                } else {
                    format!("{}:{}", host, self.client_port)
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        if self.quorum.is_empty() {
            return Err(ClientError::InvalidConfig(
                "quorum must name at least one host".to_string(),
            ));
        }
        if self.quorum.iter().any(|host| host.trim().is_empty()) {
            return Err(ClientError::InvalidConfig(
                "quorum hosts must not be blank".to_string(),
            ));
        }
        if self.client_port == 0 {
            return Err(ClientError::InvalidConfig(
                "client_port must be greater than 0".to_string(),
            ));
        }
        if !self.znode_parent.starts_with('/') {
            return Err(ClientError::InvalidConfig(
                "znode_parent must be an absolute path".to_string(),
            ));
        }
        if self.operation_timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(ClientError::InvalidConfig(
                "timeouts must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> ClientResult<Self> {
        toml::from_str(content).map_err(|e| ClientError::InvalidConfig(e.to_string()))
    }

    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Converts configuration to a TOML string.
    pub fn to_toml(&self) -> ClientResult<String> {
        toml::to_string_pretty(self).map_err(|e| ClientError::InvalidConfig(e.to_string()))
    }
}

/// Serde helper for Duration using humantime format.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
