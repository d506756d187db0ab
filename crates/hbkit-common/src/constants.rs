//! Store-wide constants.

// =============================================================================
// Namespaces
// =============================================================================

/// Namespace used for tables created without an explicit namespace.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Namespace reserved for the store's own catalog tables.
pub const SYSTEM_NAMESPACE: &str = "hbase";

/// Separator between namespace and table qualifier in a rendered table name.
pub const NAMESPACE_DELIMITER: char = ':';

// =============================================================================
// Column Family Defaults
// =============================================================================

/// Number of versions a new column family retains.
pub const DEFAULT_MAX_VERSIONS: u32 = 1;

/// Minimum number of versions a new column family retains.
pub const DEFAULT_MIN_VERSIONS: u32 = 0;

// =============================================================================
// Size Limits
// =============================================================================

/// Maximum row key size in bytes (32 KB, `Short.MAX_VALUE` in the store).
pub const MAX_ROW_KEY_SIZE: usize = 32 * 1024 - 1;

/// Maximum size of a namespace or table qualifier in bytes.
pub const MAX_NAME_SIZE: usize = 255;

// =============================================================================
// Connection Defaults
// =============================================================================

/// Default coordinator client port.
pub const DEFAULT_CLIENT_PORT: u16 = 2181;

/// Default root node of the cluster in the coordinator.
pub const DEFAULT_ZNODE_PARENT: &str = "/hbase";
