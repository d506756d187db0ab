//! Cell version timestamps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A cell version timestamp (milliseconds since Unix epoch).
///
/// Newer versions of a cell carry larger timestamps and are returned first.
///
/// # Example
///
/// ```rust
/// use hbkit_common::types::Timestamp;
///
/// let ts = Timestamp::now();
/// assert!(ts.as_millis() > 0);
/// assert!(ts < Timestamp::LATEST);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Zero timestamp (epoch).
    pub const ZERO: Self = Self(0);

    /// Placeholder meaning "assign the current time on the server".
    pub const LATEST: Self = Self(u64::MAX);

    /// Creates a timestamp from milliseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Creates a timestamp from the current system time.
    #[must_use]
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Self(duration.as_millis() as u64)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Returns true if this is the `LATEST` placeholder.
    #[inline]
    #[must_use]
    pub const fn is_latest(self) -> bool {
        self.0 == u64::MAX
    }

    /// Returns the next timestamp.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_latest() {
            return write!(f, "Timestamp(LATEST)");
        }
        write!(f, "Timestamp({}ms)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 > 0 && self.0 < i64::MAX as u64 {
            if let Some(dt) = chrono::DateTime::from_timestamp_millis(self.0 as i64) {
                return write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ"));
            }
        }
        write!(f, "{}ms", self.0)
    }
}

impl From<u64> for Timestamp {
    #[inline]
    fn from(millis: u64) -> Self {
        Self::from_millis(millis)
    }
}
