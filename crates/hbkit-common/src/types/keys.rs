//! Byte-backed row keys, qualifiers and cell values.
//!
//! The store treats all three as opaque byte sequences. Text is UTF-8 encoded
//! on the way in and is only decoded on request, never lossily.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;

/// Implements constructors, conversions and comparisons shared by every
/// byte-backed type in this module.
macro_rules! byte_type {
    ($name:ident) => {
        impl $name {
            /// Creates an empty instance.
            #[inline]
            #[must_use]
            pub const fn empty() -> Self {
                Self(Bytes::new())
            }

            /// Creates an instance from a byte slice.
            #[inline]
            #[must_use]
            pub fn from_bytes(bytes: &[u8]) -> Self {
                Self(Bytes::copy_from_slice(bytes))
            }

            /// Creates an instance from owned bytes.
            #[inline]
            #[must_use]
            pub fn from_vec(vec: Vec<u8>) -> Self {
                Self(Bytes::from(vec))
            }

            /// Creates an instance from a `Bytes` buffer without copying.
            #[inline]
            #[must_use]
            pub const fn from_raw(bytes: Bytes) -> Self {
                Self(bytes)
            }

            /// Returns the length in bytes.
            #[inline]
            #[must_use]
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Returns true if there are no bytes.
            #[inline]
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Returns the contents as a byte slice.
            #[inline]
            #[must_use]
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Returns the underlying `Bytes`.
            #[inline]
            #[must_use]
            pub fn into_bytes(self) -> Bytes {
                self.0
            }

            /// Returns the contents as UTF-8 text, if they are valid UTF-8.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> Option<&str> {
                std::str::from_utf8(&self.0).ok()
            }
        }

        impl Deref for $name {
            type Target = [u8];

            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl AsRef<[u8]> for $name {
            #[inline]
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<&[u8]> for $name {
            #[inline]
            fn from(bytes: &[u8]) -> Self {
                Self::from_bytes(bytes)
            }
        }

        impl<const N: usize> From<&[u8; N]> for $name {
            #[inline]
            fn from(bytes: &[u8; N]) -> Self {
                Self::from_bytes(bytes)
            }
        }

        impl From<Vec<u8>> for $name {
            #[inline]
            fn from(vec: Vec<u8>) -> Self {
                Self::from_vec(vec)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(s: &str) -> Self {
                Self::from_bytes(s.as_bytes())
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(s: String) -> Self {
                Self::from_vec(s.into_bytes())
            }
        }

        impl From<&String> for $name {
            #[inline]
            fn from(s: &String) -> Self {
                Self::from_bytes(s.as_bytes())
            }
        }

        impl From<Bytes> for $name {
            #[inline]
            fn from(bytes: Bytes) -> Self {
                Self::from_raw(bytes)
            }
        }

        impl From<&$name> for $name {
            #[inline]
            fn from(other: &$name) -> Self {
                other.clone()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match std::str::from_utf8(&self.0) {
                    Ok(s) => write!(f, "{s}"),
                    Err(_) => write_hex(f, &self.0),
                }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match std::str::from_utf8(&self.0) {
                    Ok(s) if s.chars().all(|c| !c.is_control()) => {
                        write!(f, "{}({:?})", stringify!($name), s)
                    }
                    _ => {
                        write!(f, "{}(0x", stringify!($name))?;
                        write_hex(f, &self.0)?;
                        write!(f, ")")
                    }
                }
            }
        }
    };
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for byte in &bytes[..bytes.len().min(32)] {
        write!(f, "{byte:02x}")?;
    }
    if bytes.len() > 32 {
        write!(f, "...")?;
    }
    Ok(())
}

/// A row key.
///
/// Rows are ordered lexicographically by unsigned bytes, which determines
/// scan order.
///
/// # Example
///
/// ```rust
/// use hbkit_common::types::RowKey;
///
/// let key = RowKey::from("1000");
/// assert!(key < RowKey::from("10000"));
/// assert!(RowKey::from("10000") < RowKey::from("2000"));
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct RowKey(Bytes);

byte_type!(RowKey);

impl RowKey {
    /// Returns the smallest key that sorts after this key and all of its
    /// extensions.
    ///
    /// Used to turn a prefix into an exclusive stop row.
    #[must_use]
    pub fn successor(&self) -> Self {
        let mut bytes = self.0.to_vec();

        // Find the rightmost byte that is not 0xFF
        for i in (0..bytes.len()).rev() {
            if bytes[i] < 0xFF {
                bytes[i] += 1;
                bytes.truncate(i + 1);
                return Self::from_vec(bytes);
            }
        }

        // All bytes are 0xFF: no finite successor, scan to the end
        Self::empty()
    }
}

/// A column qualifier within a family.
///
/// Qualifiers are not fixed by the table schema and may vary per row.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Qualifier(Bytes);

byte_type!(Qualifier);

/// The value stored in one version of a cell.
///
/// # Example
///
/// ```rust
/// use hbkit_common::types::CellValue;
///
/// let value = CellValue::from("zs");
/// assert_eq!(value.to_utf8().unwrap(), "zs");
///
/// let binary = CellValue::from_bytes(&[0xff, 0xfe]);
/// assert!(binary.to_utf8().is_err());
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct CellValue(Bytes);

byte_type!(CellValue);

impl CellValue {
    /// Decodes the value as UTF-8 text.
    pub fn to_utf8(&self) -> Result<String, std::str::Utf8Error> {
        std::str::from_utf8(&self.0).map(str::to_owned)
    }

    /// Decodes the value as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}
