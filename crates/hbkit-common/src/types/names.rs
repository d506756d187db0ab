//! Validated namespace, table and column family names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{DEFAULT_NAMESPACE, MAX_NAME_SIZE, NAMESPACE_DELIMITER, SYSTEM_NAMESPACE};

/// A name rejected by validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} name '{name}': {reason}")]
pub struct InvalidName {
    /// What was being named ("namespace", "table" or "column family").
    pub kind: &'static str,
    /// The rejected name.
    pub name: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

impl InvalidName {
    fn new(kind: &'static str, name: &str, reason: &'static str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            reason,
        }
    }
}

fn check_length(kind: &'static str, name: &str) -> Result<(), InvalidName> {
    if name.is_empty() {
        return Err(InvalidName::new(kind, name, "name is empty"));
    }
    if name.len() > MAX_NAME_SIZE {
        return Err(InvalidName::new(kind, name, "name is too long"));
    }
    Ok(())
}

/// A namespace name: one or more of `[A-Za-z0-9_]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NamespaceName(String);

impl NamespaceName {
    /// Validates and creates a namespace name.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidName> {
        let name = name.into();
        check_length("namespace", &name)?;
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(InvalidName::new(
                "namespace",
                &name,
                "only [A-Za-z0-9_] are allowed",
            ));
        }
        Ok(Self(name))
    }

    /// The namespace tables land in when none is given.
    #[must_use]
    pub fn default_namespace() -> Self {
        Self(DEFAULT_NAMESPACE.to_string())
    }

    /// The namespace reserved for the store's catalog tables.
    #[must_use]
    pub fn system_namespace() -> Self {
        Self(SYSTEM_NAMESPACE.to_string())
    }

    /// Returns true for the `default` namespace.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_NAMESPACE
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NamespaceName {
    type Err = InvalidName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for NamespaceName {
    type Error = InvalidName;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<NamespaceName> for String {
    fn from(name: NamespaceName) -> Self {
        name.0
    }
}

/// A fully qualified table name: namespace plus table qualifier.
///
/// The qualifier is one or more of `[A-Za-z0-9_.-]` and may not start with
/// `.` or `-`. Tables in the `default` namespace render without a prefix.
///
/// # Example
///
/// ```rust
/// use hbkit_common::types::TableName;
///
/// let table = TableName::new("test", "testTable").unwrap();
/// assert_eq!(table.to_string(), "test:testTable");
///
/// let plain = TableName::parse("users").unwrap();
/// assert!(plain.namespace().is_default());
/// assert_eq!(plain.to_string(), "users");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName {
    namespace: NamespaceName,
    qualifier: String,
}

impl TableName {
    /// Validates and creates a table name.
    pub fn new(namespace: impl Into<String>, table: impl Into<String>) -> Result<Self, InvalidName> {
        let namespace = NamespaceName::new(namespace)?;
        Self::with_namespace(namespace, table)
    }

    /// Creates a table name inside an already validated namespace.
    pub fn with_namespace(
        namespace: NamespaceName,
        table: impl Into<String>,
    ) -> Result<Self, InvalidName> {
        let qualifier = table.into();
        check_length("table", &qualifier)?;
        if qualifier.starts_with('.') || qualifier.starts_with('-') {
            return Err(InvalidName::new(
                "table",
                &qualifier,
                "must not start with '.' or '-'",
            ));
        }
        if !qualifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            return Err(InvalidName::new(
                "table",
                &qualifier,
                "only [A-Za-z0-9_.-] are allowed",
            ));
        }
        Ok(Self {
            namespace,
            qualifier,
        })
    }

    /// Parses `namespace:table`, or `table` for the default namespace.
    pub fn parse(name: &str) -> Result<Self, InvalidName> {
        match name.split_once(NAMESPACE_DELIMITER) {
            Some((namespace, table)) => Self::new(namespace, table),
            None => Self::with_namespace(NamespaceName::default_namespace(), name),
        }
    }

    /// Returns the namespace.
    #[must_use]
    pub fn namespace(&self) -> &NamespaceName {
        &self.namespace
    }

    /// Returns the table qualifier (the name without its namespace).
    #[must_use]
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_default() {
            f.write_str(&self.qualifier)
        } else {
            write!(f, "{}{}{}", self.namespace, NAMESPACE_DELIMITER, self.qualifier)
        }
    }
}

impl FromStr for TableName {
    type Err = InvalidName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TableName {
    type Error = InvalidName;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TableName> for String {
    fn from(name: TableName) -> Self {
        name.to_string()
    }
}

/// A column family name.
///
/// Family names are printable, non-empty, contain no `:` and do not start
/// with `.`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FamilyName(String);

impl FamilyName {
    /// Validates and creates a column family name.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidName> {
        let name = name.into();
        check_length("column family", &name)?;
        if name.starts_with('.') {
            return Err(InvalidName::new("column family", &name, "must not start with '.'"));
        }
        if name.contains(NAMESPACE_DELIMITER) {
            return Err(InvalidName::new("column family", &name, "must not contain ':'"));
        }
        if name.chars().any(char::is_control) {
            return Err(InvalidName::new(
                "column family",
                &name,
                "must not contain control characters",
            ));
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the name as bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for FamilyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FamilyName {
    type Err = InvalidName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for FamilyName {
    type Error = InvalidName;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<FamilyName> for String {
    fn from(name: FamilyName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_validation() {
        assert!(NamespaceName::new("test").is_ok());
        assert!(NamespaceName::new("my_ns_01").is_ok());

        let err = NamespaceName::new("").unwrap_err();
        assert_eq!(err.reason, "name is empty");
        assert!(NamespaceName::new("bad-ns").is_err());
        assert!(NamespaceName::new("a".repeat(MAX_NAME_SIZE + 1)).is_err());
    }

    #[test]
    fn test_table_name_display() {
        let table = TableName::new("test", "testTable").unwrap();
        assert_eq!(table.to_string(), "test:testTable");
        assert_eq!(table.qualifier(), "testTable");

        let table = TableName::new("default", "users").unwrap();
        assert_eq!(table.to_string(), "users");
    }

    #[test]
    fn test_table_name_parse() {
        let table = TableName::parse("test:testTable").unwrap();
        assert_eq!(table.namespace().as_str(), "test");
        assert_eq!(table.qualifier(), "testTable");

        let table: TableName = "events.v2".parse().unwrap();
        assert!(table.namespace().is_default());

        assert!(TableName::parse("a:b:c").is_err());
        assert!(TableName::parse(":t").is_err());
    }

    #[test]
    fn test_table_name_validation() {
        assert!(TableName::new("test", "t-1.x_y").is_ok());
        assert!(TableName::new("test", ".hidden").is_err());
        assert!(TableName::new("test", "-dash").is_err());
        assert!(TableName::new("test", "with space").is_err());
        assert!(TableName::new("test", "").is_err());
    }

    #[test]
    fn test_table_name_serde_validates() {
        #[derive(Debug, Serialize, Deserialize)]
        struct Entry {
            table: TableName,
        }

        let entry: Entry = toml::from_str(r#"table = "test:users""#).unwrap();
        assert_eq!(entry.table, TableName::new("test", "users").unwrap());
        assert_eq!(toml::to_string(&entry).unwrap().trim(), r#"table = "test:users""#);

        let entry: Entry = toml::from_str(r#"table = "users""#).unwrap();
        assert!(entry.table.namespace().is_default());

        assert!(toml::from_str::<Entry>(r#"table = "test:bad/name""#).is_err());
        assert!(toml::from_str::<Entry>(r#"table = "test:.hidden""#).is_err());
        assert!(toml::from_str::<Entry>(r#"table = "bad-ns:users""#).is_err());
    }

    #[test]
    fn test_family_name_validation() {
        assert!(FamilyName::new("info").is_ok());
        assert!(FamilyName::new("").is_err());
        assert!(FamilyName::new(".meta").is_err());
        assert!(FamilyName::new("a:b").is_err());
        assert!(FamilyName::new("tab\there").is_err());
    }

    #[test]
    fn test_error_display() {
        let err = FamilyName::new("a:b").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid column family name 'a:b': must not contain ':'"
        );
    }
}
