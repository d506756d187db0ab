//! Table and column family descriptors.
//!
//! A descriptor is the schema of a table: its name and the settings of each
//! column family.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hbkit_common::{FamilyName, TableName, DEFAULT_MAX_VERSIONS, DEFAULT_MIN_VERSIONS};

/// Settings of one column family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFamilyDescriptor {
    /// Family name.
    pub name: FamilyName,
    /// Maximum number of versions kept per cell.
    pub max_versions: u32,
    /// Minimum number of versions kept per cell.
    pub min_versions: u32,
}

impl ColumnFamilyDescriptor {
    /// Creates a family descriptor with default settings.
    pub fn new(name: FamilyName) -> Self {
        Self {
            name,
            max_versions: DEFAULT_MAX_VERSIONS,
            min_versions: DEFAULT_MIN_VERSIONS,
        }
    }

    /// Sets the maximum number of versions.
    pub fn max_versions(mut self, max_versions: u32) -> Self {
        self.max_versions = max_versions;
        self
    }

    /// Sets the minimum number of versions.
    pub fn min_versions(mut self, min_versions: u32) -> Self {
        self.min_versions = min_versions;
        self
    }

    /// Validates the family settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_versions == 0 {
            return Err(format!(
                "column family '{}': max_versions must be at least 1",
                self.name
            ));
        }
        if self.min_versions > self.max_versions {
            return Err(format!(
                "column family '{}': min_versions {} exceeds max_versions {}",
                self.name, self.min_versions, self.max_versions
            ));
        }
        Ok(())
    }
}

/// Schema of a table.
///
/// # Example
///
/// ```rust
/// use hbkit_client::{ColumnFamilyDescriptor, TableDescriptor};
/// use hbkit_common::{FamilyName, TableName};
///
/// let info = FamilyName::new("info").unwrap();
/// let descriptor = TableDescriptor::new(TableName::parse("test:users").unwrap())
///     .column_family(ColumnFamilyDescriptor::new(info.clone()).max_versions(3));
///
/// assert_eq!(descriptor.family(&info).unwrap().max_versions, 3);
/// assert!(descriptor.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    name: TableName,
    families: BTreeMap<FamilyName, ColumnFamilyDescriptor>,
}

impl TableDescriptor {
    /// Creates a descriptor with no column families.
    pub fn new(name: TableName) -> Self {
        Self {
            name,
            families: BTreeMap::new(),
        }
    }

    /// Adds a column family, replacing any family with the same name.
    pub fn column_family(mut self, family: ColumnFamilyDescriptor) -> Self {
        self.families.insert(family.name.clone(), family);
        self
    }

    /// Returns the table name.
    pub fn name(&self) -> &TableName {
        &self.name
    }

    /// Looks up a column family.
    pub fn family(&self, name: &FamilyName) -> Option<&ColumnFamilyDescriptor> {
        self.families.get(name)
    }

    /// Looks up a column family for modification.
    pub fn family_mut(&mut self, name: &FamilyName) -> Option<&mut ColumnFamilyDescriptor> {
        self.families.get_mut(name)
    }

    /// Returns true if the table has the named family.
    pub fn has_family(&self, name: &FamilyName) -> bool {
        self.families.contains_key(name)
    }

    /// Iterates over the column families in name order.
    pub fn families(&self) -> impl Iterator<Item = &ColumnFamilyDescriptor> {
        self.families.values()
    }

    /// Returns the number of column families.
    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    /// Validates the descriptor.
    pub fn validate(&self) -> Result<(), String> {
        if self.families.is_empty() {
            return Err(format!(
                "table '{}' must have at least one column family",
                self.name
            ));
        }
        self.families.values().try_for_each(ColumnFamilyDescriptor::validate)
    }
}
