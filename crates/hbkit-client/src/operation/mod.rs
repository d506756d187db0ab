//! Row operations and results.
//!
//! These are the requests handed to a [`Table`](crate::backend::Table)
//! handle and the rows it hands back.

use hbkit_common::{CellValue, FamilyName, Qualifier, RowKey, Timestamp};

mod filter;

pub use filter::{CompareOperator, Filter};

/// One version of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Column family.
    pub family: FamilyName,
    /// Column qualifier.
    pub qualifier: Qualifier,
    /// Version timestamp.
    pub timestamp: Timestamp,
    /// Stored value.
    pub value: CellValue,
}

/// A column selector: a whole family, or one qualifier within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelector {
    /// Column family.
    pub family: FamilyName,
    /// Qualifier, or `None` for every qualifier in the family.
    pub qualifier: Option<Qualifier>,
}

impl ColumnSelector {
    /// Returns true if the selector covers the given column.
    pub fn matches(&self, family: &FamilyName, qualifier: &Qualifier) -> bool {
        &self.family == family && self.qualifier.as_ref().map_or(true, |q| q == qualifier)
    }
}

fn selected(columns: &[ColumnSelector], family: &FamilyName, qualifier: &Qualifier) -> bool {
    columns.is_empty() || columns.iter().any(|c| c.matches(family, qualifier))
}

/// Writes one or more cells into a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Put {
    /// Target row.
    pub row: RowKey,
    /// Timestamp for every cell, or `LATEST` for server-assigned.
    pub timestamp: Timestamp,
    /// Cells to write.
    pub cells: Vec<(FamilyName, Qualifier, CellValue)>,
}

impl Put {
    /// Creates an empty put for a row.
    pub fn new(row: impl Into<RowKey>) -> Self {
        Self {
            row: row.into(),
            timestamp: Timestamp::LATEST,
            cells: Vec::new(),
        }
    }

    /// Pins the version timestamp of every cell in this put.
    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Adds a cell.
    pub fn add_column(
        mut self,
        family: FamilyName,
        qualifier: impl Into<Qualifier>,
        value: impl Into<CellValue>,
    ) -> Self {
        self.cells.push((family, qualifier.into(), value.into()));
        self
    }

    /// Returns true if the put carries no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Reads cells of a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Get {
    /// Target row.
    pub row: RowKey,
    /// Columns to read; empty means every column.
    pub columns: Vec<ColumnSelector>,
    /// Maximum versions returned per cell.
    pub max_versions: u32,
}

impl Get {
    /// Creates a get for the newest version of every column in a row.
    pub fn new(row: impl Into<RowKey>) -> Self {
        Self {
            row: row.into(),
            columns: Vec::new(),
            max_versions: 1,
        }
    }

    /// Restricts the get to one column.
    pub fn add_column(mut self, family: FamilyName, qualifier: impl Into<Qualifier>) -> Self {
        self.columns.push(ColumnSelector {
            family,
            qualifier: Some(qualifier.into()),
        });
        self
    }

    /// Restricts the get to one family.
    pub fn add_family(mut self, family: FamilyName) -> Self {
        self.columns.push(ColumnSelector {
            family,
            qualifier: None,
        });
        self
    }

    /// Returns every retained version instead of only the newest.
    pub fn read_all_versions(mut self) -> Self {
        self.max_versions = u32::MAX;
        self
    }

    /// Returns up to `versions` versions per cell.
    pub fn read_versions(mut self, versions: u32) -> Self {
        self.max_versions = versions;
        self
    }

    /// Returns true if the get selects the given column.
    pub fn selects(&self, family: &FamilyName, qualifier: &Qualifier) -> bool {
        selected(&self.columns, family, qualifier)
    }
}

/// Deletes cells, families or a whole row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete {
    /// Target row.
    pub row: RowKey,
    /// What to delete; empty means the whole row.
    pub columns: Vec<ColumnSelector>,
}

impl Delete {
    /// Creates a delete of an entire row.
    pub fn new(row: impl Into<RowKey>) -> Self {
        Self {
            row: row.into(),
            columns: Vec::new(),
        }
    }

    /// Deletes every version of one column.
    pub fn add_column(mut self, family: FamilyName, qualifier: impl Into<Qualifier>) -> Self {
        self.columns.push(ColumnSelector {
            family,
            qualifier: Some(qualifier.into()),
        });
        self
    }

    /// Deletes every column of one family.
    pub fn add_family(mut self, family: FamilyName) -> Self {
        self.columns.push(ColumnSelector {
            family,
            qualifier: None,
        });
        self
    }

    /// Returns true if this deletes the whole row.
    pub fn is_row_delete(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Reads a range of rows.
///
/// The range is half-open: `[start_row, stop_row)`. An empty start row means
/// the first row of the table and an empty stop row means past the last.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scan {
    /// Inclusive start row.
    pub start_row: RowKey,
    /// Exclusive stop row.
    pub stop_row: RowKey,
    /// Columns to read; empty means every column.
    pub columns: Vec<ColumnSelector>,
    /// Optional row filter.
    pub filter: Option<Filter>,
    /// Maximum versions returned per cell.
    pub max_versions: u32,
}

impl Scan {
    /// Creates a scan over the whole table.
    pub fn new() -> Self {
        Self {
            max_versions: 1,
            ..Default::default()
        }
    }

    /// Creates a scan over `[start, stop)`.
    pub fn range(start: impl Into<RowKey>, stop: impl Into<RowKey>) -> Self {
        Self::new().with_start_row(start).with_stop_row(stop)
    }

    /// Creates a scan over every row starting with `prefix`.
    pub fn prefix(prefix: impl Into<RowKey>) -> Self {
        let prefix = prefix.into();
        let stop = prefix.successor();
        Self::new().with_start_row(prefix).with_stop_row(stop)
    }

    /// Sets the inclusive start row.
    pub fn with_start_row(mut self, row: impl Into<RowKey>) -> Self {
        self.start_row = row.into();
        self
    }

    /// Sets the exclusive stop row.
    pub fn with_stop_row(mut self, row: impl Into<RowKey>) -> Self {
        self.stop_row = row.into();
        self
    }

    /// Restricts the scan to one column.
    pub fn add_column(mut self, family: FamilyName, qualifier: impl Into<Qualifier>) -> Self {
        self.columns.push(ColumnSelector {
            family,
            qualifier: Some(qualifier.into()),
        });
        self
    }

    /// Sets the row filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Returns true if `row` lies inside the scan range.
    pub fn contains(&self, row: &RowKey) -> bool {
        row >= &self.start_row && (self.stop_row.is_empty() || row < &self.stop_row)
    }

    /// Returns true if the scan selects the given column.
    pub fn selects(&self, family: &FamilyName, qualifier: &Qualifier) -> bool {
        selected(&self.columns, family, qualifier)
    }
}

/// The cells of one row returned by a get or a scan.
///
/// Cells are sorted by family, then qualifier, then newest version first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowResult {
    /// Row key.
    pub row: RowKey,
    /// Cells of the row.
    pub cells: Vec<Cell>,
}

impl RowResult {
    /// Creates a result, sorting the cells into result order.
    pub fn new(row: RowKey, mut cells: Vec<Cell>) -> Self {
        cells.sort_by(|a, b| {
            (&a.family, &a.qualifier)
                .cmp(&(&b.family, &b.qualifier))
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });
        Self { row, cells }
    }

    /// Returns true if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the newest value of the first column in the row.
    pub fn value(&self) -> Option<&CellValue> {
        self.cells.first().map(|cell| &cell.value)
    }

    /// Returns the newest value of a column.
    pub fn latest(&self, family: &FamilyName, qualifier: &Qualifier) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|cell| &cell.family == family && &cell.qualifier == qualifier)
            .map(|cell| &cell.value)
    }

    /// Iterates over the versions of a column, newest first.
    pub fn versions<'a>(
        &'a self,
        family: &'a FamilyName,
        qualifier: &'a Qualifier,
    ) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.cells
            .iter()
            .filter(move |cell| &cell.family == family && &cell.qualifier == qualifier)
            .map(|cell| &cell.value)
    }
}
