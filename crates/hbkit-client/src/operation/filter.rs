//! Scan filters.

use std::cmp::Ordering;

use hbkit_common::{CellValue, FamilyName, Qualifier};

use super::RowResult;

/// Comparison applied by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOperator {
    /// Less than.
    Less,
    /// Less than or equal to.
    LessOrEqual,
    /// Equal to.
    Equal,
    /// Not equal to.
    NotEqual,
    /// Greater than or equal to.
    GreaterOrEqual,
    /// Greater than.
    Greater,
}

impl CompareOperator {
    /// Applies the operator to the result of `cell.cmp(operand)`.
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            CompareOperator::Less => ordering == Ordering::Less,
            CompareOperator::LessOrEqual => ordering != Ordering::Greater,
            CompareOperator::Equal => ordering == Ordering::Equal,
            CompareOperator::NotEqual => ordering != Ordering::Equal,
            CompareOperator::GreaterOrEqual => ordering != Ordering::Less,
            CompareOperator::Greater => ordering == Ordering::Greater,
        }
    }
}

/// A server-side row filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Keeps only the newest cell of `family:qualifier` when its value
    /// compares true against `value`. Rows without that cell are dropped.
    ColumnValue {
        /// Column family.
        family: FamilyName,
        /// Column qualifier.
        qualifier: Qualifier,
        /// Comparison.
        op: CompareOperator,
        /// Operand, compared bytewise.
        value: CellValue,
    },
}

impl Filter {
    /// Creates an equality column-value filter.
    pub fn column_value_eq(
        family: FamilyName,
        qualifier: impl Into<Qualifier>,
        value: impl Into<CellValue>,
    ) -> Self {
        Filter::ColumnValue {
            family,
            qualifier: qualifier.into(),
            op: CompareOperator::Equal,
            value: value.into(),
        }
    }

    /// Applies the filter to a row, returning what survives.
    pub fn apply(&self, mut row: RowResult) -> Option<RowResult> {
        match self {
            Filter::ColumnValue {
                family,
                qualifier,
                op,
                value,
            } => {
                let position = row
                    .cells
                    .iter()
                    .position(|c| &c.family == family && &c.qualifier == qualifier)?;
                let cell = row.cells.swap_remove(position);
                if !op.matches(cell.value.as_bytes().cmp(value.as_bytes())) {
                    return None;
                }
                row.cells = vec![cell];
                Some(row)
            }
        }
    }
}
