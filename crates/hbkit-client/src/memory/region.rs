//! Cell storage of one in-memory table.

use std::collections::BTreeMap;
use std::ops::Bound;

use hbkit_common::{
    CellValue, FamilyName, Qualifier, RowKey, StoreError, StoreResult, Timestamp, MAX_ROW_KEY_SIZE,
};

use crate::descriptor::TableDescriptor;
use crate::operation::{Cell, Delete, Get, Put, RowResult, Scan};

/// Versions of one cell, newest first.
type Versions = Vec<(Timestamp, CellValue)>;

/// Columns of one row.
type Row = BTreeMap<(FamilyName, Qualifier), Versions>;

/// A table held in memory: schema, enabled flag and rows.
#[derive(Debug)]
pub(crate) struct Region {
    pub(crate) descriptor: TableDescriptor,
    pub(crate) enabled: bool,
    rows: BTreeMap<RowKey, Row>,
}

impl Region {
    pub(crate) fn new(descriptor: TableDescriptor) -> Self {
        Self {
            descriptor,
            enabled: true,
            rows: BTreeMap::new(),
        }
    }

    /// Swaps in a new schema. Data of removed families is dropped and
    /// histories are trimmed to the new version limits.
    pub(crate) fn set_descriptor(&mut self, descriptor: TableDescriptor) {
        self.descriptor = descriptor;
        let descriptor = &self.descriptor;
        for row in self.rows.values_mut() {
            row.retain(|(family, _), versions| match descriptor.family(family) {
                Some(cf) => {
                    versions.truncate(cf.max_versions as usize);
                    true
                }
                None => false,
            });
        }
        self.rows.retain(|_, row| !row.is_empty());
    }

    pub(crate) fn put(&mut self, put: &Put, timestamp: Timestamp) -> StoreResult<()> {
        check_row(&put.row)?;
        // Validate the whole put before touching the row so it applies atomically
        for (family, _, _) in &put.cells {
            self.check_family(family)?;
        }
        if put.is_empty() {
            return Ok(());
        }

        let row = self.rows.entry(put.row.clone()).or_default();
        for (family, qualifier, value) in &put.cells {
            let max_versions = self
                .descriptor
                .family(family)
                .map_or(1, |cf| cf.max_versions as usize);
            let versions = row.entry((family.clone(), qualifier.clone())).or_default();
            match versions.binary_search_by(|(ts, _)| timestamp.cmp(ts)) {
                Ok(pos) => versions[pos].1 = value.clone(),
                Err(pos) => versions.insert(pos, (timestamp, value.clone())),
            }
            versions.truncate(max_versions);
        }
        Ok(())
    }

    pub(crate) fn get(&self, get: &Get) -> StoreResult<RowResult> {
        check_row(&get.row)?;
        for column in &get.columns {
            self.check_family(&column.family)?;
        }

        let cells = match self.rows.get(&get.row) {
            Some(row) => self.collect(row, get.max_versions, |f, q| get.selects(f, q)),
            None => Vec::new(),
        };
        Ok(RowResult::new(get.row.clone(), cells))
    }

    pub(crate) fn delete(&mut self, delete: &Delete) -> StoreResult<()> {
        check_row(&delete.row)?;
        for column in &delete.columns {
            self.check_family(&column.family)?;
        }

        if delete.is_row_delete() {
            self.rows.remove(&delete.row);
            return Ok(());
        }
        if let Some(row) = self.rows.get_mut(&delete.row) {
            row.retain(|(family, qualifier), _| {
                !delete.columns.iter().any(|c| c.matches(family, qualifier))
            });
            if row.is_empty() {
                self.rows.remove(&delete.row);
            }
        }
        Ok(())
    }

    pub(crate) fn scan(&self, scan: &Scan) -> StoreResult<Vec<RowResult>> {
        for column in &scan.columns {
            self.check_family(&column.family)?;
        }
        if !scan.stop_row.is_empty() && scan.start_row > scan.stop_row {
            return Ok(Vec::new());
        }

        let upper = if scan.stop_row.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(&scan.stop_row)
        };

        let mut results = Vec::new();
        for (key, row) in self.rows.range::<RowKey, _>((Bound::Included(&scan.start_row), upper)) {
            let cells = self.collect(row, scan.max_versions, |f, q| scan.selects(f, q));
            if cells.is_empty() {
                continue;
            }
            let result = RowResult::new(key.clone(), cells);
            let result = match &scan.filter {
                Some(filter) => filter.apply(result),
                None => Some(result),
            };
            results.extend(result);
        }
        Ok(results)
    }

    /// Gathers the selected cells of a row, capped per column at both the
    /// requested and the schema's version limit.
    fn collect<F>(&self, row: &Row, requested: u32, selects: F) -> Vec<Cell>
    where
        F: Fn(&FamilyName, &Qualifier) -> bool,
    {
        let mut cells = Vec::new();
        for ((family, qualifier), versions) in row {
            if !selects(family, qualifier) {
                continue;
            }
            let retained = self
                .descriptor
                .family(family)
                .map_or(1, |cf| cf.max_versions);
            let limit = requested.min(retained) as usize;
            cells.extend(versions.iter().take(limit).map(|(timestamp, value)| Cell {
                family: family.clone(),
                qualifier: qualifier.clone(),
                timestamp: *timestamp,
                value: value.clone(),
            }));
        }
        cells
    }

    fn check_family(&self, family: &FamilyName) -> StoreResult<()> {
        if self.descriptor.has_family(family) {
            Ok(())
        } else {
            Err(StoreError::NoSuchColumnFamily {
                table: self.descriptor.name().to_string(),
                family: family.to_string(),
            })
        }
    }
}

fn check_row(row: &RowKey) -> StoreResult<()> {
    if row.is_empty() {
        return Err(StoreError::invalid_argument("row key is empty"));
    }
    if row.len() > MAX_ROW_KEY_SIZE {
        return Err(StoreError::invalid_argument(format!(
            "row key length {} exceeds maximum {}",
            row.len(),
            MAX_ROW_KEY_SIZE
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ColumnFamilyDescriptor;
    use crate::operation::Filter;
    use hbkit_common::TableName;

    fn info() -> FamilyName {
        FamilyName::new("info").unwrap()
    }

    fn region(max_versions: u32) -> Region {
        Region::new(
            TableDescriptor::new(TableName::parse("test:t").unwrap())
                .column_family(ColumnFamilyDescriptor::new(info()).max_versions(max_versions)),
        )
    }

    fn ts(millis: u64) -> Timestamp {
        Timestamp::from_millis(millis)
    }

    fn values(result: &RowResult) -> Vec<&str> {
        result.cells.iter().filter_map(|c| c.value.as_str()).collect()
    }

    #[test]
    fn test_versions_are_newest_first_and_capped() {
        let mut region = region(2);
        for (i, v) in ["a", "b", "c"].iter().enumerate() {
            let put = Put::new("r1").add_column(info(), "name", *v);
            region.put(&put, ts(i as u64 + 1)).unwrap();
        }

        let result = region
            .get(&Get::new("r1").add_column(info(), "name").read_all_versions())
            .unwrap();
        assert_eq!(values(&result), vec!["c", "b"]);
    }

    #[test]
    fn test_same_timestamp_overwrites() {
        let mut region = region(3);
        region
            .put(&Put::new("r1").add_column(info(), "name", "a"), ts(5))
            .unwrap();
        region
            .put(&Put::new("r1").add_column(info(), "name", "b"), ts(5))
            .unwrap();

        let result = region.get(&Get::new("r1").read_all_versions()).unwrap();
        assert_eq!(values(&result), vec!["b"]);
    }

    #[test]
    fn test_out_of_order_timestamp_is_sorted_in() {
        let mut region = region(3);
        region
            .put(&Put::new("r1").add_column(info(), "name", "new"), ts(10))
            .unwrap();
        region
            .put(&Put::new("r1").add_column(info(), "name", "old"), ts(1))
            .unwrap();

        let result = region.get(&Get::new("r1").read_all_versions()).unwrap();
        assert_eq!(values(&result), vec!["new", "old"]);
    }

    #[test]
    fn test_put_with_unknown_family_writes_nothing() {
        let mut region = region(1);
        let put = Put::new("r1")
            .add_column(info(), "name", "zs")
            .add_column(FamilyName::new("meta").unwrap(), "x", "y");

        let err = region.put(&put, ts(1)).unwrap_err();
        assert!(matches!(err, StoreError::NoSuchColumnFamily { .. }));
        assert!(region.get(&Get::new("r1")).unwrap().is_empty());
    }

    #[test]
    fn test_empty_row_key_rejected() {
        let mut region = region(1);
        let put = Put::new("").add_column(info(), "name", "zs");
        assert!(matches!(
            region.put(&put, ts(1)),
            Err(StoreError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_delete_column_and_row() {
        let mut region = region(1);
        let put = Put::new("r1")
            .add_column(info(), "name", "zs")
            .add_column(info(), "age", "18");
        region.put(&put, ts(1)).unwrap();

        region
            .delete(&Delete::new("r1").add_column(info(), "name"))
            .unwrap();
        let result = region.get(&Get::new("r1")).unwrap();
        assert_eq!(values(&result), vec!["18"]);

        region.delete(&Delete::new("r1")).unwrap();
        assert!(region.get(&Get::new("r1")).unwrap().is_empty());
    }

    #[test]
    fn test_scan_bounds() {
        let mut region = region(1);
        for key in ["1000", "2000", "9999", "10001"] {
            region
                .put(&Put::new(key).add_column(info(), "name", key), ts(1))
                .unwrap();
        }

        // Byte order: "2000" and "9999" sort after "10000"
        let rows = region.scan(&Scan::range("0", "10000")).unwrap();
        let keys: Vec<_> = rows.iter().filter_map(|r| r.row.as_str()).collect();
        assert_eq!(keys, vec!["1000"]);

        let rows = region.scan(&Scan::range("1000", "9999")).unwrap();
        let keys: Vec<_> = rows.iter().filter_map(|r| r.row.as_str()).collect();
        assert_eq!(keys, vec!["1000", "10001", "2000"]);

        // Inverted range yields nothing rather than panicking
        assert!(region.scan(&Scan::range("9", "1")).unwrap().is_empty());
        assert!(region.scan(&Scan::range("5", "5")).unwrap().is_empty());
        assert_eq!(region.scan(&Scan::new()).unwrap().len(), 4);
    }

    #[test]
    fn test_scan_with_filter() {
        let mut region = region(1);
        for (key, name) in [("1", "zs"), ("2", "ls"), ("3", "zs")] {
            region
                .put(&Put::new(key).add_column(info(), "name", name), ts(1))
                .unwrap();
        }
        region
            .put(&Put::new("4").add_column(info(), "age", "zs"), ts(1))
            .unwrap();

        let scan = Scan::new().with_filter(Filter::column_value_eq(info(), "name", "zs"));
        let rows = region.scan(&scan).unwrap();
        let keys: Vec<_> = rows.iter().filter_map(|r| r.row.as_str()).collect();
        assert_eq!(keys, vec!["1", "3"]);
    }

    #[test]
    fn test_shrinking_versions_trims_history() {
        let mut region = region(3);
        for i in 1..=3 {
            region
                .put(&Put::new("r1").add_column(info(), "name", format!("v{i}")), ts(i))
                .unwrap();
        }

        let mut descriptor = region.descriptor.clone();
        descriptor.family_mut(&info()).unwrap().max_versions = 1;
        region.set_descriptor(descriptor);

        let result = region.get(&Get::new("r1").read_all_versions()).unwrap();
        assert_eq!(values(&result), vec!["v3"]);
    }
}
