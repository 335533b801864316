//! Merging per-paper raw records into one table.
//!
//! The merged table holds one row per DP number in ascending order. Row
//! indices are positions in that order and are reassigned on every merge,
//! never taken from the input.

use crate::{MergedRow, RawRecord};
use std::collections::HashSet;
use tracing::{info, warn};

/// All raw records, unique by DP number and sorted ascending by it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedTable {
    rows: Vec<RawRecord>,
}

impl MergedTable {
    /// Rebuild a table from serialized rows.
    ///
    /// Stored row indices are ignored; the rows are merged again so the
    /// ordering invariant holds whatever the file contained.
    pub fn from_rows(rows: Vec<MergedRow>) -> Self {
        Merger::new().merge(rows.into_iter().map(|row| row.record))
    }

    /// Rows with their dense zero-based index.
    pub fn to_rows(&self) -> Vec<MergedRow> {
        self.rows
            .iter()
            .enumerate()
            .map(|(row_index, record)| MergedRow {
                row_index,
                record: record.clone(),
            })
            .collect()
    }

    /// Records in ascending DP number order.
    pub fn records(&self) -> &[RawRecord] {
        &self.rows
    }

    /// Record at a row index.
    pub fn get(&self, row_index: usize) -> Option<&RawRecord> {
        self.rows.get(row_index)
    }

    /// Row index of a DP number.
    pub fn position(&self, dp_number: u32) -> Option<usize> {
        self.rows
            .binary_search_by_key(&dp_number, |record| record.dp_number)
            .ok()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Concatenates raw records into a [`MergedTable`].
#[derive(Debug, Clone, Default)]
pub struct Merger;

impl Merger {
    /// Creates a new merger.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Merge records, keeping the first record seen for each DP number.
    ///
    /// Later records with an already seen number are dropped with a warning.
    /// The result is sorted by DP number regardless of input order.
    pub fn merge<I>(&self, records: I) -> MergedTable
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut seen = HashSet::new();
        let mut rows = Vec::new();

        for record in records {
            if !seen.insert(record.dp_number) {
                warn!(
                    dp_number = record.dp_number,
                    "duplicate raw record ignored"
                );
                continue;
            }
            rows.push(record);
        }

        rows.sort_by_key(|record| record.dp_number);
        info!(rows = rows.len(), "merged raw records");
        MergedTable { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(dp_number: u32, title: &str) -> RawRecord {
        RawRecord {
            dp_number,
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_sorts_by_dp_number() {
        let table = Merger::new().merge(vec![record(30, "c"), record(10, "a"), record(20, "b")]);
        let numbers: Vec<u32> = table.records().iter().map(|r| r.dp_number).collect();
        assert_eq!(numbers, vec![10, 20, 30]);
    }

    #[test]
    fn test_merge_keeps_first_duplicate() {
        let table = Merger::new().merge(vec![record(10, "first"), record(10, "second")]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].title.as_deref(), Some("first"));
    }

    #[test]
    fn test_row_indices_are_dense_after_sorting() {
        let table = Merger::new().merge(vec![record(500, "b"), record(7, "a")]);
        let rows = table.to_rows();
        assert_eq!(rows[0].row_index, 0);
        assert_eq!(rows[0].record.dp_number, 7);
        assert_eq!(rows[1].row_index, 1);
        assert_eq!(rows[1].record.dp_number, 500);
        assert_eq!(table.position(500), Some(1));
        assert_eq!(table.get(0).map(|r| r.dp_number), Some(7));
    }

    #[test]
    fn test_from_rows_reassigns_indices() {
        let rows = vec![
            MergedRow {
                row_index: 9,
                record: record(20, "b"),
            },
            MergedRow {
                row_index: 3,
                record: record(10, "a"),
            },
        ];
        let table = MergedTable::from_rows(rows);
        let rows = table.to_rows();
        assert_eq!(rows[0].row_index, 0);
        assert_eq!(rows[0].record.dp_number, 10);
        assert_eq!(rows[1].row_index, 1);
    }

    #[test]
    fn test_merge_empty() {
        let table = Merger::new().merge(Vec::new());
        assert!(table.is_empty());
    }
}
