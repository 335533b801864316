//! Preparation of the analysis table.
//!
//! The analysis table is the cleaned table restricted to the years studied,
//! with per-paper counts attached. Whether an author is new to the series is
//! decided against the whole cleaned table, so a paper just inside the window
//! does not count an author as new when they already published before it.

use crate::{AnalysisRecord, CleanedRecord};
use chrono::NaiveDate;
use itertools::Itertools;
use std::collections::{BTreeSet, HashMap};
use tracing::info;

/// First month of the analysis window (inclusive).
pub const WINDOW_START: NaiveDate = match NaiveDate::from_ymd_opt(2000, 1, 1) {
    Some(date) => date,
    None => panic!("invalid window start"),
};

/// End of the analysis window (exclusive).
pub const WINDOW_END: NaiveDate = match NaiveDate::from_ymd_opt(2025, 1, 1) {
    Some(date) => date,
    None => panic!("invalid window end"),
};

/// Distinct new and returning authors of one paper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorCounts {
    pub new: usize,
    pub returning: usize,
}

/// Count new and returning authors for every paper.
///
/// An author is new on every paper from the month they first appear in the
/// series and returning on every paper from a later month. Empty names are
/// ignored and an author listed twice on a paper counts once. Papers without
/// authors are absent from the map.
pub fn author_counts(records: &[CleanedRecord]) -> HashMap<u32, AuthorCounts> {
    let appearances: BTreeSet<(&str, NaiveDate, u32)> = records
        .iter()
        .flat_map(|record| {
            record
                .author_names
                .iter()
                .filter(|name| !name.is_empty())
                .map(|name| (name.as_str(), record.publication_year_month, record.dp_number))
        })
        .collect();

    let mut first_month: HashMap<&str, NaiveDate> = HashMap::new();
    for &(author, month, _) in &appearances {
        first_month
            .entry(author)
            .and_modify(|first| *first = (*first).min(month))
            .or_insert(month);
    }

    let mut counts: HashMap<u32, AuthorCounts> = HashMap::new();
    for &(author, month, dp_number) in &appearances {
        let entry = counts.entry(dp_number).or_default();
        if first_month.get(author) == Some(&month) {
            entry.new += 1;
        } else {
            entry.returning += 1;
        }
    }
    counts
}

/// Builds the analysis table from cleaned records.
#[derive(Debug, Clone, Default)]
pub struct AnalysisPreparer;

impl AnalysisPreparer {
    /// Creates a new preparer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Whether a month lies inside the analysis window.
    pub fn in_window(month: NaiveDate) -> bool {
        (WINDOW_START..WINDOW_END).contains(&month)
    }

    /// Prepare the analysis table.
    ///
    /// Rows keep the order of `records` and get a fresh dense index.
    pub fn prepare(&self, records: &[CleanedRecord]) -> Vec<AnalysisRecord> {
        let counts = author_counts(records);

        let analysis = records
            .iter()
            .filter(|record| Self::in_window(record.publication_year_month))
            .enumerate()
            .map(|(row_index, record)| {
                let authors = counts.get(&record.dp_number).copied().unwrap_or_default();
                AnalysisRecord {
                    row_index,
                    paper: record.clone(),
                    jel_codes_count: record.jel_codes.len(),
                    authors_count: record.author_names.len(),
                    authors_new: authors.new,
                    authors_returning: authors.returning,
                }
            })
            .collect_vec();

        info!(
            cleaned = records.len(),
            analysis = analysis.len(),
            "prepared analysis table"
        );
        analysis
    }
}
