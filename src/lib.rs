//! Merge, clean, and prepare discussion-paper metadata for JEL code analysis.
//!
//! `jelcorpus` turns the per-paper records scraped from a discussion-paper
//! series into the tables used for descriptive analysis of the corpus: which
//! JEL codes are used over time, how many authors write a paper, and how many
//! of them are publishing in the series for the first time.
//!
//! # Features
//!
//! - `regex` - Use the `regex` crate for pattern matching (enabled by default)
//! - `lite` - Use `regex-lite` instead, for smaller binaries
//! - `parallel` - Load raw records from disk in parallel (enabled by default)
//!
//! # Pipeline
//!
//! Each stage consumes a whole table and produces a whole table:
//!
//! 1. [`source`] loads one [`RawRecord`] per paper (the scraper's output).
//! 2. [`merge::Merger`] deduplicates by DP number and sorts.
//! 3. [`clean::Cleaner`] classifies publication status, links superseded
//!    papers, canonicalises JEL codes, and drops unusable rows.
//! 4. [`prepare::AnalysisPreparer`] restricts to the analysis window and adds
//!    per-paper counts, including new and returning authors.
//! 5. [`metrics`] and [`topics`] aggregate the prepared table for plotting.
//!
//! # Basic Usage
//!
//! ```rust
//! use jelcorpus::{RawRecord, RecordSource};
//! use jelcorpus::clean::Cleaner;
//! use jelcorpus::merge::Merger;
//! use jelcorpus::prepare::AnalysisPreparer;
//!
//! let records = vec![RawRecord {
//!     dp_number: 1500,
//!     title: Some("Minimum Wages and Employment".to_string()),
//!     author_names: vec!["Jane Doe".to_string()],
//!     published: Some("Forthcoming in the Journal of Labor Economics".to_string()),
//!     publication_date_month: Some("March".to_string()),
//!     publication_date_year: Some("2005".to_string()),
//!     jel_codes: vec!["j31".to_string(), "J3".to_string()],
//!     file_url: Some("https://example.org/dp1500.pdf".to_string()),
//!     ..Default::default()
//! }];
//!
//! let merged = Merger::new().merge(records.load().unwrap());
//! let report = Cleaner::new().clean(&merged).unwrap();
//! let analysis = AnalysisPreparer::new().prepare(&report.records);
//!
//! assert_eq!(analysis[0].paper.jel_codes[0].as_str(), "J30");
//! assert_eq!(analysis[0].authors_new, 1);
//! ```
//!
//! # Error Handling
//!
//! Every stage returns its own error type (see [`error`]); they all convert
//! into [`PipelineError`]. Unusable rows (no title, no file, no valid JEL
//! code, superseded) are filtered and counted, not reported as errors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod clean;
pub mod config;
pub mod error;
pub mod merge;
pub mod metrics;
pub mod pipeline;
pub mod prepare;
pub mod source;
pub mod table;
pub mod topics;

// Reexports
pub use clean::jel::JelCode;
pub use config::PipelineConfig;
pub use error::{CleanError, LoadError, PipelineError, TopicsError, ValueError};

mod regex;
mod utils;

pub use utils::{MONTH_NAMES, parse_month_name, publication_year_month};

/// One discussion paper as produced by the scraper.
///
/// Raw records are never modified; every later table is derived from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Discussion paper number, the unique key of the series
    pub dp_number: u32,
    /// Title of the paper
    #[serde(default)]
    pub title: Option<String>,
    /// Author names in byline order
    #[serde(default, deserialize_with = "utils::null_as_empty")]
    pub author_names: Vec<String>,
    /// Author profile links, parallel to `author_names`
    #[serde(default, deserialize_with = "utils::null_as_empty")]
    pub author_urls: Vec<String>,
    /// Free-text publication status
    #[serde(default)]
    pub published: Option<String>,
    /// Publication month name, e.g. "March"
    #[serde(default)]
    pub publication_date_month: Option<String>,
    /// Publication year, e.g. "2005"
    #[serde(default)]
    pub publication_date_year: Option<String>,
    /// Abstract text
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    /// Keywords
    #[serde(default, deserialize_with = "utils::null_as_empty")]
    pub keywords: Vec<String>,
    /// JEL codes exactly as scraped
    #[serde(default, deserialize_with = "utils::null_as_empty")]
    pub jel_codes: Vec<String>,
    /// Link to the full text, `None` when the paper has no file
    #[serde(default)]
    pub file_url: Option<String>,
}

/// A raw record with its position in the merged table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    /// Dense zero-based index, assigned after sorting by DP number
    pub row_index: usize,
    #[serde(flatten)]
    pub record: RawRecord,
}

/// The category a publication status string falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Appeared in a journal or book
    Published,
    /// Accepted but not yet out
    Forthcoming,
    /// Anything else, typically a pointer to another DP
    Other,
}

impl StatusKind {
    /// Column name used in exported tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Published => "published",
            StatusKind::Forthcoming => "forthcoming",
            StatusKind::Other => "other_publication_information",
        }
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified publication status, keeping the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationStatus {
    pub kind: StatusKind,
    pub text: String,
}

/// Tables store a status as three exclusive columns, one per [`StatusKind`].
mod status_columns {
    use crate::{PublicationStatus, StatusKind};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Default, Serialize, Deserialize)]
    struct Columns {
        #[serde(default)]
        published: Option<String>,
        #[serde(default)]
        forthcoming: Option<String>,
        #[serde(default)]
        other_publication_information: Option<String>,
    }

    pub fn serialize<S>(status: &Option<PublicationStatus>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut columns = Columns::default();
        if let Some(status) = status {
            let text = Some(status.text.clone());
            match status.kind {
                StatusKind::Published => columns.published = text,
                StatusKind::Forthcoming => columns.forthcoming = text,
                StatusKind::Other => columns.other_publication_information = text,
            }
        }
        columns.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<PublicationStatus>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let columns = Columns::deserialize(deserializer)?;
        let mut set = [
            (StatusKind::Published, columns.published),
            (StatusKind::Forthcoming, columns.forthcoming),
            (StatusKind::Other, columns.other_publication_information),
        ]
        .into_iter()
        .filter_map(|(kind, text)| text.map(|text| PublicationStatus { kind, text }));

        let status = set.next();
        if let Some(extra) = set.next() {
            return Err(D::Error::custom(format!(
                "status set in more than one column, including {}",
                extra.kind
            )));
        }
        Ok(status)
    }
}

/// A paper that survived cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub dp_number: u32,
    pub title: String,
    pub author_names: Vec<String>,
    pub author_urls: Vec<String>,
    /// Status string as scraped
    pub published_raw: Option<String>,
    /// Classified status, `None` when no status string was scraped. Stored
    /// as the `published`, `forthcoming` and `other_publication_information`
    /// columns.
    #[serde(flatten, with = "status_columns")]
    pub publication_status: Option<PublicationStatus>,
    /// DP number of the later paper replacing this one
    pub superseded: Option<u32>,
    /// First day of the publication month
    pub publication_year_month: NaiveDate,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub keywords: Vec<String>,
    /// Canonical JEL codes, sorted by letter then number
    pub jel_codes: Vec<JelCode>,
    pub file_url: String,
}

impl CleanedRecord {
    fn status_text(&self, kind: StatusKind) -> Option<&str> {
        self.publication_status
            .as_ref()
            .filter(|status| status.kind == kind)
            .map(|status| status.text.as_str())
    }

    /// Status text when the paper is published.
    pub fn published(&self) -> Option<&str> {
        self.status_text(StatusKind::Published)
    }

    /// Status text when the paper is forthcoming.
    pub fn forthcoming(&self) -> Option<&str> {
        self.status_text(StatusKind::Forthcoming)
    }

    /// Status text when it is neither published nor forthcoming.
    pub fn other_publication_information(&self) -> Option<&str> {
        self.status_text(StatusKind::Other)
    }
}

/// A cleaned paper inside the analysis window, with derived counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Dense zero-based index within the analysis table
    pub row_index: usize,
    #[serde(flatten)]
    pub paper: CleanedRecord,
    pub jel_codes_count: usize,
    pub authors_count: usize,
    /// Authors appearing in the series for the first time
    pub authors_new: usize,
    /// Authors who already appeared in an earlier month
    pub authors_returning: usize,
}

/// A supplier of raw records.
///
/// The scraper itself lives outside this crate; implementations read what it
/// produced.
pub trait RecordSource {
    /// Load every raw record, in source order.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] naming the input that could not be read.
    fn load(&self) -> Result<Vec<RawRecord>, LoadError>;
}
