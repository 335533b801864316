//! Cleaning of the merged table.
//!
//! The cleaner turns merged raw rows into [`CleanedRecord`]s. It keeps only
//! rows with a title and a full-text link, classifies the publication status,
//! detects papers replaced by a later number of the series, canonicalises the
//! JEL codes, and finally drops superseded rows and rows without a usable
//! code.
//!
//! # Example
//!
//! ```
//! use jelcorpus::RawRecord;
//! use jelcorpus::clean::Cleaner;
//! use jelcorpus::merge::Merger;
//!
//! let paper = |dp_number: u32, status: &str| RawRecord {
//!     dp_number,
//!     title: Some(format!("Paper {}", dp_number)),
//!     published: Some(status.to_string()),
//!     publication_date_month: Some("May".to_string()),
//!     publication_date_year: Some("2004".to_string()),
//!     jel_codes: vec!["J31".to_string()],
//!     file_url: Some(format!("https://example.org/{}.pdf", dp_number)),
//!     ..Default::default()
//! };
//!
//! let merged = Merger::new().merge(vec![
//!     paper(1200, "mimeo"),
//!     paper(1500, "Published as: IZA DP No. 1200"),
//! ]);
//! let report = Cleaner::new().clean(&merged).unwrap();
//!
//! assert_eq!(report.superseded.get(&1200), Some(&1500));
//! assert_eq!(report.records.len(), 1);
//! assert_eq!(report.records[0].dp_number, 1500);
//! ```

pub mod fuzzy;
pub mod jel;
mod overrides;
pub mod status;
pub mod supersede;

use crate::error::CleanError;
use crate::merge::MergedTable;
use crate::utils::publication_year_month;
use crate::{CleanedRecord, RawRecord, StatusKind};
use jel::canonicalize_jel_codes;
use status::{DEFAULT_MAX_EDITS, StatusClassifier};
use std::collections::HashSet;
use supersede::{SupersedeMap, extract_series_reference, link_superseded};
use tracing::{debug, info, warn};

/// What to do with a row whose publication date cannot be built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidDatePolicy {
    /// Abort cleaning with [`CleanError::InvalidDate`]
    #[default]
    Fail,
    /// Exclude the row and log a warning
    Drop,
}

/// Configuration for the [`Cleaner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanerConfig {
    /// Edit distance tolerated when matching status patterns
    pub max_edits: usize,
    /// Handling of unknown month names and unparsable years
    pub invalid_date_policy: InvalidDatePolicy,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CleanerConfig {
    /// Creates a new cleaner configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_edits: DEFAULT_MAX_EDITS,
            invalid_date_policy: InvalidDatePolicy::Fail,
        }
    }

    /// Sets the edit distance tolerated by the status rules
    pub fn set_max_edits(&mut self, max_edits: usize) -> &mut Self {
        self.max_edits = max_edits;
        self
    }

    /// Sets the invalid date policy
    pub fn set_invalid_date_policy(&mut self, policy: InvalidDatePolicy) -> &mut Self {
        self.invalid_date_policy = policy;
        self
    }
}

/// Outcome of a cleaning run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    /// Retained rows in ascending DP number order
    pub records: Vec<CleanedRecord>,
    /// Every superseding link found, including those of dropped rows
    pub superseded: SupersedeMap,
    /// Rows excluded for lacking a title or a file link
    pub missing_fields: usize,
    /// Rows excluded under [`InvalidDatePolicy::Drop`]
    pub invalid_dates: usize,
    /// Rows dropped because a later paper replaces them
    pub superseded_dropped: usize,
    /// Rows dropped because no JEL code survived canonicalisation
    pub empty_codes: usize,
}

/// Cleans a [`MergedTable`].
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    config: CleanerConfig,
    classifier: StatusClassifier,
}

impl Cleaner {
    /// Creates a cleaner with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cleaner with a custom configuration.
    #[must_use]
    pub fn with_config(config: CleanerConfig) -> Self {
        Self {
            classifier: StatusClassifier::new().with_max_edits(config.max_edits),
            config,
        }
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Clean every row of the merged table.
    ///
    /// # Errors
    ///
    /// Returns [`CleanError::InvalidDate`] for the first row whose date cannot
    /// be built, unless the policy is [`InvalidDatePolicy::Drop`].
    pub fn clean(&self, merged: &MergedTable) -> Result<CleanReport, CleanError> {
        let mut report = CleanReport::default();
        let mut candidates = Vec::with_capacity(merged.len());

        for raw in merged.records() {
            let Some(mut record) = self.clean_row(raw, &mut report)? else {
                continue;
            };
            record.jel_codes = canonicalize_jel_codes(raw.dp_number, &raw.jel_codes);
            candidates.push(record);
        }

        let known: HashSet<u32> = candidates.iter().map(|record| record.dp_number).collect();
        let references = candidates
            .iter()
            .filter(|record| {
                record
                    .publication_status
                    .as_ref()
                    .is_some_and(|status| status.kind == StatusKind::Other)
            })
            .map(|record| {
                let reference = record
                    .other_publication_information()
                    .and_then(extract_series_reference);
                (record.dp_number, reference)
            });
        report.superseded = link_superseded(references, &known);

        for mut record in candidates {
            record.superseded = report.superseded.get(&record.dp_number).copied();
            if let Some(successor) = record.superseded {
                debug!(dp_number = record.dp_number, successor, "superseded paper dropped");
                report.superseded_dropped += 1;
                continue;
            }
            if record.jel_codes.is_empty() {
                debug!(dp_number = record.dp_number, "paper without usable JEL codes dropped");
                report.empty_codes += 1;
                continue;
            }
            report.records.push(record);
        }

        info!(
            input = merged.len(),
            retained = report.records.len(),
            missing_fields = report.missing_fields,
            invalid_dates = report.invalid_dates,
            superseded = report.superseded_dropped,
            empty_codes = report.empty_codes,
            "cleaned merged table"
        );
        Ok(report)
    }

    /// Build the cleaned row for one raw record, without codes or links.
    ///
    /// Returns `None` when the row is excluded.
    fn clean_row(
        &self,
        raw: &RawRecord,
        report: &mut CleanReport,
    ) -> Result<Option<CleanedRecord>, CleanError> {
        let (Some(title), Some(file_url)) = (&raw.title, &raw.file_url) else {
            debug!(dp_number = raw.dp_number, "row without title or file link skipped");
            report.missing_fields += 1;
            return Ok(None);
        };

        let date = publication_year_month(
            raw.publication_date_year.as_deref(),
            raw.publication_date_month.as_deref(),
        );
        let publication_year_month = match (date, self.config.invalid_date_policy) {
            (Ok(date), _) => date,
            (Err(error), InvalidDatePolicy::Fail) => {
                return Err(CleanError::InvalidDate {
                    dp_number: raw.dp_number,
                    error,
                });
            }
            (Err(error), InvalidDatePolicy::Drop) => {
                warn!(dp_number = raw.dp_number, %error, "row with invalid date dropped");
                report.invalid_dates += 1;
                return Ok(None);
            }
        };

        Ok(Some(CleanedRecord {
            dp_number: raw.dp_number,
            title: title.clone(),
            author_names: raw.author_names.clone(),
            author_urls: raw.author_urls.clone(),
            published_raw: raw.published.clone(),
            publication_status: self.classifier.classify(raw.published.as_deref()),
            superseded: None,
            publication_year_month,
            abstract_text: raw.abstract_text.clone(),
            keywords: raw.keywords.clone(),
            jel_codes: Vec::new(),
            file_url: file_url.clone(),
        }))
    }
}
