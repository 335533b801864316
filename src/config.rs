//! Run configuration.
//!
//! [`PipelineConfig`] names the directories a run works in and derives every
//! stage file from them; [`MetricsConfig`] holds the aggregation settings.
//!
//! # Examples
//!
//! ```
//! use jelcorpus::PipelineConfig;
//! use jelcorpus::clean::InvalidDatePolicy;
//!
//! let mut config = PipelineConfig::new("data/raw", "build");
//! config.cleaner.set_invalid_date_policy(InvalidDatePolicy::Drop);
//! config.metrics.set_rolling_window(12);
//!
//! assert_eq!(config.cleaned_path(), std::path::Path::new("build/cleaned.json"));
//! ```

use crate::clean::CleanerConfig;
use std::path::{Path, PathBuf};

pub const MERGED_FILE: &str = "merged.json";
pub const CLEANED_FILE: &str = "cleaned.json";
pub const CLEANED_CSV_FILE: &str = "cleaned.csv";
pub const ANALYSIS_FILE: &str = "analysis.json";
pub const ANALYSIS_CSV_FILE: &str = "analysis.csv";
pub const MONTHLY_TRENDS_FILE: &str = "monthly_trends.csv";
pub const CODE_FREQUENCIES_FILE: &str = "code_frequencies.csv";
pub const AUTHOR_FREQUENCIES_FILE: &str = "author_frequencies.csv";
pub const YEARLY_CODE_SHARES_FILE: &str = "yearly_code_shares.csv";
pub const CODE_CO_OCCURRENCE_FILE: &str = "code_co_occurrence.csv";
pub const TOPIC_SLOPES_FILE: &str = "topic_slopes.csv";
pub const TOPIC_TRENDS_FILE: &str = "topic_trends.csv";

/// Settings of the descriptive aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Months in the trailing rolling mean
    pub rolling_window: usize,
    /// Codes used at most this often are left out of the frequency table
    pub min_code_count: usize,
    /// Authors with at most this many papers are left out
    pub min_author_count: usize,
    /// Codes per year counted as common
    pub top_codes: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsConfig {
    /// Creates a new metrics configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            rolling_window: 6,
            min_code_count: 10,
            min_author_count: 5,
            top_codes: 3,
        }
    }

    pub fn set_rolling_window(&mut self, window: usize) -> &mut Self {
        self.rolling_window = window;
        self
    }

    pub fn set_min_code_count(&mut self, count: usize) -> &mut Self {
        self.min_code_count = count;
        self
    }

    pub fn set_min_author_count(&mut self, count: usize) -> &mut Self {
        self.min_author_count = count;
        self
    }

    pub fn set_top_codes(&mut self, n: usize) -> &mut Self {
        self.top_codes = n;
        self
    }
}

/// Where a pipeline run reads and writes.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory of per-paper raw record files
    pub raw_dir: PathBuf,
    /// Directory receiving every stage table
    pub build_dir: PathBuf,
    /// Document-topic matrix, when topic trends should be computed
    pub topics_path: Option<PathBuf>,
    /// Topics reported in each direction
    pub trending_topics: usize,
    pub cleaner: CleanerConfig,
    pub metrics: MetricsConfig,
}

impl PipelineConfig {
    /// Creates a configuration with default stage settings.
    pub fn new(raw_dir: impl Into<PathBuf>, build_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            build_dir: build_dir.into(),
            topics_path: None,
            trending_topics: 5,
            cleaner: CleanerConfig::new(),
            metrics: MetricsConfig::new(),
        }
    }

    /// Sets the document-topic matrix to read.
    pub fn set_topics_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.topics_path = Some(path.into());
        self
    }

    pub fn build_path(&self, file: &str) -> PathBuf {
        self.build_dir.join(file)
    }

    pub fn merged_path(&self) -> PathBuf {
        self.build_path(MERGED_FILE)
    }

    pub fn cleaned_path(&self) -> PathBuf {
        self.build_path(CLEANED_FILE)
    }

    pub fn cleaned_csv_path(&self) -> PathBuf {
        self.build_path(CLEANED_CSV_FILE)
    }

    pub fn analysis_path(&self) -> PathBuf {
        self.build_path(ANALYSIS_FILE)
    }

    pub fn analysis_csv_path(&self) -> PathBuf {
        self.build_path(ANALYSIS_CSV_FILE)
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }
}
