//! Error types for the pipeline stages.
//!
//! Each stage has its own error type carrying the context needed to find the
//! offending input (file path, DP number, CSV line). They all fold into
//! [`PipelineError`] for the driver.

use std::path::PathBuf;
use thiserror::Error;

/// Field name constants for consistent error reporting.
pub mod fields {
    pub const DP_NUMBER: &str = "dp_number";
    pub const TITLE: &str = "title";
    pub const FILE_URL: &str = "file_url";
    pub const PUBLICATION_DATE_MONTH: &str = "publication_date_month";
    pub const PUBLICATION_DATE_YEAR: &str = "publication_date_year";
    pub const PUBLICATION_YEAR_MONTH: &str = "publication_year_month";
    pub const JEL_CODES: &str = "jel_codes";
    pub const TOPIC_WEIGHT: &str = "topic_weight";
}

/// Top-level error type for a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Clean(#[from] CleanError),

    #[error(transparent)]
    Topics(#[from] TopicsError),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON table {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid CSV table {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Failure to load the scraper's raw records.
///
/// Every variant names the file it came from; one bad file never hides
/// which paper it belongs to.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Raw record directory {0} does not exist")]
    MissingDirectory(PathBuf),

    #[error("Failed to read raw record {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed raw record {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid raw record {path}: {error}")]
    Record { path: PathBuf, error: ValueError },
}

/// Failure while cleaning a merged row.
#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Invalid publication date for DP {dp_number}: {error}")]
    InvalidDate { dp_number: u32, error: ValueError },
}

impl CleanError {
    /// DP number of the row that failed.
    pub fn dp_number(&self) -> u32 {
        match self {
            CleanError::InvalidDate { dp_number, .. } => *dp_number,
        }
    }
}

/// Error reading the document-topic matrix.
#[derive(Error, Debug)]
#[error("Error in document-topic matrix{}: {error}",
    match line {
        Some(l) => format!(" at line {}", l),
        None => String::new(),
    }
)]
pub struct TopicsError {
    /// Line number where the error occurred (1-based, None if not available)
    pub line: Option<usize>,
    /// The specific error that occurred
    pub error: ValueError,
}

impl TopicsError {
    /// Create a TopicsError with line information.
    pub fn at_line(line: usize, error: ValueError) -> Self {
        Self {
            line: Some(line),
            error,
        }
    }

    /// Create a TopicsError without position information.
    pub fn without_position(error: ValueError) -> Self {
        Self { line: None, error }
    }
}

/// Specific value-level errors.
#[derive(Error, Debug)]
pub enum ValueError {
    #[error("Bad syntax: {0}")]
    Syntax(String),

    #[error("Missing value for {field}")]
    MissingValue { field: &'static str },

    #[error("Bad value for {field}: \"{value}\" ({reason})")]
    BadValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl From<csv::Error> for TopicsError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|position| position.line() as usize);
        TopicsError {
            line,
            error: ValueError::Syntax(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_error_display() {
        let error = CleanError::InvalidDate {
            dp_number: 4711,
            error: ValueError::BadValue {
                field: fields::PUBLICATION_DATE_MONTH,
                value: "Sept".to_string(),
                reason: "not a month name".to_string(),
            },
        };

        assert_eq!(error.dp_number(), 4711);
        assert_eq!(
            format!("{}", error),
            "Invalid publication date for DP 4711: Bad value for publication_date_month: \"Sept\" (not a month name)"
        );
    }

    #[test]
    fn test_topics_error_display() {
        let error = TopicsError::at_line(
            42,
            ValueError::MissingValue {
                field: fields::DP_NUMBER,
            },
        );
        let display = format!("{}", error);
        assert!(display.contains("line 42"));
        assert!(display.contains("Missing value for dp_number"));

        let error = TopicsError::without_position(ValueError::Syntax("no header".to_string()));
        assert!(!format!("{}", error).contains("line"));
    }

    #[test]
    fn test_pipeline_error_is_transparent() {
        let error: PipelineError = LoadError::MissingDirectory(PathBuf::from("raw")).into();
        assert_eq!(
            format!("{}", error),
            "Raw record directory raw does not exist"
        );
    }

    #[test]
    fn test_csv_error_conversion() {
        let csv_content = "a,b\nc,d,e";
        let mut reader = csv::Reader::from_reader(csv_content.as_bytes());
        let result = reader.records().next();

        if let Some(Err(csv_err)) = result {
            let err: TopicsError = csv_err.into();
            assert!(matches!(err.error, ValueError::Syntax(_)));
        }
    }
}
