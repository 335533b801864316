//! Reading and writing stage tables.
//!
//! Stages hand tables to each other as JSON, which keeps list and optional
//! fields intact. The cleaned and analysis tables are also exported as CSV for
//! plotting tools, with list cells joined by `"; "` and the publication status
//! spread over one column per category.

use crate::error::PipelineError;
use crate::utils::join_list;
use crate::{AnalysisRecord, CleanedRecord, JelCode};
use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

/// Write a value as pretty-printed JSON, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PipelineError> {
    create_parent(path)?;
    let file = fs::File::create(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .map_err(|e| PipelineError::json(path, e))?;
    debug!(path = %path.display(), "wrote JSON table");
    Ok(())
}

/// Read a JSON table.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| PipelineError::json(path, e))
}

/// Write rows as CSV with a header taken from the row type.
pub fn write_csv<I, R>(path: &Path, rows: I) -> Result<(), PipelineError>
where
    I: IntoIterator<Item = R>,
    R: Serialize,
{
    create_parent(path)?;
    let mut writer = csv::Writer::from_path(path).map_err(|e| PipelineError::csv(path, e))?;
    let mut count = 0;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| PipelineError::csv(path, e))?;
        count += 1;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))?;
    debug!(path = %path.display(), rows = count, "wrote CSV table");
    Ok(())
}

fn create_parent(path: &Path) -> Result<(), PipelineError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))
        }
        _ => Ok(()),
    }
}

fn join_codes(codes: &[JelCode]) -> String {
    join_list(&codes.iter().map(JelCode::as_str).collect::<Vec<_>>())
}

/// Flat CSV row of the cleaned table.
#[derive(Debug, Serialize)]
pub struct CleanedRow<'a> {
    pub dp_number: u32,
    pub title: &'a str,
    pub author_names: String,
    pub author_urls: String,
    pub published: Option<&'a str>,
    pub forthcoming: Option<&'a str>,
    pub other_publication_information: Option<&'a str>,
    pub superseded: Option<u32>,
    pub publication_year_month: NaiveDate,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<&'a str>,
    pub keywords: String,
    pub jel_codes: String,
    pub file_url: &'a str,
}

impl<'a> From<&'a CleanedRecord> for CleanedRow<'a> {
    fn from(record: &'a CleanedRecord) -> Self {
        Self {
            dp_number: record.dp_number,
            title: &record.title,
            author_names: join_list(&record.author_names),
            author_urls: join_list(&record.author_urls),
            published: record.published(),
            forthcoming: record.forthcoming(),
            other_publication_information: record.other_publication_information(),
            superseded: record.superseded,
            publication_year_month: record.publication_year_month,
            abstract_text: record.abstract_text.as_deref(),
            keywords: join_list(&record.keywords),
            jel_codes: join_codes(&record.jel_codes),
            file_url: &record.file_url,
        }
    }
}

/// Flat CSV row of the analysis table: every cleaned column plus the counts.
#[derive(Debug, Serialize)]
pub struct AnalysisRow<'a> {
    pub row_index: usize,
    pub dp_number: u32,
    pub title: &'a str,
    pub author_names: String,
    pub author_urls: String,
    pub published: Option<&'a str>,
    pub forthcoming: Option<&'a str>,
    pub other_publication_information: Option<&'a str>,
    pub superseded: Option<u32>,
    pub publication_year_month: NaiveDate,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<&'a str>,
    pub keywords: String,
    pub jel_codes: String,
    pub file_url: &'a str,
    pub jel_codes_count: usize,
    pub authors_count: usize,
    pub authors_new: usize,
    pub authors_returning: usize,
}

impl<'a> From<&'a AnalysisRecord> for AnalysisRow<'a> {
    fn from(record: &'a AnalysisRecord) -> Self {
        let paper = &record.paper;
        Self {
            row_index: record.row_index,
            dp_number: paper.dp_number,
            title: &paper.title,
            author_names: join_list(&paper.author_names),
            author_urls: join_list(&paper.author_urls),
            published: paper.published(),
            forthcoming: paper.forthcoming(),
            other_publication_information: paper.other_publication_information(),
            superseded: paper.superseded,
            publication_year_month: paper.publication_year_month,
            abstract_text: paper.abstract_text.as_deref(),
            keywords: join_list(&paper.keywords),
            jel_codes: join_codes(&paper.jel_codes),
            file_url: &paper.file_url,
            jel_codes_count: record.jel_codes_count,
            authors_count: record.authors_count,
            authors_new: record.authors_new,
            authors_returning: record.authors_returning,
        }
    }
}

/// Export the cleaned table as CSV.
pub fn write_cleaned_csv(path: &Path, records: &[CleanedRecord]) -> Result<(), PipelineError> {
    write_csv(path, records.iter().map(CleanedRow::from))
}

/// Export the analysis table as CSV.
pub fn write_analysis_csv(path: &Path, records: &[AnalysisRecord]) -> Result<(), PipelineError> {
    write_csv(path, records.iter().map(AnalysisRow::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PublicationStatus, StatusKind};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn record() -> CleanedRecord {
        CleanedRecord {
            dp_number: 1500,
            title: "Minimum Wages, Revisited".to_string(),
            author_names: vec!["Jane Doe".to_string(), "John Roe".to_string()],
            author_urls: Vec::new(),
            published_raw: Some("Published in: Kyklos".to_string()),
            publication_status: Some(PublicationStatus {
                kind: StatusKind::Published,
                text: "Published in: Kyklos".to_string(),
            }),
            superseded: None,
            publication_year_month: NaiveDate::from_ymd_opt(2005, 3, 1).unwrap(),
            abstract_text: None,
            keywords: vec!["wages".to_string()],
            jel_codes: vec![JelCode::parse("J31").unwrap(), JelCode::parse("J38").unwrap()],
            file_url: "https://example.org/1500.pdf".to_string(),
        }
    }

    #[test]
    fn test_json_round_trip_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cleaned.json");

        write_json(&path, &vec![record()]).unwrap();
        let back: Vec<CleanedRecord> = read_json(&path).unwrap();
        assert_eq!(back, vec![record()]);
    }

    #[test]
    fn test_read_json_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "[{").unwrap();

        let err = read_json::<Vec<CleanedRecord>>(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Json { path: ref p, .. } if p == &path));
    }

    #[test]
    fn test_cleaned_csv_flattens_lists_and_status() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cleaned.csv");
        write_cleaned_csv(&path, &[record()]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        let row = reader.records().next().unwrap().unwrap();
        let cell = |name: &str| {
            let index = headers.iter().position(|h| h == name).unwrap();
            row.get(index).unwrap().to_string()
        };

        assert_eq!(cell("author_names"), "Jane Doe; John Roe");
        assert_eq!(cell("jel_codes"), "J31; J38");
        assert_eq!(cell("published"), "Published in: Kyklos");
        assert_eq!(cell("forthcoming"), "");
        assert_eq!(cell("publication_year_month"), "2005-03-01");
        assert_eq!(cell("title"), "Minimum Wages, Revisited");
    }

    #[test]
    fn test_analysis_csv_carries_cleaned_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("analysis.csv");
        let analysis = AnalysisRecord {
            row_index: 0,
            paper: CleanedRecord {
                abstract_text: Some("We study wages.".to_string()),
                author_urls: vec!["/p/doe".to_string(), "/p/roe".to_string()],
                ..record()
            },
            jel_codes_count: 2,
            authors_count: 2,
            authors_new: 2,
            authors_returning: 0,
        };
        write_analysis_csv(&path, &[analysis]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(
            headers,
            vec![
                "row_index",
                "dp_number",
                "title",
                "author_names",
                "author_urls",
                "published",
                "forthcoming",
                "other_publication_information",
                "superseded",
                "publication_year_month",
                "abstract",
                "keywords",
                "jel_codes",
                "file_url",
                "jel_codes_count",
                "authors_count",
                "authors_new",
                "authors_returning",
            ]
        );

        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[4], "/p/doe; /p/roe");
        assert_eq!(&row[10], "We study wages.");
        assert_eq!(&row[11], "wages");
        assert_eq!(&row[13], "https://example.org/1500.pdf");
    }

    #[test]
    fn test_analysis_json_has_flat_status_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("analysis.json");
        let analysis = AnalysisRecord {
            row_index: 3,
            paper: record(),
            jel_codes_count: 2,
            authors_count: 2,
            authors_new: 1,
            authors_returning: 1,
        };
        write_json(&path, &vec![analysis.clone()]).unwrap();

        let value: serde_json::Value = read_json(&path).unwrap();
        assert_eq!(value[0]["published"], "Published in: Kyklos");
        assert_eq!(value[0]["forthcoming"], serde_json::Value::Null);
        assert_eq!(value[0]["authors_new"], 1);

        let back: Vec<AnalysisRecord> = read_json(&path).unwrap();
        assert_eq!(back, vec![analysis]);
    }
}
