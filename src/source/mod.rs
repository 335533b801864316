//! Suppliers of raw records.
//!
//! The scraper writes one JSON object per paper, named after its DP number.
//! [`JsonDirSource`] reads such a directory; an in-memory slice of
//! [`RawRecord`]s is a source too, which is what tests and callers embedding
//! their own scraper use.
//!
//! # Example
//!
//! ```no_run
//! use jelcorpus::RecordSource;
//! use jelcorpus::source::JsonDirSource;
//!
//! let records = JsonDirSource::new("data/raw").load().unwrap();
//! println!("{} raw records", records.len());
//! ```

use crate::error::{LoadError, ValueError, fields};
use crate::{RawRecord, RecordSource};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Raw records stored as `*.json` files in one directory.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    /// Creates a source reading from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths of the record files, sorted so that load order is stable.
    fn record_paths(&self) -> Result<Vec<PathBuf>, LoadError> {
        if !self.dir.is_dir() {
            return Err(LoadError::MissingDirectory(self.dir.clone()));
        }

        let entries = fs::read_dir(&self.dir).map_err(|source| LoadError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LoadError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

impl RecordSource for JsonDirSource {
    fn load(&self) -> Result<Vec<RawRecord>, LoadError> {
        let paths = self.record_paths()?;

        #[cfg(feature = "parallel")]
        let records = paths
            .par_iter()
            .map(|path| read_record(path))
            .collect::<Result<Vec<_>, _>>()?;

        #[cfg(not(feature = "parallel"))]
        let records = paths
            .iter()
            .map(|path| read_record(path))
            .collect::<Result<Vec<_>, _>>()?;

        info!(dir = %self.dir.display(), records = records.len(), "loaded raw records");
        Ok(records)
    }
}

impl RecordSource for [RawRecord] {
    fn load(&self) -> Result<Vec<RawRecord>, LoadError> {
        Ok(self.to_vec())
    }
}

/// Read and validate one record file.
fn read_record(path: &Path) -> Result<RawRecord, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let record: RawRecord = serde_json::from_str(&content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if record.dp_number == 0 {
        return Err(LoadError::Record {
            path: path.to_path_buf(),
            error: ValueError::BadValue {
                field: fields::DP_NUMBER,
                value: record.dp_number.to_string(),
                reason: "DP numbers start at 1".to_string(),
            },
        });
    }

    debug!(path = %path.display(), dp_number = record.dp_number, "read raw record");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    #[test]
    fn test_load_directory() {
        let dir = TempDir::new().unwrap();
        write(&dir, "20.json", r#"{"dp_number": 20, "title": "B"}"#);
        write(&dir, "10.json", r#"{"dp_number": 10, "title": "A", "jel_codes": null}"#);
        write(&dir, "notes.txt", "not a record");

        let records = JsonDirSource::new(dir.path()).load().unwrap();
        let numbers: Vec<u32> = records.iter().map(|r| r.dp_number).collect();
        assert_eq!(numbers, vec![10, 20]);
        assert!(records[0].jel_codes.is_empty());
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = JsonDirSource::new(&missing).load().unwrap_err();
        assert!(matches!(err, LoadError::MissingDirectory(path) if path == missing));
    }

    #[test]
    fn test_malformed_file_is_named() {
        let dir = TempDir::new().unwrap();
        write(&dir, "10.json", r#"{"dp_number": 10}"#);
        write(&dir, "11.json", r#"{"dp_number": "#);

        let err = JsonDirSource::new(dir.path()).load().unwrap_err();
        match err {
            LoadError::Json { path, .. } => assert!(path.ends_with("11.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_dp_number_is_rejected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "0.json", r#"{"dp_number": 0}"#);

        let err = JsonDirSource::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, LoadError::Record { .. }));
    }

    #[test]
    fn test_in_memory_source() {
        let records = vec![RawRecord {
            dp_number: 7,
            ..Default::default()
        }];
        assert_eq!(records.load().unwrap(), records);
    }
}
