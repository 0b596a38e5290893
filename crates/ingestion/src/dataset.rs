//! Raw CSV dataset loading and writing
//!
//! Rows are kept as untyped string records in file order; the header row is
//! carried through unchanged so the train/test files have the same columns as
//! the raw file. Short rows are padded with empty fields, rows longer than the
//! header are rejected.

use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use thiserror::Error;

use crate::storage::{stage, StagedFile};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("malformed CSV")]
    Csv(#[from] csv::Error),

    #[error("I/O error")]
    Io(#[from] io::Error),

    #[error("{0} has no header row")]
    MissingHeader(PathBuf),

    #[error("line {line}: expected at most {expected} fields, found {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
}

/// Header plus ordered data rows
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawDataset {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl RawDataset {
    pub fn new(headers: StringRecord, rows: Vec<StringRecord>) -> Self {
        Self { headers, rows }
    }

    /// Load a CSV file whose first line is the header. Values are not
    /// type-checked.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(DatasetError::MissingHeader(path.to_path_buf()));
        }

        let width = headers.len();
        let mut rows = Vec::new();
        for record in reader.records() {
            let mut record = record?;
            if record.len() > width {
                return Err(DatasetError::TooManyFields {
                    line: record.position().map_or(0, |pos| pos.line()),
                    expected: width,
                    found: record.len(),
                });
            }
            while record.len() < width {
                record.push_field("");
            }
            rows.push(record);
        }

        Ok(Self { headers, rows })
    }

    /// Write header and rows to `path`, replacing any existing file. No index
    /// column is added. The file appears only once fully written.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), DatasetError> {
        self.stage_csv(path)?.persist()?;
        Ok(())
    }

    /// Write the CSV next to `path` without making it visible yet.
    pub fn stage_csv<P: AsRef<Path>>(&self, path: P) -> Result<StagedFile, DatasetError> {
        stage(path.as_ref(), |file| {
            let mut writer = WriterBuilder::new().from_writer(file);
            writer.write_record(&self.headers)?;
            for row in &self.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
            Ok::<(), DatasetError>(())
        })
    }

    /// Copy of the rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            headers: self.headers.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn create_test_csv() -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "id,name,price")?;
        writeln!(file, "1,\"Hotel, Lisbon\",120.5")?;
        writeln!(file, "2,Porto,80")?;
        writeln!(file, "3,Faro,")?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_csv() -> Result<()> {
        let file = create_test_csv()?;
        let dataset = RawDataset::from_csv(file.path())?;

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.column_count(), 3);
        assert_eq!(dataset.headers, StringRecord::from(vec!["id", "name", "price"]));
        assert_eq!(&dataset.rows[0][1], "Hotel, Lisbon");
        assert_eq!(&dataset.rows[2][2], "");

        Ok(())
    }

    #[test]
    fn test_write_then_reload_preserves_quoting() -> Result<()> {
        let file = create_test_csv()?;
        let dataset = RawDataset::from_csv(file.path())?;

        let dir = TempDir::new()?;
        let out = dir.path().join("copy.csv");
        dataset.write_csv(&out)?;

        let written = std::fs::read_to_string(&out)?;
        assert!(written.starts_with("id,name,price\n"));
        assert!(written.contains("\"Hotel, Lisbon\""));
        assert_eq!(RawDataset::from_csv(&out)?, dataset);

        Ok(())
    }

    #[test]
    fn test_write_overwrites_existing_file() -> Result<()> {
        let dir = TempDir::new()?;
        let out = dir.path().join("train.csv");
        std::fs::write(&out, "stale contents that are longer than the new file\n")?;

        let dataset = RawDataset::new(
            StringRecord::from(vec!["a"]),
            vec![StringRecord::from(vec!["1"])],
        );
        dataset.write_csv(&out)?;

        assert_eq!(std::fs::read_to_string(&out)?, "a\n1\n");
        Ok(())
    }

    #[test]
    fn test_select_keeps_header_and_order() -> Result<()> {
        let file = create_test_csv()?;
        let dataset = RawDataset::from_csv(file.path())?;

        let subset = dataset.select(&[2, 0]);
        assert_eq!(subset.headers, dataset.headers);
        assert_eq!(subset.rows, vec![dataset.rows[2].clone(), dataset.rows[0].clone()]);

        Ok(())
    }

    #[test]
    fn test_empty_file_has_no_header() -> Result<()> {
        let file = NamedTempFile::new()?;
        let err = RawDataset::from_csv(file.path()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingHeader(_)));
        Ok(())
    }

    #[test]
    fn test_short_rows_are_padded() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "id,name,price")?;
        writeln!(file, "1,Porto")?;
        file.flush()?;

        let dataset = RawDataset::from_csv(file.path())?;
        assert_eq!(dataset.rows[0], StringRecord::from(vec!["1", "Porto", ""]));
        Ok(())
    }

    #[test]
    fn test_long_row_is_rejected() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "id,label")?;
        writeln!(file, "1,0")?;
        writeln!(file, "10,1,EXTRA,FIELDS")?;
        file.flush()?;

        let err = RawDataset::from_csv(file.path()).unwrap_err();
        match err {
            DatasetError::TooManyFields {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 2);
                assert_eq!(found, 4);
            }
            other => panic!("unexpected error: {}", other),
        }
        Ok(())
    }

    #[test]
    fn test_staged_csv_is_invisible_until_persisted() -> Result<()> {
        let dir = TempDir::new()?;
        let out = dir.path().join("train.csv");
        let dataset = RawDataset::new(
            StringRecord::from(vec!["a"]),
            vec![StringRecord::from(vec!["1"])],
        );

        let staged = dataset.stage_csv(&out)?;
        assert!(!out.exists());
        staged.persist()?;
        assert_eq!(std::fs::read_to_string(&out)?, "a\n1\n");
        Ok(())
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(RawDataset::from_csv("definitely/not/here.csv").is_err());
    }
}
