use anyhow::{Context, Result};
use csv::{Reader, ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::{Path, PathBuf};

use super::record::HeaderIndex;
use crate::schema::TableSchema;

/// An opened CSV input whose header has been checked against a schema
pub struct CsvSource {
    path: PathBuf,
    reader: Reader<File>,
    headers: StringRecord,
    index: HeaderIndex,
}

impl CsvSource {
    pub fn open(path: &Path, schema: &TableSchema) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open input CSV: {:?}", path))?;

        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read CSV header: {:?}", path))?
            .clone();

        let index = HeaderIndex::new(&headers, schema)
            .with_context(|| format!("Unexpected CSV header in {:?}", path))?;

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            headers,
            index,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn index(&self) -> &HeaderIndex {
        &self.index
    }

    /// Read the next data record. Reader-level failures (I/O, invalid
    /// UTF-8) are fatal and carry the 1-based record position.
    pub fn next_record(&mut self, record: &mut StringRecord, ordinal: u64) -> Result<bool> {
        self.reader
            .read_record(record)
            .with_context(|| format!("Failed to read record {} of {:?}", ordinal, self.path))
    }
}
