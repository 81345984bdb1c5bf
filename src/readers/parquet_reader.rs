use crate::error::{ProcessingError, Result};
use crate::utils::constants::DEFAULT_READ_BATCH_SIZE;
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ParquetReader {
    batch_size: usize,
}

impl ParquetReader {
    pub fn new() -> Self {
        Self {
            batch_size: DEFAULT_READ_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Read every record batch in a Parquet file.
    pub fn read_batches(&self, path: &Path) -> Result<Vec<RecordBatch>> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(self.batch_size)
            .build()?;

        let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(path = %path.display(), batches = batches.len(), "Read Parquet file");
        Ok(batches)
    }

    /// Read a Parquet file into a single table.
    pub fn read_table(&self, path: &Path) -> Result<RecordBatch> {
        let file = File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let schema = builder.schema().clone();
        let reader = builder.with_batch_size(self.batch_size).build()?;

        let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(concat_batches(&schema, &batches)?)
    }
}

impl Default for ParquetReader {
    fn default() -> Self {
        Self::new()
    }
}

/// List the `.parquet` files in a directory, sorted by name. An empty
/// `pattern` matches every file; otherwise the file name must contain it.
pub fn list_parquet_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ProcessingError::Config(format!(
            "Input path is not a directory: {}",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_parquet = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| pattern.is_empty() || name.contains(pattern));

        if path.is_file() && is_parquet && matches {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
