use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use tracing::debug;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size.max(1);
        self
    }

    fn properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }

    /// Write a single table to a Parquet file
    pub fn write_batch(&self, batch: &RecordBatch, path: &Path) -> Result<()> {
        self.write_batches(std::slice::from_ref(batch), path)
    }

    /// Write tables sharing one schema to a Parquet file
    pub fn write_batches(&self, batches: &[RecordBatch], path: &Path) -> Result<()> {
        let schema = match batches.first() {
            Some(batch) => batch.schema(),
            None => {
                return Err(ProcessingError::InvalidFormat(
                    "No batches to write".to_string(),
                ))
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, schema, Some(self.properties()))?;
        for batch in batches {
            writer.write(batch)?;
        }
        writer.close()?;

        debug!(
            path = %path.display(),
            rows = batches.iter().map(|b| b.num_rows()).sum::<usize>(),
            "Wrote Parquet file"
        );
        Ok(())
    }

    /// Get file statistics. The codec is read from the file itself, not
    /// from this writer's settings.
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let columns = file_metadata
            .schema_descr()
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        let compression = metadata
            .row_groups()
            .first()
            .and_then(|group| group.columns().first())
            .map(|column| column.compression());

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            columns,
            file_size,
            compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub columns: Vec<String>,
    pub file_size: u64,
    /// `None` when the file has no row groups to read a codec from
    pub compression: Option<Compression>,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };
        let compression = match self.compression {
            Some(codec) => format!("{:?}", codec),
            None => "n/a".to_string(),
        };

        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Columns: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.columns.join(", "),
            self.row_groups,
            self.file_size as f64 / 1_048_576.0, // Convert to MB
            compression,
            avg_rows
        )
    }
}
