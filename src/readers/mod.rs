pub mod parquet_reader;
pub mod statistics_reader;

pub use parquet_reader::{list_parquet_files, ParquetReader};
pub use statistics_reader::StatisticsReader;
