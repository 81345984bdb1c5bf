/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "METEO_NORMALIZER";

/// Output file name markers
pub const NORMALIZED_SUFFIX: &str = "normalized";
pub const RESTORED_SUFFIX: &str = "restored";
pub const PARQUET_EXTENSION: &str = "parquet";

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_READ_BATCH_SIZE: usize = 8192;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
