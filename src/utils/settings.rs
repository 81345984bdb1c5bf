use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    COMPRESSION_SNAPPY, DEFAULT_READ_BATCH_SIZE, DEFAULT_ROW_GROUP_SIZE, ENV_PREFIX,
};
use crate::writers::ParquetWriter;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime settings, layered as defaults, then an optional settings file,
/// then `METEO_NORMALIZER_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub compression: String,
    pub row_group_size: usize,
    pub batch_size: usize,
    pub max_workers: usize,
    pub parallel_columns: bool,
    pub statistics_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compression: COMPRESSION_SNAPPY.to_string(),
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            batch_size: DEFAULT_READ_BATCH_SIZE,
            max_workers: num_cpus::get(),
            parallel_columns: false,
            statistics_path: None,
        }
    }
}

impl Settings {
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();

        let mut builder = Config::builder()
            .set_default("compression", defaults.compression.as_str())?
            .set_default("row_group_size", defaults.row_group_size as i64)?
            .set_default("batch_size", defaults.batch_size as i64)?
            .set_default("max_workers", defaults.max_workers as i64)?
            .set_default("parallel_columns", defaults.parallel_columns)?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.check()?;
        Ok(settings)
    }

    fn check(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(ProcessingError::Config(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if self.row_group_size == 0 || self.batch_size == 0 {
            return Err(ProcessingError::Config(
                "row_group_size and batch_size must be positive".to_string(),
            ));
        }
        // Surface a bad compression name at load time rather than on first write
        self.writer().map(|_| ())
    }

    pub fn writer(&self) -> Result<ParquetWriter> {
        Ok(ParquetWriter::new()
            .with_compression(&self.compression)?
            .with_row_group_size(self.row_group_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn settings_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.compression, "snappy");
        assert_eq!(settings.row_group_size, DEFAULT_ROW_GROUP_SIZE);
        assert!(settings.statistics_path.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = settings_file(
            "compression = \"zstd\"\nmax_workers = 3\nstatistics_path = \"stats/europe.json\"\n",
        );
        let settings = Settings::load(Some(file.path())).unwrap();

        assert_eq!(settings.compression, "zstd");
        assert_eq!(settings.max_workers, 3);
        assert_eq!(settings.batch_size, DEFAULT_READ_BATCH_SIZE);
        assert_eq!(
            settings.statistics_path,
            Some(PathBuf::from("stats/europe.json"))
        );
    }

    #[test]
    fn test_invalid_compression_rejected() {
        let file = settings_file("compression = \"rar\"\n");
        assert!(matches!(
            Settings::load(Some(file.path())),
            Err(ProcessingError::Config(_))
        ));
    }

    #[test]
    fn test_missing_settings_file() {
        let result = Settings::load(Some(Path::new("/nonexistent/meteo.toml")));
        assert!(matches!(result, Err(ProcessingError::Settings(_))));
    }
}
