use crate::processors::Direction;
use crate::utils::constants::{NORMALIZED_SUFFIX, PARQUET_EXTENSION, RESTORED_SUFFIX};
use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};

/// Output file name for a transformed input: {stem}-{normalized|restored}-{YYMMDD}.parquet
pub fn generate_output_filename(input: &Path, direction: Direction) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "weather".to_string());
    let suffix = match direction {
        Direction::Forward => NORMALIZED_SUFFIX,
        Direction::Inverse => RESTORED_SUFFIX,
    };

    PathBuf::from(format!(
        "{}-{}-{:02}{:02}{:02}.{}",
        stem,
        suffix,
        year,
        now.month(),
        now.day(),
        PARQUET_EXTENSION
    ))
}

/// Default output path: the generated file name next to the input file
pub fn default_output_path(input: &Path, direction: Direction) -> PathBuf {
    input.with_file_name(generate_output_filename(input, direction))
}
