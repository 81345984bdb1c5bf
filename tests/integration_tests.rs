use clap::Parser;
use meteo_normalizer::cli::{Cli, Commands};
use meteo_normalizer::models::{
    batch_to_rows, normalized_columns, raw_columns, rows_to_batch, Feature, FeatureStat,
    FeatureStatistics, RawRow,
};
use meteo_normalizer::processors::{Direction, Normalizer, ParallelProcessor};
use meteo_normalizer::readers::{list_parquet_files, ParquetReader, StatisticsReader};
use meteo_normalizer::writers::ParquetWriter;
use meteo_normalizer::ProcessingError;
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::TempDir;

const STATISTICS_JSON: &str = r#"{
    "tavg": {"mean": 10.0, "std": 5.0},
    "tmin": {"mean": 5.0, "std": 4.0},
    "tmax": {"mean": 15.0, "std": 6.0},
    "snow": {"mean": 2.0},
    "wspd": {"mean": 12.0, "std": 7.0},
    "pres": {"mean": 1015.0, "std": 9.0}
}"#;

fn write_statistics(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("statistics.json");
    std::fs::write(&path, STATISTICS_JSON).unwrap();
    path
}

fn week_of_rows() -> Vec<RawRow> {
    vec![
        RawRow::new(15.0, 10.0, 21.0, 0.0, 0.0, 0.0, 19.0, 1024.0),
        RawRow::new(12.5, 8.0, 16.5, 4.2, 0.0, 90.0, 22.0, 1008.5),
        RawRow::new(9.0, 3.5, 13.0, 11.8, 0.0, 180.0, 31.0, 996.0),
        RawRow::new(-2.0, -6.0, 1.5, 3.0, 40.0, 270.0, 14.0, 1031.0),
        RawRow::new(-4.5, -9.0, -1.0, 0.0, 65.0, 315.0, 6.0, 1036.5),
        RawRow::new(3.0, -1.0, 7.0, f64::NAN, 20.0, 45.0, f64::NAN, 1019.0),
        RawRow::new(7.5, 2.0, 11.0, 0.2, 0.0, 359.0, 9.0, 1022.0),
    ]
}

fn assert_rows_close(restored: &[RawRow], original: &[RawRow]) {
    assert_eq!(restored.len(), original.len());
    for (got, want) in restored.iter().zip(original) {
        for name in raw_columns() {
            let (g, w) = (column_value(got, name), column_value(want, name));
            if w.is_nan() {
                assert!(g.is_nan(), "{}: expected NaN, got {}", name, g);
            } else {
                assert!(
                    (g - w).abs() <= 1e-9 * w.abs().max(1.0),
                    "{}: {} != {}",
                    name,
                    g,
                    w
                );
            }
        }
    }
}

fn column_value(row: &RawRow, name: &str) -> f64 {
    use meteo_normalizer::models::TableRow;
    row.value(name).unwrap()
}

#[test]
fn test_parquet_round_trip_through_both_directions() {
    let temp_dir = TempDir::new().unwrap();
    let stats_path = write_statistics(temp_dir.path());
    let raw_path = temp_dir.path().join("station_london.parquet");
    let normalized_path = temp_dir.path().join("normalized.parquet");

    let original = week_of_rows();
    let writer = ParquetWriter::new();
    writer
        .write_batch(&rows_to_batch(&original).unwrap(), &raw_path)
        .unwrap();

    let statistics = StatisticsReader::new().read(&stats_path).unwrap();
    let reader = ParquetReader::new().with_batch_size(3);
    let normalizer = Normalizer::new(&statistics);

    let raw = reader.read_table(&raw_path).unwrap();
    let normalized = normalizer.normalize(&raw).unwrap();
    writer.write_batch(&normalized, &normalized_path).unwrap();

    let info = writer.get_file_info(&normalized_path).unwrap();
    assert_eq!(info.total_rows, 7);
    assert_eq!(info.columns, normalized_columns());

    let reloaded = reader.read_table(&normalized_path).unwrap();
    let restored = normalizer.inverse_normalize(&reloaded).unwrap();
    let restored_rows: Vec<RawRow> = batch_to_rows(&restored).unwrap();

    assert_rows_close(&restored_rows, &original);
}

#[test]
fn test_process_directory() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("raw");
    let output_dir = temp_dir.path().join("out");
    std::fs::create_dir_all(&input_dir).unwrap();

    let writer = ParquetWriter::new();
    let rows = week_of_rows();
    for name in ["station_a.parquet", "station_b.parquet", "notes.txt"] {
        let path = input_dir.join(name);
        if name.ends_with(".parquet") {
            writer
                .write_batch(&rows_to_batch(&rows).unwrap(), &path)
                .unwrap();
        } else {
            std::fs::write(&path, "not a table").unwrap();
        }
    }

    let files = list_parquet_files(&input_dir, "station_").unwrap();
    assert_eq!(files.len(), 2);

    let statistics = FeatureStatistics::from_json_str(STATISTICS_JSON).unwrap();
    let written = ParallelProcessor::new(2)
        .process_files(
            &files,
            &output_dir,
            &statistics,
            Direction::Forward,
            &writer,
            None,
        )
        .unwrap();

    assert_eq!(written.len(), 2);
    for (input, output) in files.iter().zip(&written) {
        assert!(output.exists());
        let name = output.file_name().unwrap().to_string_lossy().to_string();
        let stem = input.file_stem().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(&format!("{}-normalized-", stem)), "{}", name);

        let info = writer.get_file_info(output).unwrap();
        assert_eq!(info.columns, normalized_columns());
        assert_eq!(info.total_rows, 7);
    }
}

#[test]
fn test_incomplete_statistics_rejected_on_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("partial.json");
    std::fs::write(&path, r#"{"tavg": {"mean": 10.0, "std": 5.0}}"#).unwrap();

    let result = StatisticsReader::new().read(&path);
    assert!(matches!(
        result,
        Err(ProcessingError::MissingStatistic { ref feature, .. }) if feature == "tmin"
    ));

    let partial = StatisticsReader::new()
        .with_require_complete(false)
        .read(&path)
        .unwrap();
    assert_eq!(
        partial.get(Feature::Tavg),
        Some(&FeatureStat::new(10.0, 5.0))
    );
}

#[test]
fn test_cli_parses_process_directory() {
    let cli = Cli::try_parse_from([
        "meteo-normalizer",
        "process-directory",
        "--input-dir",
        "data/raw",
        "--output-dir",
        "data/out",
        "--stats",
        "stats.json",
        "--inverse",
        "-v",
    ])
    .unwrap();

    assert!(cli.verbose);
    match cli.command {
        Commands::ProcessDirectory {
            inverse,
            file_pattern,
            max_workers,
            ..
        } => {
            assert!(inverse);
            assert_eq!(file_pattern, "");
            assert_eq!(max_workers, None);
        }
        _ => panic!("expected process-directory"),
    }
}

#[test]
fn test_cli_requires_input() {
    assert!(Cli::try_parse_from(["meteo-normalizer", "normalize"]).is_err());
}
