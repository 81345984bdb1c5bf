use crate::cli::args::{Cli, Commands};
use crate::error::{ProcessingError, Result};
use crate::models::FeatureStatistics;
use crate::processors::{Direction, IntegrityChecker, Normalizer, ParallelProcessor};
use crate::readers::{list_parquet_files, ParquetReader, StatisticsReader};
use crate::utils::filename::default_output_path;
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use crate::utils::settings::Settings;
use crate::writers::ParquetWriter;
use arrow::util::pretty::pretty_format_batches;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Normalize {
            input,
            stats,
            output,
            compression,
        } => transform_file(
            &settings,
            Direction::Forward,
            &input,
            stats.as_deref(),
            output,
            compression.as_deref(),
        )?,

        Commands::Inverse {
            input,
            stats,
            output,
            compression,
        } => transform_file(
            &settings,
            Direction::Inverse,
            &input,
            stats.as_deref(),
            output,
            compression.as_deref(),
        )?,

        Commands::ProcessDirectory {
            input_dir,
            output_dir,
            stats,
            inverse,
            max_workers,
            file_pattern,
            compression,
        } => {
            let direction = if inverse {
                Direction::Inverse
            } else {
                Direction::Forward
            };
            let statistics = load_statistics(&settings, stats.as_deref())?;
            let writer = build_writer(&settings, compression.as_deref())?;

            let files = list_parquet_files(&input_dir, &file_pattern)?;
            if files.is_empty() {
                println!("No Parquet files found in {}", input_dir.display());
                return Ok(());
            }

            let workers = max_workers.unwrap_or(settings.max_workers);
            println!(
                "Transforming {} files ({}) with {} workers",
                files.len(),
                direction.label(),
                workers
            );

            let progress = ProgressReporter::new(files.len() as u64, "Processing files", false);
            let written = ParallelProcessor::new(workers)
                .with_parallel_columns(settings.parallel_columns)
                .process_files(
                    &files,
                    &output_dir,
                    &statistics,
                    direction,
                    &writer,
                    Some(&progress),
                )?;
            progress.finish_with_message(&format!("Wrote {} files", written.len()));

            for path in &written {
                progress.println(&format!("  {}", path.display()));
            }
        }

        Commands::Check {
            input,
            stats,
            strict,
        } => {
            println!("Checking observations: {}", input.display());

            let table = ParquetReader::new()
                .with_batch_size(settings.batch_size)
                .read_table(&input)?;

            let checker = IntegrityChecker::new().with_strict_validation(strict);
            let mut report = checker.check_raw(&table)?;
            if let Some(path) = stats.as_deref().or(settings.statistics_path.as_deref()) {
                let statistics = StatisticsReader::new()
                    .with_require_complete(false)
                    .read(path)?;
                checker.check_statistics(&statistics, &mut report);
            }

            println!("\n{}", checker.generate_summary(&report));

            if report.is_normalizable() {
                println!("✅ Table can be normalized");
            } else {
                println!(
                    "⚠️  Found {} issues that would stop normalization",
                    report.domain_violations.len()
                );
            }
        }

        Commands::Info { file, sample } => {
            println!("Inspecting Parquet file: {}", file.display());

            let file_info = ParquetWriter::new().get_file_info(&file)?;
            println!("\n{}", file_info.summary());

            if sample > 0 {
                let table = ParquetReader::new()
                    .with_batch_size(settings.batch_size)
                    .read_table(&file)?;
                let head = table.slice(0, sample.min(table.num_rows()));
                println!("\nSample Rows (showing {}):", head.num_rows());
                println!("{}", pretty_format_batches(&[head])?);
            }
        }
    }

    Ok(())
}

fn transform_file(
    settings: &Settings,
    direction: Direction,
    input: &Path,
    stats: Option<&Path>,
    output: Option<PathBuf>,
    compression: Option<&str>,
) -> Result<()> {
    let statistics = load_statistics(settings, stats)?;
    let writer = build_writer(settings, compression)?;
    let output = output.unwrap_or_else(|| default_output_path(input, direction));

    let progress = ProgressReporter::new_spinner(&format!("Running {}...", direction.label()), false);

    let table = ParquetReader::new()
        .with_batch_size(settings.batch_size)
        .read_table(input)?;
    let transformed = Normalizer::new(&statistics)
        .with_parallel_columns(settings.parallel_columns)
        .apply(&table, direction)?;
    writer.write_batch(&transformed, &output)?;

    progress.finish_with_message(&format!("Transformed {} rows", transformed.num_rows()));
    info!(
        input = %input.display(),
        output = %output.display(),
        rows = transformed.num_rows(),
        direction = direction.label(),
        "Transform complete"
    );

    let file_info = writer.get_file_info(&output)?;
    println!("\n{}", file_info.summary());
    println!("Output written to {}", output.display());
    Ok(())
}

fn load_statistics(settings: &Settings, stats: Option<&Path>) -> Result<FeatureStatistics> {
    let path = stats
        .or(settings.statistics_path.as_deref())
        .ok_or_else(|| {
            ProcessingError::Config(
                "No statistics file given; pass --stats or set statistics_path".to_string(),
            )
        })?;
    StatisticsReader::new().read(path)
}

fn build_writer(settings: &Settings, compression: Option<&str>) -> Result<ParquetWriter> {
    let writer = settings.writer()?;
    match compression {
        Some(name) => writer.with_compression(name),
        None => Ok(writer),
    }
}
