use crate::error::{ProcessingError, Result};
use crate::models::FeatureStatistics;
use crate::processors::{Direction, Normalizer};
use crate::readers::ParquetReader;
use crate::utils::filename::generate_output_filename;
use crate::utils::progress::ProgressReporter;
use crate::writers::ParquetWriter;
use arrow::record_batch::RecordBatch;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// A table of observations from one station.
#[derive(Debug, Clone)]
pub struct StationBatch {
    pub station_id: String,
    pub batch: RecordBatch,
}

impl StationBatch {
    pub fn new(station_id: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            station_id: station_id.into(),
            batch,
        }
    }
}

pub struct ParallelProcessor {
    max_workers: usize,
    parallel_columns: bool,
}

impl ParallelProcessor {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            parallel_columns: false,
        }
    }

    pub fn with_parallel_columns(mut self, parallel_columns: bool) -> Self {
        self.parallel_columns = parallel_columns;
        self
    }

    fn build_pool(&self) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))
    }

    /// Transform many batches that share one set of statistics. Output order
    /// matches input order.
    pub fn process_batches(
        &self,
        batches: &[RecordBatch],
        statistics: &FeatureStatistics,
        direction: Direction,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<RecordBatch>> {
        let processed = AtomicUsize::new(0);
        let normalizer = Normalizer::new(statistics).with_parallel_columns(self.parallel_columns);

        let pool = self.build_pool()?;
        pool.install(|| {
            batches
                .par_iter()
                .map(|batch| {
                    let result = normalizer.apply(batch, direction);

                    let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(p) = progress {
                        p.update(count as u64);
                    }

                    result
                })
                .collect()
        })
    }

    /// Transform per-station batches, each with its own statistics.
    pub fn process_stations(
        &self,
        stations: &[StationBatch],
        statistics: &HashMap<String, FeatureStatistics>,
        direction: Direction,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<StationBatch>> {
        // Fail before any work when a station has no statistics
        if let Some(missing) = stations
            .iter()
            .find(|s| !statistics.contains_key(&s.station_id))
        {
            return Err(ProcessingError::StationNotFound {
                station_id: missing.station_id.clone(),
            });
        }

        if let Some(p) = progress {
            p.set_message(&format!("Processing {} stations...", stations.len()));
        }

        let processed = AtomicUsize::new(0);
        let pool = self.build_pool()?;
        let results = pool.install(|| {
            stations
                .par_iter()
                .map(|station| {
                    let station_stats = statistics.get(&station.station_id).ok_or_else(|| {
                        ProcessingError::StationNotFound {
                            station_id: station.station_id.clone(),
                        }
                    })?;
                    let batch = Normalizer::new(station_stats)
                        .with_parallel_columns(self.parallel_columns)
                        .apply(&station.batch, direction)?;

                    let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(p) = progress {
                        p.update(count as u64);
                    }
                    debug!(station = %station.station_id, rows = batch.num_rows(), "Station processed");

                    Ok(StationBatch::new(station.station_id.clone(), batch))
                })
                .collect::<Result<Vec<_>>>()
        })?;

        if let Some(p) = progress {
            p.finish_with_message(&format!("Processed {} stations", stations.len()));
        }

        Ok(results)
    }

    /// Read, transform and write each Parquet file into `output_dir`,
    /// returning the written paths in input order.
    pub fn process_files(
        &self,
        files: &[PathBuf],
        output_dir: &Path,
        statistics: &FeatureStatistics,
        direction: Direction,
        writer: &ParquetWriter,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(output_dir)?;

        let reader = ParquetReader::new();
        let normalizer = Normalizer::new(statistics).with_parallel_columns(self.parallel_columns);
        let processed = AtomicUsize::new(0);

        let pool = self.build_pool()?;
        let written = pool.install(|| {
            files
                .par_iter()
                .map(|input| {
                    let table = reader.read_table(input)?;
                    let output_table = normalizer.apply(&table, direction)?;
                    let output = output_dir.join(generate_output_filename(input, direction));
                    writer.write_batch(&output_table, &output)?;

                    let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(p) = progress {
                        p.update(count as u64);
                    }
                    debug!(input = %input.display(), output = %output.display(), "File processed");

                    Ok(output)
                })
                .collect::<Result<Vec<_>>>()
        })?;

        info!(
            files = written.len(),
            direction = direction.label(),
            "Directory processing complete"
        );

        Ok(written)
    }
}

impl Default for ParallelProcessor {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}
