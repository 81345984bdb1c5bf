use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::models::{
    float_column, normalized_schema, raw_schema, FeatureRule, FeatureStatistics,
    TransformParams, FEATURE_RULES,
};
use crate::processors::transforms;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Physical units to model space
    Forward,
    /// Model space back to physical units
    Inverse,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Forward => "normalize",
            Direction::Inverse => "inverse_normalize",
        }
    }

    pub fn output_schema(&self) -> SchemaRef {
        match self {
            Direction::Forward => normalized_schema(),
            Direction::Inverse => raw_schema(),
        }
    }
}

/// One rule with its bound parameters and input columns.
struct ColumnJob {
    rule: &'static FeatureRule,
    params: TransformParams,
    inputs: Vec<Float64Array>,
}

impl ColumnJob {
    fn run(&self, direction: Direction) -> Result<Vec<Float64Array>> {
        match direction {
            Direction::Forward => {
                transforms::forward(self.rule.feature, &self.params, &self.inputs[0])
            }
            Direction::Inverse => {
                transforms::inverse(self.rule.feature, &self.params, &self.inputs)
                    .map(|column| vec![column])
            }
        }
    }
}

/// Applies the feature rule table to whole batches.
///
/// Statistics are borrowed per normalizer, so callers holding several sets
/// (one per station, say) build one normalizer for each.
pub struct Normalizer<'a> {
    statistics: &'a FeatureStatistics,
    parallel_columns: bool,
}

impl<'a> Normalizer<'a> {
    pub fn new(statistics: &'a FeatureStatistics) -> Self {
        Self {
            statistics,
            parallel_columns: false,
        }
    }

    /// Compute the per-feature columns on the rayon pool.
    pub fn with_parallel_columns(mut self, parallel_columns: bool) -> Self {
        self.parallel_columns = parallel_columns;
        self
    }

    /// Raw observations to the fixed nine-column normalized layout.
    pub fn normalize(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        self.apply(batch, Direction::Forward)
    }

    /// Normalized columns back to the eight-column raw layout.
    pub fn inverse_normalize(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        self.apply(batch, Direction::Inverse)
    }

    pub fn apply(&self, batch: &RecordBatch, direction: Direction) -> Result<RecordBatch> {
        let jobs = self.prepare(batch, direction)?;

        let outputs: Vec<Vec<Float64Array>> = if self.parallel_columns {
            jobs.par_iter()
                .map(|job| job.run(direction))
                .collect::<Result<_>>()?
        } else {
            jobs.iter()
                .map(|job| job.run(direction))
                .collect::<Result<_>>()?
        };

        let columns: Vec<ArrayRef> = outputs
            .into_iter()
            .flatten()
            .map(|column| Arc::new(column) as ArrayRef)
            .collect();

        let output = RecordBatch::try_new(direction.output_schema(), columns)?;

        debug!(
            direction = direction.label(),
            rows = output.num_rows(),
            columns = output.num_columns(),
            "Transformed batch"
        );

        Ok(output)
    }

    fn prepare(&self, batch: &RecordBatch, direction: Direction) -> Result<Vec<ColumnJob>> {
        // Every input column is located before statistics are resolved
        let inputs = FEATURE_RULES
            .iter()
            .map(|rule| input_columns(batch, rule, direction))
            .collect::<Result<Vec<_>>>()?;

        let params = self.statistics.resolve_all()?;

        Ok(FEATURE_RULES
            .iter()
            .zip(params)
            .zip(inputs)
            .map(|((rule, params), inputs)| ColumnJob {
                rule,
                params,
                inputs,
            })
            .collect())
    }
}

fn input_columns(
    batch: &RecordBatch,
    rule: &FeatureRule,
    direction: Direction,
) -> Result<Vec<Float64Array>> {
    match direction {
        Direction::Forward => Ok(vec![float_column(batch, rule.feature.name())?]),
        Direction::Inverse => rule
            .normalized_columns
            .iter()
            .map(|name| float_column(batch, name))
            .collect(),
    }
}

/// Normalize a raw batch with the given statistics.
pub fn normalize(batch: &RecordBatch, statistics: &FeatureStatistics) -> Result<RecordBatch> {
    Normalizer::new(statistics).normalize(batch)
}

/// Reconstruct physical units from a normalized batch with the given statistics.
pub fn inverse_normalize(
    batch: &RecordBatch,
    statistics: &FeatureStatistics,
) -> Result<RecordBatch> {
    Normalizer::new(statistics).inverse_normalize(batch)
}
