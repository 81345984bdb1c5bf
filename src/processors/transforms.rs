//! Column kernels for each transform kind.
//!
//! Every kernel maps whole Arrow columns, so nulls carry through the null
//! buffer and NaN values carry through the arithmetic.

use arrow::array::Float64Array;
use arrow::compute::kernels::arity::binary;
use arrow::datatypes::Float64Type;

use crate::error::{ProcessingError, Result};
use crate::models::{Feature, TransformParams};

/// Map a raw column to its normalized column(s).
pub fn forward(
    feature: Feature,
    params: &TransformParams,
    column: &Float64Array,
) -> Result<Vec<Float64Array>> {
    match *params {
        TransformParams::ZScore { mean, std } => {
            Ok(vec![map(column, |x| (x - mean) / std)])
        }
        TransformParams::LogCompress => {
            check_log_domain(feature, column)?;
            Ok(vec![map(column, f64::ln_1p)])
        }
        TransformParams::LogCompressScaled { scale } => {
            check_log_domain(feature, column)?;
            Ok(vec![map(column, |x| x.ln_1p() / scale)])
        }
        TransformParams::Circular => Ok(vec![
            map(column, |x| x.to_radians().sin()),
            map(column, |x| x.to_radians().cos()),
        ]),
    }
}

/// Map the normalized column(s) of one feature back to physical units.
pub fn inverse(
    feature: Feature,
    params: &TransformParams,
    columns: &[Float64Array],
) -> Result<Float64Array> {
    let expected = feature.rule().normalized_columns.len();
    if columns.len() != expected {
        return Err(ProcessingError::SchemaMismatch {
            column: feature.name().to_string(),
            reason: format!("expected {} input columns, got {}", expected, columns.len()),
        });
    }

    match *params {
        TransformParams::ZScore { mean, std } => Ok(map(&columns[0], |x| x * std + mean)),
        TransformParams::LogCompress => Ok(map(&columns[0], f64::exp_m1)),
        TransformParams::LogCompressScaled { scale } => {
            Ok(map(&columns[0], |x| (x * scale).exp_m1()))
        }
        TransformParams::Circular => Ok(binary::<_, _, _, Float64Type>(
            &columns[0],
            &columns[1],
            |sin: f64, cos: f64| wrap_degrees(sin.atan2(cos).to_degrees()),
        )?),
    }
}

fn map<F>(column: &Float64Array, op: F) -> Float64Array
where
    F: Fn(f64) -> f64,
{
    column.unary::<_, Float64Type>(op)
}

/// Fold an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// First value below -1 in a column, where ln(1 + x) is undefined.
pub fn log_domain_violation(column: &Float64Array) -> Option<f64> {
    column.iter().flatten().find(|x| *x < -1.0)
}

fn check_log_domain(feature: Feature, column: &Float64Array) -> Result<()> {
    match log_domain_violation(column) {
        Some(value) => Err(ProcessingError::domain(
            feature.name(),
            format!("value {} is below -1, ln(1 + x) is undefined", value),
        )),
        None => Ok(()),
    }
}
