use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::feature::{normalized_schema, raw_schema, COS_WDIR, SIN_WDIR};

/// One day of observations in physical units. Missing values are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct RawRow {
    #[validate(range(min = -90.0, max = 60.0))]
    pub tavg: f64,

    #[validate(range(min = -90.0, max = 60.0))]
    pub tmin: f64,

    #[validate(range(min = -90.0, max = 60.0))]
    pub tmax: f64,

    // Precipitation (mm)
    #[validate(range(min = 0.0, max = 2000.0))]
    pub prcp: f64,

    // Snow depth (mm)
    #[validate(range(min = 0.0, max = 12000.0))]
    pub snow: f64,

    // Wind direction (degrees, 360 is the same point as 0)
    #[validate(range(min = 0.0, max = 360.0))]
    pub wdir: f64,

    // Wind speed (km/h)
    #[validate(range(min = 0.0, max = 450.0))]
    pub wspd: f64,

    // Sea-level pressure (hPa)
    #[validate(range(min = 850.0, max = 1090.0))]
    pub pres: f64,
}

impl RawRow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tavg: f64,
        tmin: f64,
        tmax: f64,
        prcp: f64,
        snow: f64,
        wdir: f64,
        wspd: f64,
        pres: f64,
    ) -> Self {
        Self {
            tavg,
            tmin,
            tmax,
            prcp,
            snow,
            wdir,
            wspd,
            pres,
        }
    }

    pub fn has_missing_values(&self) -> bool {
        [
            self.tavg, self.tmin, self.tmax, self.prcp, self.snow, self.wdir, self.wspd, self.pres,
        ]
        .iter()
        .any(|v| v.is_nan())
    }
}

impl Default for RawRow {
    fn default() -> Self {
        Self::new(
            f64::NAN,
            f64::NAN,
            f64::NAN,
            f64::NAN,
            f64::NAN,
            f64::NAN,
            f64::NAN,
            f64::NAN,
        )
    }
}

/// One day of observations in model space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub tavg: f64,
    pub tmin: f64,
    pub tmax: f64,
    pub prcp: f64,
    pub snow: f64,
    pub sin_wdir: f64,
    pub cos_wdir: f64,
    pub wspd: f64,
    pub pres: f64,
}

impl Default for NormalizedRow {
    fn default() -> Self {
        Self {
            tavg: f64::NAN,
            tmin: f64::NAN,
            tmax: f64::NAN,
            prcp: f64::NAN,
            snow: f64::NAN,
            sin_wdir: f64::NAN,
            cos_wdir: f64::NAN,
            wspd: f64::NAN,
            pres: f64::NAN,
        }
    }
}

/// A row type that can be moved in and out of a columnar batch by column name.
pub trait TableRow: Default {
    fn schema() -> SchemaRef;

    fn value(&self, column: &str) -> Option<f64>;

    fn value_mut(&mut self, column: &str) -> Option<&mut f64>;
}

impl TableRow for RawRow {
    fn schema() -> SchemaRef {
        raw_schema()
    }

    fn value(&self, column: &str) -> Option<f64> {
        match column {
            "tavg" => Some(self.tavg),
            "tmin" => Some(self.tmin),
            "tmax" => Some(self.tmax),
            "prcp" => Some(self.prcp),
            "snow" => Some(self.snow),
            "wdir" => Some(self.wdir),
            "wspd" => Some(self.wspd),
            "pres" => Some(self.pres),
            _ => None,
        }
    }

    fn value_mut(&mut self, column: &str) -> Option<&mut f64> {
        match column {
            "tavg" => Some(&mut self.tavg),
            "tmin" => Some(&mut self.tmin),
            "tmax" => Some(&mut self.tmax),
            "prcp" => Some(&mut self.prcp),
            "snow" => Some(&mut self.snow),
            "wdir" => Some(&mut self.wdir),
            "wspd" => Some(&mut self.wspd),
            "pres" => Some(&mut self.pres),
            _ => None,
        }
    }
}

impl TableRow for NormalizedRow {
    fn schema() -> SchemaRef {
        normalized_schema()
    }

    fn value(&self, column: &str) -> Option<f64> {
        match column {
            "tavg" => Some(self.tavg),
            "tmin" => Some(self.tmin),
            "tmax" => Some(self.tmax),
            "prcp" => Some(self.prcp),
            "snow" => Some(self.snow),
            SIN_WDIR => Some(self.sin_wdir),
            COS_WDIR => Some(self.cos_wdir),
            "wspd" => Some(self.wspd),
            "pres" => Some(self.pres),
            _ => None,
        }
    }

    fn value_mut(&mut self, column: &str) -> Option<&mut f64> {
        match column {
            "tavg" => Some(&mut self.tavg),
            "tmin" => Some(&mut self.tmin),
            "tmax" => Some(&mut self.tmax),
            "prcp" => Some(&mut self.prcp),
            "snow" => Some(&mut self.snow),
            SIN_WDIR => Some(&mut self.sin_wdir),
            COS_WDIR => Some(&mut self.cos_wdir),
            "wspd" => Some(&mut self.wspd),
            "pres" => Some(&mut self.pres),
            _ => None,
        }
    }
}

/// Fetch a column by name as `Float64`, casting other numeric types.
pub fn float_column(batch: &RecordBatch, name: &str) -> Result<Float64Array> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| ProcessingError::missing_column(name))?;

    if !column.data_type().is_numeric() {
        return Err(ProcessingError::SchemaMismatch {
            column: name.to_string(),
            reason: format!("expected a numeric column, found {}", column.data_type()),
        });
    }

    let column = if column.data_type() == &DataType::Float64 {
        Arc::clone(column)
    } else {
        cast(column, &DataType::Float64)?
    };

    column
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| ProcessingError::SchemaMismatch {
            column: name.to_string(),
            reason: "column could not be read as Float64".to_string(),
        })
}

/// Convert rows to a batch with the row type's column layout.
pub fn rows_to_batch<R: TableRow>(rows: &[R]) -> Result<RecordBatch> {
    let schema = R::schema();

    let columns = schema
        .fields()
        .iter()
        .map(|field| {
            let values = rows
                .iter()
                .map(|row| {
                    row.value(field.name()).ok_or_else(|| {
                        ProcessingError::missing_column(field.name())
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            Ok(Arc::new(Float64Array::from(values)) as ArrayRef)
        })
        .collect::<Result<Vec<ArrayRef>>>()?;

    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Convert a batch to rows. Null cells become NaN.
pub fn batch_to_rows<R: TableRow>(batch: &RecordBatch) -> Result<Vec<R>> {
    let schema = R::schema();
    let columns = schema
        .fields()
        .iter()
        .map(|field| float_column(batch, field.name()).map(|array| (field.name(), array)))
        .collect::<Result<Vec<_>>>()?;

    let mut rows: Vec<R> = (0..batch.num_rows()).map(|_| R::default()).collect();
    for (name, array) in &columns {
        for (row, cell) in rows.iter_mut().zip(array.iter()) {
            if let Some(slot) = row.value_mut(name) {
                *slot = cell.unwrap_or(f64::NAN);
            }
        }
    }

    Ok(rows)
}
