use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Weather features carried by a raw observation table, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Tavg,
    Tmin,
    Tmax,
    Prcp,
    Snow,
    Wdir,
    Wspd,
    Pres,
}

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Tavg => "tavg",
            Feature::Tmin => "tmin",
            Feature::Tmax => "tmax",
            Feature::Prcp => "prcp",
            Feature::Snow => "snow",
            Feature::Wdir => "wdir",
            Feature::Wspd => "wspd",
            Feature::Pres => "pres",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        FEATURE_RULES
            .iter()
            .map(|rule| rule.feature)
            .find(|feature| feature.name() == name)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Feature::Tavg => "Temperature (Avg)",
            Feature::Tmin => "Temperature (Min)",
            Feature::Tmax => "Temperature (Max)",
            Feature::Prcp => "Precipitation",
            Feature::Snow => "Snow Depth",
            Feature::Wdir => "Wind Direction",
            Feature::Wspd => "Wind Speed",
            Feature::Pres => "Air Pressure",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            Feature::Tavg | Feature::Tmin | Feature::Tmax => "°C",
            Feature::Prcp | Feature::Snow => "mm",
            Feature::Wdir => "°",
            Feature::Wspd => "km/h",
            Feature::Pres => "hPa",
        }
    }

    pub fn rule(&self) -> &'static FeatureRule {
        // Every variant has exactly one entry in FEATURE_RULES.
        match self {
            Feature::Tavg => &FEATURE_RULES[0],
            Feature::Tmin => &FEATURE_RULES[1],
            Feature::Tmax => &FEATURE_RULES[2],
            Feature::Prcp => &FEATURE_RULES[3],
            Feature::Snow => &FEATURE_RULES[4],
            Feature::Wdir => &FEATURE_RULES[5],
            Feature::Wspd => &FEATURE_RULES[6],
            Feature::Pres => &FEATURE_RULES[7],
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a feature is mapped between physical units and model space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformKind {
    /// `(x - mean) / std`
    ZScore,
    /// `ln(1 + x)`
    LogCompress,
    /// `ln(1 + x) / ln(1 + mean)`
    LogCompressScaled,
    /// `(sin θ, cos θ)` of an angle in degrees
    Circular,
}

impl TransformKind {
    pub fn needs_mean(&self) -> bool {
        matches!(self, TransformKind::ZScore | TransformKind::LogCompressScaled)
    }

    pub fn needs_std(&self) -> bool {
        matches!(self, TransformKind::ZScore)
    }

    /// Whether the transform takes ln(1 + x) and so needs `x >= -1`.
    pub fn is_logarithmic(&self) -> bool {
        matches!(
            self,
            TransformKind::LogCompress | TransformKind::LogCompressScaled
        )
    }
}

/// One row of the rule table: a raw feature, its transform and the columns
/// it occupies in the normalized table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRule {
    pub feature: Feature,
    pub kind: TransformKind,
    pub normalized_columns: &'static [&'static str],
}

pub const SIN_WDIR: &str = "sin_wdir";
pub const COS_WDIR: &str = "cos_wdir";

/// The rule table shared by the forward and inverse directions. Both column
/// layouts are derived from it, so reordering an entry moves the column in
/// both tables at once.
pub const FEATURE_RULES: [FeatureRule; 8] = [
    FeatureRule {
        feature: Feature::Tavg,
        kind: TransformKind::ZScore,
        normalized_columns: &["tavg"],
    },
    FeatureRule {
        feature: Feature::Tmin,
        kind: TransformKind::ZScore,
        normalized_columns: &["tmin"],
    },
    FeatureRule {
        feature: Feature::Tmax,
        kind: TransformKind::ZScore,
        normalized_columns: &["tmax"],
    },
    FeatureRule {
        feature: Feature::Prcp,
        kind: TransformKind::LogCompress,
        normalized_columns: &["prcp"],
    },
    FeatureRule {
        feature: Feature::Snow,
        kind: TransformKind::LogCompressScaled,
        normalized_columns: &["snow"],
    },
    FeatureRule {
        feature: Feature::Wdir,
        kind: TransformKind::Circular,
        normalized_columns: &[SIN_WDIR, COS_WDIR],
    },
    FeatureRule {
        feature: Feature::Wspd,
        kind: TransformKind::ZScore,
        normalized_columns: &["wspd"],
    },
    FeatureRule {
        feature: Feature::Pres,
        kind: TransformKind::ZScore,
        normalized_columns: &["pres"],
    },
];

/// Column names of a raw observation table, in order.
pub fn raw_columns() -> Vec<&'static str> {
    FEATURE_RULES.iter().map(|rule| rule.feature.name()).collect()
}

/// Column names of a normalized table, in order.
pub fn normalized_columns() -> Vec<&'static str> {
    FEATURE_RULES
        .iter()
        .flat_map(|rule| rule.normalized_columns.iter().copied())
        .collect()
}

pub fn raw_schema() -> SchemaRef {
    float_schema(&raw_columns())
}

pub fn normalized_schema() -> SchemaRef {
    float_schema(&normalized_columns())
}

fn float_schema(columns: &[&str]) -> SchemaRef {
    let fields: Vec<Field> = columns
        .iter()
        .map(|name| Field::new(*name, DataType::Float64, true))
        .collect();
    Arc::new(Schema::new(fields))
}
