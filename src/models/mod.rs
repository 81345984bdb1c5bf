pub mod feature;
pub mod observation;
pub mod statistics;

pub use feature::{
    normalized_columns, normalized_schema, raw_columns, raw_schema, Feature, FeatureRule,
    TransformKind, COS_WDIR, FEATURE_RULES, SIN_WDIR,
};
pub use observation::{
    batch_to_rows, float_column, rows_to_batch, NormalizedRow, RawRow, TableRow,
};
pub use statistics::{FeatureStat, FeatureStatistics, TransformParams};
