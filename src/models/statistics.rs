use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ProcessingError, Result};
use crate::models::feature::{Feature, FeatureRule, TransformKind, FEATURE_RULES};

/// Mean and standard deviation of one feature over a reference corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureStat {
    pub mean: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
}

impl FeatureStat {
    pub fn new(mean: f64, std: f64) -> Self {
        Self {
            mean,
            std: Some(std),
        }
    }

    pub fn mean_only(mean: f64) -> Self {
        Self { mean, std: None }
    }
}

/// Per-feature statistics supplied by an external provider. Keyed by feature
/// name so that provider files with extra entries still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureStatistics {
    entries: BTreeMap<String, FeatureStat>,
}

impl FeatureStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, feature: Feature, stat: FeatureStat) -> Self {
        self.insert(feature, stat);
        self
    }

    pub fn insert(&mut self, feature: Feature, stat: FeatureStat) {
        self.entries.insert(feature.name().to_string(), stat);
    }

    pub fn get(&self, feature: Feature) -> Option<&FeatureStat> {
        self.entries.get(feature.name())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureStat)> {
        self.entries.iter().map(|(name, stat)| (name.as_str(), stat))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve the parameters for one rule, checking that the statistics it
    /// divides by are usable.
    pub fn params_for(&self, rule: &FeatureRule) -> Result<TransformParams> {
        let feature = rule.feature;
        match rule.kind {
            TransformKind::ZScore => {
                let stat = self.require(feature, required_fields(rule.kind))?;
                let std = stat.std.ok_or_else(|| ProcessingError::MissingStatistic {
                    feature: feature.name().to_string(),
                    field: "std",
                })?;
                if !stat.mean.is_finite() {
                    return Err(ProcessingError::domain(
                        feature.name(),
                        format!("mean {} is not finite", stat.mean),
                    ));
                }
                if !std.is_finite() || std <= 0.0 {
                    return Err(ProcessingError::domain(
                        feature.name(),
                        format!("standard deviation {} must be finite and positive", std),
                    ));
                }
                Ok(TransformParams::ZScore {
                    mean: stat.mean,
                    std,
                })
            }
            TransformKind::LogCompress => Ok(TransformParams::LogCompress),
            TransformKind::LogCompressScaled => {
                let stat = self.require(feature, required_fields(rule.kind))?;
                if !stat.mean.is_finite() || stat.mean <= 0.0 {
                    return Err(ProcessingError::domain(
                        feature.name(),
                        format!(
                            "mean {} must be finite and positive to scale ln(1 + x)",
                            stat.mean
                        ),
                    ));
                }
                Ok(TransformParams::LogCompressScaled {
                    scale: stat.mean.ln_1p(),
                })
            }
            TransformKind::Circular => Ok(TransformParams::Circular),
        }
    }

    /// Resolve every rule in table order, failing on the first unusable entry.
    pub fn resolve_all(&self) -> Result<Vec<TransformParams>> {
        FEATURE_RULES
            .iter()
            .map(|rule| self.params_for(rule))
            .collect()
    }

    fn require(&self, feature: Feature, field: &'static str) -> Result<&FeatureStat> {
        self.get(feature)
            .ok_or_else(|| ProcessingError::MissingStatistic {
                feature: feature.name().to_string(),
                field,
            })
    }
}

/// Statistics fields a transform reads, as named in error messages.
fn required_fields(kind: TransformKind) -> &'static str {
    match (kind.needs_mean(), kind.needs_std()) {
        (true, true) => "mean and std",
        (true, false) => "mean",
        (false, true) => "std",
        (false, false) => "nothing",
    }
}

/// A transform with its statistics bound, ready to run over a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformParams {
    ZScore { mean: f64, std: f64 },
    LogCompress,
    LogCompressScaled { scale: f64 },
    Circular,
}

impl TransformParams {
    pub fn kind(&self) -> TransformKind {
        match self {
            TransformParams::ZScore { .. } => TransformKind::ZScore,
            TransformParams::LogCompress => TransformKind::LogCompress,
            TransformParams::LogCompressScaled { .. } => TransformKind::LogCompressScaled,
            TransformParams::Circular => TransformKind::Circular,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> FeatureStatistics {
        FeatureStatistics::new()
            .with(Feature::Tavg, FeatureStat::new(10.0, 5.0))
            .with(Feature::Tmin, FeatureStat::new(5.0, 4.0))
            .with(Feature::Tmax, FeatureStat::new(15.0, 6.0))
            .with(Feature::Wspd, FeatureStat::new(12.0, 7.0))
            .with(Feature::Pres, FeatureStat::new(1015.0, 9.0))
            .with(Feature::Snow, FeatureStat::mean_only(2.0))
    }

    #[test]
    fn test_resolve_all() {
        let params = complete().resolve_all().unwrap();
        assert_eq!(params.len(), FEATURE_RULES.len());
        assert_eq!(params[0], TransformParams::ZScore { mean: 10.0, std: 5.0 });
        assert_eq!(params[3], TransformParams::LogCompress);
        assert_eq!(
            params[4],
            TransformParams::LogCompressScaled {
                scale: 3.0_f64.ln()
            }
        );
        assert_eq!(params[5], TransformParams::Circular);

        let kinds: Vec<TransformKind> = params.iter().map(TransformParams::kind).collect();
        let rule_kinds: Vec<TransformKind> = FEATURE_RULES.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, rule_kinds);
    }

    #[test]
    fn test_missing_entry() {
        let mut stats = complete();
        stats.entries.remove("pres");
        match stats.resolve_all() {
            Err(ProcessingError::MissingStatistic { feature, field }) => {
                assert_eq!(feature, "pres");
                assert_eq!(field, "mean and std");
            }
            other => panic!("expected MissingStatistic, got {:?}", other),
        }

        let mut stats = complete();
        stats.entries.remove("snow");
        match stats.params_for(Feature::Snow.rule()) {
            Err(ProcessingError::MissingStatistic { field, .. }) => assert_eq!(field, "mean"),
            other => panic!("expected MissingStatistic, got {:?}", other),
        }
    }

    #[test]
    fn test_required_fields_follow_kind() {
        assert_eq!(required_fields(TransformKind::ZScore), "mean and std");
        assert_eq!(required_fields(TransformKind::LogCompressScaled), "mean");
        assert_eq!(required_fields(TransformKind::LogCompress), "nothing");

        // Kinds that read no statistics resolve from an empty set
        let empty = FeatureStatistics::new();
        assert_eq!(
            empty.params_for(Feature::Prcp.rule()).unwrap(),
            TransformParams::LogCompress
        );
        assert_eq!(
            empty.params_for(Feature::Wdir.rule()).unwrap(),
            TransformParams::Circular
        );
    }

    #[test]
    fn test_missing_std() {
        let stats = complete().with(Feature::Wspd, FeatureStat::mean_only(12.0));
        match stats.params_for(Feature::Wspd.rule()) {
            Err(ProcessingError::MissingStatistic { feature, field }) => {
                assert_eq!(feature, "wspd");
                assert_eq!(field, "std");
            }
            other => panic!("expected MissingStatistic, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_std_is_domain_violation() {
        let stats = complete().with(Feature::Tmax, FeatureStat::new(15.0, 0.0));
        assert!(matches!(
            stats.params_for(Feature::Tmax.rule()),
            Err(ProcessingError::DomainViolation { .. })
        ));
    }

    #[test]
    fn test_non_positive_snow_mean() {
        let stats = complete().with(Feature::Snow, FeatureStat::mean_only(0.0));
        assert!(matches!(
            stats.params_for(Feature::Snow.rule()),
            Err(ProcessingError::DomainViolation { .. })
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let json = r#"{
            "tavg": {"mean": 10.0, "std": 5.0},
            "snow": {"mean": 2.0},
            "prcp": {"mean": 1.7, "std": 4.2}
        }"#;
        let stats = FeatureStatistics::from_json_str(json).unwrap();
        assert_eq!(stats.len(), 3);
        assert_eq!(stats.get(Feature::Tavg), Some(&FeatureStat::new(10.0, 5.0)));
        assert_eq!(stats.get(Feature::Snow), Some(&FeatureStat::mean_only(2.0)));

        let encoded = serde_json::to_string(&stats).unwrap();
        assert_eq!(FeatureStatistics::from_json_str(&encoded).unwrap(), stats);
    }
}
