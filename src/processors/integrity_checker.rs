use arrow::array::Array;
use arrow::record_batch::RecordBatch;
use std::collections::BTreeMap;
use tracing::warn;
use validator::Validate;

use crate::error::Result;
use crate::models::{batch_to_rows, float_column, Feature, FeatureStatistics, RawRow, FEATURE_RULES};
use crate::processors::transforms::log_domain_violation;

#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub total_rows: usize,
    pub complete_rows: usize,
    pub missing_values: BTreeMap<&'static str, usize>,
    pub range_violations: Vec<RangeViolation>,
    pub domain_violations: Vec<DomainIssue>,
}

impl IntegrityReport {
    /// Whether `normalize` would accept the table's values.
    pub fn is_normalizable(&self) -> bool {
        self.domain_violations.is_empty()
    }

    pub fn total_missing(&self) -> usize {
        self.missing_values.values().sum()
    }
}

/// A row whose values fall outside physical limits.
#[derive(Debug, Clone)]
pub struct RangeViolation {
    pub row: usize,
    pub details: String,
}

/// A value or statistic that would make a transform fail.
#[derive(Debug, Clone)]
pub struct DomainIssue {
    pub feature: Feature,
    pub details: String,
}

pub struct IntegrityChecker {
    max_range_violations: usize,
    strict: bool,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self {
            max_range_violations: 1000,
            strict: false,
        }
    }

    /// In strict mode the first out-of-range row fails the check.
    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_range_violations(mut self, max_range_violations: usize) -> Self {
        self.max_range_violations = max_range_violations;
        self
    }

    /// Check a raw observation table without transforming it.
    pub fn check_raw(&self, batch: &RecordBatch) -> Result<IntegrityReport> {
        let mut report = IntegrityReport {
            total_rows: batch.num_rows(),
            complete_rows: 0,
            missing_values: BTreeMap::new(),
            range_violations: Vec::new(),
            domain_violations: Vec::new(),
        };

        for rule in &FEATURE_RULES {
            let column = float_column(batch, rule.feature.name())?;
            let missing = column.null_count()
                + column.iter().flatten().filter(|v| v.is_nan()).count();
            report.missing_values.insert(rule.feature.name(), missing);

            if rule.kind.is_logarithmic() {
                if let Some(value) = log_domain_violation(&column) {
                    report.domain_violations.push(DomainIssue {
                        feature: rule.feature,
                        details: format!("value {} is below -1", value),
                    });
                }
            }
        }

        let rows: Vec<RawRow> = batch_to_rows(batch)?;
        for (index, row) in rows.iter().enumerate() {
            if !row.has_missing_values() {
                report.complete_rows += 1;
            }

            if let Err(errors) = row.validate() {
                if self.strict {
                    return Err(errors.into());
                }
                if report.range_violations.len() < self.max_range_violations {
                    report.range_violations.push(RangeViolation {
                        row: index,
                        details: errors.to_string(),
                    });
                }
            }
        }

        if !report.domain_violations.is_empty() {
            warn!(
                issues = report.domain_violations.len(),
                "Table contains values outside the transform domain"
            );
        }

        Ok(report)
    }

    /// Record statistics problems that would stop either direction.
    pub fn check_statistics(&self, statistics: &FeatureStatistics, report: &mut IntegrityReport) {
        for rule in &FEATURE_RULES {
            if let Err(e) = statistics.params_for(rule) {
                report.domain_violations.push(DomainIssue {
                    feature: rule.feature,
                    details: e.to_string(),
                });
            }
        }
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();

        summary.push_str("=== Integrity Check Report ===\n");
        summary.push_str(&format!("Total Rows: {}\n", report.total_rows));
        summary.push_str(&format!(
            "Complete Rows: {} ({:.1}%)\n",
            report.complete_rows,
            percentage(report.complete_rows, report.total_rows)
        ));

        summary.push_str("\nMissing Values:\n");
        for (column, missing) in &report.missing_values {
            let units = Feature::from_name(column).map_or("", |f| f.units());
            summary.push_str(&format!(
                "  {:<5} [{}] {:>8} ({:.1}%)\n",
                column,
                units,
                missing,
                percentage(*missing, report.total_rows)
            ));
        }

        summary.push_str(&format!(
            "\nRange Violations: {}\n",
            report.range_violations.len()
        ));
        for violation in report.range_violations.iter().take(10) {
            summary.push_str(&format!(
                "  Row {}: {}\n",
                violation.row,
                violation.details.replace('\n', "; ")
            ));
        }

        summary.push_str(&format!(
            "\nDomain Violations: {}\n",
            report.domain_violations.len()
        ));
        for issue in &report.domain_violations {
            summary.push_str(&format!(
                "  {} [{}]: {}\n",
                issue.feature.display_name(),
                issue.feature,
                issue.details
            ));
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}
