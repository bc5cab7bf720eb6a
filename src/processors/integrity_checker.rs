use crate::error::Result;
use crate::models::{JoinedSeries, YearMonth};
use crate::utils::constants::TEMP_JUMP_THRESHOLD;
use serde::Serialize;
use validator::Validate;

#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub total_records: usize,
    pub matched_records: usize,
    pub unmatched_records: usize,
    pub unmatched_keys: Vec<YearMonth>,
    pub missing_months: Vec<YearMonth>,
    pub violations: Vec<SeriesViolation>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.unmatched_records == 0 && self.missing_months.is_empty() && self.violations.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesViolation {
    pub year_month: YearMonth,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationType {
    OutOfRange,
    NegativeCo2,
    SuspiciousJump,
}

pub struct IntegrityChecker {
    temperature_jump_threshold: f64,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self {
            temperature_jump_threshold: TEMP_JUMP_THRESHOLD, // between consecutive monthly means
        }
    }

    pub fn with_jump_threshold(temperature_jump_threshold: f64) -> Self {
        Self {
            temperature_jump_threshold,
        }
    }

    /// Check coverage, calendar continuity and value ranges of a joined series
    pub fn check_integrity(&self, series: &JoinedSeries) -> Result<IntegrityReport> {
        let coverage = series.coverage();
        let mut report = IntegrityReport {
            total_records: coverage.total_rows,
            matched_records: coverage.matched_rows,
            unmatched_records: coverage.unmatched_rows,
            unmatched_keys: coverage.unmatched_keys,
            missing_months: Vec::new(),
            violations: Vec::new(),
        };

        for record in series {
            if let Err(errors) = record.validate() {
                for (field, _) in errors.field_errors() {
                    let (violation_type, details) = if field == "co2" {
                        (
                            ViolationType::NegativeCo2,
                            format!("co2 {:?} is negative", record.co2),
                        )
                    } else {
                        (
                            ViolationType::OutOfRange,
                            format!(
                                "max temperature {} is outside the plausible range",
                                record.max_temperature
                            ),
                        )
                    };
                    report.violations.push(SeriesViolation {
                        year_month: record.year_month,
                        violation_type,
                        details,
                    });
                }
            }
        }

        self.check_time_series_integrity(series, &mut report);

        Ok(report)
    }

    /// Gaps in the monthly grid and suspicious month-to-month jumps
    fn check_time_series_integrity(&self, series: &JoinedSeries, report: &mut IntegrityReport) {
        for window in series.records().windows(2) {
            let prev = &window[0];
            let curr = &window[1];

            let step = prev.year_month.months_until(&curr.year_month);
            if step > 1 {
                report
                    .missing_months
                    .extend(prev.year_month.next().range_inclusive(curr.year_month.previous()));
                continue;
            }

            let jump = (curr.max_temperature - prev.max_temperature).abs();
            if jump > self.temperature_jump_threshold {
                report.violations.push(SeriesViolation {
                    year_month: curr.year_month,
                    violation_type: ViolationType::SuspiciousJump,
                    details: format!(
                        "max temperature jumped {:.1}°C from {} to {}",
                        jump, prev.year_month, curr.year_month
                    ),
                });
            }
        }
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();
        let percentage = |count: usize| {
            if report.total_records == 0 {
                0.0
            } else {
                100.0 * count as f64 / report.total_records as f64
            }
        };

        summary.push_str("=== Integrity Check Report ===\n");
        summary.push_str(&format!("Total Months: {}\n", report.total_records));
        summary.push_str(&format!(
            "Months with CO2: {} ({:.1}%)\n",
            report.matched_records,
            percentage(report.matched_records)
        ));
        summary.push_str(&format!(
            "Months without CO2: {} ({:.1}%)\n",
            report.unmatched_records,
            percentage(report.unmatched_records)
        ));
        let keys = &report.unmatched_keys;
        if let (Some(first), Some(last)) = (keys.first(), keys.last()) {
            summary.push_str(&format!("  Unmatched span: {} .. {}\n", first, last));
        }
        summary.push_str(&format!(
            "Missing Calendar Months: {}\n",
            report.missing_months.len()
        ));
        summary.push_str(&format!("\nViolations: {}\n", report.violations.len()));

        if !report.violations.is_empty() {
            summary.push_str("\nTop 10 Violations:\n");
            for (i, violation) in report.violations.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. {}: {}\n",
                    i + 1,
                    violation.year_month,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JoinedRecord;

    fn series(rows: &[(&str, f64, Option<f64>)]) -> JoinedSeries {
        JoinedSeries::from_records(
            rows.iter()
                .map(|(key, temp, co2)| JoinedRecord::new(key.parse().unwrap(), *temp, *co2))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_clean_series() {
        let joined = series(&[("1950-01", 25.0, Some(1.0)), ("1950-02", 24.0, Some(1.0))]);
        let report = IntegrityChecker::new().check_integrity(&joined).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.total_records, 2);
    }

    #[test]
    fn test_reports_unmatched_and_missing_months() {
        let joined = series(&[
            ("1950-01", 25.0, Some(1.0)),
            ("1950-04", 24.0, None),
            ("1950-05", 23.0, None),
        ]);
        let report = IntegrityChecker::new().check_integrity(&joined).unwrap();

        assert_eq!(report.unmatched_records, 2);
        let missing: Vec<String> = report.missing_months.iter().map(|m| m.to_string()).collect();
        assert_eq!(missing, vec!["1950-02", "1950-03"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_reports_value_violations() {
        let joined = series(&[
            ("1950-01", 25.0, Some(-1.0)),
            ("1950-02", 45.0, Some(1.0)),
            ("1950-03", 75.0, Some(1.0)),
        ]);
        let report = IntegrityChecker::new().check_integrity(&joined).unwrap();

        let types: Vec<ViolationType> =
            report.violations.iter().map(|v| v.violation_type).collect();
        assert!(types.contains(&ViolationType::NegativeCo2));
        assert!(types.contains(&ViolationType::OutOfRange));
        assert!(types.contains(&ViolationType::SuspiciousJump));
    }

    #[test]
    fn test_custom_jump_threshold() {
        let joined = series(&[("1950-01", 20.0, Some(1.0)), ("1950-02", 26.0, Some(1.0))]);
        assert!(IntegrityChecker::new().check_integrity(&joined).unwrap().is_clean());

        let strict = IntegrityChecker::with_jump_threshold(5.0);
        let report = strict.check_integrity(&joined).unwrap();
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].violation_type, ViolationType::SuspiciousJump);
    }

    #[test]
    fn test_summary_mentions_counts() {
        let joined = series(&[("1950-01", 25.0, Some(1.0)), ("1950-02", 24.0, None)]);
        let checker = IntegrityChecker::new();
        let report = checker.check_integrity(&joined).unwrap();
        let summary = checker.generate_summary(&report);

        assert!(summary.contains("Total Months: 2"));
        assert!(summary.contains("Months without CO2: 1 (50.0%)"));
    }
}
