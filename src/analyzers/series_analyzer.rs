use crate::error::{ProcessingError, Result};
use crate::models::{JoinedSeries, YearMonth};
use serde::Serialize;
use std::path::Path;

/// describe()-style statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); NaN for a single value
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    /// `None` when there are no values to describe
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let variance =
                sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        } else {
            f64::NAN
        };

        Some(Self {
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }
}

/// Linear interpolation between the two nearest ranks of sorted input.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesStatistics {
    pub total_months: usize,
    pub first_month: YearMonth,
    pub last_month: YearMonth,
    pub co2_coverage_percentage: f64,
    pub max_temperature: ColumnStats,
    pub co2: Option<ColumnStats>,
    pub warmest_month: YearMonth,
    pub coolest_month: YearMonth,
}

pub struct SeriesAnalyzer;

impl SeriesAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Read a joined CSV or Parquet file and describe it
    pub fn analyze_file(&self, path: &Path) -> Result<SeriesStatistics> {
        let series = crate::writers::read_series(path)?;
        self.analyze(&series)
    }

    pub fn analyze(&self, series: &JoinedSeries) -> Result<SeriesStatistics> {
        let (Some(first), Some(last)) = (series.records().first(), series.records().last()) else {
            return Err(ProcessingError::InsufficientData(
                "No records to analyze".to_string(),
            ));
        };

        let temperatures = series.max_temperatures();
        let co2: Vec<f64> = series.iter().filter_map(|r| r.co2).collect();

        let mut warmest = first;
        let mut coolest = first;
        for record in series {
            if record.max_temperature > warmest.max_temperature {
                warmest = record;
            }
            if record.max_temperature < coolest.max_temperature {
                coolest = record;
            }
        }

        let max_temperature = ColumnStats::from_values(&temperatures).ok_or_else(|| {
            ProcessingError::InsufficientData("No temperature values".to_string())
        })?;

        Ok(SeriesStatistics {
            total_months: series.len(),
            first_month: first.year_month,
            last_month: last.year_month,
            co2_coverage_percentage: series.coverage().matched_percentage(),
            max_temperature,
            co2: ColumnStats::from_values(&co2),
            warmest_month: warmest.year_month,
            coolest_month: coolest.year_month,
        })
    }
}

impl Default for SeriesAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesStatistics {
    pub fn summary(&self) -> String {
        format!(
            "Months: {} ({} to {})\n\
            CO2 coverage: {:.1}%\n\
            Max temperature: {:.1}°C to {:.1}°C (mean {:.2}°C)",
            self.total_months,
            self.first_month,
            self.last_month,
            self.co2_coverage_percentage,
            self.max_temperature.min,
            self.max_temperature.max,
            self.max_temperature.mean,
        )
    }

    pub fn detailed_summary(&self) -> String {
        let mut out = format!(
            "{}\n\n\
            Extremes:\n\
            - Warmest month: {} ({:.1}°C)\n\
            - Coolest month: {} ({:.1}°C)\n\n\
            {:<8} {:>12} {:>12}\n",
            self.summary(),
            self.warmest_month,
            self.max_temperature.max,
            self.coolest_month,
            self.max_temperature.min,
            "",
            "max_temp",
            "co2"
        );

        let t = &self.max_temperature;
        let rows: [(&str, f64, Option<f64>); 8] = [
            ("count", t.count as f64, self.co2.as_ref().map(|c| c.count as f64)),
            ("mean", t.mean, self.co2.as_ref().map(|c| c.mean)),
            ("std", t.std, self.co2.as_ref().map(|c| c.std)),
            ("min", t.min, self.co2.as_ref().map(|c| c.min)),
            ("25%", t.q25, self.co2.as_ref().map(|c| c.q25)),
            ("50%", t.median, self.co2.as_ref().map(|c| c.median)),
            ("75%", t.q75, self.co2.as_ref().map(|c| c.q75)),
            ("max", t.max, self.co2.as_ref().map(|c| c.max)),
        ];
        for (name, temperature, co2) in rows {
            let co2 = co2.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v));
            out.push_str(&format!("{:<8} {:>12.3} {:>12}\n", name, temperature, co2));
        }
        out
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ProcessingError::InvalidFormat(format!("JSON serialization failed: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JoinedRecord;

    fn series() -> JoinedSeries {
        JoinedSeries::from_records(vec![
            JoinedRecord::new("1950-01".parse().unwrap(), 1.0, Some(10.0)),
            JoinedRecord::new("1950-02".parse().unwrap(), 2.0, Some(20.0)),
            JoinedRecord::new("1950-03".parse().unwrap(), 3.0, None),
            JoinedRecord::new("1950-04".parse().unwrap(), 4.0, None),
        ])
        .unwrap()
    }

    #[test]
    fn test_column_stats_match_describe() {
        let stats = ColumnStats::from_values(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert!((stats.std - 1.2909944487358056).abs() < 1e-12);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.q25, 1.75);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.q75, 3.25);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn test_single_value_has_nan_std() {
        let stats = ColumnStats::from_values(&[7.0]).unwrap();
        assert!(stats.std.is_nan());
        assert_eq!(stats.median, 7.0);
        assert!(ColumnStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_analyze_series() {
        let stats = SeriesAnalyzer::new().analyze(&series()).unwrap();
        assert_eq!(stats.total_months, 4);
        assert_eq!(stats.first_month.to_string(), "1950-01");
        assert_eq!(stats.last_month.to_string(), "1950-04");
        assert_eq!(stats.co2_coverage_percentage, 50.0);
        assert_eq!(stats.co2.as_ref().unwrap().count, 2);
        assert_eq!(stats.warmest_month.to_string(), "1950-04");
        assert_eq!(stats.coolest_month.to_string(), "1950-01");
    }

    #[test]
    fn test_summaries_and_json() {
        let stats = SeriesAnalyzer::new().analyze(&series()).unwrap();
        assert!(stats.summary().contains("Months: 4 (1950-01 to 1950-04)"));
        assert!(stats.detailed_summary().contains("Warmest month: 1950-04"));

        let json: serde_json::Value = serde_json::from_str(&stats.to_json().unwrap()).unwrap();
        assert_eq!(json["total_months"], 4);
        assert_eq!(json["first_month"], "1950-01");
    }

    #[test]
    fn test_empty_series_is_error() {
        assert!(SeriesAnalyzer::new().analyze(&JoinedSeries::default()).is_err());
    }
}
