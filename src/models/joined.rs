use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::YearMonth;

/// One month of the aligned output table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct JoinedRecord {
    pub year_month: YearMonth,

    #[validate(range(min = -50.0, max = 60.0))]
    pub max_temperature: f64,

    #[validate(range(min = 0.0))]
    pub co2: Option<f64>,
}

impl JoinedRecord {
    pub fn new(year_month: YearMonth, max_temperature: f64, co2: Option<f64>) -> Self {
        Self {
            year_month,
            max_temperature,
            co2,
        }
    }

    pub fn has_co2(&self) -> bool {
        self.co2.is_some()
    }
}

/// How much of a joined series received a CO2 value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coverage {
    pub total_rows: usize,
    pub matched_rows: usize,
    pub unmatched_rows: usize,
    pub unmatched_keys: Vec<YearMonth>,
}

impl Coverage {
    pub fn matched_percentage(&self) -> f64 {
        if self.total_rows == 0 {
            return 0.0;
        }
        100.0 * self.matched_rows as f64 / self.total_rows as f64
    }

    pub fn is_complete(&self) -> bool {
        self.unmatched_rows == 0
    }
}

/// Monthly temperature joined with monthly CO2, ascending by `year_month`
/// with one row per month.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinedSeries {
    records: Vec<JoinedRecord>,
}

impl JoinedSeries {
    /// Builds a series from rows that are already strictly ascending.
    pub fn from_records(records: Vec<JoinedRecord>) -> Result<Self> {
        for pair in records.windows(2) {
            if pair[1].year_month == pair[0].year_month {
                return Err(ProcessingError::duplicate_key(
                    "joined series",
                    pair[1].year_month,
                ));
            }
            if pair[1].year_month < pair[0].year_month {
                return Err(ProcessingError::input_shape(format!(
                    "joined series must be ordered by year_month, found {} after {}",
                    pair[1].year_month, pair[0].year_month
                )));
            }
        }
        Ok(Self { records })
    }

    /// Callers guarantee strict ordering; used by stages that preserve it.
    pub(crate) fn from_sorted_unchecked(records: Vec<JoinedRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[JoinedRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JoinedRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_month(&self) -> Option<YearMonth> {
        self.records.first().map(|r| r.year_month)
    }

    pub fn last_month(&self) -> Option<YearMonth> {
        self.records.last().map(|r| r.year_month)
    }

    pub fn get(&self, year_month: &YearMonth) -> Option<&JoinedRecord> {
        self.records
            .binary_search_by(|r| r.year_month.cmp(year_month))
            .ok()
            .map(|i| &self.records[i])
    }

    pub fn max_temperatures(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.max_temperature).collect()
    }

    pub fn coverage(&self) -> Coverage {
        let unmatched_keys: Vec<YearMonth> = self
            .records
            .iter()
            .filter(|r| !r.has_co2())
            .map(|r| r.year_month)
            .collect();

        Coverage {
            total_rows: self.records.len(),
            matched_rows: self.records.len() - unmatched_keys.len(),
            unmatched_rows: unmatched_keys.len(),
            unmatched_keys,
        }
    }
}

impl<'a> IntoIterator for &'a JoinedSeries {
    type Item = &'a JoinedRecord;
    type IntoIter = std::slice::Iter<'a, JoinedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, temp: f64, co2: Option<f64>) -> JoinedRecord {
        JoinedRecord::new(key.parse().unwrap(), temp, co2)
    }

    #[test]
    fn test_from_records_rejects_duplicates_and_disorder() {
        let duplicate = vec![record("1950-01", 25.0, None), record("1950-01", 24.0, None)];
        assert!(matches!(
            JoinedSeries::from_records(duplicate),
            Err(ProcessingError::InputShape { .. })
        ));

        let unordered = vec![record("1950-02", 25.0, None), record("1950-01", 24.0, None)];
        assert!(JoinedSeries::from_records(unordered).is_err());
    }

    #[test]
    fn test_coverage_counts_unmatched_rows() {
        let series = JoinedSeries::from_records(vec![
            record("1950-01", 25.0, Some(10.0)),
            record("1950-02", 24.0, None),
            record("1950-03", 23.0, Some(10.0)),
            record("1950-04", 22.0, None),
        ])
        .unwrap();

        let coverage = series.coverage();
        assert_eq!(coverage.total_rows, 4);
        assert_eq!(coverage.matched_rows, 2);
        assert_eq!(coverage.unmatched_rows, 2);
        assert_eq!(coverage.unmatched_keys[0].to_string(), "1950-02");
        assert_eq!(coverage.matched_percentage(), 50.0);
        assert!(!coverage.is_complete());
    }

    #[test]
    fn test_lookup_by_month() {
        let series = JoinedSeries::from_records(vec![
            record("1950-01", 25.0, Some(10.0)),
            record("1950-02", 24.0, None),
        ])
        .unwrap();

        assert_eq!(series.get(&"1950-02".parse().unwrap()).unwrap().max_temperature, 24.0);
        assert!(series.get(&"1950-03".parse().unwrap()).is_none());
        assert_eq!(series.first_month().unwrap().to_string(), "1950-01");
        assert_eq!(series.last_month().unwrap().to_string(), "1950-02");
    }
}
