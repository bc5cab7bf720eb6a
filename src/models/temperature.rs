use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::YearMonth;
use crate::utils::constants::{MAX_VALID_TEMP, MIN_VALID_TEMP};

/// One station/day row as delivered by the temperature reader.
///
/// Key fields stay optional so that a row missing them reaches aggregation
/// and is rejected there with the row index, instead of disappearing at ingest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTemperatureRecord {
    pub year_month: Option<YearMonth>,
    pub year: Option<i32>,
    pub max_temperature: f64,
}

impl RawTemperatureRecord {
    pub fn new(year_month: YearMonth, year: i32, max_temperature: f64) -> Self {
        Self {
            year_month: Some(year_month),
            year: Some(year),
            max_temperature,
        }
    }
}

/// Monthly mean of daily maximum temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TemperatureObservation {
    pub year_month: YearMonth,
    pub year: i32,

    #[validate(range(min = -50.0, max = 60.0))]
    pub max_temperature: f64,
}

impl TemperatureObservation {
    pub fn new(year_month: YearMonth, year: i32, max_temperature: f64) -> Self {
        Self {
            year_month,
            year,
            max_temperature,
        }
    }

    pub fn is_valid_temperature(&self) -> bool {
        (MIN_VALID_TEMP..=MAX_VALID_TEMP).contains(&self.max_temperature)
    }

    /// The `year` column must agree with the year inside `year_month`.
    pub fn validate_key(&self) -> Result<()> {
        if self.year_month.year() != self.year {
            return Err(ProcessingError::input_shape(format!(
                "year {} disagrees with year_month {}",
                self.year, self.year_month
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    #[test]
    fn test_temperature_validation() {
        let valid = TemperatureObservation::new(ym("2019-01"), 2019, 35.4);
        assert!(valid.validate().is_ok());
        assert!(valid.is_valid_temperature());

        let invalid = TemperatureObservation::new(ym("2019-01"), 2019, 75.0);
        assert!(invalid.validate().is_err());
        assert!(!invalid.is_valid_temperature());
    }

    #[test]
    fn test_key_consistency() {
        assert!(TemperatureObservation::new(ym("1950-01"), 1950, 20.0)
            .validate_key()
            .is_ok());
        assert!(TemperatureObservation::new(ym("1950-01"), 1951, 20.0)
            .validate_key()
            .is_err());
    }
}
