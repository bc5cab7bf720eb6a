//! Declared mappings from source CSV headers to record fields.
//!
//! Renaming happens here and only here: the aligner never sees a source
//! header name.

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    CO2_COL_CO2, CO2_COL_COUNTRY, CO2_COL_YEAR, TEMP_COL_MAX_TEMPERATURE, TEMP_COL_YEAR,
    TEMP_COL_YEAR_MONTH,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureColumns {
    pub year_month: String,
    pub year: String,
    pub max_temperature: String,
}

impl Default for TemperatureColumns {
    fn default() -> Self {
        Self {
            year_month: TEMP_COL_YEAR_MONTH.to_string(),
            year: TEMP_COL_YEAR.to_string(),
            max_temperature: TEMP_COL_MAX_TEMPERATURE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Co2Columns {
    pub country: String,
    pub year: String,
    pub co2: String,
}

impl Default for Co2Columns {
    fn default() -> Self {
        Self {
            country: CO2_COL_COUNTRY.to_string(),
            year: CO2_COL_YEAR.to_string(),
            co2: CO2_COL_CO2.to_string(),
        }
    }
}

/// Position of a declared column in the header row.
pub(crate) fn column_index(headers: &StringRecord, name: &str, dataset: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| {
            ProcessingError::input_shape(format!(
                "{} file is missing required column '{}'",
                dataset, name
            ))
        })
}

/// True for cells that pandas would read as NaN.
pub(crate) fn is_missing(cell: &str) -> bool {
    matches!(cell.trim(), "" | "NA" | "NaN" | "nan" | "null" | "NULL")
}

/// Years are integers, but exports sometimes write them as `1950.0`.
pub(crate) fn parse_year(cell: &str) -> Option<i32> {
    let cell = cell.trim();
    cell.parse::<i32>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0 && v.abs() < i32::MAX as f64)
            .map(|v| v as i32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index() {
        let headers = StringRecord::from(vec!["Yr_Month", " Year ", "maximum temperature (degC)"]);
        assert_eq!(column_index(&headers, "Year", "temperature").unwrap(), 1);

        let err = column_index(&headers, "minimum temperature (degC)", "temperature").unwrap_err();
        assert!(err.to_string().contains("minimum temperature (degC)"));
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("1950"), Some(1950));
        assert_eq!(parse_year(" 1950.0 "), Some(1950));
        assert_eq!(parse_year("1950.5"), None);
        assert_eq!(parse_year("year"), None);
    }

    #[test]
    fn test_missing_markers() {
        assert!(is_missing(""));
        assert!(is_missing(" NaN "));
        assert!(!is_missing("0.0"));
    }
}
