use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::YearMonth;

/// One country/year row from the emissions dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCo2Record {
    pub country: Option<String>,
    pub year: Option<i32>,
    pub co2: Option<f64>,
}

impl RawCo2Record {
    pub fn new(country: &str, year: i32, co2: f64) -> Self {
        Self {
            country: Some(country.to_string()),
            year: Some(year),
            co2: Some(co2),
        }
    }
}

/// Annual CO2, the unweighted mean across every country row of that year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Co2Observation {
    pub year: i32,

    #[validate(range(min = 0.0))]
    pub co2: f64,
}

impl Co2Observation {
    pub fn new(year: i32, co2: f64) -> Self {
        Self { year, co2 }
    }
}

/// Annual CO2 spread onto a single month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCo2Observation {
    pub year_month: YearMonth,
    pub co2: f64,
}

impl MonthlyCo2Observation {
    pub fn new(year_month: YearMonth, co2: f64) -> Self {
        Self { year_month, co2 }
    }
}
