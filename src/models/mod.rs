pub mod co2;
pub mod joined;
pub mod temperature;
pub mod year_month;

pub use co2::{Co2Observation, MonthlyCo2Observation, RawCo2Record};
pub use joined::{Coverage, JoinedRecord, JoinedSeries};
pub use temperature::{RawTemperatureRecord, TemperatureObservation};
pub use year_month::YearMonth;
