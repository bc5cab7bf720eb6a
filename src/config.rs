//! Layered configuration for the aligner.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file,
//! then `ACORN_`-prefixed environment variables (`__` separates nested keys,
//! e.g. `ACORN_CO2__MIN_YEAR=1950`). CLI flags are applied on top by the
//! command layer.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::ops::Bound;
use std::path::Path;
use tracing::debug;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::YearMonth;
use crate::processors::decomposition::DecompositionModel;
use crate::processors::series_aligner::FillPolicy;
use crate::processors::window::DateWindow;
use crate::readers::{Co2Columns, TemperatureColumns};
use crate::utils::constants::{
    COMPRESSION_SNAPPY, DEFAULT_CHUNK_SIZE, DEFAULT_CO2_MAX_YEAR, DEFAULT_CO2_MIN_YEAR,
    DEFAULT_SEASONAL_PERIOD, DEFAULT_SPLIT_BOUNDARY, DEFAULT_SPLIT_START, ENV_PREFIX,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    pub temperature: TemperatureConfig,
    pub co2: Co2Config,
    pub window: WindowConfig,
    pub split: SplitConfig,
    pub decomposition: DecompositionConfig,
    pub processing: ProcessingConfig,
}

/// Raw temperature ingestion and the optional year subset applied before aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureConfig {
    pub columns: TemperatureColumns,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Co2Config {
    pub columns: Co2Columns,
    pub min_year: i32,
    pub max_year: i32,
    pub fill_policy: FillPolicy,
}

impl Default for Co2Config {
    fn default() -> Self {
        Self {
            columns: Co2Columns::default(),
            min_year: DEFAULT_CO2_MIN_YEAR,
            max_year: DEFAULT_CO2_MAX_YEAR,
            fill_policy: FillPolicy::default(),
        }
    }
}

/// Working window over the joined series. `from` is inclusive; `until` is
/// exclusive unless `until_inclusive` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub from: Option<YearMonth>,
    pub until: Option<YearMonth>,
    pub until_inclusive: bool,
}

impl WindowConfig {
    pub fn to_window(&self) -> Result<DateWindow> {
        let start = self.from.map_or(Bound::Unbounded, Bound::Included);
        let end = match self.until {
            Some(until) if self.until_inclusive => Bound::Included(until),
            Some(until) => Bound::Excluded(until),
            None => Bound::Unbounded,
        };
        DateWindow::new(start, end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub start: YearMonth,
    pub boundary: YearMonth,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            start: DEFAULT_SPLIT_START
                .parse()
                .unwrap_or_else(|_| unreachable!("default split start is a valid key")),
            boundary: DEFAULT_SPLIT_BOUNDARY
                .parse()
                .unwrap_or_else(|_| unreachable!("default split boundary is a valid key")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DecompositionConfig {
    #[validate(range(min = 2))]
    pub period: usize,
    pub model: DecompositionModel,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_SEASONAL_PERIOD,
            model: DecompositionModel::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProcessingConfig {
    #[validate(range(min = 1))]
    pub max_workers: usize,
    #[validate(range(min = 1))]
    pub chunk_size: usize,
    pub use_mmap: bool,
    pub compression: String,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_workers: num_cpus::get(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            use_mmap: false,
            compression: COMPRESSION_SNAPPY.to_string(),
        }
    }
}

impl AlignerConfig {
    /// Load defaults, then the optional file, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AlignerConfig = builder.build()?.try_deserialize()?;
        config.check()?;
        debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Cross-field checks the individual sections cannot express
    pub fn check(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.temperature.min_year, self.temperature.max_year) {
            if min > max {
                return Err(ProcessingError::range(format!(
                    "temperature year range is inverted: {} > {}",
                    min, max
                )));
            }
        }
        if self.co2.min_year > self.co2.max_year {
            return Err(ProcessingError::range(format!(
                "CO2 year bounds are inverted: {} > {}",
                self.co2.min_year, self.co2.max_year
            )));
        }
        if self.split.start >= self.split.boundary {
            return Err(ProcessingError::range(format!(
                "split start {} must precede boundary {}",
                self.split.start, self.split.boundary
            )));
        }
        self.window.to_window()?;
        self.decomposition.validate()?;
        self.processing.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults() {
        let config = AlignerConfig::default();
        assert_eq!(config.co2.min_year, 1910);
        assert_eq!(config.co2.max_year, 2019);
        assert_eq!(config.co2.fill_policy, FillPolicy::SameYear);
        assert_eq!(config.temperature.columns.max_temperature, "maximum temperature (degC)");
        assert_eq!(config.split.boundary.to_string(), "1990-01");
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[temperature]
min_year = 1980

[co2]
min_year = 1950
fill_policy = "backward"

[window]
from = "1980-01"

[decomposition]
period = 30
"#
        )
        .unwrap();

        let config = AlignerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.temperature.min_year, Some(1980));
        assert_eq!(config.co2.min_year, 1950);
        assert_eq!(config.co2.max_year, 2019);
        assert_eq!(config.co2.fill_policy, FillPolicy::Backward);
        assert_eq!(config.window.from.unwrap().to_string(), "1980-01");
        assert_eq!(config.decomposition.period, 30);
    }

    #[test]
    fn test_inverted_ranges_fail_check() {
        let mut config = AlignerConfig::default();
        config.co2.min_year = 2020;
        assert!(matches!(config.check(), Err(ProcessingError::Range { .. })));

        let mut config = AlignerConfig::default();
        config.window.from = Some("1990-01".parse().unwrap());
        config.window.until = Some("1990-01".parse().unwrap());
        assert!(config.check().is_err());

        config.window.until_inclusive = true;
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_environment_overrides_defaults() {
        // The TOML test sets the same value, so running alongside it is harmless.
        std::env::set_var("ACORN_CO2__MIN_YEAR", "1950");
        let loaded = AlignerConfig::load(None);
        std::env::remove_var("ACORN_CO2__MIN_YEAR");

        let config = loaded.unwrap();
        assert_eq!(config.co2.min_year, 1950);
        assert_eq!(config.co2.max_year, 2019);
    }

    #[test]
    fn test_processing_validation() {
        let mut config = AlignerConfig::default();
        config.processing.chunk_size = 0;
        assert!(matches!(config.check(), Err(ProcessingError::Validation(_))));
    }
}
