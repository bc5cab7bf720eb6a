//! Classical moving-average seasonal decomposition of the monthly
//! temperature column.
//!
//! The trend is a centred moving average over one seasonal period, the
//! seasonal component is the per-position mean of the detrended values, and
//! the residual is whatever remains. Trend and residual are undefined for the
//! first and last half-period.

use crate::error::{ProcessingError, Result};
use crate::models::{JoinedSeries, YearMonth};
use crate::utils::constants::DEFAULT_SEASONAL_PERIOD;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DecompositionModel {
    /// observed = trend + seasonal + residual
    #[default]
    Additive,
    /// observed = trend * seasonal * residual
    Multiplicative,
}

/// Components aligned index-for-index with the input values.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub model: DecompositionModel,
    pub period: usize,
    pub observed: Vec<f64>,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<Option<f64>>,
}

impl Decomposition {
    /// One seasonal cycle of the seasonal component.
    pub fn seasonal_pattern(&self) -> &[f64] {
        &self.seasonal[..self.period.min(self.seasonal.len())]
    }
}

/// One output row of a decomposed joined series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecompositionRow {
    pub year_month: YearMonth,
    pub observed: f64,
    pub trend: Option<f64>,
    pub seasonal: f64,
    pub residual: Option<f64>,
}

pub struct Decomposer {
    model: DecompositionModel,
    period: usize,
}

impl Decomposer {
    pub fn new(model: DecompositionModel) -> Self {
        Self {
            model,
            period: DEFAULT_SEASONAL_PERIOD,
        }
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    /// Decompose the `max_temperature` column of a joined series
    pub fn decompose_series(&self, series: &JoinedSeries) -> Result<Vec<DecompositionRow>> {
        let decomposition = self.decompose(&series.max_temperatures())?;

        Ok(series
            .iter()
            .enumerate()
            .map(|(i, record)| DecompositionRow {
                year_month: record.year_month,
                observed: decomposition.observed[i],
                trend: decomposition.trend[i],
                seasonal: decomposition.seasonal[i],
                residual: decomposition.residual[i],
            })
            .collect())
    }

    pub fn decompose(&self, values: &[f64]) -> Result<Decomposition> {
        let period = self.period;
        if period < 2 {
            return Err(ProcessingError::InsufficientData(format!(
                "seasonal period must be at least 2, got {}",
                period
            )));
        }
        if values.len() < 2 * period {
            return Err(ProcessingError::InsufficientData(format!(
                "decomposition needs two complete cycles ({} observations), got {}",
                2 * period,
                values.len()
            )));
        }
        if self.model == DecompositionModel::Multiplicative && values.iter().any(|v| *v <= 0.0) {
            return Err(ProcessingError::InsufficientData(
                "multiplicative decomposition requires strictly positive observations".to_string(),
            ));
        }

        let trend = centred_moving_average(values, period);

        let detrended: Vec<Option<f64>> = values
            .iter()
            .zip(&trend)
            .map(|(value, trend)| {
                trend.map(|t| match self.model {
                    DecompositionModel::Additive => value - t,
                    DecompositionModel::Multiplicative => value / t,
                })
            })
            .collect();

        let pattern = self.seasonal_pattern(&detrended, period);
        let seasonal: Vec<f64> = (0..values.len()).map(|i| pattern[i % period]).collect();

        let residual = detrended
            .iter()
            .zip(&seasonal)
            .map(|(d, s)| {
                d.map(|d| match self.model {
                    DecompositionModel::Additive => d - s,
                    DecompositionModel::Multiplicative => d / s,
                })
            })
            .collect();

        debug!(
            observations = values.len(),
            period,
            model = ?self.model,
            "Decomposed series"
        );

        Ok(Decomposition {
            model: self.model,
            period,
            observed: values.to_vec(),
            trend,
            seasonal,
            residual,
        })
    }

    /// Mean detrended value per seasonal position, centred on 0 (additive)
    /// or 1 (multiplicative)
    fn seasonal_pattern(&self, detrended: &[Option<f64>], period: usize) -> Vec<f64> {
        let mut sums = vec![0.0; period];
        let mut counts = vec![0usize; period];
        for (i, value) in detrended.iter().enumerate() {
            if let Some(value) = value {
                sums[i % period] += value;
                counts[i % period] += 1;
            }
        }

        let mut pattern: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .map(|(sum, count)| if *count > 0 { sum / *count as f64 } else { 0.0 })
            .collect();

        let centre = pattern.iter().sum::<f64>() / period as f64;
        for value in &mut pattern {
            match self.model {
                DecompositionModel::Additive => *value -= centre,
                DecompositionModel::Multiplicative => *value /= centre,
            }
        }
        pattern
    }
}

impl Default for Decomposer {
    fn default() -> Self {
        Self::new(DecompositionModel::Additive)
    }
}

/// Centred moving average over `period` points; a 2x`period` average with
/// half weights at both ends when `period` is even.
fn centred_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let weights: Vec<f64> = if period % 2 == 0 {
        let mut w = vec![1.0 / period as f64; period + 1];
        w[0] /= 2.0;
        w[period] /= 2.0;
        w
    } else {
        vec![1.0 / period as f64; period]
    };

    let half = weights.len() / 2;
    (0..values.len())
        .map(|i| {
            if i < half || i + half >= values.len() {
                return None;
            }
            let window = &values[i - half..=i + half];
            Some(window.iter().zip(&weights).map(|(v, w)| v * w).sum())
        })
        .collect()
}
