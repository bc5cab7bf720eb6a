use crate::error::{ProcessingError, Result};
use crate::models::{Co2Observation, RawCo2Record, RawTemperatureRecord, TemperatureObservation};
use crate::utils::constants::DEFAULT_CHUNK_SIZE;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Running sum and count for one group.
#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn merge(&mut self, other: MeanAccumulator) {
        self.sum += other.sum;
        self.count += other.count;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Group-and-mean reduction for both input series.
///
/// Large inputs are split into fixed-size chunks reduced in parallel; the
/// partial sums are merged in chunk order so the result does not depend on
/// scheduling.
pub struct Aggregator {
    chunk_size: usize,
    pool: Option<ThreadPool>,
}

impl Aggregator {
    /// The worker pool is built once here and shared by every aggregation call.
    /// If it cannot be built, aggregation runs sequentially.
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        let pool = if max_workers > 1 {
            match ThreadPoolBuilder::new().num_threads(max_workers).build() {
                Ok(pool) => Some(pool),
                Err(e) => {
                    warn!("Falling back to sequential aggregation: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            pool,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Mean maximum temperature per `(year_month, year)`, ascending by month
    pub fn aggregate_temperatures(
        &self,
        records: &[RawTemperatureRecord],
    ) -> Result<Vec<TemperatureObservation>> {
        let groups = self.grouped_means(records, |row, record| {
            let year_month = record.year_month.ok_or_else(|| {
                ProcessingError::input_shape(format!(
                    "temperature row {} is missing year_month",
                    row
                ))
            })?;
            let year = record.year.ok_or_else(|| {
                ProcessingError::input_shape(format!("temperature row {} is missing year", row))
            })?;
            Ok(((year_month, year), Some(record.max_temperature)))
        })?;

        let mut observations: Vec<TemperatureObservation> = Vec::with_capacity(groups.len());
        for ((year_month, year), acc) in groups {
            if let Some(previous) = observations.last() {
                if previous.year_month == year_month {
                    return Err(ProcessingError::input_shape(format!(
                        "temperature aggregation requires one row per year_month, \
                         but {} is grouped under both year {} and year {}",
                        year_month, previous.year, year
                    )));
                }
            }

            let Some(mean) = acc.mean() else { continue };
            let observation = TemperatureObservation::new(year_month, year, mean);
            observation.validate_key()?;
            observations.push(observation);
        }

        debug!(
            input_rows = records.len(),
            months = observations.len(),
            "Aggregated temperature records"
        );
        Ok(observations)
    }

    /// Unweighted mean CO2 per year across all country rows of that year
    pub fn aggregate_co2(&self, records: &[RawCo2Record]) -> Result<Vec<Co2Observation>> {
        let groups = self.grouped_means(records, |row, record| {
            let year = record.year.ok_or_else(|| {
                ProcessingError::input_shape(format!("CO2 row {} is missing year", row))
            })?;
            Ok((year, record.co2))
        })?;

        let mut empty_years = Vec::new();
        let mut observations = Vec::with_capacity(groups.len());
        for (year, acc) in groups {
            match acc.mean() {
                Some(mean) => observations.push(Co2Observation::new(year, mean)),
                None => empty_years.push(year),
            }
        }

        if !empty_years.is_empty() {
            warn!(
                "{} years have no CO2 value in any country row (first: {})",
                empty_years.len(),
                empty_years[0]
            );
        }
        debug!(
            input_rows = records.len(),
            years = observations.len(),
            "Aggregated CO2 records"
        );
        Ok(observations)
    }

    /// Reduce records to per-key accumulators, in parallel when worthwhile
    fn grouped_means<T, K, F>(
        &self,
        records: &[T],
        key_value: F,
    ) -> Result<BTreeMap<K, MeanAccumulator>>
    where
        T: Sync,
        K: Ord + Send,
        F: Fn(usize, &T) -> Result<(K, Option<f64>)> + Sync,
    {
        let chunk_size = self.chunk_size;
        let reduce_chunk = |chunk_idx: usize, chunk: &[T]| {
            let mut partial: BTreeMap<K, MeanAccumulator> = BTreeMap::new();
            for (offset, record) in chunk.iter().enumerate() {
                let (key, value) = key_value(chunk_idx * chunk_size + offset, record)?;
                let acc = partial.entry(key).or_default();
                if let Some(value) = value {
                    acc.push(value);
                }
            }
            Ok::<_, ProcessingError>(partial)
        };

        let partials: Vec<BTreeMap<K, MeanAccumulator>> = match &self.pool {
            Some(pool) if records.len() > chunk_size => pool.install(|| {
                records
                    .par_chunks(chunk_size)
                    .enumerate()
                    .map(|(i, chunk)| reduce_chunk(i, chunk))
                    .collect::<Result<Vec<_>>>()
            })?,
            _ => records
                .chunks(chunk_size)
                .enumerate()
                .map(|(i, chunk)| reduce_chunk(i, chunk))
                .collect::<Result<_>>()?,
        };

        let mut merged: BTreeMap<K, MeanAccumulator> = BTreeMap::new();
        for partial in partials {
            for (key, acc) in partial {
                merged.entry(key).or_default().merge(acc);
            }
        }
        Ok(merged)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

/// Keep raw temperature rows whose year lies within the optional bounds.
///
/// Rows without a year are kept so aggregation can reject them.
pub fn subset_years(
    records: &[RawTemperatureRecord],
    min_year: Option<i32>,
    max_year: Option<i32>,
) -> Result<Vec<RawTemperatureRecord>> {
    if let (Some(min), Some(max)) = (min_year, max_year) {
        if min > max {
            return Err(ProcessingError::range(format!(
                "temperature year range is inverted: {} > {}",
                min, max
            )));
        }
    }

    Ok(records
        .iter()
        .filter(|r| match r.year {
            Some(year) => {
                min_year.map_or(true, |min| year >= min) && max_year.map_or(true, |max| year <= max)
            }
            None => true,
        })
        .cloned()
        .collect())
}
