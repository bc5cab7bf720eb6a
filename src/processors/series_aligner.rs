use crate::error::{ProcessingError, Result};
use crate::models::{
    Co2Observation, JoinedRecord, JoinedSeries, MonthlyCo2Observation, TemperatureObservation,
    YearMonth,
};
use crate::processors::window::DateWindow;
use crate::utils::constants::{DEFAULT_CO2_MAX_YEAR, DEFAULT_CO2_MIN_YEAR};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use tracing::{debug, info, warn};

/// Which annual value a month receives when annual CO2 is spread onto months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FillPolicy {
    /// Each year's value repeats over its own twelve months
    #[default]
    SameYear,
    /// Anchors on January; other months take the next anchor at or after them
    Backward,
    /// Anchors on January; months take the latest anchor at or before them
    Forward,
}

impl std::fmt::Display for FillPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FillPolicy::SameYear => "same-year",
            FillPolicy::Backward => "backward",
            FillPolicy::Forward => "forward",
        };
        write!(f, "{}", name)
    }
}

/// Keep annual observations with `lower_year <= year <= upper_year`.
pub fn bound_years(
    observations: &[Co2Observation],
    lower_year: i32,
    upper_year: i32,
) -> Result<Vec<Co2Observation>> {
    if lower_year > upper_year {
        return Err(ProcessingError::range(format!(
            "CO2 year bounds are inverted: {} > {}",
            lower_year, upper_year
        )));
    }

    let bounded: Vec<Co2Observation> = observations
        .iter()
        .filter(|o| (lower_year..=upper_year).contains(&o.year))
        .cloned()
        .collect();

    debug!(
        kept = bounded.len(),
        dropped = observations.len() - bounded.len(),
        "Bounded CO2 years to [{}, {}]",
        lower_year,
        upper_year
    );
    Ok(bounded)
}

/// Spread annual observations onto a monthly grid.
pub fn upsample(
    observations: &[Co2Observation],
    policy: FillPolicy,
) -> Result<Vec<MonthlyCo2Observation>> {
    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for observation in observations {
        if by_year.insert(observation.year, observation.co2).is_some() {
            return Err(ProcessingError::duplicate_key(
                "CO2 upsampling",
                format!("year {}", observation.year),
            ));
        }
    }

    let (Some((&first_year, _)), Some((&last_year, _))) =
        (by_year.first_key_value(), by_year.last_key_value())
    else {
        return Ok(Vec::new());
    };

    let mut monthly = Vec::with_capacity(by_year.len() * 12);
    match policy {
        FillPolicy::SameYear => {
            for (&year, &co2) in &by_year {
                let months = YearMonth::january(year)?.range_inclusive(YearMonth::december(year)?);
                for year_month in months {
                    monthly.push(MonthlyCo2Observation::new(year_month, co2));
                }
            }
        }
        FillPolicy::Backward => {
            let months = YearMonth::january(first_year)?
                .range_inclusive(YearMonth::january(last_year)?);
            for year_month in months {
                let anchor = if year_month.month() == 1 {
                    year_month.year()
                } else {
                    year_month.year() + 1
                };
                if let Some((_, &co2)) = by_year.range(anchor..).next() {
                    monthly.push(MonthlyCo2Observation::new(year_month, co2));
                }
            }
        }
        FillPolicy::Forward => {
            let months = YearMonth::january(first_year)?
                .range_inclusive(YearMonth::december(last_year)?);
            for year_month in months {
                if let Some((_, &co2)) = by_year.range(..=year_month.year()).next_back() {
                    monthly.push(MonthlyCo2Observation::new(year_month, co2));
                }
            }
        }
    }

    debug!(
        years = by_year.len(),
        months = monthly.len(),
        policy = %policy,
        "Upsampled CO2 to monthly"
    );
    Ok(monthly)
}

/// Left outer join of monthly temperature with monthly CO2 on `year_month`.
///
/// Every temperature month appears exactly once in the output. Duplicate keys
/// on either side are rejected rather than resolved by the join.
pub fn join(
    temperatures: &[TemperatureObservation],
    monthly_co2: &[MonthlyCo2Observation],
) -> Result<JoinedSeries> {
    let mut co2_by_month: HashMap<YearMonth, f64> = HashMap::with_capacity(monthly_co2.len());
    for observation in monthly_co2 {
        if co2_by_month
            .insert(observation.year_month, observation.co2)
            .is_some()
        {
            return Err(ProcessingError::duplicate_key(
                "join (CO2 side)",
                observation.year_month,
            ));
        }
    }

    let mut rows: Vec<JoinedRecord> = temperatures
        .iter()
        .map(|t| {
            JoinedRecord::new(
                t.year_month,
                t.max_temperature,
                co2_by_month.get(&t.year_month).copied(),
            )
        })
        .collect();
    rows.sort_by_key(|r| r.year_month);

    if let Some(pair) = rows.windows(2).find(|pair| pair[0].year_month == pair[1].year_month) {
        return Err(ProcessingError::duplicate_key(
            "join (temperature side)",
            pair[0].year_month,
        ));
    }

    let series = JoinedSeries::from_sorted_unchecked(rows);
    let coverage = series.coverage();
    if coverage.unmatched_rows > 0 {
        warn!(
            "{} of {} months have no CO2 value (first unmatched: {})",
            coverage.unmatched_rows,
            coverage.total_rows,
            coverage.unmatched_keys[0]
        );
    }
    debug!(
        rows = coverage.total_rows,
        matched = coverage.matched_rows,
        "Joined temperature and CO2"
    );
    Ok(series)
}

/// Rows of `series` inside `window`.
pub fn apply_window(series: &JoinedSeries, window: &DateWindow) -> JoinedSeries {
    let rows = series
        .iter()
        .filter(|r| window.contains_month(&r.year_month))
        .cloned()
        .collect();
    JoinedSeries::from_sorted_unchecked(rows)
}

/// Rows of `series` between `start` and `end`, each bound typed by the caller.
pub fn window_filter(
    series: &JoinedSeries,
    start: Bound<YearMonth>,
    end: Bound<YearMonth>,
) -> Result<JoinedSeries> {
    let window = DateWindow::new(start, end)?;
    Ok(apply_window(series, &window))
}

/// Forecasting split: `train = [start, boundary)`, `test = [boundary, ..)`.
pub fn train_test_split(
    series: &JoinedSeries,
    start: YearMonth,
    boundary: YearMonth,
) -> Result<(JoinedSeries, JoinedSeries)> {
    let train_window = DateWindow::half_open(start, boundary)?;
    let test_window = DateWindow::starting_at(boundary);

    let train = apply_window(series, &train_window);
    let test = apply_window(series, &test_window);

    info!(
        "Split {} rows into train {} ({} rows) and test {} ({} rows)",
        series.len(),
        train_window,
        train.len(),
        test_window,
        test.len()
    );
    Ok((train, test))
}

/// Bound → Upsample → Join → WindowFilter over already aggregated inputs.
#[derive(Debug, Clone)]
pub struct SeriesAligner {
    co2_min_year: i32,
    co2_max_year: i32,
    fill_policy: FillPolicy,
    window: DateWindow,
}

impl SeriesAligner {
    pub fn new() -> Self {
        Self {
            co2_min_year: DEFAULT_CO2_MIN_YEAR,
            co2_max_year: DEFAULT_CO2_MAX_YEAR,
            fill_policy: FillPolicy::default(),
            window: DateWindow::unbounded(),
        }
    }

    pub fn with_co2_years(mut self, min_year: i32, max_year: i32) -> Self {
        self.co2_min_year = min_year;
        self.co2_max_year = max_year;
        self
    }

    pub fn with_fill_policy(mut self, fill_policy: FillPolicy) -> Self {
        self.fill_policy = fill_policy;
        self
    }

    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    pub fn align(
        &self,
        temperatures: &[TemperatureObservation],
        co2: &[Co2Observation],
    ) -> Result<JoinedSeries> {
        let bounded = bound_years(co2, self.co2_min_year, self.co2_max_year)?;
        let monthly = upsample(&bounded, self.fill_policy)?;
        let joined = join(temperatures, &monthly)?;
        let windowed = apply_window(&joined, &self.window);

        info!(
            "Aligned {} temperature months with {} CO2 years into {} rows within {}",
            temperatures.len(),
            bounded.len(),
            windowed.len(),
            self.window
        );
        Ok(windowed)
    }
}

impl Default for SeriesAligner {
    fn default() -> Self {
        Self::new()
    }
}
