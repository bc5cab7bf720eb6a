use crate::config::AlignerConfig;
use crate::error::Result;
use crate::models::{JoinedSeries, RawCo2Record, RawTemperatureRecord};
use crate::processors::aggregator::{subset_years, Aggregator};
use crate::processors::integrity_checker::{IntegrityChecker, IntegrityReport};
use crate::processors::series_aligner::SeriesAligner;
use crate::readers::{Co2Reader, TemperatureReader};
use crate::utils::progress::ProgressReporter;
use std::path::Path;
use tracing::info;

/// Subset → Aggregate → Bound → Upsample → Join → WindowFilter → integrity check.
pub struct AlignmentPipeline {
    config: AlignerConfig,
}

impl AlignmentPipeline {
    pub fn new(config: AlignerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    /// Read both files concurrently, then run every stage
    pub async fn process_files(
        &self,
        temperature_path: &Path,
        co2_path: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<(JoinedSeries, IntegrityReport)> {
        if let Some(p) = progress {
            p.set_message("Reading input files...");
        }

        let use_mmap = self.config.processing.use_mmap;
        let temperature_reader = TemperatureReader::new()
            .with_columns(self.config.temperature.columns.clone())
            .with_mmap(use_mmap);
        let co2_reader = Co2Reader::new()
            .with_columns(self.config.co2.columns.clone())
            .with_mmap(use_mmap);

        let temperature_path = temperature_path.to_path_buf();
        let co2_path = co2_path.to_path_buf();
        let temperature_task = tokio::task::spawn_blocking(move || {
            temperature_reader.read_temperatures(&temperature_path)
        });
        let co2_task = tokio::task::spawn_blocking(move || co2_reader.read_co2(&co2_path));

        let (temperatures, co2) = tokio::try_join!(temperature_task, co2_task)?;
        let temperatures = temperatures?;
        let co2 = co2?;

        info!(
            "Read {} temperature rows and {} CO2 rows",
            temperatures.len(),
            co2.len()
        );

        self.run(&temperatures, &co2, progress)
    }

    /// Run every stage over rows already in memory
    pub fn run(
        &self,
        temperatures: &[RawTemperatureRecord],
        co2: &[RawCo2Record],
        progress: Option<&ProgressReporter>,
    ) -> Result<(JoinedSeries, IntegrityReport)> {
        let config = &self.config;
        config.check()?;

        if let Some(p) = progress {
            p.set_message("Aggregating observations...");
        }

        let subset = subset_years(
            temperatures,
            config.temperature.min_year,
            config.temperature.max_year,
        )?;
        let aggregator = Aggregator::new(config.processing.max_workers)
            .with_chunk_size(config.processing.chunk_size);
        let temperature_means = aggregator.aggregate_temperatures(&subset)?;
        let co2_means = aggregator.aggregate_co2(co2)?;

        info!(
            "Aggregated {} temperature months and {} CO2 years",
            temperature_means.len(),
            co2_means.len()
        );

        if let Some(p) = progress {
            p.set_message("Aligning series...");
        }

        let aligner = SeriesAligner::new()
            .with_co2_years(config.co2.min_year, config.co2.max_year)
            .with_fill_policy(config.co2.fill_policy)
            .with_window(config.window.to_window()?);
        let joined = aligner.align(&temperature_means, &co2_means)?;

        if let Some(p) = progress {
            p.set_message("Checking series integrity...");
        }

        let report = IntegrityChecker::new().check_integrity(&joined)?;

        if let Some(p) = progress {
            p.finish_with_message("Alignment complete");
        }

        Ok((joined, report))
    }
}

impl Default for AlignmentPipeline {
    fn default() -> Self {
        Self::new(AlignerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearMonth;
    use crate::processors::series_aligner::FillPolicy;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn raw_temperatures() -> Vec<RawTemperatureRecord> {
        let mut rows = Vec::new();
        for year in [1909, 1910, 1911] {
            for month in 1..=12 {
                let key = YearMonth::new(year, month).unwrap();
                rows.push(RawTemperatureRecord::new(key, year, 20.0 + month as f64));
                rows.push(RawTemperatureRecord::new(key, year, 22.0 + month as f64));
            }
        }
        rows
    }

    fn raw_co2() -> Vec<RawCo2Record> {
        vec![
            RawCo2Record::new("Australia", 1909, 1.0),
            RawCo2Record::new("Australia", 1910, 2.0),
            RawCo2Record::new("World", 1910, 4.0),
            RawCo2Record::new("Australia", 1911, 5.0),
        ]
    }

    #[test]
    fn test_run_default_config() {
        let pipeline = AlignmentPipeline::default();
        let (series, report) = pipeline.run(&raw_temperatures(), &raw_co2(), None).unwrap();

        assert_eq!(series.len(), 36);
        assert_eq!(series.get(&ym("1909-06")).unwrap().co2, None);
        assert_eq!(series.get(&ym("1910-06")).unwrap().co2, Some(3.0));
        assert_eq!(series.get(&ym("1911-12")).unwrap().co2, Some(5.0));
        assert_eq!(series.get(&ym("1910-03")).unwrap().max_temperature, 24.0);
        assert_eq!(report.unmatched_records, 12);
    }

    #[test]
    fn test_run_with_subset_and_window() {
        let mut config = AlignerConfig::default();
        config.temperature.min_year = Some(1910);
        config.co2.fill_policy = FillPolicy::Forward;
        config.window.from = Some(ym("1910-06"));
        config.window.until = Some(ym("1911-01"));

        let (series, report) = AlignmentPipeline::new(config)
            .run(&raw_temperatures(), &raw_co2(), None)
            .unwrap();

        assert_eq!(series.first_month(), Some(ym("1910-06")));
        assert_eq!(series.last_month(), Some(ym("1910-12")));
        assert!(series.iter().all(|r| r.co2 == Some(3.0)));
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_process_files() {
        let mut temperatures = NamedTempFile::new().unwrap();
        writeln!(temperatures, "Yr_Month,Year,maximum temperature (degC)").unwrap();
        writeln!(temperatures, "1910-01,1910,30.0").unwrap();
        writeln!(temperatures, "1910-01,1910,32.0").unwrap();
        writeln!(temperatures, "1910-02,1910,29.0").unwrap();

        let mut co2 = NamedTempFile::new().unwrap();
        writeln!(co2, "country,year,co2").unwrap();
        writeln!(co2, "Australia,1910,7.5").unwrap();

        let pipeline = AlignmentPipeline::default();
        let (series, _) = pipeline
            .process_files(temperatures.path(), co2.path(), None)
            .await
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.records()[0].max_temperature, 31.0);
        assert_eq!(series.records()[1].co2, Some(7.5));
    }
}
