use crate::error::{ProcessingError, Result};
use crate::models::{RawTemperatureRecord, YearMonth};
use crate::readers::columns::{column_index, is_missing, parse_year, TemperatureColumns};
use crate::readers::source::read_text;
use csv::{ReaderBuilder, Trim};
use std::path::Path;
use tracing::{debug, warn};

pub struct TemperatureReader {
    columns: TemperatureColumns,
    use_mmap: bool,
}

impl TemperatureReader {
    pub fn new() -> Self {
        Self {
            columns: TemperatureColumns::default(),
            use_mmap: false,
        }
    }

    pub fn with_columns(mut self, columns: TemperatureColumns) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Read raw station/day temperature rows from a CSV file
    pub fn read_temperatures(&self, path: &Path) -> Result<Vec<RawTemperatureRecord>> {
        let content = read_text(path, self.use_mmap)?;
        let records = self.parse_temperatures(&content)?;
        debug!(path = %path.display(), rows = records.len(), "Read temperature file");
        Ok(records)
    }

    /// Parse CSV text with a header row containing the declared columns
    pub fn parse_temperatures(&self, content: &str) -> Result<Vec<RawTemperatureRecord>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        let year_month_idx = column_index(&headers, &self.columns.year_month, "temperature")?;
        let year_idx = column_index(&headers, &self.columns.year, "temperature")?;
        let temp_idx = column_index(&headers, &self.columns.max_temperature, "temperature")?;

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (row, result) in reader.records().enumerate() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(row as u64 + 2);

            let temp_cell = record.get(temp_idx).unwrap_or("");
            if is_missing(temp_cell) {
                skipped += 1;
                continue;
            }
            let max_temperature = temp_cell.parse::<f64>().map_err(|_| {
                ProcessingError::InvalidFormat(format!(
                    "line {}: invalid {} value '{}'",
                    line, self.columns.max_temperature, temp_cell
                ))
            })?;

            let year_month_cell = record.get(year_month_idx).unwrap_or("");
            let year_month = if is_missing(year_month_cell) {
                None
            } else {
                Some(year_month_cell.parse::<YearMonth>().map_err(|_| {
                    ProcessingError::InvalidFormat(format!(
                        "line {}: invalid {} value '{}'",
                        line, self.columns.year_month, year_month_cell
                    ))
                })?)
            };

            let year_cell = record.get(year_idx).unwrap_or("");
            let year = if is_missing(year_cell) {
                None
            } else {
                Some(parse_year(year_cell).ok_or_else(|| {
                    ProcessingError::InvalidFormat(format!(
                        "line {}: invalid {} value '{}'",
                        line, self.columns.year, year_cell
                    ))
                })?)
            };

            records.push(RawTemperatureRecord {
                year_month,
                year,
                max_temperature,
            });
        }

        if skipped > 0 {
            warn!("Skipped {} temperature rows without a maximum temperature", skipped);
        }

        Ok(records)
    }
}

impl Default for TemperatureReader {
    fn default() -> Self {
        Self::new()
    }
}
