use crate::error::Result;
use crate::models::{JoinedRecord, JoinedSeries};
use crate::processors::decomposition::DecompositionRow;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

/// CSV output with header `year_month,max_temperature,co2`; a missing CO2 value is an empty cell.
pub struct CsvWriter {
    delimiter: u8,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn write_series(&self, series: &JoinedSeries, path: &Path) -> Result<()> {
        self.write_rows(series.records(), path)?;
        debug!("Wrote {} rows to {}", series.len(), path.display());
        Ok(())
    }

    pub fn write_decomposition(&self, rows: &[DecompositionRow], path: &Path) -> Result<()> {
        self.write_rows(rows, path)
    }

    fn write_rows<T: Serialize>(&self, rows: &[T], path: &Path) -> Result<()> {
        let file = BufWriter::new(File::create(path)?);
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(file);

        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a series previously written by this writer
    pub fn read_series(&self, path: &Path) -> Result<JoinedSeries> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .from_path(path)?;

        let records = reader
            .deserialize::<JoinedRecord>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        JoinedSeries::from_records(records)
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}
