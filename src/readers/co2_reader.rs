use crate::error::{ProcessingError, Result};
use crate::models::RawCo2Record;
use crate::readers::columns::{column_index, is_missing, parse_year, Co2Columns};
use crate::readers::source::read_text;
use csv::{ReaderBuilder, Trim};
use std::path::Path;
use tracing::debug;

pub struct Co2Reader {
    columns: Co2Columns,
    use_mmap: bool,
}

impl Co2Reader {
    pub fn new() -> Self {
        Self {
            columns: Co2Columns::default(),
            use_mmap: false,
        }
    }

    pub fn with_columns(mut self, columns: Co2Columns) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Read per-country annual CO2 rows from a CSV file
    pub fn read_co2(&self, path: &Path) -> Result<Vec<RawCo2Record>> {
        let content = read_text(path, self.use_mmap)?;
        let records = self.parse_co2(&content)?;
        debug!(path = %path.display(), rows = records.len(), "Read CO2 file");
        Ok(records)
    }

    /// Parse CSV text; any column beyond the three declared ones is ignored
    pub fn parse_co2(&self, content: &str) -> Result<Vec<RawCo2Record>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        let country_idx = column_index(&headers, &self.columns.country, "CO2")?;
        let year_idx = column_index(&headers, &self.columns.year, "CO2")?;
        let co2_idx = column_index(&headers, &self.columns.co2, "CO2")?;

        let mut records = Vec::new();
        let mut empty_values = 0usize;

        for (row, result) in reader.records().enumerate() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(row as u64 + 2);

            let country = record
                .get(country_idx)
                .filter(|c| !is_missing(c))
                .map(str::to_string);

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

            let co2_cell = record.get(co2_idx).unwrap_or("");
            let co2 = if is_missing(co2_cell) {
                empty_values += 1;
                None
            } else {
                Some(co2_cell.parse::<f64>().map_err(|_| {
                    ProcessingError::InvalidFormat(format!(
                        "line {}: invalid {} value '{}'",
                        line, self.columns.co2, co2_cell
                    ))
                })?)
            };

            records.push(RawCo2Record { country, year, co2 });
        }

        debug!("{} CO2 rows carry no value", empty_values);
        Ok(records)
    }
}

impl Default for Co2Reader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_owid_style_rows() {
        let content = "iso_code,country,year,co2,co2_per_capita\n\
                       AUS,Australia,1950,23.5,2.8\n\
                       AFG,Afghanistan,1950,,\n\
                       ,World,1950,6003.0,2.4\n";
        let records = Co2Reader::new().parse_co2(content).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0], RawCo2Record::new("Australia", 1950, 23.5));
        assert_eq!(records[1].co2, None);
        assert_eq!(records[2].country.as_deref(), Some("World"));
    }

    #[test]
    fn test_missing_year_cell_is_none() {
        let records = Co2Reader::new().parse_co2("country,year,co2\nChad,,1.5\n").unwrap();
        assert_eq!(records[0].year, None);
    }

    #[test]
    fn test_missing_column_is_input_shape_error() {
        let err = Co2Reader::new().parse_co2("country,co2\nChad,1.5\n").unwrap_err();
        assert!(matches!(err, ProcessingError::InputShape { .. }));
        assert!(err.to_string().contains("'year'"));
    }

    #[test]
    fn test_invalid_value() {
        let err = Co2Reader::new()
            .parse_co2("country,year,co2\nChad,1950,lots\n")
            .unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidFormat(_)));
    }

    #[test]
    fn test_read_co2_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "country,year,co2")?;
        writeln!(file, "Australia,1756,0.0")?;
        writeln!(file, "Australia,1950,23.5")?;

        let records = Co2Reader::new().read_co2(file.path())?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, Some(1756));
        Ok(())
    }
}
