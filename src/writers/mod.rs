pub mod csv_writer;
pub mod parquet_writer;

pub use csv_writer::CsvWriter;
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};

use crate::error::Result;
use crate::models::JoinedSeries;
use crate::processors::decomposition::DecompositionRow;
use crate::utils::filename::OutputFormat;
use std::path::Path;

/// Write a series as CSV or Parquet depending on the path's extension
pub fn write_series(series: &JoinedSeries, path: &Path, compression: &str) -> Result<()> {
    ensure_parent(path)?;
    match OutputFormat::from_path(path)? {
        OutputFormat::Csv => CsvWriter::new().write_series(series, path),
        OutputFormat::Parquet => ParquetWriter::new()
            .with_compression(compression)?
            .write_series(series, path),
    }
}

pub fn read_series(path: &Path) -> Result<JoinedSeries> {
    match OutputFormat::from_path(path)? {
        OutputFormat::Csv => CsvWriter::new().read_series(path),
        OutputFormat::Parquet => ParquetWriter::new().read_series(path),
    }
}

pub fn write_decomposition(
    rows: &[DecompositionRow],
    path: &Path,
    compression: &str,
) -> Result<()> {
    ensure_parent(path)?;
    match OutputFormat::from_path(path)? {
        OutputFormat::Csv => CsvWriter::new().write_decomposition(rows, path),
        OutputFormat::Parquet => ParquetWriter::new()
            .with_compression(compression)?
            .write_decomposition(rows, path),
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
