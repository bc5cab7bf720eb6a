use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};

use crate::error::{ProcessingError, Result};

/// Default output path: output/acorn-co2-{YYMMDD}.parquet
pub fn generate_default_output_filename() -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100;

    let filename = format!("acorn-co2-{:02}{:02}{:02}.parquet", year, now.month(), now.day());
    PathBuf::from("output").join(filename)
}

/// Sibling paths for the train and test halves of a split, e.g.
/// `series.parquet` -> `series-train.parquet`, `series-test.parquet`.
pub fn split_output_paths(output: &Path) -> (PathBuf, PathBuf) {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "series".to_string());
    let extension = output
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let sibling = |suffix: &str| output.with_file_name(format!("{}-{}{}", stem, suffix, extension));
    (sibling("train"), sibling("test"))
}

/// Tabular file formats the tool reads and writes, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(OutputFormat::Csv),
            Some("parquet") | Some("pq") => Ok(OutputFormat::Parquet),
            _ => Err(ProcessingError::InvalidFormat(format!(
                "cannot infer file format from '{}' (expected .csv or .parquet)",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_output_filename() {
        let filename = generate_default_output_filename();
        let filename_str = filename.to_string_lossy();

        let parts: Vec<&str> = filename_str.split('/').collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "output");
        assert!(parts[1].starts_with("acorn-co2-"));
        assert!(parts[1].ends_with(".parquet"));
        assert_eq!(parts[1].len(), "acorn-co2-YYMMDD.parquet".len());
    }

    #[test]
    fn test_split_output_paths() {
        let (train, test) = split_output_paths(Path::new("out/series.csv"));
        assert_eq!(train, PathBuf::from("out/series-train.csv"));
        assert_eq!(test, PathBuf::from("out/series-test.csv"));
    }

    #[test]
    fn test_output_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a.CSV")).unwrap(), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_path(Path::new("a.parquet")).unwrap(),
            OutputFormat::Parquet
        );
        assert!(OutputFormat::from_path(Path::new("a.json")).is_err());
        assert!(OutputFormat::from_path(Path::new("noextension")).is_err());
    }
}
