pub mod series_analyzer;

pub use series_analyzer::{ColumnStats, SeriesAnalyzer, SeriesStatistics};
