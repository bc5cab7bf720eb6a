pub mod analyzers;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod utils;
pub mod writers;

pub use config::AlignerConfig;
pub use error::{ProcessingError, Result};
pub use models::{JoinedRecord, JoinedSeries, YearMonth};
pub use processors::{AlignmentPipeline, FillPolicy, SeriesAligner};
