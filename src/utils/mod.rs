pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{generate_default_output_filename, split_output_paths, OutputFormat};
pub use progress::ProgressReporter;
