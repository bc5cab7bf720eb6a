pub mod aggregator;
pub mod decomposition;
pub mod integrity_checker;
pub mod pipeline;
pub mod series_aligner;
pub mod window;

pub use aggregator::{subset_years, Aggregator};
pub use decomposition::{Decomposer, Decomposition, DecompositionModel, DecompositionRow};
pub use integrity_checker::{IntegrityChecker, IntegrityReport, SeriesViolation, ViolationType};
pub use pipeline::AlignmentPipeline;
pub use series_aligner::{
    apply_window, bound_years, join, train_test_split, upsample, window_filter, FillPolicy,
    SeriesAligner,
};
pub use window::DateWindow;
