pub mod co2_reader;
pub mod columns;
pub mod source;
pub mod temperature_reader;

pub use co2_reader::Co2Reader;
pub use columns::{Co2Columns, TemperatureColumns};
pub use temperature_reader::TemperatureReader;
