/// Default source column names (ACORN-SAT clean export)
pub const TEMP_COL_YEAR_MONTH: &str = "Yr_Month";
pub const TEMP_COL_YEAR: &str = "Year";
pub const TEMP_COL_MAX_TEMPERATURE: &str = "maximum temperature (degC)";

/// Default source column names (OWID CO2 dataset)
pub const CO2_COL_COUNTRY: &str = "country";
pub const CO2_COL_YEAR: &str = "year";
pub const CO2_COL_CO2: &str = "co2";

/// Output column names
pub const OUT_COL_YEAR_MONTH: &str = "year_month";
pub const OUT_COL_MAX_TEMPERATURE: &str = "max_temperature";
pub const OUT_COL_CO2: &str = "co2";

/// Temperature constraints
pub const MIN_VALID_TEMP: f64 = -50.0;
pub const MAX_VALID_TEMP: f64 = 60.0;
pub const TEMP_JUMP_THRESHOLD: f64 = 15.0;

/// CO2 coverage of the temperature record
pub const DEFAULT_CO2_MIN_YEAR: i32 = 1910;
pub const DEFAULT_CO2_MAX_YEAR: i32 = 2019;

/// Forecasting split
pub const DEFAULT_SPLIT_START: &str = "1950-01";
pub const DEFAULT_SPLIT_BOUNDARY: &str = "1990-01";

/// Monthly seasonality
pub const DEFAULT_SEASONAL_PERIOD: usize = 12;

/// Processing defaults
pub const DEFAULT_CHUNK_SIZE: usize = 10000;
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "ACORN";
