use crate::error::{ProcessingError, Result};
use crate::models::{JoinedRecord, JoinedSeries, YearMonth};
use crate::processors::decomposition::DecompositionRow;
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE, OUT_COL_CO2, OUT_COL_MAX_TEMPERATURE, OUT_COL_YEAR_MONTH,
};
use arrow::array::{Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    fn properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }

    /// Write a joined series; an empty series still produces a file with the schema
    pub fn write_series(&self, series: &JoinedSeries, path: &Path) -> Result<()> {
        self.write_series_batched(series, path, self.row_group_size)
    }

    /// Write the series in record batches of at most `batch_size` rows
    pub fn write_series_batched(
        &self,
        series: &JoinedSeries,
        path: &Path,
        batch_size: usize,
    ) -> Result<()> {
        let schema = series_schema();
        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(self.properties()))?;

        for chunk in series.records().chunks(batch_size.max(1)) {
            let batch = records_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }

        writer.close()?;
        debug!("Wrote {} rows to {}", series.len(), path.display());
        Ok(())
    }

    /// Write decomposition rows: year_month, observed, trend, seasonal, residual
    pub fn write_decomposition(&self, rows: &[DecompositionRow], path: &Path) -> Result<()> {
        let schema = Arc::new(Schema::new(vec![
            Field::new(OUT_COL_YEAR_MONTH, DataType::Utf8, false),
            Field::new("observed", DataType::Float64, false),
            Field::new("trend", DataType::Float64, true),
            Field::new("seasonal", DataType::Float64, false),
            Field::new("residual", DataType::Float64, true),
        ]));

        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(self.properties()))?;

        for chunk in rows.chunks(self.row_group_size.max(1)) {
            let keys: Vec<String> = chunk.iter().map(|r| r.year_month.to_string()).collect();
            let batch = RecordBatch::try_new(
                schema.clone(),
                vec![
                    Arc::new(StringArray::from(keys)),
                    Arc::new(Float64Array::from_iter_values(chunk.iter().map(|r| r.observed))),
                    Arc::new(chunk.iter().map(|r| r.trend).collect::<Float64Array>()),
                    Arc::new(Float64Array::from_iter_values(chunk.iter().map(|r| r.seasonal))),
                    Arc::new(chunk.iter().map(|r| r.residual).collect::<Float64Array>()),
                ],
            )?;
            writer.write(&batch)?;
        }

        writer.close()?;
        Ok(())
    }

    /// Read a joined series back; rows must be unique and ascending by month
    pub fn read_series(&self, path: &Path) -> Result<JoinedSeries> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut records = Vec::new();
        for batch in reader {
            let batch = batch?;
            let schema = batch.schema();

            let keys = batch
                .column(schema.index_of(OUT_COL_YEAR_MONTH)?)
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| column_type_error(OUT_COL_YEAR_MONTH))?;
            let temperatures = batch
                .column(schema.index_of(OUT_COL_MAX_TEMPERATURE)?)
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| column_type_error(OUT_COL_MAX_TEMPERATURE))?;
            let co2 = batch
                .column(schema.index_of(OUT_COL_CO2)?)
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| column_type_error(OUT_COL_CO2))?;

            for i in 0..batch.num_rows() {
                if keys.is_null(i) || temperatures.is_null(i) {
                    return Err(ProcessingError::input_shape(format!(
                        "row {} of {} has a null key or temperature",
                        records.len() + 1,
                        path.display()
                    )));
                }
                let year_month: YearMonth = keys.value(i).parse()?;
                let co2 = (!co2.is_null(i)).then(|| co2.value(i));
                records.push(JoinedRecord::new(year_month, temperatures.value(i), co2));
            }
        }

        JoinedSeries::from_records(records)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let total_rows = metadata.file_metadata().num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();
        let compression = if row_groups > 0 && metadata.row_group(0).num_columns() > 0 {
            metadata.row_group(0).column(0).compression()
        } else {
            self.compression
        };

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// year_month: Utf8, max_temperature: Float64, co2: nullable Float64
fn series_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(OUT_COL_YEAR_MONTH, DataType::Utf8, false),
        Field::new(OUT_COL_MAX_TEMPERATURE, DataType::Float64, false),
        Field::new(OUT_COL_CO2, DataType::Float64, true),
    ]))
}

fn records_to_batch(records: &[JoinedRecord], schema: Arc<Schema>) -> Result<RecordBatch> {
    let keys: Vec<String> = records.iter().map(|r| r.year_month.to_string()).collect();
    let temperatures: Vec<f64> = records.iter().map(|r| r.max_temperature).collect();
    let co2: Float64Array = records.iter().map(|r| r.co2).collect();

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(keys)),
            Arc::new(Float64Array::from(temperatures)),
            Arc::new(co2),
        ],
    )?;
    Ok(batch)
}

fn column_type_error(column: &str) -> ProcessingError {
    ProcessingError::InvalidFormat(format!("Invalid {} column type", column))
}

pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
            avg_rows
        )
    }
}
