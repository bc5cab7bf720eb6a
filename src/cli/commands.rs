use crate::analyzers::SeriesAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::config::AlignerConfig;
use crate::error::{ProcessingError, Result};
use crate::processors::{train_test_split, AlignmentPipeline, Decomposer, IntegrityChecker};
use crate::utils::filename::{generate_default_output_filename, split_output_paths, OutputFormat};
use crate::utils::progress::ProgressReporter;
use crate::writers::{self, ParquetWriter};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, Level};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let mut config = AlignerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Align {
            temperature,
            co2,
            output_file,
            fill_policy,
            co2_min_year,
            co2_max_year,
            min_year,
            max_year,
            from,
            until,
            until_inclusive,
            compression,
            max_workers,
            chunk_size,
            mmap,
            validate_only,
        } => {
            if let Some(policy) = fill_policy {
                config.co2.fill_policy = policy;
            }
            if let Some(year) = co2_min_year {
                config.co2.min_year = year;
            }
            if let Some(year) = co2_max_year {
                config.co2.max_year = year;
            }
            if min_year.is_some() {
                config.temperature.min_year = min_year;
            }
            if max_year.is_some() {
                config.temperature.max_year = max_year;
            }
            if from.is_some() {
                config.window.from = from;
            }
            if until.is_some() {
                config.window.until = until;
                config.window.until_inclusive = until_inclusive;
            }
            if let Some(compression) = compression {
                config.processing.compression = compression;
            }
            if let Some(workers) = max_workers {
                config.processing.max_workers = workers;
            }
            if let Some(size) = chunk_size {
                config.processing.chunk_size = size;
            }
            config.processing.use_mmap |= mmap;

            let output_file = output_file.unwrap_or_else(generate_default_output_filename);
            // Fail on a bad extension before doing any work.
            OutputFormat::from_path(&output_file)?;

            println!("Aligning temperature and CO2 series...");
            println!("Temperature file: {}", temperature.display());
            println!("CO2 file: {}", co2.display());
            println!(
                "Fill policy: {}, CO2 years: {}..={}, window: {}",
                config.co2.fill_policy,
                config.co2.min_year,
                config.co2.max_year,
                config.window.to_window()?
            );

            let progress = ProgressReporter::new_spinner("Processing data...", false);
            let pipeline = AlignmentPipeline::new(config);
            let (series, integrity_report) = pipeline
                .process_files(&temperature, &co2, Some(&progress))
                .await?;

            progress.finish_with_message(&format!("Aligned {} months", series.len()));

            let checker = IntegrityChecker::new();
            println!("\n{}", checker.generate_summary(&integrity_report));

            if validate_only {
                println!("Validation complete - no output file written");
                return Ok(());
            }

            if series.is_empty() {
                println!("No records to write");
                return Ok(());
            }

            let compression = &pipeline.config().processing.compression;
            println!("Writing {} months to {}...", series.len(), output_file.display());
            writers::write_series(&series, &output_file, compression)?;
            print_file_details(&output_file)?;

            println!("Processing complete!");
        }

        Commands::Split {
            input,
            start,
            boundary,
            train_output,
            test_output,
        } => {
            let start = start.unwrap_or(config.split.start);
            let boundary = boundary.unwrap_or(config.split.boundary);
            let (default_train, default_test) = split_output_paths(&input);
            let train_output = train_output.unwrap_or(default_train);
            let test_output = test_output.unwrap_or(default_test);

            println!("Splitting {} at {}", input.display(), boundary);

            let series = writers::read_series(&input)?;
            let (train, test) = train_test_split(&series, start, boundary)?;

            let compression = &config.processing.compression;
            writers::write_series(&train, &train_output, compression)?;
            writers::write_series(&test, &test_output, compression)?;

            println!(
                "Train: {} months ({} to {}) -> {}",
                train.len(),
                start,
                boundary.previous(),
                train_output.display()
            );
            println!(
                "Test: {} months (from {}) -> {}",
                test.len(),
                boundary,
                test_output.display()
            );
        }

        Commands::Decompose {
            input,
            period,
            model,
            output_file,
        } => {
            let period = period.unwrap_or(config.decomposition.period);
            let model = model.unwrap_or(config.decomposition.model);

            let series = writers::read_series(&input)?;
            let decomposer = Decomposer::new(model).with_period(period);
            let rows = decomposer.decompose_series(&series)?;

            info!(
                "Decomposed {} months with period {} ({:?})",
                rows.len(),
                period,
                model
            );

            match output_file {
                Some(path) => {
                    writers::write_decomposition(&rows, &path, &config.processing.compression)?;
                    println!("Wrote {} rows to {}", rows.len(), path.display());
                }
                None => {
                    println!("Seasonal pattern (period {}):", period);
                    for row in rows.iter().take(period) {
                        println!("  {}: {:+.3}", row.year_month, row.seasonal);
                    }
                }
            }
        }

        Commands::Info { file, sample, json } => {
            let series = writers::read_series(&file)?;
            let stats = SeriesAnalyzer::new().analyze(&series)?;

            if json {
                println!("{}", stats.to_json()?);
                return Ok(());
            }

            println!("Analyzing joined series: {}", file.display());
            println!("\n{}", stats.detailed_summary());

            print_file_details(&file)?;

            if sample > 0 {
                println!("\nSample Records (showing {} records):", sample.min(series.len()));
                for (i, record) in series.iter().take(sample).enumerate() {
                    let co2 = record
                        .co2
                        .map_or_else(|| "-".to_string(), |v| format!("{:.3}", v));
                    println!(
                        "{}. {}: max={:.1}°C, co2={}",
                        i + 1,
                        record.year_month,
                        record.max_temperature,
                        co2
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_file_details(path: &Path) -> Result<()> {
    if OutputFormat::from_path(path)? == OutputFormat::Parquet {
        let file_info = ParquetWriter::new().get_file_info(path)?;
        println!("\nFile Details:\n{}", file_info.summary());
    }
    Ok(())
}

/// `--verbose` lowers the level to DEBUG; `--log-file` sends plain text to a
/// file instead of stderr.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt().with_max_level(level).with_target(false);

    let result = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    result.map_err(|e| ProcessingError::Config(format!("failed to initialise logging: {}", e)))
}
