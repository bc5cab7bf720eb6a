use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::YearMonth;
use crate::processors::{DecompositionModel, FillPolicy};

#[derive(Parser)]
#[command(name = "acorn-co2")]
#[command(about = "Align monthly ACORN-SAT maximum temperatures with annual CO2 emissions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate, upsample and join the two source files into one monthly series
    Align {
        #[arg(short, long, help = "Temperature CSV (one row per station reading)")]
        temperature: PathBuf,

        #[arg(long, help = "CO2 CSV (one row per country and year)")]
        co2: PathBuf,

        #[arg(
            short,
            long,
            help = "Output .csv or .parquet path [default: output/acorn-co2-{YYMMDD}.parquet]"
        )]
        output_file: Option<PathBuf>,

        #[arg(long, value_enum)]
        fill_policy: Option<FillPolicy>,

        #[arg(long, help = "Earliest CO2 year kept before upsampling")]
        co2_min_year: Option<i32>,

        #[arg(long, help = "Latest CO2 year kept before upsampling")]
        co2_max_year: Option<i32>,

        #[arg(long, help = "Drop raw temperature rows before this year")]
        min_year: Option<i32>,

        #[arg(long, help = "Drop raw temperature rows after this year")]
        max_year: Option<i32>,

        #[arg(long, help = "First month kept (YYYY-MM, inclusive)")]
        from: Option<YearMonth>,

        #[arg(long, help = "End of the kept months (YYYY-MM, exclusive)")]
        until: Option<YearMonth>,

        #[arg(long, requires = "until", help = "Treat --until as inclusive")]
        until_inclusive: bool,

        #[arg(short, long)]
        compression: Option<String>,

        #[arg(long)]
        max_workers: Option<usize>,

        #[arg(long)]
        chunk_size: Option<usize>,

        #[arg(long, help = "Memory-map the input files")]
        mmap: bool,

        #[arg(long, default_value = "false")]
        validate_only: bool,
    },

    /// Split a joined series into train and test files at a boundary month
    Split {
        #[arg(short, long, help = "Joined .csv or .parquet file")]
        input: PathBuf,

        #[arg(long, help = "First month of the training set [default: 1950-01]")]
        start: Option<YearMonth>,

        #[arg(long, help = "First month of the test set [default: 1990-01]")]
        boundary: Option<YearMonth>,

        #[arg(long)]
        train_output: Option<PathBuf>,

        #[arg(long)]
        test_output: Option<PathBuf>,
    },

    /// Seasonal decomposition of the max temperature column
    Decompose {
        #[arg(short, long, help = "Joined .csv or .parquet file")]
        input: PathBuf,

        #[arg(long)]
        period: Option<usize>,

        #[arg(long, value_enum)]
        model: Option<DecompositionModel>,

        #[arg(short, long, help = "Output .csv or .parquet path")]
        output_file: Option<PathBuf>,
    },

    /// Display statistics about a joined series file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,

        #[arg(long, help = "Print statistics as JSON")]
        json: bool,
    },
}
