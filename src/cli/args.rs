use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "meteo-normalizer")]
#[command(about = "Reversible normalization of daily weather observations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Settings file (TOML, JSON or YAML)")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize a raw observation table into model features
    Normalize {
        #[arg(short, long, help = "Input Parquet file with raw observations")]
        input: PathBuf,

        #[arg(short, long, help = "Feature statistics JSON file")]
        stats: Option<PathBuf>,

        #[arg(
            short,
            long,
            help = "Output Parquet file path [default: {input}-normalized-{YYMMDD}.parquet]"
        )]
        output: Option<PathBuf>,

        #[arg(short, long)]
        compression: Option<String>,
    },

    /// Restore physical units from a normalized table
    Inverse {
        #[arg(short, long, help = "Input Parquet file with normalized features")]
        input: PathBuf,

        #[arg(short, long, help = "Feature statistics JSON file")]
        stats: Option<PathBuf>,

        #[arg(
            short,
            long,
            help = "Output Parquet file path [default: {input}-restored-{YYMMDD}.parquet]"
        )]
        output: Option<PathBuf>,

        #[arg(short, long)]
        compression: Option<String>,
    },

    /// Transform every Parquet file in a directory
    ProcessDirectory {
        #[arg(short, long, help = "Input directory containing Parquet files")]
        input_dir: PathBuf,

        #[arg(short, long, help = "Directory for transformed files")]
        output_dir: PathBuf,

        #[arg(short, long, help = "Feature statistics JSON file")]
        stats: Option<PathBuf>,

        #[arg(long, default_value = "false", help = "Restore instead of normalize")]
        inverse: bool,

        #[arg(long)]
        max_workers: Option<usize>,

        #[arg(
            long,
            help = "Filter to specific file pattern (e.g., 'station_')",
            default_value = ""
        )]
        file_pattern: String,

        #[arg(short, long)]
        compression: Option<String>,
    },

    /// Report missing values and out-of-range data in a raw table
    Check {
        #[arg(short, long, help = "Input Parquet file with raw observations")]
        input: PathBuf,

        #[arg(short, long, help = "Also check a feature statistics JSON file")]
        stats: Option<PathBuf>,

        #[arg(long, default_value = "false", help = "Fail on the first out-of-range row")]
        strict: bool,
    },

    /// Display information about a Parquet file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "5")]
        sample: usize,
    },
}
