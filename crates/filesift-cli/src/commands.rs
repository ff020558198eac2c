use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "filesift")]
#[command(about = "Sorts files into category folders by confidence", long_about = None)]
pub struct Cli {
    /// TOML configuration file (defaults to ./Filesift.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More console detail (-v debug, -vv trace); TRACING_LEVEL overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan, classify, plan and (with --apply) organize files
    Run(RunArgs),
    /// Export the scanned file inventory as JSON without classifying
    Scan(ScanArgs),
    /// Write a configuration file populated with defaults
    GenerateConfig(GenerateConfigArgs),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Directory to organize
    #[arg(long)]
    pub source: Option<PathBuf>,
    /// Destination root for organized files
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Perform the planned operations (default is a dry run)
    #[arg(long)]
    pub apply: bool,
    /// Skip the confirmation prompt for live runs
    #[arg(short, long)]
    pub yes: bool,
    /// Copy instead of move
    #[arg(long)]
    pub copy: bool,
    #[arg(long)]
    pub approve_threshold: Option<f64>,
    #[arg(long)]
    pub review_threshold: Option<f64>,
    /// Reuse annotations stored in the dataset instead of annotating again
    #[arg(long)]
    pub replay: bool,
    /// Annotation dataset file
    #[arg(long)]
    pub dataset: Option<PathBuf>,
    /// Where the JSON run report is written
    #[arg(long, default_value = "./reports")]
    pub report_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    #[arg(long)]
    pub source: Option<PathBuf>,
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
    /// Compute BLAKE3 content checksums
    #[arg(long)]
    pub checksum: bool,
}

#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    pub path: PathBuf,
    #[arg(long)]
    pub source: Option<PathBuf>,
    #[arg(long)]
    pub output: Option<PathBuf>,
}
