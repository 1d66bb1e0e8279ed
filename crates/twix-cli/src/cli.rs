use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "twix")]
#[command(about = "Anonymize Siemens TWIX raw data files", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: platform config dir)
    #[arg(long, global = true, env = "TWIX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Anonymize a TWIX file or every TWIX file in a directory
    Anonymize(AnonymizeArgs),

    /// Show the layout and identifying fields of a TWIX file
    Inspect {
        /// TWIX file
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct AnonymizeArgs {
    /// TWIX file, directory of TWIX files, or glob pattern
    #[arg(short, long)]
    pub input: String,

    /// Directory for anonymized files and the record table
    #[arg(short, long)]
    pub output: PathBuf,

    /// Remove the output directory before starting
    #[arg(short, long)]
    pub force: bool,

    /// Only write the record table, not the anonymized files
    #[arg(short = 'm', long = "meta-only", alias = "meta_only")]
    pub meta_only: bool,

    /// Files processed concurrently (default from config: 1)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Record table path (default: <output>/<input name>.csv)
    #[arg(long)]
    pub table: Option<PathBuf>,
}
