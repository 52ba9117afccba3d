use clap::{Args, Parser, Subcommand, ValueEnum};

use std::path::PathBuf;

use super::constants::{ENV_INPUT, ENV_LIMIT};

#[derive(Parser)]
#[command(name = "roundscope")]
#[command(version, about = "Dialog log correlation pipeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconstruct dialog rounds or flat trace groups from an exported record set
    Analyze(AnalyzeArgs),
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input file: a JSON array of records, or a search-response envelope
    /// (the records are taken from `hits.hits`)
    #[arg(long, short = 'i', env = ENV_INPUT)]
    pub input: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Output shape
    #[arg(long, value_enum, default_value_t = OutputMode::Rounds)]
    pub mode: OutputMode,

    /// Maximum number of dialog rounds to emit (rounds mode only)
    #[arg(long, env = ENV_LIMIT)]
    pub limit: Option<usize>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// Self-contained dialog rounds (one per trace id)
    Rounds,
    /// Flat record-index groups keyed by trace id
    Groups,
}

/// Parse command line arguments.
pub fn parse() -> Cli {
    Cli::parse()
}
