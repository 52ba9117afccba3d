//! Core application

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;

use crate::core::cli::{self, AnalyzeArgs, Commands, OutputMode};
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::domain::pipeline;

pub struct CoreApp;

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let cli = cli::parse();
        match cli.command {
            Commands::Analyze(args) => Self::analyze(args),
        }
    }

    fn analyze(args: AnalyzeArgs) -> Result<()> {
        let records = load_records(&args.input)?;
        tracing::info!(records = records.len(), input = %args.input.display(), "Loaded records");

        let batch = pipeline::analyze(records);
        tracing::info!(
            buckets = batch.buckets.len(),
            ignored = batch.ignored.len(),
            "Batch analyzed"
        );

        let rendered = match args.mode {
            OutputMode::Rounds => {
                let rounds = batch.dialog_rounds(args.limit);
                tracing::info!(rounds = rounds.len(), "Reconstructed dialog rounds");
                serde_json::to_string_pretty(&rounds)?
            }
            OutputMode::Groups => {
                let groups = batch.flat_groups();
                tracing::info!(groups = groups.len(), "Built flat groups");
                serde_json::to_string_pretty(&groups)?
            }
        };

        match &args.output {
            Some(path) => {
                fs::write(path, rendered)
                    .with_context(|| format!("Failed to write output to {}", path.display()))?;
                tracing::info!(output = %path.display(), "Wrote output");
            }
            None => println!("{rendered}"),
        }

        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }
}

/// Load records from a JSON export: either a bare array of records, or a
/// search-response envelope with the records under `hits.hits`.
pub fn load_records(path: &Path) -> Result<Vec<JsonValue>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    let parsed: JsonValue = serde_json::from_str(&raw)
        .with_context(|| format!("Input file {} is not valid JSON", path.display()))?;

    match parsed {
        JsonValue::Array(records) => Ok(records),
        JsonValue::Object(mut envelope) => {
            let hits = envelope
                .get_mut("hits")
                .and_then(|h| h.get_mut("hits"))
                .map(JsonValue::take);
            match hits {
                Some(JsonValue::Array(records)) => Ok(records),
                _ => bail!(
                    "Input file {} has no record array at hits.hits",
                    path.display()
                ),
            }
        }
        _ => bail!("Input file {} is neither an array nor an envelope", path.display()),
    }
}
