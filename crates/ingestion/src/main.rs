//! Data ingestion step CLI
//!
//! Downloads the configured dataset (unless already cached) and writes the
//! train/test split.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use pipeline_ingestion::app::{exit_code, run_data_ingestion, IngestionArgs};
use pipeline_ingestion::{logging, VERSION};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "data-ingestion")]
#[command(version = VERSION)]
#[command(about = "Fetch the raw dataset and split it into train/test files", long_about = None)]
struct Args {
    #[command(flatten)]
    ingestion: IngestionArgs,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let log = logging::init(&args.ingestion.log_settings())
        .context("Failed to set up logging")?;
    info!("Data ingestion v{}", VERSION);
    info!("Logging to {}", log.file_path().display());

    let result = run_data_ingestion(&args.ingestion);
    Ok(ExitCode::from(exit_code(&result)))
}
