//! Training pipeline entry point
//!
//! Runs the pipeline stages in order. Data ingestion is the only stage so far.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use pipeline_ingestion::app::{exit_code, run_data_ingestion, IngestionArgs};
use pipeline_ingestion::{logging, VERSION};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "training-pipeline")]
#[command(version = VERSION)]
#[command(about = "Run the training pipeline", long_about = None)]
struct Args {
    #[command(flatten)]
    ingestion: IngestionArgs,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    logging::init(&args.ingestion.log_settings()).context("Failed to set up logging")?;
    info!("Training pipeline v{}", VERSION);

    info!("Stage 1: data ingestion");
    let result = run_data_ingestion(&args.ingestion);
    if result.is_err() {
        error!("Pipeline stopped at stage 1");
    }

    Ok(ExitCode::from(exit_code(&result)))
}
