//! Command-line plumbing shared by the binaries

use std::path::PathBuf;

use clap::Args;
use tracing::{error, info};

use crate::config::{read_yaml, resolve_config_path};
use crate::errors::{IngestionError, Result};
use crate::ingestion::DataIngestion;
use crate::logging::{LogSettings, LOGS_DIR};
use crate::paths::{ArtifactPaths, ARTIFACTS_DIR};
use crate::storage::{GcsObjectStore, LocalObjectStore, ObjectStore};

#[derive(Args, Debug, Clone)]
pub struct IngestionArgs {
    /// Configuration file (defaults to $CONFIG_PATH, then config/config.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Root directory for the raw, train and test files
    #[arg(long, default_value = ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Read buckets from this local directory instead of Google Cloud Storage
    #[arg(long)]
    pub local_bucket_root: Option<PathBuf>,

    /// Directory for the daily log files
    #[arg(long, default_value = LOGS_DIR)]
    pub log_dir: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl IngestionArgs {
    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            dir: self.log_dir.clone(),
            verbose: self.verbose,
        }
    }
}

/// Resolve and load the configuration, pick the storage backend and build
/// the ingestion component.
pub fn build_ingestion(args: &IngestionArgs) -> Result<DataIngestion> {
    let config_path = resolve_config_path(args.config.clone());
    info!("Using configuration {}", config_path.display());
    let config = read_yaml(&config_path)?;

    let store: Box<dyn ObjectStore> = match &args.local_bucket_root {
        Some(root) => {
            info!("Reading buckets from local directory {}", root.display());
            Box::new(LocalObjectStore::new(root.clone()))
        }
        None => {
            let gcs = GcsObjectStore::from_env()
                .map_err(|e| IngestionError::download("Failed to create storage client", e))?;
            info!("Reading buckets from {}", gcs.endpoint());
            Box::new(gcs)
        }
    };

    DataIngestion::new(
        config.data_ingestion,
        ArtifactPaths::under(&args.artifacts_dir),
        store,
    )
}

/// Build and run the ingestion step.
pub fn run_data_ingestion(args: &IngestionArgs) -> Result<()> {
    let ingestion = build_ingestion(args).map_err(|e| {
        error!("Fatal error in data ingestion: {}", e.detailed());
        e
    })?;
    ingestion.run()
}

/// 0 on success, 1 on any ingestion failure.
pub fn exit_code(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}
