//! Pipeline configuration loaded from YAML

use crate::errors::{IngestionError, Result};
use crate::paths::{CONFIG_PATH, CONFIG_PATH_ENV};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Top-level configuration document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub data_ingestion: DataIngestionConfig,
}

/// `data_ingestion` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataIngestionConfig {
    /// Object storage bucket holding the dataset
    pub bucket_name: String,
    /// Object key of the CSV inside the bucket
    pub bucket_file_name: String,
    /// Fraction of rows assigned to the training subset, in (0, 1)
    pub train_ratio: f64,
}

impl DataIngestionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bucket_name.trim().is_empty() {
            return Err(IngestionError::config("bucket_name must not be empty"));
        }
        if self.bucket_file_name.trim().is_empty() {
            return Err(IngestionError::config("bucket_file_name must not be empty"));
        }
        if !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            return Err(IngestionError::config(format!(
                "train_ratio must be in (0, 1), got {}",
                self.train_ratio
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| IngestionError::config_caused("Invalid configuration document", e))
    }
}

/// Pick the configuration file: explicit override, then `CONFIG_PATH`, then
/// `config/config.yaml`.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    resolve_config_path_with(explicit, env::var(CONFIG_PATH_ENV).ok())
}

fn resolve_config_path_with(explicit: Option<PathBuf>, from_env: Option<String>) -> PathBuf {
    explicit
        .or_else(|| {
            from_env
                .filter(|value| !value.trim().is_empty())
                .map(|value| PathBuf::from(value.trim()))
        })
        .unwrap_or_else(|| PathBuf::from(CONFIG_PATH))
}

/// Read and parse a YAML configuration file.
pub fn read_yaml(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        error!("Configuration file {} does not exist", path.display());
        return Err(IngestionError::config(format!(
            "The file {} does not exist",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        error!("Error reading YAML file {}: {}", path.display(), e);
        IngestionError::config_caused(format!("Error reading YAML file {}", path.display()), e)
    })?;

    let config = AppConfig::from_yaml_str(&content).map_err(|e| {
        error!("Error parsing YAML file {}: {}", path.display(), e.detailed());
        e
    })?;

    info!("YAML file {} loaded successfully", path.display());
    Ok(config)
}
