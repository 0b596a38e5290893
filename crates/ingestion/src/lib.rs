//! Pipeline data ingestion
//!
//! Fetches a CSV dataset from object storage (reusing a local copy when one
//! exists) and splits it into training and testing files with a fixed seed.

pub mod app;
pub mod config;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod ingestion;
pub mod logging;
pub mod paths;
pub mod split;
pub mod storage;

pub use config::{read_yaml, resolve_config_path, AppConfig, DataIngestionConfig};
pub use dataset::{DatasetError, RawDataset};
pub use deterministic::{permutation, LcgRng, SPLIT_SEED};
pub use errors::IngestionError;
pub use ingestion::DataIngestion;
pub use paths::ArtifactPaths;
pub use split::{train_test_split, SplitError, SplitResult};
pub use storage::{GcsObjectStore, LocalObjectStore, ObjectStore, StorageError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
