//! Fetch-then-split ingestion step

use tracing::{error, info};

use crate::config::DataIngestionConfig;
use crate::dataset::RawDataset;
use crate::deterministic::SPLIT_SEED;
use crate::errors::{IngestionError, Result};
use crate::paths::ArtifactPaths;
use crate::split::train_test_split;
use crate::storage::ObjectStore;

/// Downloads the raw dataset (unless cached) and writes the train/test files.
pub struct DataIngestion {
    config: DataIngestionConfig,
    paths: ArtifactPaths,
    store: Box<dyn ObjectStore>,
}

impl DataIngestion {
    /// Validates the configuration and creates the raw-data directory.
    pub fn new(
        config: DataIngestionConfig,
        paths: ArtifactPaths,
        store: Box<dyn ObjectStore>,
    ) -> Result<Self> {
        config.validate().map_err(|e| {
            error!("Error during DataIngestion initialization: {}", e);
            e
        })?;

        std::fs::create_dir_all(&paths.raw_dir).map_err(|e| {
            error!("Error during DataIngestion initialization: {}", e);
            IngestionError::io(
                format!("Failed to create raw data directory {}", paths.raw_dir.display()),
                e,
            )
        })?;

        info!(
            "Data Ingestion initialized with bucket: {}, file: {}",
            config.bucket_name, config.bucket_file_name
        );

        Ok(Self {
            config,
            paths,
            store,
        })
    }

    /// Download the raw CSV unless a file already sits at the raw path.
    ///
    /// An existing file is trusted as-is and storage is not contacted.
    pub fn fetch_raw_file(&self) -> Result<()> {
        let raw_file = &self.paths.raw_file;
        if raw_file.exists() {
            info!(
                "Raw file already exists at {}; skipping download",
                raw_file.display()
            );
            return Ok(());
        }

        self.store
            .download_to_file(&self.config.bucket_name, &self.config.bucket_file_name, raw_file)
            .map_err(|e| {
                error!("Error while downloading the CSV file: {}", e);
                IngestionError::download("Failed to download CSV file", e)
            })?;

        info!("CSV file successfully downloaded to {}", raw_file.display());
        Ok(())
    }

    /// Split the raw file into the train and test files.
    pub fn split_raw_file(&self) -> Result<()> {
        info!("Starting train-test split");

        let dataset = RawDataset::from_csv(&self.paths.raw_file).map_err(|e| {
            error!("Error while reading {}: {}", self.paths.raw_file.display(), e);
            IngestionError::split_caused("Failed to read raw data", e)
        })?;

        let split = train_test_split(&dataset, self.config.train_ratio, SPLIT_SEED).map_err(|e| {
            error!("Error while splitting data: {}", e);
            IngestionError::split_caused("Failed to split data into training and test sets", e)
        })?;

        // Both files are fully written before either replaces its destination.
        let staged = [
            (&split.train, &self.paths.train_file),
            (&split.test, &self.paths.test_file),
        ]
        .into_iter()
        .map(|(subset, path)| {
            subset.stage_csv(path).map_err(|e| {
                error!("Error while writing {}: {}", path.display(), e);
                IngestionError::split_caused(format!("Failed to write {}", path.display()), e)
            })
        })
        .collect::<Result<Vec<_>>>()?;

        for file in staged {
            let dest = file.dest().to_path_buf();
            file.persist().map_err(|e| {
                error!("Error while replacing {}: {}", dest.display(), e);
                IngestionError::split_caused(format!("Failed to replace {}", dest.display()), e)
            })?;
        }

        info!(
            "Train data saved to {} ({} rows)",
            self.paths.train_file.display(),
            split.train.len()
        );
        info!(
            "Test data saved to {} ({} rows)",
            self.paths.test_file.display(),
            split.test.len()
        );
        Ok(())
    }

    /// Fetch, then split. Stops at the first failure.
    pub fn run(&self) -> Result<()> {
        info!("Starting data ingestion process");

        let result = self.fetch_raw_file().and_then(|_| self.split_raw_file());
        match &result {
            Ok(()) => info!("Data ingestion completed successfully"),
            Err(e) => error!("Data ingestion failed: {}", e.detailed()),
        }

        info!("Data ingestion process finished");
        result
    }
}
