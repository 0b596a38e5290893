//! Filesystem layout of the pipeline artifacts

use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";
/// Configuration file used when `CONFIG_PATH` is unset.
pub const CONFIG_PATH: &str = "config/config.yaml";

pub const ARTIFACTS_DIR: &str = "artifacts";
pub const RAW_DIR: &str = "artifacts/raw";
pub const RAW_FILE_PATH: &str = "artifacts/raw/raw.csv";
pub const TRAIN_FILE_PATH: &str = "artifacts/raw/train.csv";
pub const TEST_FILE_PATH: &str = "artifacts/raw/test.csv";

/// Where the raw, train and test files live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub raw_dir: PathBuf,
    pub raw_file: PathBuf,
    pub train_file: PathBuf,
    pub test_file: PathBuf,
}

impl ArtifactPaths {
    /// Same layout as the defaults, rooted at `artifacts_dir` instead of `artifacts/`.
    pub fn under<P: AsRef<Path>>(artifacts_dir: P) -> Self {
        let raw_dir = artifacts_dir.as_ref().join("raw");
        Self {
            raw_file: raw_dir.join("raw.csv"),
            train_file: raw_dir.join("train.csv"),
            test_file: raw_dir.join("test.csv"),
            raw_dir,
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from(RAW_DIR),
            raw_file: PathBuf::from(RAW_FILE_PATH),
            train_file: PathBuf::from(TRAIN_FILE_PATH),
            test_file: PathBuf::from(TEST_FILE_PATH),
        }
    }
}
