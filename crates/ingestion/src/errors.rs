//! Error types for the ingestion step

use thiserror::Error;

type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the data ingestion step.
///
/// Every variant carries a human-readable message and, when one exists, the
/// underlying error that caused it.
#[derive(Error, Debug)]
pub enum IngestionError {
    /// Configuration could not be read or is invalid
    #[error("configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// Raw file could not be fetched from object storage
    #[error("download error: {message}")]
    Download {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// Raw file could not be split or the subsets could not be written
    #[error("split error: {message}")]
    Split {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// Local filesystem error outside of download/split
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<Cause>,
    },
}

impl IngestionError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_caused<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<Cause>,
    {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn download<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<Cause>,
    {
        Self::Download {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn split(message: impl Into<String>) -> Self {
        Self::Split {
            message: message.into(),
            source: None,
        }
    }

    pub fn split_caused<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<Cause>,
    {
        Self::Split {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Message followed by the chain of underlying causes, for log lines.
    pub fn detailed(&self) -> String {
        let mut out = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            out.push_str(": ");
            out.push_str(&err.to_string());
            cause = err.source();
        }
        out
    }
}

/// Result type for ingestion operations
pub type Result<T> = std::result::Result<T, IngestionError>;
