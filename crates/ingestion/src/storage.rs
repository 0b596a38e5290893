//! Object storage backends
//!
//! The ingestion step only needs one capability from remote storage: copy the
//! bytes of `(bucket, object)` to a local path. Downloads are staged in a
//! temporary sibling of the destination and renamed into place once complete,
//! so the destination either holds the whole object or does not exist.

use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Environment variable pointing at a GCS-compatible emulator
pub const STORAGE_EMULATOR_HOST_ENV: &str = "STORAGE_EMULATOR_HOST";
/// Environment variable holding an OAuth2 bearer token for GCS
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
/// OAuth2 scope requested from Application Default Credentials
pub const READ_ONLY_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_only";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object gs://{bucket}/{object} not found")]
    NotFound { bucket: String, object: String },

    #[error("access to gs://{bucket}/{object} denied (HTTP {status})")]
    Unauthorized {
        bucket: String,
        object: String,
        status: u16,
    },

    #[error("unexpected HTTP status {status} for gs://{bucket}/{object}")]
    Status {
        bucket: String,
        object: String,
        status: u16,
    },

    #[error("invalid storage endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("invalid object name: {0}")]
    InvalidObject(String),

    #[error("could not obtain Google credentials")]
    Credentials(#[from] gcp_auth::Error),

    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("I/O error")]
    Io(#[from] io::Error),
}

/// "Download object to local path" capability.
pub trait ObjectStore {
    fn download_to_file(&self, bucket: &str, object: &str, dest: &Path) -> Result<(), StorageError>;
}

/// Fully written temporary sibling of `dest`, not yet visible at `dest`.
/// Dropping it without calling [`StagedFile::persist`] removes it.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
    dest: PathBuf,
}

impl StagedFile {
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Rename the staged file over `dest`.
    pub fn persist(self) -> io::Result<()> {
        self.file.persist(&self.dest).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Run `write` against a temporary file in the directory of `dest`.
/// Fails before writing anything when `dest` is a directory.
pub fn stage<F, E>(dest: &Path, write: F) -> Result<StagedFile, E>
where
    F: FnOnce(&mut File) -> Result<(), E>,
    E: From<io::Error>,
{
    if dest.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("{} is a directory", dest.display()),
        )
        .into());
    }

    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    write(file.as_file_mut())?;
    file.as_file().sync_all()?;
    Ok(StagedFile {
        file,
        dest: dest.to_path_buf(),
    })
}

/// [`stage`] then rename into place. On error nothing is left behind.
pub fn stage_and_persist<F, E>(dest: &Path, write: F) -> Result<(), E>
where
    F: FnOnce(&mut File) -> Result<(), E>,
    E: From<io::Error>,
{
    stage(dest, write)?.persist()?;
    Ok(())
}

/// How requests to GCS are authorized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GcsAuth {
    /// No `Authorization` header (public buckets, emulators)
    Anonymous,
    /// Fixed OAuth2 bearer token
    Token(String),
    /// Application Default Credentials: `GOOGLE_APPLICATION_CREDENTIALS`,
    /// gcloud user credentials or the metadata server
    ApplicationDefault,
}

impl GcsAuth {
    /// Explicit token wins; an emulator gets anonymous access; otherwise ADC.
    pub fn select(emulator_host: Option<&str>, token: Option<String>) -> Self {
        match (token, emulator_host) {
            (Some(token), _) => GcsAuth::Token(token),
            (None, Some(_)) => GcsAuth::Anonymous,
            (None, None) => GcsAuth::ApplicationDefault,
        }
    }

    fn bearer_token(&self) -> Result<Option<String>, StorageError> {
        match self {
            GcsAuth::Anonymous => Ok(None),
            GcsAuth::Token(token) => Ok(Some(token.clone())),
            GcsAuth::ApplicationDefault => application_default_token().map(Some),
        }
    }
}

/// Fetch a read-only token through the credential chain on a short-lived
/// runtime; the blocking HTTP client must not run inside it.
fn application_default_token() -> Result<String, StorageError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let token = runtime.block_on(async {
        let provider = gcp_auth::provider().await?;
        let token = provider.token(&[READ_ONLY_SCOPE]).await?;
        Ok::<_, gcp_auth::Error>(token)
    })?;

    debug!("Obtained Google access token from application default credentials");
    Ok(token.as_str().to_string())
}

/// Google Cloud Storage over the JSON API
#[derive(Debug, Clone)]
pub struct GcsObjectStore {
    client: Client,
    endpoint: Url,
    auth: GcsAuth,
}

impl GcsObjectStore {
    pub const DEFAULT_ENDPOINT: &'static str = "https://storage.googleapis.com";

    pub fn new(endpoint: &str, auth: GcsAuth) -> Result<Self, StorageError> {
        let endpoint = normalize_endpoint(endpoint)?;
        let client = Client::builder()
            .user_agent(concat!("pipeline-ingestion/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            auth,
        })
    }

    /// Endpoint from `STORAGE_EMULATOR_HOST` (if set), authorization per
    /// [`GcsAuth::select`] with the token from `GOOGLE_OAUTH_ACCESS_TOKEN`.
    pub fn from_env() -> Result<Self, StorageError> {
        let emulator = std::env::var(STORAGE_EMULATOR_HOST_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());
        let token = std::env::var(ACCESS_TOKEN_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let auth = GcsAuth::select(emulator.as_deref(), token);
        let endpoint = emulator.unwrap_or_else(|| Self::DEFAULT_ENDPOINT.to_string());
        Self::new(&endpoint, auth)
    }

    pub fn auth(&self) -> &GcsAuth {
        &self.auth
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// `{endpoint}/storage/v1/b/{bucket}/o/{object}?alt=media`, with `/` in the
    /// object name percent-encoded.
    pub fn media_url(&self, bucket: &str, object: &str) -> Result<Url, StorageError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| StorageError::InvalidEndpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .extend(["storage", "v1", "b", bucket, "o", object]);
        url.set_query(Some("alt=media"));
        Ok(url)
    }
}

fn normalize_endpoint(raw: &str) -> Result<Url, StorageError> {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };
    let url = Url::parse(&with_scheme).map_err(|e| StorageError::InvalidEndpoint(format!("{}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(StorageError::InvalidEndpoint(raw.to_string()));
    }
    Ok(url)
}

impl ObjectStore for GcsObjectStore {
    fn download_to_file(&self, bucket: &str, object: &str, dest: &Path) -> Result<(), StorageError> {
        let url = self.media_url(bucket, object)?;
        debug!("GET {}", url);

        let mut request = self.client.get(url);
        if let Some(token) = self.auth.bearer_token()? {
            request = request.bearer_auth(token);
        }
        let mut response = request.send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::NOT_FOUND => StorageError::NotFound {
                    bucket: bucket.to_string(),
                    object: object.to_string(),
                },
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StorageError::Unauthorized {
                    bucket: bucket.to_string(),
                    object: object.to_string(),
                    status: status.as_u16(),
                },
                _ => StorageError::Status {
                    bucket: bucket.to_string(),
                    object: object.to_string(),
                    status: status.as_u16(),
                },
            });
        }

        stage_and_persist(dest, |file| {
            let bytes = response.copy_to(file)?;
            debug!("Received {} bytes for gs://{}/{}", bytes, bucket, object);
            Ok::<(), StorageError>(())
        })
    }
}

/// Buckets as sub-directories of a local root, for offline runs
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, bucket: &str, object: &str) -> Result<PathBuf, StorageError> {
        for part in [bucket, object] {
            let escapes = Path::new(part)
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
            if part.is_empty() || escapes {
                return Err(StorageError::InvalidObject(part.to_string()));
            }
        }
        Ok(self.root.join(bucket).join(object))
    }
}

impl ObjectStore for LocalObjectStore {
    fn download_to_file(&self, bucket: &str, object: &str, dest: &Path) -> Result<(), StorageError> {
        let source = self.object_path(bucket, object)?;
        let mut reader = match File::open(&source) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound {
                    bucket: bucket.to_string(),
                    object: object.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        stage_and_persist(dest, |file| {
            io::copy(&mut reader, file)?;
            Ok::<(), StorageError>(())
        })
    }
}
