//! Loading and storing document bytes.
//!
//! A source string is classified as a local path, a `file://` URL or an
//! `http(s)://` URL. Remote sources go through a shared `reqwest` client
//! (timeout and optional proxy from [`Config`]); every source is capped at
//! `max_document_bytes`. Destinations must be local and are written through
//! a temp file that is synced and renamed into place.

use futures::StreamExt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum ResourceError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    #[error("Request timed out")]
    Timeout,

    #[error("Document exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },

    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported source scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Invalid file URL: {0}")]
    InvalidFileUrl(String),

    #[error("Cannot write to '{0}': destinations must be local files")]
    UnsupportedDestination(String),
}

/// Where a source string points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    File(PathBuf),
    Remote(Url),
}

impl Resource {
    /// Classifies a source string.
    ///
    /// Anything that does not parse as an absolute URL is a path. Single
    /// letter schemes are Windows drive letters, also paths.
    pub fn parse(source: &str) -> Result<Self, ResourceError> {
        let url = match Url::parse(source) {
            Ok(url) => url,
            Err(_) => return Ok(Self::File(PathBuf::from(source))),
        };

        match url.scheme() {
            "http" | "https" => Ok(Self::Remote(url)),
            "file" => url
                .to_file_path()
                .map(Self::File)
                .map_err(|_| ResourceError::InvalidFileUrl(source.to_string())),
            scheme if scheme.len() == 1 => Ok(Self::File(PathBuf::from(source))),
            scheme => Err(ResourceError::UnsupportedScheme(scheme.to_string())),
        }
    }
}

/// Fetches and stores raw document bytes.
#[derive(Debug, Clone)]
pub struct ResourceOpener {
    client: reqwest::Client,
    max_bytes: usize,
}

impl ResourceOpener {
    pub fn new(client: reqwest::Client, max_bytes: usize) -> Self {
        Self { client, max_bytes }
    }

    /// Builds the HTTP client from the configured timeout and proxy.
    pub fn from_config(config: &Config) -> Result<Self, ResourceError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("opmlkit/", env!("CARGO_PKG_VERSION")));

        if let Some(proxy_config) = &config.proxy {
            let mut proxy = reqwest::Proxy::all(&proxy_config.url)?;
            if let Some(username) = &proxy_config.username {
                proxy = proxy.basic_auth(username, proxy_config.password().unwrap_or(""));
            }
            tracing::debug!(proxy = %proxy_config.url, "Routing remote sources through proxy");
            builder = builder.proxy(proxy);
        }

        Ok(Self::new(builder.build()?, config.max_document_bytes))
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Reads the whole resource named by `source`.
    pub async fn open(&self, source: &str) -> Result<Vec<u8>, ResourceError> {
        match Resource::parse(source)? {
            Resource::File(path) => self.open_file(&path).await,
            Resource::Remote(url) => self.open_remote(url).await,
        }
    }

    /// Replaces the file named by `destination` with `bytes`.
    pub async fn store(&self, destination: &str, bytes: &[u8]) -> Result<(), ResourceError> {
        match Resource::parse(destination)? {
            Resource::File(path) => write_atomic(&path, bytes).await,
            Resource::Remote(_) => Err(ResourceError::UnsupportedDestination(
                destination.to_string(),
            )),
        }
    }

    async fn open_file(&self, path: &Path) -> Result<Vec<u8>, ResourceError> {
        let io_error = |source| ResourceError::Io {
            path: path.to_path_buf(),
            source,
        };

        let meta = tokio::fs::metadata(path).await.map_err(io_error)?;
        if meta.len() > self.max_bytes as u64 {
            return Err(ResourceError::TooLarge {
                limit: self.max_bytes,
            });
        }
        tokio::fs::read(path).await.map_err(io_error)
    }

    async fn open_remote(&self, url: Url) -> Result<Vec<u8>, ResourceError> {
        tracing::debug!(url = %url, "Fetching remote document");
        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResourceError::HttpStatus(status.as_u16()));
        }

        read_limited_bytes(response, self.max_bytes).await
    }
}

fn classify(error: reqwest::Error) -> ResourceError {
    if error.is_timeout() {
        ResourceError::Timeout
    } else {
        ResourceError::Network(error)
    }
}

/// Reads a response body, failing as soon as it exceeds `limit` bytes.
async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ResourceError> {
    let expected_length = response.content_length();

    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(ResourceError::TooLarge { limit });
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(classify)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ResourceError::TooLarge { limit });
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(ResourceError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}

/// Writes through a randomized temp file next to `path`, then renames it
/// over `path`. The destination is never left partially written.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ResourceError> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", random_suffix));

    let result = async {
        // create_new refuses to follow a planted symlink
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);

        #[cfg(windows)]
        if tokio::fs::try_exists(path).await? {
            tokio::fs::remove_file(path).await?;
        }

        tokio::fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(source) = result {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(ResourceError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Stored document");
    Ok(())
}
