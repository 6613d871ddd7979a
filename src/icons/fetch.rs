//! Retrieval of the icon archive into the scratch area

use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::IconConfig;
use crate::errors::{IconError, IconResult};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Somewhere an icon archive can be copied from
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    /// Write the archive to `dest`, returning the number of bytes written
    async fn fetch(&self, dest: &Path) -> IconResult<u64>;

    /// Human readable origin, used in log lines
    fn describe(&self) -> String;
}

/// Downloads the archive over HTTP(S) with a bounded total timeout
pub struct HttpArchiveSource {
    client: Client,
    url: String,
}

impl HttpArchiveSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            url: url.into(),
        }
    }

    fn map_error(&self, e: reqwest::Error) -> IconError {
        if e.is_timeout() {
            IconError::Timeout {
                url: self.url.clone(),
            }
        } else {
            IconError::Http {
                url: self.url.clone(),
                source: e,
            }
        }
    }
}

#[async_trait]
impl ArchiveSource for HttpArchiveSource {
    async fn fetch(&self, dest: &Path) -> IconResult<u64> {
        info!("Downloading icon archive from {}", self.url);

        let mut response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IconError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let mut file = File::create(dest)
            .await
            .map_err(|e| IconError::io(dest, e))?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(|e| self.map_error(e))? {
            file.write_all(&chunk)
                .await
                .map_err(|e| IconError::io(dest, e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| IconError::io(dest, e))?;

        debug!("Downloaded {} bytes to {}", written, dest.display());
        Ok(written)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Copies an archive that already sits on a local file system
pub struct FileArchiveSource {
    path: PathBuf,
}

impl FileArchiveSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ArchiveSource for FileArchiveSource {
    async fn fetch(&self, dest: &Path) -> IconResult<u64> {
        debug!("Copying icon archive from {}", self.path.display());
        tokio::fs::copy(&self.path, dest)
            .await
            .map_err(|e| IconError::io(&self.path, e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Pick a source for `icons.archive_url`: `file://` URLs and bare paths are
/// read from disk, anything else is downloaded.
pub fn archive_source_from_config(config: &IconConfig) -> Box<dyn ArchiveSource> {
    let url = config.archive_url.as_str();
    if let Some(path) = url.strip_prefix("file://") {
        Box::new(FileArchiveSource::new(path))
    } else if !url.contains("://") {
        Box::new(FileArchiveSource::new(url))
    } else {
        Box::new(HttpArchiveSource::new(url, config.fetch_timeout))
    }
}
