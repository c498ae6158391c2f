//! Blob store implementation.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use vidchat_models::VideoId;

use crate::error::{StorageError, StorageResult};

/// Fallback extension when the filename carries none.
const DEFAULT_EXTENSION: &str = "mp4";

/// Configuration for the blob store.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for uploaded videos
    pub root: PathBuf,
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            root: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/app/uploads")),
        }
    }
}

/// Result of a blob write.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    /// Absolute path of the stored file
    pub path: String,
    /// Size in bytes
    pub size: i64,
}

/// Filesystem-backed blob store.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a new blob store, creating the root directory if needed.
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        tokio::fs::create_dir_all(&config.root).await.map_err(|e| {
            StorageError::config_error(format!(
                "Cannot create upload dir {}: {}",
                config.root.display(),
                e
            ))
        })?;
        info!("Blob store rooted at {}", config.root.display());
        Ok(Self { root: config.root })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        Self::new(StorageConfig::from_env()).await
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist an uploaded video under `{video_id}.{ext}`.
    pub async fn store_video(
        &self,
        video_id: &VideoId,
        filename: &str,
        data: &[u8],
    ) -> StorageResult<StoredBlob> {
        let ext = extension_for(filename);
        let path = self.root.join(format!("{}.{}", video_id, ext));
        debug!("Writing {} bytes to {}", data.len(), path.display());

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| StorageError::write_failed(format!("{}: {}", path.display(), e)))?;

        info!("Stored video {} at {}", video_id, path.display());
        Ok(StoredBlob {
            path: path.to_string_lossy().into_owned(),
            size: data.len() as i64,
        })
    }

    /// Read a stored blob back.
    pub async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        match tokio::fs::read(path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::not_found(path))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check that the root directory is still reachable.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        let meta = tokio::fs::metadata(&self.root).await?;
        if !meta.is_dir() {
            return Err(StorageError::config_error(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        Ok(())
    }
}

/// Guess a file extension from the uploaded filename.
///
/// Mirrors the upload contract: the segment after the last `.`, defaulting
/// to `mp4` for extensionless names.
pub fn extension_for(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext,
        _ => DEFAULT_EXTENSION,
    }
}
