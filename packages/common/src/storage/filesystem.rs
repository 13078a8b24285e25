use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::traits::{ArtifactStore, validate_key};

/// Artifact store that writes into a local directory served by something
/// else (a static file server, a CDN origin, ...).
///
/// Objects land at `{base_path}/{key}` and are advertised as
/// `{public_base_url}/{key}`.
pub struct FilesystemArtifactStore {
    base_path: PathBuf,
    public_base_url: String,
}

impl FilesystemArtifactStore {
    /// Create a new filesystem artifact store.
    pub async fn new(
        base_path: PathBuf,
        public_base_url: impl Into<String>,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl ArtifactStore for FilesystemArtifactStore {
    async fn put_public(&self, key: &str, data: Vec<u8>) -> Result<String, StorageError> {
        validate_key(key)?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, &data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, self.object_path(key)).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(key, bytes = data.len(), "Artifact written");
        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn put_public_file(&self, key: &str, path: &Path) -> Result<String, StorageError> {
        validate_key(key)?;

        let temp_path = self.temp_path();
        let bytes = match fs::copy(path, &temp_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = fs::remove_file(&temp_path).await;
                return Err(e.into());
            }
        };

        if let Err(e) = fs::rename(&temp_path, self.object_path(key)).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(key, bytes, "Artifact copied");
        Ok(format!("{}/{}", self.public_base_url, key))
    }
}
