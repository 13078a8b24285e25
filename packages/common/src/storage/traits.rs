use std::path::Path;

use async_trait::async_trait;

use super::error::StorageError;

/// Publicly readable object storage for build artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store `data` under `key` with public-read visibility and return the
    /// URL it can be downloaded from.
    async fn put_public(&self, key: &str, data: Vec<u8>) -> Result<String, StorageError>;

    /// Like [`ArtifactStore::put_public`], reading the object from a local
    /// file. Backends that can stream override this.
    async fn put_public_file(&self, key: &str, path: &Path) -> Result<String, StorageError> {
        let data = tokio::fs::read(path).await?;
        self.put_public(key, data).await
    }
}

/// Reject keys that are empty or could address anything outside a flat
/// namespace.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains(['/', '\\', '\0']);

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
