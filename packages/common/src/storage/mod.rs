mod error;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

use std::sync::Arc;

pub use error::StorageError;
pub use traits::ArtifactStore;

use crate::config::{StorageBackend, StorageConfig};

/// Construct the artifact store selected by `config.backend`.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn ArtifactStore>, StorageError> {
    match config.backend {
        StorageBackend::Filesystem => {
            let base_url = config.public_base_url.clone().ok_or_else(|| {
                StorageError::Config(
                    "storage.public_base_url is required for the filesystem backend".into(),
                )
            })?;
            let store =
                filesystem::FilesystemArtifactStore::new(config.local_dir.clone(), base_url)
                    .await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => Ok(Arc::new(s3::S3ArtifactStore::new(config)?)),
        #[cfg(not(feature = "object-storage"))]
        StorageBackend::S3 => Err(StorageError::Config(
            "built without the `object-storage` feature; S3 backend unavailable".into(),
        )),
    }
}
