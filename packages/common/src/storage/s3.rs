use std::path::Path;

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::debug;

use super::error::StorageError;
use super::traits::{ArtifactStore, validate_key};
use crate::config::StorageConfig;

const ZIP_CONTENT_TYPE: &str = "application/zip";

/// S3-backed artifact store. Every object is uploaded with a `public-read`
/// canned ACL.
pub struct S3ArtifactStore {
    bucket: Box<Bucket>,
    public_base_url: Option<String>,
}

impl S3ArtifactStore {
    /// Build a client from configuration. Credentials fall back to the
    /// standard AWS environment/profile chain when not configured.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        if config.bucket.is_empty() {
            return Err(StorageError::Config("storage.bucket is required".into()));
        }

        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse()
                .map_err(|e| StorageError::Config(format!("invalid region: {e}")))?,
        };

        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Config(format!("invalid credentials: {e}")))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StorageError::Config(e.to_string()))?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }
        bucket.add_header("x-amz-acl", "public-read");

        Ok(Self {
            bucket,
            public_base_url: config
                .public_base_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
        })
    }

    fn public_url(&self, key: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{base}/{key}"),
            None => format!("{}/{}", self.bucket.url(), key),
        }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put_public(&self, key: &str, data: Vec<u8>) -> Result<String, StorageError> {
        validate_key(key)?;

        let response = self
            .bucket
            .put_object_with_content_type(key, &data, ZIP_CONTENT_TYPE)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Rejected { status });
        }

        let url = self.public_url(key);
        debug!(key, url = %url, bytes = data.len(), "Uploaded artifact to S3");
        Ok(url)
    }

    async fn put_public_file(&self, key: &str, path: &Path) -> Result<String, StorageError> {
        validate_key(key)?;

        let mut file = tokio::fs::File::open(path).await?;
        let response = self
            .bucket
            .put_object_stream_with_content_type(&mut file, key, ZIP_CONTENT_TYPE)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Rejected { status });
        }

        let url = self.public_url(key);
        debug!(key, url = %url, bytes = response.uploaded_bytes(), "Streamed artifact to S3");
        Ok(url)
    }
}
