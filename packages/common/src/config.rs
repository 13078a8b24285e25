use std::path::PathBuf;

use serde::Deserialize;

/// Which artifact store backend to publish into.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3 or an S3-compatible service. Default.
    #[default]
    S3,
    /// A local directory fronted by a static file server.
    Filesystem,
}

/// Artifact storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Backend selection. Default: `s3`.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Bucket receiving the zips. Required for the S3 backend.
    #[serde(default)]
    pub bucket: String,
    /// Bucket region. Default: "us-east-1".
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible services (MinIO, R2, ...).
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Use path-style addressing. Default: false.
    #[serde(default)]
    pub path_style: bool,
    /// Target directory for the filesystem backend. Default: "./artifacts".
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,
    /// Base URL advertised for stored objects. Required for the filesystem
    /// backend; overrides the bucket URL for S3 when set.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

fn default_region() -> String {
    "us-east-1".into()
}
fn default_local_dir() -> PathBuf {
    PathBuf::from("./artifacts")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: String::new(),
            region: default_region(),
            endpoint: None,
            access_key: None,
            secret_key: None,
            path_style: false,
            local_dir: default_local_dir(),
            public_base_url: None,
        }
    }
}
