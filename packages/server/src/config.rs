use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use forge_common::config::{StorageBackend, StorageConfig};

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum log level: trace, debug, info, warn or error. Default: "info".
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub cors: CorsConfig,
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubConfig {
    /// Shared secret configured on the repository's webhook.
    pub webhook_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Secret used to sign read API request paths.
    pub secret: String,
}

/// Artifact pipeline tuning.
#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Scratch directory for clones and zips. Default: system temp dir.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Git executable. Default: "git".
    #[serde(default = "default_git_bin")]
    pub git_bin: String,
    /// Default: 300.
    #[serde(default = "default_clone_timeout_secs")]
    pub clone_timeout_secs: u64,
    /// Default: 120.
    #[serde(default = "default_archive_timeout_secs")]
    pub archive_timeout_secs: u64,
    /// Default: 300.
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
    /// Builds allowed to run at once across all repositories. Default: 4.
    #[serde(default = "default_max_concurrent_builds")]
    pub max_concurrent_builds: usize,
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("plugin-forge")
}
fn default_git_bin() -> String {
    "git".into()
}
fn default_clone_timeout_secs() -> u64 {
    300
}
fn default_archive_timeout_secs() -> u64 {
    120
}
fn default_upload_timeout_secs() -> u64 {
    300
}
fn default_max_concurrent_builds() -> usize {
    4
}

impl PipelineConfig {
    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_timeout_secs)
    }

    pub fn archive_timeout(&self) -> Duration {
        Duration::from_secs(self.archive_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            git_bin: default_git_bin(),
            clone_timeout_secs: default_clone_timeout_secs(),
            archive_timeout_secs: default_archive_timeout_secs(),
            upload_timeout_secs: default_upload_timeout_secs(),
            max_concurrent_builds: default_max_concurrent_builds(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub github: GithubConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("FORGE_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 4000)?
            .set_default("server.log_level", "info")?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://plugin-forge.db?mode=rwc")?
            // Load from config/config.toml
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., FORGE__GITHUB__WEBHOOK_SECRET)
            .add_source(Environment::with_prefix("FORGE").separator("__"))
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.github.webhook_secret.is_empty() {
            return Err(ConfigError::Message(
                "github.webhook_secret must not be empty".into(),
            ));
        }
        if self.api.secret.is_empty() {
            return Err(ConfigError::Message("api.secret must not be empty".into()));
        }
        if self.pipeline.max_concurrent_builds == 0 {
            return Err(ConfigError::Message(
                "pipeline.max_concurrent_builds must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
