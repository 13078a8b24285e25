use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to run git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git clone exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("clone cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// Source-control boundary: materialises a repository's working tree.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Populate `dest`, which must not exist yet, with the working tree
    /// behind `url`.
    ///
    /// Implementations must stop promptly once `cancel` fires and must not
    /// touch `dest` after returning.
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        cancel: CancellationToken,
    ) -> Result<(), FetchError>;
}

/// Clones with the `git` executable (shallow, default branch only).
pub struct GitCliFetcher {
    git_bin: String,
}

impl GitCliFetcher {
    pub fn new(git_bin: impl Into<String>) -> Self {
        Self {
            git_bin: git_bin.into(),
        }
    }
}

#[async_trait]
impl SourceFetcher for GitCliFetcher {
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        cancel: CancellationToken,
    ) -> Result<(), FetchError> {
        debug!(url, dest = ?dest, "Cloning repository");

        let mut child = Command::new(&self.git_bin)
            .args(["clone", "--depth", "1", "--quiet", "--"])
            .arg(url)
            .arg(dest)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(FetchError::Spawn)?;

        let stderr = child.stderr.take();
        let stderr_reader = tokio::spawn(async move {
            let mut buf = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut buf).await;
            }
            buf
        });

        let status = tokio::select! {
            status = child.wait() => status.map_err(FetchError::Spawn)?,
            _ = cancel.cancelled() => {
                // Reap the child so it cannot write into `dest` after we return.
                let _ = child.kill().await;
                stderr_reader.abort();
                return Err(FetchError::Cancelled);
            }
        };

        let stderr = stderr_reader.await.unwrap_or_default();
        if !status.success() {
            return Err(FetchError::Failed {
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}
