//! Artifact pipeline: clone a repository, zip its working tree, publish the
//! zip and remove every local trace of the build.
//!
//! A build moves through [`PipelineStage`]s in order. Each stage runs under
//! its own timeout and observes the caller's [`CancellationToken`]; whichever
//! way a build ends, the scratch directory and zip are deleted before
//! [`ArtifactPipeline::build`] returns.

pub mod archive;
pub mod fetch;
mod keys;
mod locks;
mod workspace;

use std::fmt;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use forge_common::storage::{ArtifactStore, StorageError};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::PipelineConfig;

pub use archive::ArchiveError;
pub use fetch::{FetchError, GitCliFetcher, SourceFetcher};
pub use keys::{KeyClock, artifact_key};
pub use locks::{RepoLockGuard, RepoLocks};
pub use workspace::BuildWorkspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Cloning,
    Archiving,
    Uploading,
    CleaningUp,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::Cloning => "cloning",
            PipelineStage::Archiving => "archiving",
            PipelineStage::Uploading => "uploading",
            PipelineStage::CleaningUp => "cleaning up",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage} timed out after {timeout:?}")]
    TimedOut {
        stage: PipelineStage,
        timeout: Duration,
    },

    #[error("{stage} cancelled")]
    Cancelled { stage: PipelineStage },

    #[error("clone failed: {0}")]
    Clone(#[source] FetchError),

    #[error("archive failed: {0}")]
    Archive(#[source] ArchiveError),

    #[error("upload failed: {0}")]
    Upload(#[source] StorageError),

    #[error("workspace IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result of one build. Either way the caller gets the artifact list to
/// persist: the prior list with the new URL appended, or the prior list
/// untouched.
#[derive(Debug)]
pub enum BuildOutcome {
    Published {
        url: String,
        zips: Vec<String>,
    },
    Failed {
        stage: PipelineStage,
        error: PipelineError,
        zips: Vec<String>,
    },
}

impl BuildOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, BuildOutcome::Published { .. })
    }

    pub fn zips(&self) -> &[String] {
        match self {
            BuildOutcome::Published { zips, .. } | BuildOutcome::Failed { zips, .. } => zips,
        }
    }

    pub fn into_zips(self) -> Vec<String> {
        match self {
            BuildOutcome::Published { zips, .. } | BuildOutcome::Failed { zips, .. } => zips,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StageTimeouts {
    clone: Duration,
    archive: Duration,
    upload: Duration,
}

pub struct ArtifactPipeline {
    config: PipelineConfig,
    timeouts: StageTimeouts,
    fetcher: Arc<dyn SourceFetcher>,
    store: Arc<dyn ArtifactStore>,
    locks: RepoLocks,
    permits: Arc<Semaphore>,
    clock: KeyClock,
}

impl ArtifactPipeline {
    pub fn new(
        config: PipelineConfig,
        fetcher: Arc<dyn SourceFetcher>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        let timeouts = StageTimeouts {
            clone: config.clone_timeout(),
            archive: config.archive_timeout(),
            upload: config.upload_timeout(),
        };
        let permits = Arc::new(Semaphore::new(config.max_concurrent_builds.max(1)));
        Self {
            config,
            timeouts,
            fetcher,
            store,
            locks: RepoLocks::new(),
            permits,
            clock: KeyClock::new(),
        }
    }

    /// Serialize all work on one repository. Hold the guard from reading the
    /// prior artifact list until the updated list is persisted.
    pub async fn lock_repository(&self, full_name: &str) -> RepoLockGuard {
        self.locks.acquire(full_name).await
    }

    /// Build and publish `repo_name` from `html_url`, returning the artifact
    /// list to persist. Never fails outright: errors come back as
    /// [`BuildOutcome::Failed`] with `prior_zips` unchanged.
    #[instrument(skip(self, prior_zips, cancel), fields(prior = prior_zips.len()))]
    pub async fn build(
        &self,
        repo_name: &str,
        html_url: &str,
        prior_zips: Vec<String>,
        cancel: &CancellationToken,
    ) -> BuildOutcome {
        let permit = tokio::select! {
            permit = Arc::clone(&self.permits).acquire_owned() => permit.ok(),
            _ = cancel.cancelled() => None,
        };
        let Some(_permit) = permit else {
            return BuildOutcome::Failed {
                stage: PipelineStage::Cloning,
                error: PipelineError::Cancelled {
                    stage: PipelineStage::Cloning,
                },
                zips: prior_zips,
            };
        };

        let workspace = match BuildWorkspace::create(&self.config.work_dir, repo_name).await {
            Ok(ws) => ws,
            Err(e) => {
                warn!(error = %e, "Failed to prepare build workspace");
                return BuildOutcome::Failed {
                    stage: PipelineStage::Cloning,
                    error: PipelineError::Io(e),
                    zips: prior_zips,
                };
            }
        };

        let result = self
            .run_stages(&workspace, repo_name, html_url, cancel)
            .await;

        debug!(stage = %PipelineStage::CleaningUp, "Removing build workspace");
        workspace.cleanup().await;

        match result {
            Ok(url) => {
                info!(url = %url, "Artifact published");
                let mut zips = prior_zips;
                zips.push(url.clone());
                BuildOutcome::Published { url, zips }
            }
            Err((stage, error)) => {
                warn!(stage = %stage, error = %error, "Build failed");
                BuildOutcome::Failed {
                    stage,
                    error,
                    zips: prior_zips,
                }
            }
        }
    }

    async fn run_stages(
        &self,
        workspace: &BuildWorkspace,
        repo_name: &str,
        html_url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, (PipelineStage, PipelineError)> {
        let fetcher = &self.fetcher;
        run_stage(PipelineStage::Cloning, self.timeouts.clone, cancel, |token| async move {
            fetcher
                .fetch(html_url, workspace.clone_dir(), token)
                .await
                .map_err(PipelineError::Clone)
        })
        .await
        .map_err(|e| (PipelineStage::Cloning, e))?;

        let source = workspace.clone_dir().to_path_buf();
        let dest = workspace.zip_path().to_path_buf();
        let root = repo_name.to_string();
        run_stage(PipelineStage::Archiving, self.timeouts.archive, cancel, |token| async move {
            let abort = Arc::new(AtomicBool::new(false));
            let worker_abort = Arc::clone(&abort);
            let mut handle = tokio::task::spawn_blocking(move || {
                archive::zip_directory(&source, &dest, &root, &worker_abort)
            });

            let joined = tokio::select! {
                joined = &mut handle => joined,
                _ = token.cancelled() => {
                    abort.store(true, Ordering::Relaxed);
                    // The zip file must be closed before cleanup removes it.
                    handle.await
                }
            };

            match joined {
                Ok(Ok(files)) => {
                    debug!(files, "Archive written");
                    Ok(())
                }
                Ok(Err(e)) => Err(PipelineError::Archive(e)),
                Err(e) => Err(PipelineError::Archive(ArchiveError::Io(io::Error::other(e)))),
            }
        })
        .await
        .map_err(|e| (PipelineStage::Archiving, e))?;

        let key = artifact_key(repo_name, self.clock.next_millis());
        let store = &self.store;
        let zip_path = workspace.zip_path();
        run_stage(PipelineStage::Uploading, self.timeouts.upload, cancel, |token| async move {
            debug!(key = %key, "Uploading artifact");
            tokio::select! {
                result = store.put_public_file(&key, zip_path) => {
                    result.map_err(PipelineError::Upload)
                }
                _ = token.cancelled() => Err(PipelineError::Cancelled {
                    stage: PipelineStage::Uploading,
                }),
            }
        })
        .await
        .map_err(|e| (PipelineStage::Uploading, e))
    }
}

/// Run one stage under `timeout`. On timeout or cancellation the stage's own
/// token is cancelled and the stage is awaited to completion, so nothing it
/// started outlives this call.
async fn run_stage<F, Fut, T>(
    stage: PipelineStage,
    timeout: Duration,
    cancel: &CancellationToken,
    f: F,
) -> Result<T, PipelineError>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled { stage });
    }

    debug!(stage = %stage, "Stage started");
    let token = cancel.child_token();
    let fut = f(token.clone());
    tokio::pin!(fut);

    let error = tokio::select! {
        biased;
        _ = cancel.cancelled() => PipelineError::Cancelled { stage },
        _ = tokio::time::sleep(timeout) => PipelineError::TimedOut { stage, timeout },
        result = &mut fut => return result,
    };

    token.cancel();
    let _ = fut.await;
    Err(error)
}
