use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

/// Disk footprint of one build: a clone directory and a sibling zip file,
/// both named with a fresh random token so concurrent builds never collide.
///
/// Call [`BuildWorkspace::cleanup`] on every exit path. `Drop` removes
/// anything left behind if the owning future is dropped first.
#[derive(Debug)]
pub struct BuildWorkspace {
    clone_dir: PathBuf,
    zip_path: PathBuf,
    cleaned: bool,
}

impl BuildWorkspace {
    pub async fn create(work_dir: &Path, repo_name: &str) -> io::Result<Self> {
        tokio::fs::create_dir_all(work_dir).await?;
        let stem = format!("{}-{}", sanitize(repo_name), Uuid::new_v4().simple());
        Ok(Self {
            clone_dir: work_dir.join(&stem),
            zip_path: work_dir.join(format!("{stem}.zip")),
            cleaned: false,
        })
    }

    pub fn clone_dir(&self) -> &Path {
        &self.clone_dir
    }

    pub fn zip_path(&self) -> &Path {
        &self.zip_path
    }

    /// Remove the clone directory and the zip. Missing paths are fine;
    /// other failures are logged and swallowed.
    pub async fn cleanup(mut self) {
        match tokio::fs::remove_dir_all(&self.clone_dir).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                warn!(path = ?self.clone_dir, error = %e, "Failed to remove clone directory");
            }
            _ => {}
        }
        match tokio::fs::remove_file(&self.zip_path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                warn!(path = ?self.zip_path, error = %e, "Failed to remove zip file");
            }
            _ => {}
        }
        self.cleaned = true;
    }
}

impl Drop for BuildWorkspace {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        let _ = std::fs::remove_dir_all(&self.clone_dir);
        let _ = std::fs::remove_file(&self.zip_path);
    }
}

/// Keep repository names usable as a single path component.
fn sanitize(repo_name: &str) -> String {
    let cleaned: String = repo_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "repo".to_string()
    } else {
        trimmed.to_string()
    }
}
