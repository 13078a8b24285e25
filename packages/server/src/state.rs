use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::pipeline::ArtifactPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub pipeline: Arc<ArtifactPipeline>,
    /// Cancelled on shutdown; in-flight builds abort and clean up.
    pub shutdown: CancellationToken,
}
