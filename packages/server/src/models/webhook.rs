use serde::Serialize;
use utoipa::ToSchema;

use super::plugin::PluginResponse;

/// Body returned after a default-branch push has been processed.
#[derive(Serialize, ToSchema)]
pub struct PluginEnvelope {
    pub plugin: PluginResponse,
}

/// Body returned for deliveries that required no work.
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Not a push to the default branch.")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
