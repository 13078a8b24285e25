use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::plugin;

use super::pusher::PusherSummary;

/// Plugin record as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PluginResponse {
    pub id: i32,
    pub name: String,
    #[schema(example = "octo-org/my-plugin")]
    pub full_name: String,
    pub private: bool,
    pub html_url: String,
    pub default_branch: String,
    pub pushed_at: Option<String>,
    pub updated_at: Option<String>,
    pub created_at: Option<String>,
    /// Artifact URLs, oldest first.
    pub zips: Vec<String>,
    pub pusher_id: i32,
}

impl From<plugin::Model> for PluginResponse {
    fn from(m: plugin::Model) -> Self {
        let zips = m.zip_urls();
        Self {
            id: m.id,
            name: m.name,
            full_name: m.full_name,
            private: m.private,
            html_url: m.html_url,
            default_branch: m.default_branch,
            pushed_at: m.pushed_at,
            updated_at: m.updated_at,
            created_at: m.created_at,
            zips,
            pusher_id: m.pusher_id,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PluginListResponse {
    pub data: Vec<PluginResponse>,
}

/// A plugin together with the pusher it references. `pusher` is `null` when
/// the referenced record no longer exists.
#[derive(Serialize, ToSchema)]
pub struct PluginDetailResponse {
    #[serde(flatten)]
    pub plugin: PluginResponse,
    pub pusher: Option<PusherSummary>,
}
