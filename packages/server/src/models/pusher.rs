use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::pusher;

use super::plugin::PluginResponse;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PusherSummary {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<pusher::Model> for PusherSummary {
    fn from(m: pusher::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PusherListResponse {
    pub data: Vec<PusherSummary>,
}

/// A pusher and the plugins whose latest default-branch push they made.
#[derive(Serialize, ToSchema)]
pub struct PusherDetailResponse {
    #[serde(flatten)]
    pub pusher: PusherSummary,
    pub plugins: Vec<PluginResponse>,
}
