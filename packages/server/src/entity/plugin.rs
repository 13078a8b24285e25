use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A tracked source repository and its artifact history.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "plugin")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// `owner/repo`; the business key used for upserts.
    #[sea_orm(unique)]
    pub full_name: String,

    pub private: bool,
    pub html_url: String,
    pub default_branch: String,

    /// Timestamps mirrored verbatim from the latest push delivery.
    pub pushed_at: Option<String>,
    pub updated_at: Option<String>,
    pub created_at: Option<String>,

    /// Artifact URLs as a JSON array of strings, oldest first.
    #[sea_orm(column_type = "JsonBinary")]
    pub zips: serde_json::Value,

    /// Pusher of the most recent default-branch push. A plain ID, not a
    /// foreign key: pushers live independently of plugins.
    #[sea_orm(indexed)]
    pub pusher_id: i32,
}

impl Model {
    /// Artifact URLs in build order.
    pub fn zip_urls(&self) -> Vec<String> {
        zips_from_json(&self.zips)
    }
}

/// Decode a stored `zips` column, skipping anything that is not a string.
pub fn zips_from_json(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

pub fn zips_to_json(zips: &[String]) -> serde_json::Value {
    serde_json::Value::from(zips.to_vec())
}

impl ActiveModelBehavior for ActiveModel {}
