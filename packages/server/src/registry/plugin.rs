use forge_common::Repository;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};
use tracing::{info, instrument};

use crate::entity::plugin::{self, zips_to_json};

/// What the pipeline needs to know about a previously seen repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingPlugin {
    pub id: i32,
    pub zips: Vec<String>,
}

/// Mutable plugin metadata, refreshed from every default-branch push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginFields {
    pub name: String,
    pub private: bool,
    pub html_url: String,
    pub default_branch: String,
    pub pushed_at: Option<String>,
    pub updated_at: Option<String>,
    pub created_at: Option<String>,
}

impl From<&Repository> for PluginFields {
    fn from(repo: &Repository) -> Self {
        Self {
            name: repo.name.clone(),
            private: repo.private,
            html_url: repo.html_url.clone(),
            default_branch: repo.default_branch.clone(),
            pushed_at: repo.pushed_at.clone(),
            updated_at: repo.updated_at.clone(),
            created_at: repo.created_at.clone(),
        }
    }
}

/// Plugin records keyed by repository full name.
pub struct PluginRegistry<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> PluginRegistry<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// `Ok(None)` means the repository has never been built; store failures
    /// surface as `Err`.
    pub async fn find_by_full_name(
        &self,
        full_name: &str,
    ) -> Result<Option<ExistingPlugin>, DbErr> {
        Ok(self.find_model(full_name).await?.map(|model| ExistingPlugin {
            id: model.id,
            zips: model.zip_urls(),
        }))
    }

    async fn find_model(&self, full_name: &str) -> Result<Option<plugin::Model>, DbErr> {
        plugin::Entity::find()
            .filter(plugin::Column::FullName.eq(full_name))
            .one(self.conn)
            .await
    }

    /// Create the plugin for `full_name`, or replace the existing record's
    /// metadata, artifact history and pusher in place.
    #[instrument(skip(self, fields, zips), fields(zips = zips.len()))]
    pub async fn upsert(
        &self,
        full_name: &str,
        fields: &PluginFields,
        zips: &[String],
        pusher_id: i32,
    ) -> Result<plugin::Model, DbErr> {
        if let Some(existing) = self.find_model(full_name).await? {
            return self
                .update(existing.id, full_name, fields, zips, pusher_id)
                .await;
        }

        let model = Self::active_model(full_name, fields, zips, pusher_id);
        match model.insert(self.conn).await {
            Ok(created) => {
                info!(plugin_id = created.id, "Plugin created");
                Ok(created)
            }
            // A concurrent delivery created it first; fall back to update.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                let existing = self.find_model(full_name).await?.ok_or_else(|| {
                    DbErr::Custom(
                        "UniqueConstraintViolation but existing plugin not found".to_string(),
                    )
                })?;
                self.update(existing.id, full_name, fields, zips, pusher_id)
                    .await
            }
            Err(e) => Err(e),
        }
    }

    async fn update(
        &self,
        id: i32,
        full_name: &str,
        fields: &PluginFields,
        zips: &[String],
        pusher_id: i32,
    ) -> Result<plugin::Model, DbErr> {
        let mut model = Self::active_model(full_name, fields, zips, pusher_id);
        model.id = Set(id);
        let updated = model.update(self.conn).await?;
        info!(plugin_id = updated.id, "Plugin updated");
        Ok(updated)
    }

    fn active_model(
        full_name: &str,
        fields: &PluginFields,
        zips: &[String],
        pusher_id: i32,
    ) -> plugin::ActiveModel {
        plugin::ActiveModel {
            name: Set(fields.name.clone()),
            full_name: Set(full_name.to_string()),
            private: Set(fields.private),
            html_url: Set(fields.html_url.clone()),
            default_branch: Set(fields.default_branch.clone()),
            pushed_at: Set(fields.pushed_at.clone()),
            updated_at: Set(fields.updated_at.clone()),
            created_at: Set(fields.created_at.clone()),
            zips: Set(zips_to_json(zips)),
            pusher_id: Set(pusher_id),
            ..Default::default()
        }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<plugin::Model>, DbErr> {
        plugin::Entity::find_by_id(id).one(self.conn).await
    }

    pub async fn list(&self) -> Result<Vec<plugin::Model>, DbErr> {
        plugin::Entity::find()
            .order_by_asc(plugin::Column::Id)
            .all(self.conn)
            .await
    }

    /// Plugins whose most recent default-branch push came from `pusher_id`.
    pub async fn list_by_pusher(&self, pusher_id: i32) -> Result<Vec<plugin::Model>, DbErr> {
        plugin::Entity::find()
            .filter(plugin::Column::PusherId.eq(pusher_id))
            .order_by_asc(plugin::Column::Id)
            .all(self.conn)
            .await
    }
}
