use forge_common::PusherIdentity;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};
use tracing::{debug, info, instrument};

use crate::entity::pusher;

/// Deduplicates contributor identities by email.
pub struct PusherRegistry<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> PusherRegistry<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<pusher::Model>, DbErr> {
        pusher::Entity::find()
            .filter(pusher::Column::Email.eq(email))
            .one(self.conn)
            .await
    }

    /// Return the ID of the pusher with `identity.email`, creating the record
    /// on first sight. Existing records are never modified.
    #[instrument(skip(self, identity), fields(email = %identity.email))]
    pub async fn get_or_create_pusher_id(&self, identity: &PusherIdentity) -> Result<i32, DbErr> {
        if let Some(existing) = self.find_by_email(&identity.email).await? {
            debug!(pusher_id = existing.id, "Pusher found");
            return Ok(existing.id);
        }

        let model = pusher::ActiveModel {
            name: Set(identity.name.clone()),
            email: Set(identity.email.clone()),
            ..Default::default()
        };

        match model.insert(self.conn).await {
            Ok(created) => {
                info!(pusher_id = created.id, "Pusher created");
                Ok(created.id)
            }
            // Lost a race with a concurrent delivery from the same pusher.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => self
                .find_by_email(&identity.email)
                .await?
                .map(|p| p.id)
                .ok_or_else(|| {
                    DbErr::Custom(
                        "UniqueConstraintViolation but existing pusher not found".to_string(),
                    )
                }),
            Err(e) => Err(e),
        }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<pusher::Model>, DbErr> {
        pusher::Entity::find_by_id(id).one(self.conn).await
    }

    pub async fn list(&self) -> Result<Vec<pusher::Model>, DbErr> {
        pusher::Entity::find()
            .order_by_asc(pusher::Column::Id)
            .all(self.conn)
            .await
    }
}
