//! Moderation ledger repository.
//!
//! Append-only: there is deliberately no update or delete method here.
//! Entries disappear only through the room cascade when a room is
//! permanently removed.

use std::sync::Arc;

use liveclass_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::entities::{ModerationEvent, moderation_event};

/// Repository for the moderation event ledger.
#[derive(Clone)]
pub struct ModerationRepository {
    db: Arc<DatabaseConnection>,
}

impl ModerationRepository {
    /// Create a new moderation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append a moderation event to the ledger.
    pub async fn append(
        &self,
        model: moderation_event::ActiveModel,
    ) -> AppResult<moderation_event::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recent events for a room, newest first.
    pub async fn list_recent(
        &self,
        room_id: &str,
        limit: u64,
    ) -> AppResult<Vec<moderation_event::Model>> {
        ModerationEvent::find()
            .filter(moderation_event::Column::RoomId.eq(room_id))
            .order_by_desc(moderation_event::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
