//! Recording repository.

use std::sync::Arc;

use liveclass_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

use crate::entities::{Recording, recording};

/// Repository for recording metadata operations.
#[derive(Clone)]
pub struct RecordingRepository {
    db: Arc<DatabaseConnection>,
}

impl RecordingRepository {
    /// Create a new recording repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a recording by its unique (room, external id) key.
    pub async fn find_by_room_and_external(
        &self,
        room_id: &str,
        external_id: &str,
    ) -> AppResult<Option<recording::Model>> {
        Recording::find()
            .filter(recording::Column::RoomId.eq(room_id))
            .filter(recording::Column::ExternalId.eq(external_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Recordings for a room, newest first.
    pub async fn find_by_room(&self, room_id: &str) -> AppResult<Vec<recording::Model>> {
        Recording::find()
            .filter(recording::Column::RoomId.eq(room_id))
            .order_by_desc(recording::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Recordings across a set of rooms, newest first.
    pub async fn find_by_rooms(&self, room_ids: &[String]) -> AppResult<Vec<recording::Model>> {
        if room_ids.is_empty() {
            return Ok(vec![]);
        }
        Recording::find()
            .filter(recording::Column::RoomId.is_in(room_ids.iter().cloned()))
            .order_by_desc(recording::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new recording entry.
    ///
    /// A unique-key violation on (room, external id) maps to `Conflict`
    /// so the caller can fall back to update-in-place.
    pub async fn create(&self, model: recording::ActiveModel) -> AppResult<recording::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                AppError::Conflict(msg)
            } else {
                AppError::Database(msg)
            }
        })
    }

    /// Update a recording entry.
    pub async fn update(&self, model: recording::ActiveModel) -> AppResult<recording::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
