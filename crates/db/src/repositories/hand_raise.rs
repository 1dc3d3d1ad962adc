//! Hand-raise repository.

use std::sync::Arc;

use liveclass_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::entities::{HandRaise, hand_raise, hand_raise::HandRaiseStatus};

/// Repository for hand-raise queue operations.
#[derive(Clone)]
pub struct HandRaiseRepository {
    db: Arc<DatabaseConnection>,
}

impl HandRaiseRepository {
    /// Create a new hand-raise repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find hand-raise by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<hand_raise::Model>> {
        HandRaise::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get hand-raise by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<hand_raise::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Hand raise not found: {id}")))
    }

    /// Find the participant's pending entry in a room, if any. At most one
    /// exists.
    pub async fn find_pending(
        &self,
        room_id: &str,
        participant_id: &str,
    ) -> AppResult<Option<hand_raise::Model>> {
        HandRaise::find()
            .filter(hand_raise::Column::RoomId.eq(room_id))
            .filter(hand_raise::Column::ParticipantId.eq(participant_id))
            .filter(hand_raise::Column::Status.eq(HandRaiseStatus::Pending))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Highest priority value among pending entries in a room.
    pub async fn max_pending_priority(&self, room_id: &str) -> AppResult<Option<i32>> {
        let top = HandRaise::find()
            .filter(hand_raise::Column::RoomId.eq(room_id))
            .filter(hand_raise::Column::Status.eq(HandRaiseStatus::Pending))
            .order_by_desc(hand_raise::Column::Priority)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(top.map(|entry| entry.priority))
    }

    /// Pending entries in queue order: priority asc, then raised_at asc.
    pub async fn list_pending(&self, room_id: &str) -> AppResult<Vec<hand_raise::Model>> {
        HandRaise::find()
            .filter(hand_raise::Column::RoomId.eq(room_id))
            .filter(hand_raise::Column::Status.eq(HandRaiseStatus::Pending))
            .order_by_asc(hand_raise::Column::Priority)
            .order_by_asc(hand_raise::Column::RaisedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recently acknowledged entries, newest first.
    pub async fn list_recent_acknowledged(
        &self,
        room_id: &str,
        limit: u64,
    ) -> AppResult<Vec<hand_raise::Model>> {
        HandRaise::find()
            .filter(hand_raise::Column::RoomId.eq(room_id))
            .filter(hand_raise::Column::Status.eq(HandRaiseStatus::Acknowledged))
            .order_by_desc(hand_raise::Column::AcknowledgedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new hand-raise.
    ///
    /// A violation of the one-pending-entry unique index maps to
    /// `Conflict` so the caller can re-run the idempotent raise.
    pub async fn create(&self, model: hand_raise::ActiveModel) -> AppResult<hand_raise::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                AppError::Conflict(msg)
            } else {
                AppError::Database(msg)
            }
        })
    }

    /// Update a hand-raise.
    pub async fn update(&self, model: hand_raise::ActiveModel) -> AppResult<hand_raise::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
