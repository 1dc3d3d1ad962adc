//! Poll and poll vote repositories.

use std::sync::Arc;

use liveclass_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::entities::{Poll, PollVote, poll, poll::PollStatus, poll_vote};

/// Repository for poll operations.
#[derive(Clone)]
pub struct PollRepository {
    db: Arc<DatabaseConnection>,
}

impl PollRepository {
    /// Create a new poll repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a poll by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<poll::Model>> {
        Poll::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a poll by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<poll::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Poll not found: {id}")))
    }

    /// Find the room's active poll, if any. At most one exists.
    pub async fn find_active_by_room(&self, room_id: &str) -> AppResult<Option<poll::Model>> {
        Poll::find()
            .filter(poll::Column::RoomId.eq(room_id))
            .filter(poll::Column::Status.eq(PollStatus::Active))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Polls for a room, newest first.
    pub async fn list_by_room(&self, room_id: &str, limit: u64) -> AppResult<Vec<poll::Model>> {
        Poll::find()
            .filter(poll::Column::RoomId.eq(room_id))
            .order_by_desc(poll::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new poll.
    ///
    /// A violation of the one-active-poll-per-room unique index maps to
    /// `Conflict` so the caller can re-run its close-then-create step.
    pub async fn create(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                AppError::Conflict(msg)
            } else {
                AppError::Database(msg)
            }
        })
    }

    /// Update a poll.
    pub async fn update(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Repository for poll vote operations.
#[derive(Clone)]
pub struct PollVoteRepository {
    db: Arc<DatabaseConnection>,
}

impl PollVoteRepository {
    /// Create a new poll vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a participant's vote on a poll, if any. At most one exists.
    pub async fn find_by_poll_and_participant(
        &self,
        poll_id: &str,
        participant_id: &str,
    ) -> AppResult<Option<poll_vote::Model>> {
        PollVote::find()
            .filter(poll_vote::Column::PollId.eq(poll_id))
            .filter(poll_vote::Column::ParticipantId.eq(participant_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All votes for a poll.
    pub async fn find_by_poll(&self, poll_id: &str) -> AppResult<Vec<poll_vote::Model>> {
        PollVote::find()
            .filter(poll_vote::Column::PollId.eq(poll_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new vote.
    ///
    /// A violation of the one-vote-per-participant unique index maps to
    /// `Conflict` so the caller can fall back to replacing the vote.
    pub async fn create(&self, model: poll_vote::ActiveModel) -> AppResult<poll_vote::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                AppError::Conflict(msg)
            } else {
                AppError::Database(msg)
            }
        })
    }

    /// Replace the selections of an existing vote.
    pub async fn update(&self, model: poll_vote::ActiveModel) -> AppResult<poll_vote::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
