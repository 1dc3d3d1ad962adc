//! Attendance repository.

use std::sync::Arc;

use liveclass_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

use crate::entities::{AttendanceRecord, attendance_record};

/// Repository for attendance record operations.
#[derive(Clone)]
pub struct AttendanceRepository {
    db: Arc<DatabaseConnection>,
}

impl AttendanceRepository {
    /// Create a new attendance repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the single open record (no `left_at`) for a (room, participant)
    /// pair, if any.
    pub async fn find_open(
        &self,
        room_id: &str,
        participant_id: &str,
    ) -> AppResult<Option<attendance_record::Model>> {
        AttendanceRecord::find()
            .filter(attendance_record::Column::RoomId.eq(room_id))
            .filter(attendance_record::Column::ParticipantId.eq(participant_id))
            .filter(attendance_record::Column::LeftAt.is_null())
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new attendance record.
    ///
    /// A violation of the one-open-record unique index maps to `Conflict`
    /// so the caller can re-run the idempotent join.
    pub async fn create(
        &self,
        model: attendance_record::ActiveModel,
    ) -> AppResult<attendance_record::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                AppError::Conflict(msg)
            } else {
                AppError::Database(msg)
            }
        })
    }

    /// Update an attendance record.
    pub async fn update(
        &self,
        model: attendance_record::ActiveModel,
    ) -> AppResult<attendance_record::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All records for a room, earliest join first.
    pub async fn find_by_room(&self, room_id: &str) -> AppResult<Vec<attendance_record::Model>> {
        AttendanceRecord::find()
            .filter(attendance_record::Column::RoomId.eq(room_id))
            .order_by_asc(attendance_record::Column::JoinedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All records for one participant in a room, earliest join first.
    pub async fn find_by_room_and_participant(
        &self,
        room_id: &str,
        participant_id: &str,
    ) -> AppResult<Vec<attendance_record::Model>> {
        AttendanceRecord::find()
            .filter(attendance_record::Column::RoomId.eq(room_id))
            .filter(attendance_record::Column::ParticipantId.eq(participant_id))
            .order_by_asc(attendance_record::Column::JoinedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of currently open records in a room.
    pub async fn count_active(&self, room_id: &str) -> AppResult<u64> {
        AttendanceRecord::find()
            .filter(attendance_record::Column::RoomId.eq(room_id))
            .filter(attendance_record::Column::LeftAt.is_null())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

}
