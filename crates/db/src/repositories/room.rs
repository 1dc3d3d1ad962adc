//! Room repository.

use std::sync::Arc;

use chrono::Utc;
use liveclass_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

use crate::entities::{Room, room, room::RoomStatus};

/// Filter for room listings.
#[derive(Debug, Clone, Default)]
pub struct RoomQuery {
    /// Restrict to rooms linked to this course.
    pub course_id: Option<String>,
    /// Restrict to rooms in this status.
    pub status: Option<RoomStatus>,
    /// Restrict to upcoming rooms: start >= now and status in
    /// {scheduled, active}.
    pub upcoming: bool,
}

/// Repository for room operations.
///
/// The room row is mutated only through this repository; all other
/// components read rooms through the registry's API.
#[derive(Clone)]
pub struct RoomRepository {
    db: Arc<DatabaseConnection>,
}

impl RoomRepository {
    /// Create a new room repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find room by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<room::Model>> {
        Room::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get room by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<room::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Room not found: {id}")))
    }

    /// Create a new room.
    pub async fn create(&self, model: room::ActiveModel) -> AppResult<room::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a room.
    pub async fn update(&self, model: room::ActiveModel) -> AppResult<room::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List rooms matching a query.
    ///
    /// When `visibility` is supplied, results are restricted to rooms the
    /// requester owns or rooms linked to a course in their enrollment set.
    /// Admin callers pass `None`.
    pub async fn list(
        &self,
        query: &RoomQuery,
        visibility: Option<(&str, &[String])>,
    ) -> AppResult<Vec<room::Model>> {
        let mut select = Room::find();

        if let Some(ref course_id) = query.course_id {
            select = select.filter(room::Column::CourseId.eq(course_id));
        }
        if let Some(status) = query.status {
            select = select.filter(room::Column::Status.eq(status));
        }
        if query.upcoming {
            select = select
                .filter(room::Column::ScheduledStart.gte(Utc::now()))
                .filter(
                    room::Column::Status
                        .is_in([RoomStatus::Scheduled, RoomStatus::Active]),
                );
        }
        if let Some((requester_id, course_ids)) = visibility {
            let mut access = Condition::any().add(room::Column::OwnerId.eq(requester_id));
            if !course_ids.is_empty() {
                access = access.add(room::Column::CourseId.is_in(course_ids.iter().cloned()));
            }
            select = select.filter(access);
        }

        select
            .order_by_asc(room::Column::ScheduledStart)
            .order_by_desc(room::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fold one join into the room's counters atomically: bump the
    /// lifetime participant total and lift the peak to the observed
    /// concurrency. Single SQL statement, so concurrent joins from
    /// different participants never lose increments.
    pub async fn record_join(&self, id: &str, active_count: i32) -> AppResult<()> {
        use sea_orm::sea_query::Expr;

        Room::update_many()
            .col_expr(
                room::Column::TotalParticipants,
                Expr::col(room::Column::TotalParticipants).add(1),
            )
            .col_expr(
                room::Column::PeakParticipants,
                Expr::cust_with_exprs(
                    "GREATEST(peak_participants, ?)",
                    [Expr::value(active_count)],
                ),
            )
            .col_expr(room::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(room::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Find rooms owned by a user.
    pub async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<room::Model>> {
        Room::find()
            .filter(room::Column::OwnerId.eq(owner_id))
            .order_by_desc(room::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find rooms linked to any of the given courses.
    pub async fn find_by_courses(&self, course_ids: &[String]) -> AppResult<Vec<room::Model>> {
        if course_ids.is_empty() {
            return Ok(vec![]);
        }
        Room::find()
            .filter(room::Column::CourseId.is_in(course_ids.iter().cloned()))
            .order_by_desc(room::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Permanently delete a room. Sub-resources cascade at the schema
    /// level (the room is the aggregate root).
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Room::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
