//! Presence service.
//!
//! Tracks who is in a room right now and the attendance history. A
//! participant has at most one open attendance record per room; joins
//! and leaves are safe to retry.

use std::sync::Arc;

use chrono::Utc;
use liveclass_common::{Actor, AppError, AppResult, CounterStore, IdGenerator, limits};
use liveclass_db::entities::attendance_record;
use liveclass_db::repositories::AttendanceRepository;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::access;
use crate::services::RoomService;

/// Input for joining a room.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinInput {
    pub room_id: String,
    #[validate(length(min = 1, max = 128))]
    pub display_name: String,
}

/// Aggregate attendance figures for a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceStats {
    /// Distinct participants that ever joined.
    pub distinct_participants: u64,
    /// Participants with an open record right now.
    pub currently_active: u64,
    /// Mean completed-visit length in seconds, zero when no visit has
    /// finished yet.
    pub avg_duration_secs: i64,
}

/// Service for participant presence and attendance history.
#[derive(Clone)]
pub struct PresenceService {
    attendance_repo: AttendanceRepository,
    rooms: RoomService,
    counters: Arc<dyn CounterStore>,
    id_gen: IdGenerator,
}

impl PresenceService {
    /// Create a new presence service.
    #[must_use]
    pub fn new(
        attendance_repo: AttendanceRepository,
        rooms: RoomService,
        counters: Arc<dyn CounterStore>,
    ) -> Self {
        Self {
            attendance_repo,
            rooms,
            counters,
            id_gen: IdGenerator::new(),
        }
    }

    /// Join a room.
    ///
    /// Idempotent: a participant who already holds an open record gets
    /// that record back unchanged, so a retried join never double-counts.
    pub async fn join(
        &self,
        actor: &Actor,
        input: JoinInput,
    ) -> AppResult<attendance_record::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let key = format!("join:{}:{}", input.room_id, actor.id);
        if !self.counters.check(&key, limits::JOIN).await? {
            return Err(AppError::RateLimited);
        }

        let room = self.rooms.require_active(&input.room_id).await?;

        if let Some(open) = self
            .attendance_repo
            .find_open(&room.id, &actor.id)
            .await?
        {
            return Ok(open);
        }

        let model = attendance_record::ActiveModel {
            id: Set(self.id_gen.generate()),
            room_id: Set(room.id.clone()),
            participant_id: Set(actor.id.clone()),
            display_name: Set(input.display_name),
            joined_at: Set(Utc::now().into()),
            left_at: Set(None),
            duration_secs: Set(None),
        };

        let record = match self.attendance_repo.create(model).await {
            // Counters move only for the request that actually inserted
            // the open record.
            Ok(record) => {
                let active_count = self.attendance_repo.count_active(&room.id).await?;
                self.rooms
                    .note_participant_joined(&room.id, active_count)
                    .await?;
                record
            }
            // A concurrent join won the insert race and already counted
            // this participant; the open record it created is the answer.
            Err(AppError::Conflict(_)) => self
                .attendance_repo
                .find_open(&room.id, &actor.id)
                .await?
                .ok_or_else(|| {
                    AppError::Internal("Open attendance record vanished".to_string())
                })?,
            Err(e) => return Err(e),
        };

        tracing::debug!(room_id = %record.room_id, participant_id = %actor.id, "Participant joined");
        Ok(record)
    }

    /// Leave a room, closing the open record and stamping its duration.
    pub async fn leave(
        &self,
        actor: &Actor,
        room_id: &str,
    ) -> AppResult<attendance_record::Model> {
        let open = self
            .attendance_repo
            .find_open(room_id, &actor.id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No active session in room: {room_id}"))
            })?;

        let now = Utc::now();
        let duration = (now - open.joined_at.to_utc()).num_seconds().max(0);

        let mut active: attendance_record::ActiveModel = open.into();
        active.left_at = Set(Some(now.into()));
        active.duration_secs = Set(Some(duration));

        self.attendance_repo.update(active).await
    }

    /// Attendance records for a room.
    ///
    /// Moderators see the full history; a participant sees only their own
    /// records.
    pub async fn list_attendance(
        &self,
        actor: &Actor,
        room_id: &str,
    ) -> AppResult<Vec<attendance_record::Model>> {
        let room = self.rooms.get_by_id(room_id).await?;

        if access::is_moderator(actor, &room) {
            self.attendance_repo.find_by_room(&room.id).await
        } else {
            self.attendance_repo
                .find_by_room_and_participant(&room.id, &actor.id)
                .await
        }
    }

    /// Aggregate attendance figures, for anyone who can see the room.
    pub async fn stats(&self, actor: &Actor, room_id: &str) -> AppResult<AttendanceStats> {
        let room = self.rooms.get_by_id(room_id).await?;
        if !access::can_view_room(actor, &room, self.rooms.directory()).await? {
            return Err(AppError::Forbidden(
                "Not allowed to view this room's attendance".to_string(),
            ));
        }

        let records = self.attendance_repo.find_by_room(&room.id).await?;
        let currently_active = records.iter().filter(|r| r.left_at.is_none()).count() as u64;

        let completed: Vec<i64> = records
            .iter()
            .filter_map(|r| r.duration_secs)
            .collect();
        let avg_duration_secs = if completed.is_empty() {
            0
        } else {
            completed.iter().sum::<i64>() / completed.len() as i64
        };

        let distinct: std::collections::HashSet<&str> =
            records.iter().map(|r| r.participant_id.as_str()).collect();

        Ok(AttendanceStats {
            distinct_participants: distinct.len() as u64,
            currently_active,
            avg_duration_secs,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use liveclass_common::MemoryCounterStore;
    use liveclass_common::config::SessionConfig;
    use liveclass_db::entities::{room, room::RoomStatus};
    use liveclass_db::repositories::RoomRepository;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service(db: MockDatabase) -> PresenceService {
        let conn = Arc::new(db.into_connection());
        PresenceService::new(
            AttendanceRepository::new(conn.clone()),
            RoomService::new(
                RoomRepository::new(conn),
                Arc::new(liveclass_common::StaticCourseDirectory::empty()),
                SessionConfig::default(),
            ),
            Arc::new(MemoryCounterStore::new()),
        )
    }

    fn test_room(status: RoomStatus) -> room::Model {
        room::Model {
            id: "room1".to_string(),
            name: "Seminar".to_string(),
            course_id: None,
            owner_id: "owner1".to_string(),
            status,
            room_url: None,
            scheduled_start: None,
            scheduled_end: None,
            timezone: None,
            is_recurring: false,
            recurrence_pattern: None,
            capacity: 100,
            recording_enabled: true,
            screenshare_enabled: true,
            chat_enabled: true,
            whiteboard_enabled: false,
            waiting_room_enabled: false,
            breakout_enabled: false,
            total_participants: 0,
            peak_participants: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn open_record(id: &str, participant_id: &str) -> attendance_record::Model {
        attendance_record::Model {
            id: id.to_string(),
            room_id: "room1".to_string(),
            participant_id: participant_id.to_string(),
            display_name: "Pat".to_string(),
            joined_at: Utc::now().into(),
            left_at: None,
            duration_secs: None,
        }
    }

    #[tokio::test]
    async fn test_join_rejects_inactive_room() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_room(RoomStatus::Scheduled)]]);
        let svc = service(db);

        let result = svc
            .join(
                &Actor::new("p1", "Pat", false),
                JoinInput {
                    room_id: "room1".to_string(),
                    display_name: "Pat".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_join_is_idempotent_with_open_record() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_room(RoomStatus::Active)]])
            .append_query_results([[open_record("a1", "p1")]]);
        let svc = service(db);

        let record = svc
            .join(
                &Actor::new("p1", "Pat", false),
                JoinInput {
                    room_id: "room1".to_string(),
                    display_name: "Pat".to_string(),
                },
            )
            .await
            .unwrap();

        // The existing open record comes back; no insert, no counter bump.
        assert_eq!(record.id, "a1");
    }

    #[tokio::test]
    async fn test_join_is_rate_limited() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let actor = Actor::new("p1", "Pat", false);

        // Exhaust the window before the join attempt.
        for _ in 0..limits::JOIN.max_ops {
            svc.counters
                .incr("join:room1:p1", limits::JOIN.window_secs)
                .await
                .unwrap();
        }

        let result = svc
            .join(
                &actor,
                JoinInput {
                    room_id: "room1".to_string(),
                    display_name: "Pat".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::RateLimited)));
    }

    #[tokio::test]
    async fn test_losing_join_race_adopts_winner_without_recounting() {
        // Insert loses to a concurrent duplicate join. No room counter
        // update is queued on the mock, so the call only succeeds if the
        // conflict arm leaves the room row alone.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_room(RoomStatus::Active)]])
            .append_query_results([Vec::<attendance_record::Model>::new()])
            .append_query_errors([sea_orm::DbErr::Query(sea_orm::RuntimeErr::Internal(
                "duplicate key value violates unique constraint \
                 \"idx_attendance_record_open\""
                    .to_string(),
            ))])
            .append_query_results([[open_record("a-winner", "p1")]]);
        let svc = service(db);

        let record = svc
            .join(
                &Actor::new("p1", "Pat", false),
                JoinInput {
                    room_id: "room1".to_string(),
                    display_name: "Pat".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(record.id, "a-winner");
    }

    #[tokio::test]
    async fn test_stats_visible_to_enrolled_participant() {
        let mut room = test_room(RoomStatus::Active);
        room.course_id = Some("course-a".to_string());

        let mut done = open_record("a2", "p2");
        done.left_at = Some(Utc::now().into());
        done.duration_secs = Some(120);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[room]])
            .append_query_results([[open_record("a1", "p1"), done]]);
        let conn = Arc::new(db.into_connection());
        let directory = Arc::new(liveclass_common::StaticCourseDirectory::new([(
            "p1".to_string(),
            vec!["course-a".to_string()],
        )]));
        let svc = PresenceService::new(
            AttendanceRepository::new(conn.clone()),
            RoomService::new(RoomRepository::new(conn), directory, SessionConfig::default()),
            Arc::new(MemoryCounterStore::new()),
        );

        let stats = svc
            .stats(&Actor::new("p1", "Pat", false), "room1")
            .await
            .unwrap();

        assert_eq!(stats.distinct_participants, 2);
        assert_eq!(stats.currently_active, 1);
        assert_eq!(stats.avg_duration_secs, 120);
    }

    #[tokio::test]
    async fn test_stats_hidden_from_stranger() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_room(RoomStatus::Active)]]);
        let svc = service(db);

        let result = svc.stats(&Actor::new("p2", "Sam", false), "room1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_leave_without_open_record() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<attendance_record::Model>::new()]);
        let svc = service(db);

        let result = svc.leave(&Actor::new("p1", "Pat", false), "room1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
