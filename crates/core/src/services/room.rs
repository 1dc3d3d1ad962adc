//! Room registry service.
//!
//! Owns the room lifecycle state machine. The room row is mutated only
//! here; every other component reads rooms through this service and
//! reports participant counts back through it.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use liveclass_common::config::SessionConfig;
use liveclass_common::{Actor, AppError, AppResult, CourseDirectory, IdGenerator};
use liveclass_db::entities::{room, room::RoomStatus};
use liveclass_db::repositories::{RoomQuery, RoomRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::access;

/// Input for creating a room.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    pub course_id: Option<String>,
    #[validate(url)]
    pub room_url: Option<String>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurrence_pattern: Option<String>,
    #[validate(range(min = 2, max = 10_000))]
    pub capacity: Option<i32>,
    #[serde(default = "default_true")]
    pub recording_enabled: bool,
    #[serde(default = "default_true")]
    pub screenshare_enabled: bool,
    #[serde(default = "default_true")]
    pub chat_enabled: bool,
    #[serde(default)]
    pub whiteboard_enabled: bool,
    #[serde(default)]
    pub waiting_room_enabled: bool,
    #[serde(default)]
    pub breakout_enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Service for room lifecycle and scheduling.
#[derive(Clone)]
pub struct RoomService {
    room_repo: RoomRepository,
    directory: Arc<dyn CourseDirectory>,
    session: SessionConfig,
    id_gen: IdGenerator,
}

impl RoomService {
    /// Create a new room service.
    #[must_use]
    pub fn new(
        room_repo: RoomRepository,
        directory: Arc<dyn CourseDirectory>,
        session: SessionConfig,
    ) -> Self {
        Self {
            room_repo,
            directory,
            session,
            id_gen: IdGenerator::new(),
        }
    }

    /// Access to the underlying repository, for sibling services that
    /// resolve rooms through the registry.
    #[must_use]
    pub const fn repo(&self) -> &RoomRepository {
        &self.room_repo
    }

    /// The course directory backing visibility checks.
    #[must_use]
    pub fn directory(&self) -> &dyn CourseDirectory {
        self.directory.as_ref()
    }

    /// Create a room.
    ///
    /// All rooms start in `scheduled`. An explicit start instant must lie
    /// in the future; a missing end instant defaults to start plus the
    /// configured session duration.
    pub async fn create(&self, actor: &Actor, input: CreateRoomInput) -> AppResult<room::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(ref tz) = input.timezone
            && tz.parse::<chrono_tz::Tz>().is_err()
        {
            return Err(AppError::Validation(format!("Unknown timezone: {tz}")));
        }

        let now = Utc::now();

        if let Some(start) = input.scheduled_start
            && start <= now
        {
            return Err(AppError::Validation(
                "Scheduled start must be in the future".to_string(),
            ));
        }

        let scheduled_end = match (input.scheduled_start, input.scheduled_end) {
            (_, Some(end)) => {
                let start = input.scheduled_start.unwrap_or(now);
                if end <= start {
                    return Err(AppError::Validation(
                        "Scheduled end must be after the start".to_string(),
                    ));
                }
                Some(end)
            }
            (Some(start), None) => {
                Some(start + Duration::seconds(self.session.default_duration_secs))
            }
            (None, None) => None,
        };

        if input.is_recurring && input.recurrence_pattern.is_none() {
            return Err(AppError::Validation(
                "Recurring rooms need a recurrence pattern".to_string(),
            ));
        }

        let id = self.id_gen.generate_room_id(&input.name);

        let model = room::ActiveModel {
            id: Set(id),
            name: Set(input.name),
            course_id: Set(input.course_id),
            owner_id: Set(actor.id.clone()),
            status: Set(RoomStatus::Scheduled),
            room_url: Set(input.room_url),
            scheduled_start: Set(input.scheduled_start.map(Into::into)),
            scheduled_end: Set(scheduled_end.map(Into::into)),
            timezone: Set(input.timezone),
            is_recurring: Set(input.is_recurring),
            recurrence_pattern: Set(input.recurrence_pattern),
            capacity: Set(input.capacity.unwrap_or(self.session.default_capacity)),
            recording_enabled: Set(input.recording_enabled),
            screenshare_enabled: Set(input.screenshare_enabled),
            chat_enabled: Set(input.chat_enabled),
            whiteboard_enabled: Set(input.whiteboard_enabled),
            waiting_room_enabled: Set(input.waiting_room_enabled),
            breakout_enabled: Set(input.breakout_enabled),
            total_participants: Set(0),
            peak_participants: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let room = self.room_repo.create(model).await?;
        tracing::info!(room_id = %room.id, owner_id = %actor.id, "Room created");
        Ok(room)
    }

    /// Get a room by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<room::Model> {
        self.room_repo.get_by_id(id).await
    }

    /// Get a room, requiring it to be `active`.
    pub async fn require_active(&self, id: &str) -> AppResult<room::Model> {
        let room = self.room_repo.get_by_id(id).await?;
        if room.status != RoomStatus::Active {
            return Err(AppError::BadRequest(format!(
                "Room is not active: {id}"
            )));
        }
        Ok(room)
    }

    /// Transition a room along the lifecycle state machine.
    ///
    /// Re-requesting the current status is a no-op so a retried request
    /// cannot fail spuriously. Illegal edges are rejected.
    pub async fn transition(
        &self,
        actor: &Actor,
        room_id: &str,
        target: RoomStatus,
    ) -> AppResult<room::Model> {
        let room = access::room_for_moderator(&self.room_repo, actor, room_id).await?;

        if room.status == target {
            return Ok(room);
        }
        if !room.status.can_transition_to(target) {
            return Err(AppError::InvalidTransition(format!(
                "Cannot move room from {:?} to {target:?}",
                room.status
            )));
        }

        let mut active: room::ActiveModel = room.into();
        active.status = Set(target);
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.room_repo.update(active).await?;
        tracing::info!(room_id = %updated.id, status = ?target, "Room transitioned");
        Ok(updated)
    }

    /// List rooms visible to the actor.
    ///
    /// Admins see everything; other callers see rooms they own plus rooms
    /// linked to their enrolled courses.
    pub async fn list(&self, actor: &Actor, query: &RoomQuery) -> AppResult<Vec<room::Model>> {
        if actor.is_admin {
            self.room_repo.list(query, None).await
        } else {
            let courses = self.directory.enrolled_courses(&actor.id).await?;
            self.room_repo
                .list(query, Some((&actor.id, &courses)))
                .await
        }
    }

    /// Permanently remove a room and all its sub-resources (attendance,
    /// queue, polls, recordings, ledger) via the schema cascade.
    pub async fn purge(&self, actor: &Actor, room_id: &str) -> AppResult<()> {
        let room = access::room_for_moderator(&self.room_repo, actor, room_id).await?;
        self.room_repo.delete(&room.id).await?;
        tracing::info!(room_id = %room.id, moderator_id = %actor.id, "Room purged");
        Ok(())
    }

    /// Fold a join into the room's denormalized counters: bump the
    /// lifetime total and lift the peak if the current concurrency
    /// exceeds it. Applied as a single atomic update so concurrent
    /// joins never lose increments.
    pub async fn note_participant_joined(
        &self,
        room_id: &str,
        active_count: u64,
    ) -> AppResult<()> {
        let active = i32::try_from(active_count).unwrap_or(i32::MAX);
        self.room_repo.record_join(room_id, active).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service(db: MockDatabase) -> RoomService {
        let conn = Arc::new(db.into_connection());
        RoomService::new(
            RoomRepository::new(conn),
            Arc::new(liveclass_common::StaticCourseDirectory::empty()),
            SessionConfig::default(),
        )
    }

    fn base_input(name: &str) -> CreateRoomInput {
        CreateRoomInput {
            name: name.to_string(),
            course_id: None,
            room_url: None,
            scheduled_start: None,
            scheduled_end: None,
            timezone: None,
            is_recurring: false,
            recurrence_pattern: None,
            capacity: None,
            recording_enabled: true,
            screenshare_enabled: true,
            chat_enabled: true,
            whiteboard_enabled: false,
            waiting_room_enabled: false,
            breakout_enabled: false,
        }
    }

    fn test_room(status: RoomStatus, owner_id: &str) -> room::Model {
        room::Model {
            id: "seminar-01h".to_string(),
            name: "Seminar".to_string(),
            course_id: None,
            owner_id: owner_id.to_string(),
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

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let actor = Actor::new("owner1", "Owner", false);

        let result = svc.create(&actor, base_input("")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_past_start() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let actor = Actor::new("owner1", "Owner", false);

        let mut input = base_input("Office Hours");
        input.scheduled_start = Some(Utc::now() - Duration::hours(1));

        let result = svc.create(&actor, input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_end_before_start() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let actor = Actor::new("owner1", "Owner", false);

        let start = Utc::now() + Duration::hours(2);
        let mut input = base_input("Office Hours");
        input.scheduled_start = Some(start);
        input.scheduled_end = Some(start - Duration::minutes(30));

        let result = svc.create(&actor, input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_timezone() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let actor = Actor::new("owner1", "Owner", false);

        let mut input = base_input("Office Hours");
        input.timezone = Some("Mars/Olympus_Mons".to_string());

        let result = svc.create(&actor, input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_transition_same_status_is_noop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_room(RoomStatus::Active, "owner1")]]);
        let svc = service(db);
        let actor = Actor::new("owner1", "Owner", false);

        let room = svc
            .transition(&actor, "seminar-01h", RoomStatus::Active)
            .await
            .unwrap();

        assert_eq!(room.status, RoomStatus::Active);
        // No update was queued on the mock, so the call must not have
        // written anything.
    }

    #[tokio::test]
    async fn test_transition_rejects_illegal_edge() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_room(RoomStatus::Ended, "owner1")]]);
        let svc = service(db);
        let actor = Actor::new("owner1", "Owner", false);

        let result = svc
            .transition(&actor, "seminar-01h", RoomStatus::Active)
            .await;

        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_transition_requires_moderator() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_room(RoomStatus::Scheduled, "owner1")]]);
        let svc = service(db);
        let actor = Actor::new("p1", "Pat", false);

        let result = svc
            .transition(&actor, "seminar-01h", RoomStatus::Active)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_require_active_rejects_scheduled_room() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_room(RoomStatus::Scheduled, "owner1")]]);
        let svc = service(db);

        let result = svc.require_active("seminar-01h").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
