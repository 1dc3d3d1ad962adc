//! Recording ledger service.
//!
//! Metadata for session recordings captured by the external conferencing
//! provider. Registration is an upsert keyed by (room, external id), so
//! provider callbacks can be replayed safely, and processing status never
//! moves backwards.

use std::sync::Arc;

use chrono::Utc;
use liveclass_common::{Actor, AppError, AppResult, CourseDirectory, IdGenerator};
use liveclass_db::entities::{
    recording,
    recording::{RecordingKind, RecordingStatus},
};
use liveclass_db::repositories::RecordingRepository;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::access;
use crate::services::RoomService;

/// Input for registering a recording.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRecordingInput {
    pub room_id: String,
    #[validate(length(min = 1, max = 256))]
    pub external_id: String,
    #[validate(url)]
    pub url: Option<String>,
    #[serde(default)]
    pub kind: RecordingKind,
    #[validate(range(min = 0))]
    pub duration_secs: Option<i64>,
    #[validate(range(min = 0))]
    pub file_size: Option<i64>,
    #[validate(url)]
    pub thumbnail_url: Option<String>,
}

/// Service for the recording ledger.
#[derive(Clone)]
pub struct RecordingService {
    recording_repo: RecordingRepository,
    rooms: RoomService,
    directory: Arc<dyn CourseDirectory>,
    id_gen: IdGenerator,
}

impl RecordingService {
    /// Create a new recording service.
    #[must_use]
    pub fn new(
        recording_repo: RecordingRepository,
        rooms: RoomService,
        directory: Arc<dyn CourseDirectory>,
    ) -> Self {
        Self {
            recording_repo,
            rooms,
            directory,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register or refresh a recording, moderator-only.
    ///
    /// Upsert keyed by (room, external id). A recording registered with a
    /// playback URL is `ready` immediately; without one it sits in
    /// `processing` until a later registration supplies the URL. `ready`
    /// and `failed` are final.
    pub async fn register(
        &self,
        actor: &Actor,
        input: RegisterRecordingInput,
    ) -> AppResult<recording::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let room = access::room_for_moderator(self.rooms.repo(), actor, &input.room_id).await?;
        if !room.recording_enabled {
            return Err(AppError::BadRequest(
                "Recording is disabled for this room".to_string(),
            ));
        }

        if let Some(existing) = self
            .recording_repo
            .find_by_room_and_external(&room.id, &input.external_id)
            .await?
        {
            return self.refresh(existing, input).await;
        }

        let status = if input.url.is_some() {
            RecordingStatus::Ready
        } else {
            RecordingStatus::Processing
        };

        let model = recording::ActiveModel {
            id: Set(self.id_gen.generate()),
            room_id: Set(room.id.clone()),
            external_id: Set(input.external_id.clone()),
            url: Set(input.url.clone()),
            kind: Set(input.kind),
            status: Set(status),
            duration_secs: Set(input.duration_secs),
            file_size: Set(input.file_size),
            thumbnail_url: Set(input.thumbnail_url.clone()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        match self.recording_repo.create(model).await {
            Ok(created) => {
                tracing::info!(
                    room_id = %created.room_id,
                    external_id = %created.external_id,
                    "Recording registered"
                );
                Ok(created)
            }
            // A concurrent registration won the insert race; refresh it.
            Err(AppError::Conflict(_)) => {
                let existing = self
                    .recording_repo
                    .find_by_room_and_external(&room.id, &input.external_id)
                    .await?
                    .ok_or_else(|| AppError::Internal("Recording vanished".to_string()))?;
                self.refresh(existing, input).await
            }
            Err(e) => Err(e),
        }
    }

    /// Mark a processing recording as failed, moderator-only. A recording
    /// that already reached `ready` or `failed` stays where it is.
    pub async fn mark_failed(
        &self,
        actor: &Actor,
        room_id: &str,
        external_id: &str,
    ) -> AppResult<recording::Model> {
        let room = access::room_for_moderator(self.rooms.repo(), actor, room_id).await?;

        let existing = self
            .recording_repo
            .find_by_room_and_external(&room.id, external_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Recording not found: {external_id}")))?;

        if existing.status != RecordingStatus::Processing {
            return Ok(existing);
        }

        let mut active: recording::ActiveModel = existing.into();
        active.status = Set(RecordingStatus::Failed);
        active.updated_at = Set(Some(Utc::now().into()));
        self.recording_repo.update(active).await
    }

    /// Recordings for one room. Visible to moderators and to participants
    /// enrolled in the room's linked course.
    pub async fn list_for_room(
        &self,
        actor: &Actor,
        room_id: &str,
    ) -> AppResult<Vec<recording::Model>> {
        let room = self.rooms.get_by_id(room_id).await?;
        if !access::can_view_room(actor, &room, self.directory.as_ref()).await? {
            return Err(AppError::Forbidden(
                "Not allowed to view this room's recordings".to_string(),
            ));
        }
        self.recording_repo.find_by_room(&room.id).await
    }

    /// All recordings across the rooms the actor can see.
    pub async fn list_visible(&self, actor: &Actor) -> AppResult<Vec<recording::Model>> {
        let room_ids =
            access::visible_room_ids(actor, self.rooms.repo(), self.directory.as_ref()).await?;
        self.recording_repo.find_by_rooms(&room_ids).await
    }

    /// Fold a later registration into an existing row without moving the
    /// status backwards.
    async fn refresh(
        &self,
        existing: recording::Model,
        input: RegisterRecordingInput,
    ) -> AppResult<recording::Model> {
        let status = match existing.status {
            RecordingStatus::Processing if input.url.is_some() => RecordingStatus::Ready,
            other => other,
        };
        let url = input.url.or_else(|| existing.url.clone());
        let duration_secs = input.duration_secs.or(existing.duration_secs);
        let file_size = input.file_size.or(existing.file_size);
        let thumbnail_url = input.thumbnail_url.or_else(|| existing.thumbnail_url.clone());

        let mut active: recording::ActiveModel = existing.into();
        active.status = Set(status);
        active.url = Set(url);
        active.duration_secs = Set(duration_secs);
        active.file_size = Set(file_size);
        active.thumbnail_url = Set(thumbnail_url);
        active.updated_at = Set(Some(Utc::now().into()));

        self.recording_repo.update(active).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use liveclass_common::StaticCourseDirectory;
    use liveclass_common::config::SessionConfig;
    use liveclass_db::entities::{room, room::RoomStatus};
    use liveclass_db::repositories::RoomRepository;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service(db: MockDatabase) -> RecordingService {
        let conn = Arc::new(db.into_connection());
        let directory = Arc::new(StaticCourseDirectory::new([(
            "p1".to_string(),
            vec!["course-a".to_string()],
        )]));
        RecordingService::new(
            RecordingRepository::new(conn.clone()),
            RoomService::new(
                RoomRepository::new(conn),
                directory.clone(),
                SessionConfig::default(),
            ),
            directory,
        )
    }

    fn test_room(recording_enabled: bool) -> room::Model {
        room::Model {
            id: "room1".to_string(),
            name: "Seminar".to_string(),
            course_id: Some("course-a".to_string()),
            owner_id: "owner1".to_string(),
            status: RoomStatus::Ended,
            room_url: None,
            scheduled_start: None,
            scheduled_end: None,
            timezone: None,
            is_recurring: false,
            recurrence_pattern: None,
            capacity: 100,
            recording_enabled,
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

    fn register_input(url: Option<&str>) -> RegisterRecordingInput {
        RegisterRecordingInput {
            room_id: "room1".to_string(),
            external_id: "ext-42".to_string(),
            url: url.map(ToString::to_string),
            kind: RecordingKind::Provider,
            duration_secs: None,
            file_size: None,
            thumbnail_url: None,
        }
    }

    #[tokio::test]
    async fn test_register_requires_moderator() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_room(true)]]);
        let svc = service(db);

        let result = svc
            .register(&Actor::new("p1", "Pat", false), register_input(None))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_recording_disabled_room() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_room(false)]]);
        let svc = service(db);

        let result = svc
            .register(&Actor::new("owner1", "Owner", false), register_input(None))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_list_for_room_rejects_unenrolled_participant() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_room(true)]]);
        let svc = service(db);

        let result = svc
            .list_for_room(&Actor::new("stranger", "Sam", false), "room1")
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
