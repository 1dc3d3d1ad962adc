//! Moderation ledger service.
//!
//! Records moderator actions against participants in an append-only
//! audit trail. The side effects themselves (muting or removing the
//! participant at the conferencing provider) are relayed by the calling
//! layer; this ledger is the durable record of who did what to whom.

use chrono::Utc;
use liveclass_common::{Actor, AppResult, IdGenerator};
use liveclass_db::entities::{moderation_event, moderation_event::ModerationAction};
use liveclass_db::repositories::ModerationRepository;
use sea_orm::Set;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::access;
use crate::services::RoomService;

/// Ledger entries returned per listing.
const LEDGER_LIMIT: u64 = 50;

/// Input for logging a moderation action.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogActionInput {
    pub room_id: String,
    pub target_id: String,
    pub action: ModerationAction,
    /// Free-form context (reason, new role, ...).
    pub metadata: Option<JsonValue>,
}

/// Service for the moderation ledger.
#[derive(Clone)]
pub struct ModerationService {
    moderation_repo: ModerationRepository,
    rooms: RoomService,
    id_gen: IdGenerator,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(moderation_repo: ModerationRepository, rooms: RoomService) -> Self {
        Self {
            moderation_repo,
            rooms,
            id_gen: IdGenerator::new(),
        }
    }

    /// Append an action to the ledger, moderator-only.
    ///
    /// Once the moderator and room checks pass the append always goes
    /// through; the ledger records what happened, it does not police it.
    pub async fn log_action(
        &self,
        actor: &Actor,
        input: LogActionInput,
    ) -> AppResult<moderation_event::Model> {
        let room = access::room_for_moderator(self.rooms.repo(), actor, &input.room_id).await?;

        let model = moderation_event::ActiveModel {
            id: Set(self.id_gen.generate()),
            room_id: Set(room.id.clone()),
            moderator_id: Set(actor.id.clone()),
            target_id: Set(input.target_id),
            action: Set(input.action),
            metadata: Set(input
                .metadata
                .unwrap_or_else(|| JsonValue::Object(serde_json::Map::new()))),
            created_at: Set(Utc::now().into()),
        };

        let event = self.moderation_repo.append(model).await?;
        tracing::info!(
            room_id = %event.room_id,
            moderator_id = %event.moderator_id,
            target_id = %event.target_id,
            action = ?event.action,
            "Moderation action logged"
        );
        Ok(event)
    }

    /// Recent ledger entries for a room, newest first, moderator-only.
    pub async fn list_recent(
        &self,
        actor: &Actor,
        room_id: &str,
    ) -> AppResult<Vec<moderation_event::Model>> {
        let room = access::room_for_moderator(self.rooms.repo(), actor, room_id).await?;
        self.moderation_repo.list_recent(&room.id, LEDGER_LIMIT).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use liveclass_common::AppError;
    use liveclass_common::config::SessionConfig;
    use liveclass_db::entities::{room, room::RoomStatus};
    use liveclass_db::repositories::RoomRepository;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: MockDatabase) -> ModerationService {
        let conn = Arc::new(db.into_connection());
        ModerationService::new(
            ModerationRepository::new(conn.clone()),
            RoomService::new(
                RoomRepository::new(conn),
                Arc::new(liveclass_common::StaticCourseDirectory::empty()),
                SessionConfig::default(),
            ),
        )
    }

    fn test_room() -> room::Model {
        room::Model {
            id: "room1".to_string(),
            name: "Seminar".to_string(),
            course_id: None,
            owner_id: "owner1".to_string(),
            status: RoomStatus::Active,
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

    fn log_input(target_id: &str) -> LogActionInput {
        LogActionInput {
            room_id: "room1".to_string(),
            target_id: target_id.to_string(),
            action: ModerationAction::Mute,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn test_log_action_requires_moderator() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_room()]]);
        let svc = service(db);

        let result = svc
            .log_action(&Actor::new("p1", "Pat", false), log_input("p2"))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_log_action_appends_even_when_moderator_targets_themselves() {
        let event = moderation_event::Model {
            id: "ev1".to_string(),
            room_id: "room1".to_string(),
            moderator_id: "owner1".to_string(),
            target_id: "owner1".to_string(),
            action: ModerationAction::Mute,
            metadata: serde_json::json!({}),
            created_at: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_room()]])
            .append_query_results([[event]]);
        let svc = service(db);

        let logged = svc
            .log_action(&Actor::new("owner1", "Owner", false), log_input("owner1"))
            .await
            .unwrap();

        assert_eq!(logged.target_id, "owner1");
    }

    #[tokio::test]
    async fn test_missing_room_is_forbidden_for_non_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<room::Model>::new()]);
        let svc = service(db);

        let result = svc
            .log_action(&Actor::new("p1", "Pat", false), log_input("p2"))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_missing_room_is_not_found_for_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<room::Model>::new()]);
        let svc = service(db);

        let result = svc
            .log_action(&Actor::new("admin1", "Admin", true), log_input("p2"))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
