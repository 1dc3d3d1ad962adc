//! Q&A queue service.
//!
//! An ordered hand-raise queue per room. Entries are served by priority
//! (lower first, ties by raise time) and move from pending through
//! acknowledged to resolved. A participant holds at most one pending
//! entry per room.

use std::sync::Arc;

use chrono::Utc;
use liveclass_common::config::SessionConfig;
use liveclass_common::{Actor, AppError, AppResult, CounterStore, IdGenerator, limits};
use liveclass_db::entities::{hand_raise, hand_raise::HandRaiseStatus};
use liveclass_db::repositories::HandRaiseRepository;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::access;
use crate::services::RoomService;

/// Input for raising a hand.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RaiseHandInput {
    pub room_id: String,
    #[validate(length(min = 1, max = 128))]
    pub display_name: String,
    #[validate(length(max = 2048))]
    pub question: Option<String>,
}

/// The queue as moderators see it: pending entries in serving order plus
/// a short tail of recently acknowledged entries for context.
#[derive(Debug, Clone)]
pub struct QueueView {
    pub pending: Vec<hand_raise::Model>,
    pub recently_acknowledged: Vec<hand_raise::Model>,
}

/// Service for the hand-raise queue.
#[derive(Clone)]
pub struct QnaService {
    hand_repo: HandRaiseRepository,
    rooms: RoomService,
    counters: Arc<dyn CounterStore>,
    session: SessionConfig,
    id_gen: IdGenerator,
}

impl QnaService {
    /// Create a new Q&A service.
    #[must_use]
    pub fn new(
        hand_repo: HandRaiseRepository,
        rooms: RoomService,
        counters: Arc<dyn CounterStore>,
        session: SessionConfig,
    ) -> Self {
        Self {
            hand_repo,
            rooms,
            counters,
            session,
            id_gen: IdGenerator::new(),
        }
    }

    /// Raise a hand in an active room.
    ///
    /// Idempotent: if the participant already has a pending entry it is
    /// returned unchanged. A new entry joins the back of the queue with
    /// priority one past the current pending maximum.
    pub async fn raise_hand(
        &self,
        actor: &Actor,
        input: RaiseHandInput,
    ) -> AppResult<hand_raise::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let key = format!("raise:{}:{}", input.room_id, actor.id);
        if !self.counters.check(&key, limits::HAND_RAISE).await? {
            return Err(AppError::RateLimited);
        }

        let room = self.rooms.require_active(&input.room_id).await?;

        if let Some(pending) = self.hand_repo.find_pending(&room.id, &actor.id).await? {
            return Ok(pending);
        }

        let priority = self
            .hand_repo
            .max_pending_priority(&room.id)
            .await?
            .map_or(1, |max| max.saturating_add(1));

        let model = hand_raise::ActiveModel {
            id: Set(self.id_gen.generate()),
            room_id: Set(room.id.clone()),
            participant_id: Set(actor.id.clone()),
            display_name: Set(input.display_name),
            question: Set(input.question),
            priority: Set(priority),
            status: Set(HandRaiseStatus::Pending),
            raised_at: Set(Utc::now().into()),
            acknowledged_at: Set(None),
            acknowledged_by: Set(None),
            resolved_at: Set(None),
        };

        match self.hand_repo.create(model).await {
            Ok(entry) => Ok(entry),
            // A concurrent raise won the insert race.
            Err(AppError::Conflict(_)) => self
                .hand_repo
                .find_pending(&room.id, &actor.id)
                .await?
                .ok_or_else(|| AppError::Internal("Pending hand-raise vanished".to_string())),
            Err(e) => Err(e),
        }
    }

    /// Lower a raised hand.
    ///
    /// A no-op when the participant has no pending entry, so a retried
    /// lower cannot fail. The entry resolves without acknowledgement.
    pub async fn lower_hand(
        &self,
        actor: &Actor,
        room_id: &str,
    ) -> AppResult<Option<hand_raise::Model>> {
        let Some(pending) = self.hand_repo.find_pending(room_id, &actor.id).await? else {
            return Ok(None);
        };

        let mut active: hand_raise::ActiveModel = pending.into();
        active.status = Set(HandRaiseStatus::Resolved);
        active.resolved_at = Set(Some(Utc::now().into()));

        Ok(Some(self.hand_repo.update(active).await?))
    }

    /// Acknowledge a pending entry, moderator-only.
    ///
    /// Re-acknowledging an already acknowledged entry returns it
    /// unchanged; acknowledging a resolved entry is an error.
    pub async fn acknowledge(&self, actor: &Actor, entry_id: &str) -> AppResult<hand_raise::Model> {
        let entry = self.hand_repo.get_by_id(entry_id).await?;
        let room = self.rooms.get_by_id(&entry.room_id).await?;
        access::ensure_moderator(actor, &room)?;

        match entry.status {
            HandRaiseStatus::Acknowledged => Ok(entry),
            HandRaiseStatus::Resolved => Err(AppError::BadRequest(
                "Hand-raise is already resolved".to_string(),
            )),
            HandRaiseStatus::Pending => {
                let mut active: hand_raise::ActiveModel = entry.into();
                active.status = Set(HandRaiseStatus::Acknowledged);
                active.acknowledged_at = Set(Some(Utc::now().into()));
                active.acknowledged_by = Set(Some(actor.id.clone()));
                self.hand_repo.update(active).await
            }
        }
    }

    /// Resolve an entry, moderator-only. Idempotent on resolved entries.
    pub async fn resolve(&self, actor: &Actor, entry_id: &str) -> AppResult<hand_raise::Model> {
        let entry = self.hand_repo.get_by_id(entry_id).await?;
        let room = self.rooms.get_by_id(&entry.room_id).await?;
        access::ensure_moderator(actor, &room)?;

        if entry.status == HandRaiseStatus::Resolved {
            return Ok(entry);
        }

        let mut active: hand_raise::ActiveModel = entry.into();
        active.status = Set(HandRaiseStatus::Resolved);
        active.resolved_at = Set(Some(Utc::now().into()));
        self.hand_repo.update(active).await
    }

    /// Override an entry's queue priority, moderator-only.
    ///
    /// Only the priority changes; raise time still breaks ties among
    /// equal priorities.
    pub async fn reprioritize(
        &self,
        actor: &Actor,
        entry_id: &str,
        priority: i32,
    ) -> AppResult<hand_raise::Model> {
        let entry = self.hand_repo.get_by_id(entry_id).await?;
        let room = self.rooms.get_by_id(&entry.room_id).await?;
        access::ensure_moderator(actor, &room)?;

        if entry.status != HandRaiseStatus::Pending {
            return Err(AppError::BadRequest(
                "Only pending hand-raises can be reprioritized".to_string(),
            ));
        }

        let mut active: hand_raise::ActiveModel = entry.into();
        active.priority = Set(priority);
        self.hand_repo.update(active).await
    }

    /// The room's queue in serving order, with recently acknowledged
    /// entries appended for context.
    pub async fn queue_view(&self, room_id: &str) -> AppResult<QueueView> {
        let room = self.rooms.get_by_id(room_id).await?;

        let pending = self.hand_repo.list_pending(&room.id).await?;
        let recently_acknowledged = self
            .hand_repo
            .list_recent_acknowledged(&room.id, self.session.acknowledged_context)
            .await?;

        Ok(QueueView {
            pending,
            recently_acknowledged,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use liveclass_common::MemoryCounterStore;
    use liveclass_db::entities::{room, room::RoomStatus};
    use liveclass_db::repositories::RoomRepository;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service(db: MockDatabase) -> QnaService {
        let conn = Arc::new(db.into_connection());
        QnaService::new(
            HandRaiseRepository::new(conn.clone()),
            RoomService::new(
                RoomRepository::new(conn),
                Arc::new(liveclass_common::StaticCourseDirectory::empty()),
                SessionConfig::default(),
            ),
            Arc::new(MemoryCounterStore::new()),
            SessionConfig::default(),
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

    fn test_raise(id: &str, status: HandRaiseStatus) -> hand_raise::Model {
        hand_raise::Model {
            id: id.to_string(),
            room_id: "room1".to_string(),
            participant_id: "p1".to_string(),
            display_name: "Pat".to_string(),
            question: None,
            priority: 1,
            status,
            raised_at: Utc::now().into(),
            acknowledged_at: None,
            acknowledged_by: None,
            resolved_at: None,
        }
    }

    fn raise_input() -> RaiseHandInput {
        RaiseHandInput {
            room_id: "room1".to_string(),
            display_name: "Pat".to_string(),
            question: None,
        }
    }

    #[tokio::test]
    async fn test_raise_rejects_inactive_room() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_room(RoomStatus::Ended)]]);
        let svc = service(db);

        let result = svc
            .raise_hand(&Actor::new("p1", "Pat", false), raise_input())
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_raise_returns_existing_pending_entry() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_room(RoomStatus::Active)]])
            .append_query_results([[test_raise("h1", HandRaiseStatus::Pending)]]);
        let svc = service(db);

        let entry = svc
            .raise_hand(&Actor::new("p1", "Pat", false), raise_input())
            .await
            .unwrap();

        assert_eq!(entry.id, "h1");
    }

    #[tokio::test]
    async fn test_lower_without_pending_is_noop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<hand_raise::Model>::new()]);
        let svc = service(db);

        let result = svc
            .lower_hand(&Actor::new("p1", "Pat", false), "room1")
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_acknowledge_requires_moderator() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_raise("h1", HandRaiseStatus::Pending)]])
            .append_query_results([[test_room(RoomStatus::Active)]]);
        let svc = service(db);

        let result = svc.acknowledge(&Actor::new("p2", "Sam", false), "h1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_acknowledge_resolved_entry_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_raise("h1", HandRaiseStatus::Resolved)]])
            .append_query_results([[test_room(RoomStatus::Active)]]);
        let svc = service(db);

        let result = svc
            .acknowledge(&Actor::new("owner1", "Owner", false), "h1")
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_acknowledge_twice_returns_entry_unchanged() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_raise("h1", HandRaiseStatus::Acknowledged)]])
            .append_query_results([[test_room(RoomStatus::Active)]]);
        let svc = service(db);

        let entry = svc
            .acknowledge(&Actor::new("owner1", "Owner", false), "h1")
            .await
            .unwrap();

        assert_eq!(entry.status, HandRaiseStatus::Acknowledged);
    }

    #[tokio::test]
    async fn test_reprioritize_rejects_non_pending() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_raise("h1", HandRaiseStatus::Acknowledged)]])
            .append_query_results([[test_room(RoomStatus::Active)]]);
        let svc = service(db);

        let result = svc
            .reprioritize(&Actor::new("owner1", "Owner", false), "h1", 0)
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
