//! Room entity - the aggregate root for one live session instance.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Room lifecycle status.
///
/// Legal edges: `scheduled → active → ended`, `scheduled → cancelled`.
/// `ended` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[derive(Default)]
pub enum RoomStatus {
    #[sea_orm(string_value = "scheduled")]
    #[default]
    Scheduled,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "ended")]
    Ended,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl RoomStatus {
    /// Whether a transition from `self` to `target` follows a legal edge.
    /// A self-transition is allowed (idempotent).
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Scheduled, Self::Active | Self::Cancelled) | (Self::Active, Self::Ended)
        ) || matches!(
            (self, target),
            (Self::Scheduled, Self::Scheduled)
                | (Self::Active, Self::Active)
                | (Self::Ended, Self::Ended)
                | (Self::Cancelled, Self::Cancelled)
        )
    }

    /// Whether this status is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }
}

/// Room model - one live session instance and its configuration/status.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "room")]
pub struct Model {
    /// URL-safe ID, the routing key for all sub-resources. Immutable.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Display name.
    pub name: String,

    /// Linked course (optional).
    #[sea_orm(nullable, indexed)]
    pub course_id: Option<String>,

    /// Owner identity - the user who may moderate.
    #[sea_orm(indexed)]
    pub owner_id: String,

    /// Lifecycle status.
    pub status: RoomStatus,

    /// URL at the external conferencing provider that carries the media.
    #[sea_orm(nullable)]
    pub room_url: Option<String>,

    /// Scheduled start instant (optional for ad-hoc rooms).
    #[sea_orm(nullable)]
    pub scheduled_start: Option<DateTimeWithTimeZone>,

    /// Scheduled end instant, strictly after the start.
    #[sea_orm(nullable)]
    pub scheduled_end: Option<DateTimeWithTimeZone>,

    /// IANA timezone for displaying the schedule window.
    #[sea_orm(nullable)]
    pub timezone: Option<String>,

    /// Whether this room recurs.
    #[sea_orm(default_value = false)]
    pub is_recurring: bool,

    /// Recurrence pattern (free-form, interpreted by the scheduler).
    #[sea_orm(nullable)]
    pub recurrence_pattern: Option<String>,

    /// Participant capacity.
    pub capacity: i32,

    // === Feature flags ===
    #[sea_orm(default_value = true)]
    pub recording_enabled: bool,
    #[sea_orm(default_value = true)]
    pub screenshare_enabled: bool,
    #[sea_orm(default_value = true)]
    pub chat_enabled: bool,
    #[sea_orm(default_value = false)]
    pub whiteboard_enabled: bool,
    #[sea_orm(default_value = false)]
    pub waiting_room_enabled: bool,
    #[sea_orm(default_value = false)]
    pub breakout_enabled: bool,

    /// Total participants ever joined (denormalized).
    #[sea_orm(default_value = 0)]
    pub total_participants: i64,

    /// Peak concurrent participants ever observed (denormalized).
    #[sea_orm(default_value = 0)]
    pub peak_participants: i32,

    /// When the room was created.
    pub created_at: DateTimeWithTimeZone,

    /// When the room was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    AttendanceRecords,
    #[sea_orm(has_many = "super::hand_raise::Entity")]
    HandRaises,
    #[sea_orm(has_many = "super::poll::Entity")]
    Polls,
    #[sea_orm(has_many = "super::recording::Entity")]
    Recordings,
    #[sea_orm(has_many = "super::moderation_event::Entity")]
    ModerationEvents,
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceRecords.def()
    }
}

impl Related<super::hand_raise::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HandRaises.def()
    }
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Polls.def()
    }
}

impl Related<super::recording::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recordings.def()
    }
}

impl Related<super::moderation_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModerationEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_edges() {
        assert!(RoomStatus::Scheduled.can_transition_to(RoomStatus::Active));
        assert!(RoomStatus::Scheduled.can_transition_to(RoomStatus::Cancelled));
        assert!(RoomStatus::Active.can_transition_to(RoomStatus::Ended));
    }

    #[test]
    fn test_illegal_edges() {
        assert!(!RoomStatus::Scheduled.can_transition_to(RoomStatus::Ended));
        assert!(!RoomStatus::Active.can_transition_to(RoomStatus::Cancelled));
        assert!(!RoomStatus::Active.can_transition_to(RoomStatus::Scheduled));
        assert!(!RoomStatus::Ended.can_transition_to(RoomStatus::Active));
        assert!(!RoomStatus::Cancelled.can_transition_to(RoomStatus::Scheduled));
    }

    #[test]
    fn test_self_transition_is_legal() {
        assert!(RoomStatus::Scheduled.can_transition_to(RoomStatus::Scheduled));
        assert!(RoomStatus::Active.can_transition_to(RoomStatus::Active));
        assert!(RoomStatus::Ended.can_transition_to(RoomStatus::Ended));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(RoomStatus::Ended.is_terminal());
        assert!(RoomStatus::Cancelled.is_terminal());
        assert!(!RoomStatus::Scheduled.is_terminal());
        assert!(!RoomStatus::Active.is_terminal());
    }
}
