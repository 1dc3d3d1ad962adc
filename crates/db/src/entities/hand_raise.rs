//! Hand-raise entity - a queued request for moderator attention.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Hand-raise status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[derive(Default)]
pub enum HandRaiseStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "acknowledged")]
    Acknowledged,
    #[sea_orm(string_value = "resolved")]
    Resolved,
}

/// Hand-raise model.
///
/// The queue is drained by (priority asc, `raised_at` asc): lower priority
/// numbers are served first, ties break by raise time. At most one
/// `pending` entry exists per (room, participant).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hand_raise")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Room whose queue this entry belongs to.
    #[sea_orm(indexed)]
    pub room_id: String,

    /// Participant who raised their hand.
    #[sea_orm(indexed)]
    pub participant_id: String,

    /// Display name at raise time.
    pub display_name: String,

    /// Optional question text.
    #[sea_orm(column_type = "Text", nullable)]
    pub question: Option<String>,

    /// Queue priority; assigned as max pending priority + 1 on raise.
    pub priority: i32,

    /// Current status.
    pub status: HandRaiseStatus,

    /// When the hand was raised.
    pub raised_at: DateTimeWithTimeZone,

    /// When a moderator acknowledged the entry.
    #[sea_orm(nullable)]
    pub acknowledged_at: Option<DateTimeWithTimeZone>,

    /// Moderator who acknowledged the entry.
    #[sea_orm(nullable)]
    pub acknowledged_by: Option<String>,

    /// When the entry was resolved.
    #[sea_orm(nullable)]
    pub resolved_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id",
        on_delete = "Cascade"
    )]
    Room,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
