//! Poll vote entity - one row per participant per poll.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Poll vote model.
///
/// (`poll_id`, `participant_id`) is unique: re-voting replaces the prior
/// selections in place (documented last-write-wins), it never accumulates
/// history.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll_vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Poll voted on.
    #[sea_orm(indexed)]
    pub poll_id: String,

    /// Room the poll belongs to (denormalized for room-scoped scans).
    #[sea_orm(indexed)]
    pub room_id: String,

    /// Participant who voted.
    #[sea_orm(indexed)]
    pub participant_id: String,

    /// Selected option indices (JSON array of integers, 0-based).
    #[sea_orm(column_type = "Json")]
    pub choices: JsonValue,

    /// When the current selections were cast.
    pub voted_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::poll::Entity",
        from = "Column::PollId",
        to = "super::poll::Column::Id",
        on_delete = "Cascade"
    )]
    Poll,
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
