//! Poll entity for live room polls.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Poll status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[derive(Default)]
pub enum PollStatus {
    #[sea_orm(string_value = "active")]
    #[default]
    Active,
    #[sea_orm(string_value = "closed")]
    Closed,
}

/// Poll model.
///
/// A room has at most one `active` poll; creating a new poll force-closes
/// the prior active one. Tallies are computed by scanning the vote set at
/// read time - the set is bounded by room capacity, so no pre-aggregation
/// is stored here.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Room this poll belongs to.
    #[sea_orm(indexed)]
    pub room_id: String,

    /// Moderator who created the poll.
    pub creator_id: String,

    /// Poll question.
    pub question: String,

    /// Ordered option labels (JSON array of strings, at least 2).
    #[sea_orm(column_type = "Json")]
    pub options: JsonValue,

    /// Whether multiple options may be selected per vote.
    pub multiple: bool,

    /// Current status.
    pub status: PollStatus,

    /// When the poll was created.
    pub created_at: DateTimeWithTimeZone,

    /// When the poll was closed.
    #[sea_orm(nullable)]
    pub closed_at: Option<DateTimeWithTimeZone>,
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
    #[sea_orm(has_many = "super::poll_vote::Entity")]
    Votes,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::poll_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
