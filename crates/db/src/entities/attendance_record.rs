//! Attendance record entity - one occupancy interval per participant.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attendance record model.
///
/// A record is *open* while `left_at` is absent. At most one open record
/// exists per (room, participant) at any time; re-joining after leaving
/// creates a new record rather than mutating the old one.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendance_record")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Room this interval belongs to.
    #[sea_orm(indexed)]
    pub room_id: String,

    /// Participant identity.
    #[sea_orm(indexed)]
    pub participant_id: String,

    /// Display name at join time.
    pub display_name: String,

    /// Set once when the record is created.
    pub joined_at: DateTimeWithTimeZone,

    /// Set at most once; absent while the participant is in the room.
    #[sea_orm(nullable)]
    pub left_at: Option<DateTimeWithTimeZone>,

    /// Derived `left_at - joined_at` in whole seconds, set with `left_at`.
    #[sea_orm(nullable)]
    pub duration_secs: Option<i64>,
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
