//! Moderation event entity - append-only audit ledger.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Moderation action tag.
///
/// The legal action set is a closed variant; the side effects themselves
/// (mute/kick at the conferencing provider) are relayed by the calling
/// layer, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ModerationAction {
    #[sea_orm(string_value = "mute")]
    Mute,
    #[sea_orm(string_value = "unmute")]
    Unmute,
    #[sea_orm(string_value = "kick")]
    Kick,
    #[sea_orm(string_value = "role_change")]
    RoleChange,
}

/// Moderation event model. Never updated or deleted after creation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "moderation_event")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Room the action happened in.
    #[sea_orm(indexed)]
    pub room_id: String,

    /// Moderator who issued the action.
    pub moderator_id: String,

    /// Participant the action targets.
    pub target_id: String,

    /// Action tag.
    pub action: ModerationAction,

    /// Free-form metadata (reason, new role, ...).
    #[sea_orm(column_type = "Json")]
    pub metadata: JsonValue,

    /// When the action was logged.
    pub created_at: DateTimeWithTimeZone,
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
