//! Recording entity - metadata for a captured session recording.
//!
//! Only metadata and state live here; the bytes are captured and encoded
//! by the external conferencing provider.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recording processing status.
///
/// Status only advances `processing → ready` or `processing → failed`,
/// never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[derive(Default)]
pub enum RecordingStatus {
    #[sea_orm(string_value = "processing")]
    #[default]
    Processing,
    #[sea_orm(string_value = "ready")]
    Ready,
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// How the recording was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[derive(Default)]
pub enum RecordingKind {
    #[sea_orm(string_value = "local")]
    #[default]
    Local,
    #[sea_orm(string_value = "provider")]
    Provider,
}

/// Recording model. (`room_id`, `external_id`) is unique.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recording")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Room the recording belongs to.
    #[sea_orm(indexed)]
    pub room_id: String,

    /// Recording ID at the conferencing provider.
    pub external_id: String,

    /// Playback URL, present once processing finishes.
    #[sea_orm(nullable)]
    pub url: Option<String>,

    /// Capture kind.
    pub kind: RecordingKind,

    /// Processing status.
    pub status: RecordingStatus,

    /// Recording length in seconds.
    #[sea_orm(nullable)]
    pub duration_secs: Option<i64>,

    /// File size in bytes.
    #[sea_orm(nullable)]
    pub file_size: Option<i64>,

    /// Thumbnail URL.
    #[sea_orm(nullable)]
    pub thumbnail_url: Option<String>,

    /// When the recording was first registered.
    pub created_at: DateTimeWithTimeZone,

    /// When the metadata was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
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
