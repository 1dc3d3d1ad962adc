//! Create hand raise table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HandRaise::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(HandRaise::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(HandRaise::RoomId).string_len(128).not_null())
                    .col(ColumnDef::new(HandRaise::ParticipantId).string_len(64).not_null())
                    .col(ColumnDef::new(HandRaise::DisplayName).string_len(256).not_null())
                    .col(ColumnDef::new(HandRaise::Question).text())
                    .col(ColumnDef::new(HandRaise::Priority).integer().not_null())
                    .col(ColumnDef::new(HandRaise::Status).string_len(32).not_null())
                    .col(
                        ColumnDef::new(HandRaise::RaisedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HandRaise::AcknowledgedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(HandRaise::AcknowledgedBy).string_len(64))
                    .col(ColumnDef::new(HandRaise::ResolvedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hand_raise_room")
                            .from(HandRaise::Table, HandRaise::RoomId)
                            .to(Room::Table, Room::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (room, status, priority) covers queue drains
        manager
            .create_index(
                Index::create()
                    .name("idx_hand_raise_room_status_priority")
                    .table(HandRaise::Table)
                    .col(HandRaise::RoomId)
                    .col(HandRaise::Status)
                    .col(HandRaise::Priority)
                    .to_owned(),
            )
            .await?;

        // Index: (room, participant) for the pending-entry uniqueness check
        manager
            .create_index(
                Index::create()
                    .name("idx_hand_raise_room_participant")
                    .table(HandRaise::Table)
                    .col(HandRaise::RoomId)
                    .col(HandRaise::ParticipantId)
                    .to_owned(),
            )
            .await?;

        // Partial unique index: at most one pending entry per (room, participant)
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_hand_raise_pending \
                 ON hand_raise (room_id, participant_id) \
                 WHERE status = 'pending'",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HandRaise::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum HandRaise {
    Table,
    Id,
    RoomId,
    ParticipantId,
    DisplayName,
    Question,
    Priority,
    Status,
    RaisedAt,
    AcknowledgedAt,
    AcknowledgedBy,
    ResolvedAt,
}

#[derive(Iden)]
enum Room {
    Table,
    Id,
}
