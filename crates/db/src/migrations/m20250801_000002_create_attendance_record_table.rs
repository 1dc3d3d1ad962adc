//! Create attendance record table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AttendanceRecord::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceRecord::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AttendanceRecord::RoomId).string_len(128).not_null())
                    .col(ColumnDef::new(AttendanceRecord::ParticipantId).string_len(64).not_null())
                    .col(ColumnDef::new(AttendanceRecord::DisplayName).string_len(256).not_null())
                    .col(
                        ColumnDef::new(AttendanceRecord::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttendanceRecord::LeftAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(AttendanceRecord::DurationSecs).big_integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_record_room")
                            .from(AttendanceRecord::Table, AttendanceRecord::RoomId)
                            .to(Room::Table, Room::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: room (for range scans)
        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_record_room_id")
                    .table(AttendanceRecord::Table)
                    .col(AttendanceRecord::RoomId)
                    .to_owned(),
            )
            .await?;

        // Index: (room, participant) for the open-record uniqueness check
        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_record_room_participant")
                    .table(AttendanceRecord::Table)
                    .col(AttendanceRecord::RoomId)
                    .col(AttendanceRecord::ParticipantId)
                    .to_owned(),
            )
            .await?;

        // Partial unique index: at most one open record per (room, participant)
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_attendance_record_open \
                 ON attendance_record (room_id, participant_id) \
                 WHERE left_at IS NULL",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AttendanceRecord::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AttendanceRecord {
    Table,
    Id,
    RoomId,
    ParticipantId,
    DisplayName,
    JoinedAt,
    LeftAt,
    DurationSecs,
}

#[derive(Iden)]
enum Room {
    Table,
    Id,
}
