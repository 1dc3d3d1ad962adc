//! Create room table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Room::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Room::Id).string_len(128).not_null().primary_key())
                    .col(ColumnDef::new(Room::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Room::CourseId).string_len(64))
                    .col(ColumnDef::new(Room::OwnerId).string_len(64).not_null())
                    .col(ColumnDef::new(Room::Status).string_len(32).not_null())
                    .col(ColumnDef::new(Room::RoomUrl).string_len(1024))
                    .col(ColumnDef::new(Room::ScheduledStart).timestamp_with_time_zone())
                    .col(ColumnDef::new(Room::ScheduledEnd).timestamp_with_time_zone())
                    .col(ColumnDef::new(Room::Timezone).string_len(64))
                    .col(ColumnDef::new(Room::IsRecurring).boolean().not_null().default(false))
                    .col(ColumnDef::new(Room::RecurrencePattern).string_len(256))
                    .col(ColumnDef::new(Room::Capacity).integer().not_null())
                    .col(ColumnDef::new(Room::RecordingEnabled).boolean().not_null().default(true))
                    .col(ColumnDef::new(Room::ScreenshareEnabled).boolean().not_null().default(true))
                    .col(ColumnDef::new(Room::ChatEnabled).boolean().not_null().default(true))
                    .col(ColumnDef::new(Room::WhiteboardEnabled).boolean().not_null().default(false))
                    .col(ColumnDef::new(Room::WaitingRoomEnabled).boolean().not_null().default(false))
                    .col(ColumnDef::new(Room::BreakoutEnabled).boolean().not_null().default(false))
                    .col(ColumnDef::new(Room::TotalParticipants).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Room::PeakParticipants).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Room::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Room::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: owner (for ownership-scoped listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_room_owner_id")
                    .table(Room::Table)
                    .col(Room::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Index: linked course (for enrollment-scoped listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_room_course_id")
                    .table(Room::Table)
                    .col(Room::CourseId)
                    .to_owned(),
            )
            .await?;

        // Index: (status, scheduled_start) for upcoming-room scans
        manager
            .create_index(
                Index::create()
                    .name("idx_room_status_scheduled_start")
                    .table(Room::Table)
                    .col(Room::Status)
                    .col(Room::ScheduledStart)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Room::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Room {
    Table,
    Id,
    Name,
    CourseId,
    OwnerId,
    Status,
    RoomUrl,
    ScheduledStart,
    ScheduledEnd,
    Timezone,
    IsRecurring,
    RecurrencePattern,
    Capacity,
    RecordingEnabled,
    ScreenshareEnabled,
    ChatEnabled,
    WhiteboardEnabled,
    WaitingRoomEnabled,
    BreakoutEnabled,
    TotalParticipants,
    PeakParticipants,
    CreatedAt,
    UpdatedAt,
}
