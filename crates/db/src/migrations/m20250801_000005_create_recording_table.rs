//! Create recording table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Recording::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Recording::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Recording::RoomId).string_len(128).not_null())
                    .col(ColumnDef::new(Recording::ExternalId).string_len(256).not_null())
                    .col(ColumnDef::new(Recording::Url).string_len(1024))
                    .col(ColumnDef::new(Recording::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(Recording::Status).string_len(32).not_null())
                    .col(ColumnDef::new(Recording::DurationSecs).big_integer())
                    .col(ColumnDef::new(Recording::FileSize).big_integer())
                    .col(ColumnDef::new(Recording::ThumbnailUrl).string_len(1024))
                    .col(
                        ColumnDef::new(Recording::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Recording::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recording_room")
                            .from(Recording::Table, Recording::RoomId)
                            .to(Room::Table, Room::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (room, external id) - registration is an upsert
        manager
            .create_index(
                Index::create()
                    .name("idx_recording_room_external")
                    .table(Recording::Table)
                    .col(Recording::RoomId)
                    .col(Recording::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Recording::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Recording {
    Table,
    Id,
    RoomId,
    ExternalId,
    Url,
    Kind,
    Status,
    DurationSecs,
    FileSize,
    ThumbnailUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Room {
    Table,
    Id,
}
