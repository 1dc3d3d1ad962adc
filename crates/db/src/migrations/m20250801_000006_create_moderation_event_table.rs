//! Create moderation event table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ModerationEvent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ModerationEvent::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ModerationEvent::RoomId).string_len(128).not_null())
                    .col(ColumnDef::new(ModerationEvent::ModeratorId).string_len(64).not_null())
                    .col(ColumnDef::new(ModerationEvent::TargetId).string_len(64).not_null())
                    .col(ColumnDef::new(ModerationEvent::Action).string_len(32).not_null())
                    .col(ColumnDef::new(ModerationEvent::Metadata).json().not_null())
                    .col(
                        ColumnDef::new(ModerationEvent::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_moderation_event_room")
                            .from(ModerationEvent::Table, ModerationEvent::RoomId)
                            .to(Room::Table, Room::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (room, created_at) for recent-events listings
        manager
            .create_index(
                Index::create()
                    .name("idx_moderation_event_room_created")
                    .table(ModerationEvent::Table)
                    .col(ModerationEvent::RoomId)
                    .col(ModerationEvent::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ModerationEvent::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ModerationEvent {
    Table,
    Id,
    RoomId,
    ModeratorId,
    TargetId,
    Action,
    Metadata,
    CreatedAt,
}

#[derive(Iden)]
enum Room {
    Table,
    Id,
}
