//! Create poll and poll vote tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Poll::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Poll::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Poll::RoomId).string_len(128).not_null())
                    .col(ColumnDef::new(Poll::CreatorId).string_len(64).not_null())
                    .col(ColumnDef::new(Poll::Question).string_len(1024).not_null())
                    .col(ColumnDef::new(Poll::Options).json().not_null())
                    .col(ColumnDef::new(Poll::Multiple).boolean().not_null().default(false))
                    .col(ColumnDef::new(Poll::Status).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Poll::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Poll::ClosedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poll_room")
                            .from(Poll::Table, Poll::RoomId)
                            .to(Room::Table, Room::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (room, status) for the single-active-poll lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_room_status")
                    .table(Poll::Table)
                    .col(Poll::RoomId)
                    .col(Poll::Status)
                    .to_owned(),
            )
            .await?;

        // Partial unique index: at most one active poll per room
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_poll_room_active \
                 ON poll (room_id) \
                 WHERE status = 'active'",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PollVote::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PollVote::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(PollVote::PollId).string_len(32).not_null())
                    .col(ColumnDef::new(PollVote::RoomId).string_len(128).not_null())
                    .col(ColumnDef::new(PollVote::ParticipantId).string_len(64).not_null())
                    .col(ColumnDef::new(PollVote::Choices).json().not_null())
                    .col(
                        ColumnDef::new(PollVote::VotedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poll_vote_poll")
                            .from(PollVote::Table, PollVote::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one vote row per (poll, participant) - re-voting
        // replaces in place
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_vote_poll_participant")
                    .table(PollVote::Table)
                    .col(PollVote::PollId)
                    .col(PollVote::ParticipantId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: room (for room-scoped scans)
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_vote_room_id")
                    .table(PollVote::Table)
                    .col(PollVote::RoomId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PollVote::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Poll::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
    RoomId,
    CreatorId,
    Question,
    Options,
    Multiple,
    Status,
    CreatedAt,
    ClosedAt,
}

#[derive(Iden)]
enum PollVote {
    Table,
    Id,
    PollId,
    RoomId,
    ParticipantId,
    Choices,
    VotedAt,
}

#[derive(Iden)]
enum Room {
    Table,
    Id,
}
