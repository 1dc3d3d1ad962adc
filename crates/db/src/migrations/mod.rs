//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250801_000001_create_room_table;
mod m20250801_000002_create_attendance_record_table;
mod m20250801_000003_create_hand_raise_table;
mod m20250801_000004_create_poll_tables;
mod m20250801_000005_create_recording_table;
mod m20250801_000006_create_moderation_event_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_room_table::Migration),
            Box::new(m20250801_000002_create_attendance_record_table::Migration),
            Box::new(m20250801_000003_create_hand_raise_table::Migration),
            Box::new(m20250801_000004_create_poll_tables::Migration),
            Box::new(m20250801_000005_create_recording_table::Migration),
            Box::new(m20250801_000006_create_moderation_event_table::Migration),
        ]
    }
}
