//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `liveclass_test`)
//!   `TEST_DB_PASSWORD` (default: `liveclass_test`)
//!   `TEST_DB_NAME` (default: `liveclass_test`)

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use liveclass_db::entities::{attendance_record, poll, poll::PollStatus, room, room::RoomStatus};
use liveclass_db::repositories::{AttendanceRepository, PollRepository, RoomRepository};
use liveclass_db::test_utils::{TestDatabase, TestDbConfig, TestRedisConfig};
use sea_orm::Set;
use serde_json::json;

fn room_model(id: &str) -> room::ActiveModel {
    room::ActiveModel {
        id: Set(id.to_string()),
        name: Set("Integration Seminar".to_string()),
        course_id: Set(None),
        owner_id: Set("owner1".to_string()),
        status: Set(RoomStatus::Active),
        room_url: Set(None),
        scheduled_start: Set(None),
        scheduled_end: Set(None),
        timezone: Set(None),
        is_recurring: Set(false),
        recurrence_pattern: Set(None),
        capacity: Set(100),
        recording_enabled: Set(true),
        screenshare_enabled: Set(true),
        chat_enabled: Set(true),
        whiteboard_enabled: Set(false),
        waiting_room_enabled: Set(false),
        breakout_enabled: Set(false),
        total_participants: Set(0),
        peak_participants: Set(0),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}

fn open_attendance(id: &str, room_id: &str, participant_id: &str) -> attendance_record::ActiveModel {
    attendance_record::ActiveModel {
        id: Set(id.to_string()),
        room_id: Set(room_id.to_string()),
        participant_id: Set(participant_id.to_string()),
        display_name: Set("Pat".to_string()),
        joined_at: Set(Utc::now().into()),
        left_at: Set(None),
        duration_secs: Set(None),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_room_round_trip() {
    let db = TestDatabase::create_unique().await.unwrap();
    liveclass_db::migrate(db.connection()).await.unwrap();

    let repo = RoomRepository::new(db.conn.clone());
    repo.create(room_model("it-room-1")).await.unwrap();

    let found = repo.get_by_id("it-room-1").await.unwrap();
    assert_eq!(found.status, RoomStatus::Active);
    assert_eq!(found.owner_id, "owner1");

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_second_open_attendance_record_is_rejected() {
    let db = TestDatabase::create_unique().await.unwrap();
    liveclass_db::migrate(db.connection()).await.unwrap();

    let conn = db.conn.clone();
    let rooms = RoomRepository::new(conn.clone());
    let attendance = AttendanceRepository::new(conn);

    rooms.create(room_model("it-room-2")).await.unwrap();
    attendance
        .create(open_attendance("a1", "it-room-2", "p1"))
        .await
        .unwrap();

    // The partial unique index allows only one open record per
    // (room, participant).
    let second = attendance
        .create(open_attendance("a2", "it-room-2", "p1"))
        .await;
    assert!(matches!(
        second,
        Err(liveclass_common::AppError::Conflict(_))
    ));

    db.drop_database().await.unwrap();
}

fn active_poll(id: &str, room_id: &str) -> poll::ActiveModel {
    poll::ActiveModel {
        id: Set(id.to_string()),
        room_id: Set(room_id.to_string()),
        creator_id: Set("owner1".to_string()),
        question: Set("Ready to move on?".to_string()),
        options: Set(json!(["Yes", "No"])),
        multiple: Set(false),
        status: Set(PollStatus::Active),
        created_at: Set(Utc::now().into()),
        closed_at: Set(None),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_second_active_poll_is_rejected() {
    let db = TestDatabase::create_unique().await.unwrap();
    liveclass_db::migrate(db.connection()).await.unwrap();

    let conn = db.conn.clone();
    let rooms = RoomRepository::new(conn.clone());
    let polls = PollRepository::new(conn);

    rooms.create(room_model("it-room-5")).await.unwrap();
    polls.create(active_poll("pl1", "it-room-5")).await.unwrap();

    // The partial unique index allows only one active poll per room.
    let second = polls.create(active_poll("pl2", "it-room-5")).await;
    assert!(matches!(
        second,
        Err(liveclass_common::AppError::Conflict(_))
    ));

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_record_join_moves_counters_atomically() {
    let db = TestDatabase::create_unique().await.unwrap();
    liveclass_db::migrate(db.connection()).await.unwrap();

    let rooms = RoomRepository::new(db.conn.clone());
    rooms.create(room_model("it-room-6")).await.unwrap();

    rooms.record_join("it-room-6", 3).await.unwrap();
    rooms.record_join("it-room-6", 2).await.unwrap();

    let room = rooms.get_by_id("it-room-6").await.unwrap();
    assert_eq!(room.total_participants, 2);
    // The peak only ever rises.
    assert_eq!(room.peak_participants, 3);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_room_delete_cascades_to_attendance() {
    let db = TestDatabase::create_unique().await.unwrap();
    liveclass_db::migrate(db.connection()).await.unwrap();

    let conn = db.conn.clone();
    let rooms = RoomRepository::new(conn.clone());
    let attendance = AttendanceRepository::new(conn);

    rooms.create(room_model("it-room-3")).await.unwrap();
    attendance
        .create(open_attendance("a1", "it-room-3", "p1"))
        .await
        .unwrap();

    rooms.delete("it-room-3").await.unwrap();

    let records = attendance.find_by_room("it-room-3").await.unwrap();
    assert!(records.is_empty());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_shared_database_cleanup() {
    let db = TestDatabase::new().await.unwrap();
    let result = db.cleanup().await;
    assert!(result.is_ok(), "Cleanup failed: {:?}", result.err());
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_redis_config_from_env() {
    let config = TestRedisConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("testdb"));
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    assert!(config.postgres_url().ends_with("/postgres"));
}
