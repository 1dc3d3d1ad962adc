//! Database repositories.
//!
//! One repository per collection. Each holds an `Arc<DatabaseConnection>`
//! and maps `DbErr` to `AppError::Database` at this boundary.

#![allow(missing_docs)]

pub mod attendance;
pub mod hand_raise;
pub mod moderation;
pub mod poll;
pub mod recording;
pub mod room;

pub use attendance::AttendanceRepository;
pub use hand_raise::HandRaiseRepository;
pub use moderation::ModerationRepository;
pub use poll::{PollRepository, PollVoteRepository};
pub use recording::RecordingRepository;
pub use room::{RoomQuery, RoomRepository};
