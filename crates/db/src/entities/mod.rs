//! Database entities.
//!
//! Six independent keyed collections, all logically owned by the room
//! aggregate but stored separately so concurrent participant writes never
//! contend on the room row itself.

#![allow(missing_docs)]

pub mod attendance_record;
pub mod hand_raise;
pub mod moderation_event;
pub mod poll;
pub mod poll_vote;
pub mod recording;
pub mod room;

pub use attendance_record::Entity as AttendanceRecord;
pub use hand_raise::Entity as HandRaise;
pub use moderation_event::Entity as ModerationEvent;
pub use poll::Entity as Poll;
pub use poll_vote::Entity as PollVote;
pub use recording::Entity as Recording;
pub use room::Entity as Room;
