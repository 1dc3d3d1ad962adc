//! Business logic services.

pub mod moderation;
pub mod poll;
pub mod presence;
pub mod qna;
pub mod recording;
pub mod room;

pub use moderation::{LogActionInput, ModerationService};
pub use poll::{CreatePollInput, PollResults, PollService, VoteInput};
pub use presence::{AttendanceStats, JoinInput, PresenceService};
pub use qna::{QnaService, QueueView, RaiseHandInput};
pub use recording::{RecordingService, RegisterRecordingInput};
pub use room::{CreateRoomInput, RoomService};
