//! Core business logic for liveclass-rs.
//!
//! The live session coordination subsystem: room lifecycle, participant
//! presence, the hand-raise queue, live polling, and the
//! recording/moderation ledger. Each component is a service over the
//! repositories in `liveclass-db`; the surrounding API layer owns
//! transport and supplies authenticated [`liveclass_common::Actor`]s.

pub mod access;
pub mod services;

pub use services::*;
