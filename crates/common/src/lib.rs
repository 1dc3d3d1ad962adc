//! Common utilities and shared types for liveclass-rs.
//!
//! This crate provides foundational components used across all liveclass-rs
//! crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Collaborators**: Trusted identity input ([`Actor`]) and the course
//!   enrollment directory trait ([`CourseDirectory`])
//! - **Counter Store**: Shared atomic increment-with-expiry capability via
//!   [`CounterStore`], backed by Redis in production
//!
//! # Example
//!
//! ```no_run
//! use liveclass_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod actor;
pub mod config;
pub mod counter_store;
pub mod error;
pub mod id;

pub use actor::{Actor, CourseDirectory, StaticCourseDirectory};
pub use config::Config;
pub use counter_store::{
    CounterStore, CounterWindow, MemoryCounterStore, RedisCounterStore, limits,
};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
