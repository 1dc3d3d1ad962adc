//! Shared atomic counter store with expiry.
//!
//! Idempotence and burst-control guarantees must hold across all serving
//! instances, so windowed counters live in a shared keyed store instead of
//! per-process maps. The capability is "atomic increment-with-expiry by
//! key": the first increment of a key starts its window, the key expires
//! when the window ends.
//!
//! # Example
//!
//! ```ignore
//! use liveclass_common::counter_store::{CounterStore, RedisCounterStore, limits};
//!
//! let store = RedisCounterStore::new(redis, "liveclass".into());
//! let count = store.incr("vote:room1:user1", limits::VOTE.window_secs).await?;
//! if count > u64::from(limits::VOTE.max_ops) {
//!     // rate limited
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use tokio::sync::RwLock;

use crate::{AppError, AppResult};

/// A bounded operation window: at most `max_ops` per `window_secs`.
#[derive(Debug, Clone, Copy)]
pub struct CounterWindow {
    /// Maximum operations per window.
    pub max_ops: u32,
    /// Window length in seconds.
    pub window_secs: i64,
}

impl CounterWindow {
    /// Create a new counter window.
    #[must_use]
    pub const fn new(max_ops: u32, window_secs: i64) -> Self {
        Self {
            max_ops,
            window_secs,
        }
    }
}

/// Default windows for bursty participant operations.
pub mod limits {
    use super::CounterWindow;

    /// Presence joins (absorbs network retries).
    pub const JOIN: CounterWindow = CounterWindow::new(30, 60);

    /// Hand raises/lowers per participant per room.
    pub const HAND_RAISE: CounterWindow = CounterWindow::new(20, 60);

    /// Poll votes per participant per poll.
    pub const VOTE: CounterWindow = CounterWindow::new(30, 60);
}

/// Atomic increment-with-expiry by key.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increment `key`, starting a `window_secs` expiry window
    /// on the first increment. Returns the count after the increment.
    async fn incr(&self, key: &str, window_secs: i64) -> AppResult<u64>;

    /// Check a windowed limit: increments the counter and returns an error
    /// only on infrastructure failure. `Ok(true)` means allowed.
    async fn check(&self, key: &str, window: CounterWindow) -> AppResult<bool> {
        let count = self.incr(key, window.window_secs).await?;
        Ok(count <= u64::from(window.max_ops))
    }
}

/// Redis-backed counter store, shared across serving instances.
#[derive(Clone)]
pub struct RedisCounterStore {
    redis: Arc<RedisClient>,
    prefix: String,
}

impl RedisCounterStore {
    /// Create a new Redis-backed counter store.
    #[must_use]
    pub const fn new(redis: Arc<RedisClient>, prefix: String) -> Self {
        Self { redis, prefix }
    }

    fn counter_key(&self, key: &str) -> String {
        format!("{}:counter:{key}", self.prefix)
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr(&self, key: &str, window_secs: i64) -> AppResult<u64> {
        let key = self.counter_key(key);

        let count: i64 = self
            .redis
            .incr(key.clone())
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        // First increment starts the window.
        if count == 1 {
            self.redis
                .expire::<(), _>(key, window_secs, None)
                .await
                .map_err(|e| AppError::Redis(e.to_string()))?;
        }

        Ok(count.max(0) as u64)
    }
}

/// In-memory counter store for tests and single-process development.
#[derive(Clone, Default)]
pub struct MemoryCounterStore {
    counters: Arc<RwLock<HashMap<String, (u64, Instant, Duration)>>>,
}

impl MemoryCounterStore {
    /// Create a new in-memory counter store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) keys, for test assertions.
    pub async fn key_count(&self) -> usize {
        let now = Instant::now();
        self.counters
            .read()
            .await
            .values()
            .filter(|(_, start, ttl)| now.duration_since(*start) < *ttl)
            .count()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn incr(&self, key: &str, window_secs: i64) -> AppResult<u64> {
        let mut counters = self.counters.write().await;
        let now = Instant::now();
        let ttl = Duration::from_secs(window_secs.max(0) as u64);

        let entry = counters
            .entry(key.to_string())
            .or_insert_with(|| (0, now, ttl));

        // Expired window restarts the counter.
        if now.duration_since(entry.1) >= entry.2 {
            *entry = (0, now, ttl);
        }

        entry.0 += 1;
        Ok(entry.0)
    }
}
