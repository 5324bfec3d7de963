//! Rate Limiting Infrastructure
//!
//! Sliding-window counters keyed by an arbitrary string, plus a managed
//! background sweep that evicts idle keys.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::clock::Clock;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Requests left in the current window after this one
    pub remaining: u32,
    /// When the oldest counted request leaves the window (Unix ms)
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Whole seconds until another request would be admitted, at least 1
    pub fn retry_after_secs(&self, now_ms: i64) -> u64 {
        let wait_ms = self.reset_at_ms.saturating_sub(now_ms).max(0) as u64;
        wait_ms.div_ceil(1000).max(1)
    }
}

/// Storage backend for sliding-window counters
///
/// `check_and_record` must be atomic per key: two concurrent calls for one
/// key must never both observe "under ceiling" when only one slot is left.
pub trait RateLimitStore: Send + Sync {
    /// Prune, check and (if admitted) record one request at `now_ms`
    ///
    /// A rejected request is not recorded.
    fn check_and_record(&self, key: &str, config: &RateLimitConfig, now_ms: i64)
    -> RateLimitResult;

    /// Drop timestamps older than `window_ms` and delete emptied keys
    ///
    /// Returns the number of keys removed.
    fn sweep(&self, now_ms: i64, window_ms: i64) -> usize;
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store; counters reset on restart
///
/// Each key's queue is mutated under its `DashMap` shard lock, which
/// serializes access per key without a global lock.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    windows: DashMap<String, VecDeque<i64>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently tracked
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Drop timestamps that have left the window; a timestamp exactly
/// `window_ms` old is already outside.
fn prune(timestamps: &mut VecDeque<i64>, now_ms: i64, window_ms: i64) {
    while let Some(&oldest) = timestamps.front() {
        if now_ms.saturating_sub(oldest) >= window_ms {
            timestamps.pop_front();
        } else {
            break;
        }
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn check_and_record(
        &self,
        key: &str,
        config: &RateLimitConfig,
        now_ms: i64,
    ) -> RateLimitResult {
        let window_ms = config.window_ms();
        let ceiling = config.max_requests as usize;

        let mut entry = self.windows.entry(key.to_string()).or_default();
        let timestamps = entry.value_mut();
        prune(timestamps, now_ms, window_ms);

        let result = if timestamps.len() >= ceiling {
            RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_at_ms: timestamps
                    .front()
                    .map_or(now_ms, |t| t.saturating_add(window_ms)),
            }
        } else {
            timestamps.push_back(now_ms);
            RateLimitResult {
                allowed: true,
                remaining: (ceiling - timestamps.len()) as u32,
                reset_at_ms: timestamps
                    .front()
                    .map_or(now_ms, |t| t.saturating_add(window_ms)),
            }
        };

        let emptied = timestamps.is_empty();
        drop(entry);
        if emptied {
            // Only reachable with a zero ceiling; keep the map bounded anyway
            self.windows.remove_if(key, |_, v| v.is_empty());
        }

        result
    }

    fn sweep(&self, now_ms: i64, window_ms: i64) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, timestamps| {
            prune(timestamps, now_ms, window_ms);
            !timestamps.is_empty()
        });
        before.saturating_sub(self.windows.len())
    }
}

// ============================================================================
// Background sweep
// ============================================================================

/// Handle to a running sweep task
///
/// The task stops when [`RateLimitSweeper::stop`] is awaited or the handle
/// is dropped.
#[derive(Debug)]
pub struct RateLimitSweeper {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RateLimitSweeper {
    /// Spawn a task sweeping `store` every `interval`
    ///
    /// `window` should be the longest window configured against `store`.
    pub fn start(
        store: Arc<dyn RateLimitStore>,
        clock: Arc<dyn Clock>,
        window: Duration,
        interval: Duration,
    ) -> Self {
        let (shutdown, mut stopped) = watch::channel(false);
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick fires immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = store.sweep(clock.now_ms(), window_ms);
                        if removed > 0 {
                            tracing::debug!(removed, "Swept idle rate limit keys");
                        }
                    }
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::debug!("Rate limit sweeper stopped");
        });

        Self { shutdown, task }
    }

    /// Signal the task and wait for it to exit
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Rate limit sweeper task ended abnormally");
        }
    }
}
