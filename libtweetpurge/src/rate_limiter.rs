//! Rate limiting for deletions
//!
//! The API allows a fixed number of deletes per window. We count attempts
//! (successful or not) and, once the quota is used up, pause for a full
//! window before the next delete. The window is not rolling: it only resets
//! after the pause.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{info, warn};

/// Deletes allowed per window
pub const DELETE_QUOTA: u32 = 50;

/// Length of one rate limit window
pub const DELETE_WINDOW: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub quota: u32,
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            quota: DELETE_QUOTA,
            window: DELETE_WINDOW,
        }
    }
}

/// Consumption of the delete quota in the current window
#[derive(Debug)]
pub struct RateLimitWindow {
    policy: RateLimitPolicy,
    count: u32,
    started_at: Instant,
}

impl RateLimitWindow {
    pub fn new(policy: RateLimitPolicy, now: Instant) -> Self {
        Self {
            policy,
            count: 0,
            started_at: now,
        }
    }

    /// Count one delete attempt
    pub fn record(&mut self) {
        debug_assert!(
            self.count < self.policy.quota,
            "delete attempted with an exhausted window"
        );
        self.count += 1;
    }

    /// True once `quota` attempts have been made in this window
    pub fn is_exhausted(&self) -> bool {
        self.count >= self.policy.quota
    }

    /// Start a fresh window at `now`
    pub fn reset(&mut self, now: Instant) {
        self.count = 0;
        self.started_at = now;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }
}

/// Suspends the run while the quota refills
#[async_trait]
pub trait Cooldown: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Waits on the tokio clock, logging a countdown once per `tick`
#[derive(Debug, Clone, Copy)]
pub struct TokioCooldown {
    tick: Duration,
}

impl Default for TokioCooldown {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(60),
        }
    }
}

impl TokioCooldown {
    /// Log the countdown every `tick`. A zero tick is raised to one second.
    pub fn with_tick(tick: Duration) -> Self {
        Self {
            tick: tick.max(MIN_TICK),
        }
    }
}

const MIN_TICK: Duration = Duration::from_secs(1);

/// Whole minutes left in a cooldown, rounded up
fn minutes_left(remaining: Duration) -> u64 {
    remaining.as_secs().div_ceil(60)
}

#[async_trait]
impl Cooldown for TokioCooldown {
    async fn pause(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        warn!(
            "*** RATE LIMIT REACHED. SLEEPING FOR {} ***",
            humantime::format_duration(duration)
        );

        let sleep = tokio::time::sleep_until(deadline);
        tokio::pin!(sleep);
        let mut ticker = tokio::time::interval_at(Instant::now() + self.tick, self.tick);

        loop {
            tokio::select! {
                biased;
                _ = &mut sleep => break,
                _ = ticker.tick() => {
                    let minutes = minutes_left(deadline.saturating_duration_since(Instant::now()));
                    info!(minutes_left = minutes, "{} minutes left...", minutes);
                }
            }
        }

        info!("Rate limit window elapsed, resuming");
    }
}

/// Returns immediately, remembering every requested pause
#[derive(Debug, Clone, Default)]
pub struct RecordingCooldown {
    pauses: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingCooldown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Cooldown for RecordingCooldown {
    async fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}
