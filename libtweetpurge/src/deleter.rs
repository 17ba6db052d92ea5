//! Rate-limited deletion loop
//!
//! Two states: active (issuing deletes) and throttled (paused for one full
//! window). Every attempt counts against the quota whether it succeeds or
//! not. A failed delete is recorded and the loop moves on; nothing is
//! retried within a run.

use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::api::TimelineApi;
use crate::error::DeletionError;
use crate::rate_limiter::{Cooldown, RateLimitPolicy, RateLimitWindow};
use crate::types::Post;

/// Result of one delete attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionOutcome {
    pub post_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DeletionError>,
}

impl DeletionOutcome {
    fn deleted(post_id: &str) -> Self {
        Self {
            post_id: post_id.to_string(),
            success: true,
            error: None,
        }
    }

    fn failed(error: DeletionError) -> Self {
        Self {
            post_id: error.post_id.clone(),
            success: false,
            error: Some(error),
        }
    }
}

/// Totals for a deletion pass
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub deleted: usize,
    pub errored: usize,
    /// Number of times the loop paused for the quota to refill
    pub cooldowns: usize,
    pub outcomes: Vec<DeletionOutcome>,
}

impl DeletionReport {
    fn record(&mut self, outcome: DeletionOutcome) {
        if outcome.success {
            self.deleted += 1;
        } else {
            self.errored += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeletionError> {
        self.outcomes.iter().filter_map(|o| o.error.as_ref())
    }
}

pub struct RateLimitedDeleter<'a> {
    api: &'a dyn TimelineApi,
    cooldown: &'a dyn Cooldown,
    window: RateLimitWindow,
    report: DeletionReport,
}

impl<'a> RateLimitedDeleter<'a> {
    pub fn new(api: &'a dyn TimelineApi, cooldown: &'a dyn Cooldown, policy: RateLimitPolicy) -> Self {
        Self {
            api,
            cooldown,
            window: RateLimitWindow::new(policy, Instant::now()),
            report: DeletionReport::default(),
        }
    }

    /// Delete each post once, in order, pausing whenever the window is used up.
    ///
    /// The pause happens before the next delete rather than right after the
    /// last one, so a run never ends in a cooldown.
    pub async fn delete_all(mut self, posts: &[Post]) -> DeletionReport {
        for post in posts {
            if self.window.is_exhausted() {
                self.throttle().await;
            }

            let outcome = self.delete_one(post).await;
            self.window.record();
            self.report.record(outcome);
        }

        self.report
    }

    async fn throttle(&mut self) {
        let policy = self.window.policy();
        info!(
            deleted = self.report.deleted,
            errored = self.report.errored,
            quota = policy.quota,
            "Delete quota used up for this window"
        );

        self.cooldown.pause(policy.window).await;
        self.window.reset(Instant::now());
        self.report.cooldowns += 1;
    }

    async fn delete_one(&self, post: &Post) -> DeletionOutcome {
        match self.api.delete_tweet(&post.id).await {
            Ok(reply) if reply.is_success() => {
                info!("[SUCCESS] Deleted tweetId={}", post.id);
                DeletionOutcome::deleted(&post.id)
            }
            Ok(reply) => {
                let error = DeletionError {
                    post_id: post.id.clone(),
                    status: Some(reply.status),
                    detail: reply.body,
                };
                warn!(status = reply.status, "[ERROR] {}", error);
                DeletionOutcome::failed(error)
            }
            Err(e) => {
                let error = DeletionError {
                    post_id: post.id.clone(),
                    status: None,
                    detail: e.to_string(),
                };
                warn!("[ERROR] {}", error);
                DeletionOutcome::failed(error)
            }
        }
    }
}
