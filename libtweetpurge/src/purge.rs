//! Purge orchestration
//!
//! Runs the stages strictly in order: resolve the account, fetch the whole
//! timeline, split it at the cutoff, then delete. Failures in the first
//! three stages abort before any delete is issued.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::account::resolve_account;
use crate::api::TimelineApi;
use crate::deleter::RateLimitedDeleter;
use crate::error::{DeletionError, Result};
use crate::fetcher::fetch_all_tweets;
use crate::filter::{partition_by_cutoff, Partition};
use crate::rate_limiter::{Cooldown, RateLimitPolicy};
use crate::types::AccountIdentity;

#[derive(Debug, Clone)]
pub struct PurgeOptions {
    pub cutoff: DateTime<Utc>,
    /// Report what would be deleted without deleting anything
    pub dry_run: bool,
    pub policy: RateLimitPolicy,
}

impl PurgeOptions {
    pub fn new(cutoff: DateTime<Utc>) -> Self {
        Self {
            cutoff,
            dry_run: false,
            policy: RateLimitPolicy::default(),
        }
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct PurgeSummary {
    pub account: AccountIdentity,
    pub cutoff: DateTime<Utc>,
    pub dry_run: bool,
    pub fetched: usize,
    pub selected: usize,
    pub kept: usize,
    pub deleted: usize,
    pub errored: usize,
    pub cooldowns: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<DeletionError>,
    /// Ids that a dry run would have deleted
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub would_delete: Vec<String>,
}

pub struct Purger {
    api: Box<dyn TimelineApi>,
    cooldown: Box<dyn Cooldown>,
    options: PurgeOptions,
}

impl Purger {
    pub fn new(api: Box<dyn TimelineApi>, cooldown: Box<dyn Cooldown>, options: PurgeOptions) -> Self {
        Self {
            api,
            cooldown,
            options,
        }
    }

    pub fn options(&self) -> &PurgeOptions {
        &self.options
    }

    /// Run one purge.
    ///
    /// # Errors
    ///
    /// Identity, listing, and timestamp failures are returned as-is. Failed
    /// deletes are not errors; they are counted in the summary.
    pub async fn run(&self) -> Result<PurgeSummary> {
        let api = self.api.as_ref();
        let cutoff = self.options.cutoff;

        let account = resolve_account(api).await?;
        let tweets = fetch_all_tweets(api, &account).await?;
        let fetched = tweets.len();

        let Partition { delete, keep } = partition_by_cutoff(tweets, cutoff)?;
        info!(
            selected = delete.len(),
            kept = keep.len(),
            "Deleting tweets before: {}",
            cutoff.to_rfc3339()
        );

        let mut summary = PurgeSummary {
            account,
            cutoff,
            dry_run: self.options.dry_run,
            fetched,
            selected: delete.len(),
            kept: keep.len(),
            deleted: 0,
            errored: 0,
            cooldowns: 0,
            failures: Vec::new(),
            would_delete: Vec::new(),
        };

        if self.options.dry_run {
            for post in &delete {
                info!(created_at = %post.created_at, "[DRY RUN] Would delete tweetId={}", post.id);
            }
            summary.would_delete = delete.into_iter().map(|post| post.id).collect();
            return Ok(summary);
        }

        let report = RateLimitedDeleter::new(api, self.cooldown.as_ref(), self.options.policy)
            .delete_all(&delete)
            .await;

        info!(
            "Successfully deleted {} tweets, with {} errors",
            report.deleted, report.errored
        );

        summary.deleted = report.deleted;
        summary.errored = report.errored;
        summary.cooldowns = report.cooldowns;
        summary.failures = report.failures().cloned().collect();

        Ok(summary)
    }
}
