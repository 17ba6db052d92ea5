//! Twitter API v2 access
//!
//! [`TimelineApi`] is the seam between the purge pipeline and the network.
//! Implementations hand back the raw status and body of each call; deciding
//! what a non-200 means (fatal or per-item) is left to the caller.
//!
//! # Examples
//!
//! ```no_run
//! use libtweetpurge::api::{http::HttpTimelineApi, TimelineApi};
//! use libtweetpurge::Config;
//!
//! # async fn example() -> libtweetpurge::Result<()> {
//! let config = Config::load()?;
//! let api = HttpTimelineApi::from_config(&config)?;
//!
//! let reply = api.me().await?;
//! println!("{} {}", reply.status, reply.body);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ApiReply, PaginationCursor};

pub mod http;

// Available for all builds (not just tests) so integration tests can use it
pub mod mock;

/// Number of tweets requested per listing page
pub const PAGE_SIZE: u32 = 100;

/// The three endpoints a purge needs
#[async_trait]
pub trait TimelineApi: Send + Sync {
    /// `GET /2/users/me?user.fields=id,username` (user context)
    async fn me(&self) -> Result<ApiReply>;

    /// `GET /2/users/{user_id}/tweets` for one page (app-only)
    ///
    /// # Arguments
    ///
    /// * `user_id` - Account whose timeline is listed
    /// * `cursor` - `next_token` from the previous page, `None` for the first page
    async fn user_tweets(
        &self,
        user_id: &str,
        cursor: Option<&PaginationCursor>,
    ) -> Result<ApiReply>;

    /// `DELETE /2/tweets/{post_id}` (user context)
    async fn delete_tweet(&self, post_id: &str) -> Result<ApiReply>;
}
