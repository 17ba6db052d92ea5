//! tweet-purge - delete old tweets in bulk
//!
//! This library resolves the authenticated account, enumerates its whole
//! timeline through the v2 API, selects tweets created before a cutoff, and
//! deletes them while staying under the delete rate limit.

pub mod account;
pub mod api;
pub mod auth;
pub mod config;
pub mod deleter;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod logging;
pub mod purge;
pub mod rate_limiter;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{DeletionError, PurgeError, Result};
pub use purge::{PurgeOptions, PurgeSummary, Purger};
pub use types::{AccountIdentity, Post};
