//! Error types for tweet-purge

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PurgeError>;

/// Errors that abort a purge run.
///
/// Per-post deletion failures are not part of this enum; they are
/// recoverable and travel as [`DeletionError`] inside deletion outcomes.
#[derive(Error, Debug)]
pub enum PurgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Error getting current user: {status} {body}")]
    AuthResolution { status: u16, body: String },

    #[error("Error fetching tweets (page {page}): {status} {body}")]
    FetchPage { page: u32, status: u16, body: String },

    #[error("Malformed created_at for tweetId={post_id}: {value:?}")]
    TimestampParse { post_id: String, value: String },

    #[error("Unexpected response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request signing failed: {0}")]
    Signing(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PurgeError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PurgeError::InvalidInput(_) => 3,
            PurgeError::AuthResolution { .. } => 2,
            PurgeError::Config(_)
            | PurgeError::FetchPage { .. }
            | PurgeError::TimestampParse { .. }
            | PurgeError::InvalidResponse { .. }
            | PurgeError::Http(_)
            | PurgeError::Signing(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// A single failed delete call. Counted and reported, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Could not delete tweetId={post_id}. Reason: {detail}")]
pub struct DeletionError {
    pub post_id: String,
    /// HTTP status, or `None` when the request never got a response
    pub status: Option<u16>,
    pub detail: String,
}
