//! Core types for tweet-purge

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PurgeError, Result};

/// Wire format of `created_at`, e.g. `2015-07-01T00:00:00.000Z`
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Length of a `created_at` value with exactly three fraction digits
const CREATED_AT_LEN: usize = 24;

/// The authenticated account, resolved once per run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIdentity {
    pub id: String,
    pub username: String,
}

/// One tweet returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Post {
    /// Parse `created_at` into a UTC instant.
    ///
    /// A value that does not match [`CREATED_AT_FORMAT`] means the API broke
    /// its response contract, so this returns [`PurgeError::TimestampParse`].
    pub fn created_instant(&self) -> Result<DateTime<Utc>> {
        let parse_error = || PurgeError::TimestampParse {
            post_id: self.id.clone(),
            value: self.created_at.clone(),
        };

        // chrono treats `%.3f` as optional when parsing, so the
        // millisecond field is checked on the raw text first
        let raw = self.created_at.as_bytes();
        if raw.len() != CREATED_AT_LEN || raw[19] != b'.' {
            return Err(parse_error());
        }

        NaiveDateTime::parse_from_str(&self.created_at, CREATED_AT_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|_| parse_error())
    }
}

/// Opaque continuation token handed out by the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaginationCursor(String);

impl PaginationCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaginationCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `GET /2/users/me` body
#[derive(Debug, Deserialize)]
pub struct IdentityEnvelope {
    pub data: AccountIdentity,
}

/// One page of `GET /2/users/{id}/tweets`
///
/// The API leaves out `data` altogether when there is nothing to list.
#[derive(Debug, Deserialize)]
pub struct TweetPage {
    #[serde(default)]
    pub data: Vec<Post>,
    #[serde(default)]
    pub meta: PageMeta,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageMeta {
    pub next_token: Option<PaginationCursor>,
    pub result_count: Option<u32>,
}

/// A raw HTTP reply, interpreted by the component that asked for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: u16,
    pub body: String,
}

impl ApiReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}
