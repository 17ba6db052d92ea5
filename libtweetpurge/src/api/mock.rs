//! Mock Twitter API for testing
//!
//! Two listing modes are supported:
//!
//! - scripted: listing replies are served in the order they were queued,
//!   which makes it easy to simulate broken pages or odd cursors
//! - timeline: a live in-memory timeline that paginates over whatever has
//!   not been deleted yet, so repeated runs observe earlier deletions
//!
//! Every call is recorded for later inspection.

use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::api::TimelineApi;
use crate::error::{PurgeError, Result};
use crate::types::{ApiReply, PaginationCursor, Post};

/// A call observed by [`MockTimelineApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Me,
    UserTweets {
        user_id: String,
        cursor: Option<String>,
    },
    Delete {
        post_id: String,
    },
}

#[derive(Debug)]
enum Listing {
    Scripted(VecDeque<ApiReply>),
    Timeline { posts: Vec<Post>, page_size: usize },
}

#[derive(Debug)]
enum DeleteBehavior {
    Reply(ApiReply),
    TransportError(String),
}

#[derive(Debug)]
struct MockState {
    me: ApiReply,
    listing: Listing,
    deletes: HashMap<String, DeleteBehavior>,
    calls: Vec<MockCall>,
}

/// Scripted [`TimelineApi`]. Clones share state.
#[derive(Debug, Clone)]
pub struct MockTimelineApi {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockTimelineApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTimelineApi {
    /// Scripted mode, authenticated as `@mock` (id `1`), no pages queued
    pub fn new() -> Self {
        let me = ApiReply::ok(json!({"data": {"id": "1", "username": "mock"}}).to_string());
        Self {
            state: Arc::new(Mutex::new(MockState {
                me,
                listing: Listing::Scripted(VecDeque::new()),
                deletes: HashMap::new(),
                calls: Vec::new(),
            })),
        }
    }

    /// Timeline mode over `posts`, served `page_size` at a time
    pub fn with_timeline(posts: Vec<Post>, page_size: usize) -> Self {
        let api = Self::new();
        api.state.lock().unwrap().listing = Listing::Timeline {
            posts,
            page_size: page_size.max(1),
        };
        api
    }

    /// Answer `me()` with this identity
    pub fn with_identity(self, id: &str, username: &str) -> Self {
        self.with_me_reply(ApiReply::ok(
            json!({"data": {"id": id, "username": username}}).to_string(),
        ))
    }

    /// Answer `me()` with an arbitrary reply
    pub fn with_me_reply(self, reply: ApiReply) -> Self {
        self.state.lock().unwrap().me = reply;
        self
    }

    /// Queue a successful listing page of `(id, created_at)` pairs
    pub fn with_page(self, posts: &[(&str, &str)], next_token: Option<&str>) -> Self {
        let data: Vec<_> = posts
            .iter()
            .map(|(id, created_at)| json!({"id": id, "created_at": created_at, "text": format!("tweet {}", id)}))
            .collect();

        let mut meta = json!({"result_count": data.len()});
        if let Some(token) = next_token {
            meta["next_token"] = json!(token);
        }

        let body = if data.is_empty() {
            json!({"meta": meta})
        } else {
            json!({"data": data, "meta": meta})
        };
        self.with_page_reply(ApiReply::ok(body.to_string()))
    }

    /// Queue an arbitrary listing reply (scripted mode only)
    pub fn with_page_reply(self, reply: ApiReply) -> Self {
        if let Listing::Scripted(pages) = &mut self.state.lock().unwrap().listing {
            pages.push_back(reply);
        }
        self
    }

    /// Answer deletes of `post_id` with this reply instead of the default
    pub fn with_delete_reply(self, post_id: &str, reply: ApiReply) -> Self {
        self.state
            .lock()
            .unwrap()
            .deletes
            .insert(post_id.to_string(), DeleteBehavior::Reply(reply));
        self
    }

    /// Fail deletes of `post_id` before any reply is received
    pub fn with_delete_transport_error(self, post_id: &str, message: &str) -> Self {
        self.state.lock().unwrap().deletes.insert(
            post_id.to_string(),
            DeleteBehavior::TransportError(message.to_string()),
        );
        self
    }

    /// All calls in the order they were made
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn listing_call_count(&self) -> usize {
        self.count(|call| matches!(call, MockCall::UserTweets { .. }))
    }

    pub fn delete_call_count(&self) -> usize {
        self.count(|call| matches!(call, MockCall::Delete { .. }))
    }

    /// Post ids passed to `delete_tweet`, in order
    pub fn deleted_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Delete { post_id } => Some(post_id),
                _ => None,
            })
            .collect()
    }

    /// Posts still on the timeline (timeline mode only)
    pub fn remaining_posts(&self) -> Vec<Post> {
        match &self.state.lock().unwrap().listing {
            Listing::Timeline { posts, .. } => posts.clone(),
            Listing::Scripted(_) => Vec::new(),
        }
    }

    fn count(&self, predicate: impl Fn(&MockCall) -> bool) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }
}

fn timeline_page(posts: &[Post], page_size: usize, cursor: Option<&PaginationCursor>) -> ApiReply {
    let offset = match cursor.map(|c| c.as_str().parse::<usize>()) {
        None => 0,
        Some(Ok(offset)) => offset,
        Some(Err(_)) => {
            return ApiReply::new(400, r#"{"title":"Invalid Request","detail":"bad pagination_token"}"#)
        }
    };

    let end = (offset + page_size).min(posts.len());
    let page = posts.get(offset..end).unwrap_or_default();

    let mut meta = json!({"result_count": page.len()});
    if end < posts.len() {
        meta["next_token"] = json!(end.to_string());
    }

    let body = if page.is_empty() {
        json!({"meta": meta})
    } else {
        json!({"data": page, "meta": meta})
    };
    ApiReply::ok(body.to_string())
}

#[async_trait]
impl TimelineApi for MockTimelineApi {
    async fn me(&self) -> Result<ApiReply> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall::Me);
        Ok(state.me.clone())
    }

    async fn user_tweets(
        &self,
        user_id: &str,
        cursor: Option<&PaginationCursor>,
    ) -> Result<ApiReply> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall::UserTweets {
            user_id: user_id.to_string(),
            cursor: cursor.map(|c| c.to_string()),
        });

        let reply = match &mut state.listing {
            Listing::Scripted(pages) => pages.pop_front().unwrap_or_else(|| {
                ApiReply::new(500, r#"{"title":"mock: no more scripted pages"}"#)
            }),
            Listing::Timeline { posts, page_size } => timeline_page(posts, *page_size, cursor),
        };
        Ok(reply)
    }

    async fn delete_tweet(&self, post_id: &str) -> Result<ApiReply> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall::Delete {
            post_id: post_id.to_string(),
        });

        match state.deletes.get(post_id) {
            Some(DeleteBehavior::Reply(reply)) => return Ok(reply.clone()),
            Some(DeleteBehavior::TransportError(message)) => {
                return Err(PurgeError::InvalidResponse {
                    endpoint: format!("DELETE /2/tweets/{}", post_id),
                    message: message.clone(),
                })
            }
            None => {}
        }

        match &mut state.listing {
            Listing::Timeline { posts, .. } => {
                let before = posts.len();
                posts.retain(|post| post.id != post_id);
                if posts.len() < before {
                    Ok(ApiReply::ok(r#"{"data":{"deleted":true}}"#))
                } else {
                    Ok(ApiReply::new(404, r#"{"title":"Not Found Error"}"#))
                }
            }
            Listing::Scripted(_) => Ok(ApiReply::ok(r#"{"data":{"deleted":true}}"#)),
        }
    }
}
