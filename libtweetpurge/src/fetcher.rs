//! Enumerate every tweet on the account's timeline
//!
//! Follows `meta.next_token` until a page comes back without one. The whole
//! timeline is materialized before anything is filtered or deleted.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::api::TimelineApi;
use crate::error::{PurgeError, Result};
use crate::types::{AccountIdentity, PaginationCursor, Post, TweetPage};

/// Fetch all tweets for `account`, oldest-page-last as the API returns them.
///
/// # Errors
///
/// Any page that does not come back 200 fails the whole fetch with
/// [`PurgeError::FetchPage`], carrying the 1-based page number. A partial
/// listing is never returned.
pub async fn fetch_all_tweets(api: &dyn TimelineApi, account: &AccountIdentity) -> Result<Vec<Post>> {
    let mut tweets = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor: Option<PaginationCursor> = None;
    let mut page: u32 = 1;

    info!(user_id = %account.id, "Fetching tweets...");

    loop {
        let reply = api.user_tweets(&account.id, cursor.as_ref()).await?;

        if !reply.is_success() {
            return Err(PurgeError::FetchPage {
                page,
                status: reply.status,
                body: reply.body,
            });
        }

        let result: TweetPage =
            serde_json::from_str(&reply.body).map_err(|e| PurgeError::InvalidResponse {
                endpoint: format!("GET /2/users/{}/tweets (page {})", account.id, page),
                message: e.to_string(),
            })?;

        let received = result.data.len();
        for tweet in result.data {
            if seen.insert(tweet.id.clone()) {
                tweets.push(tweet);
            } else {
                warn!(tweet_id = %tweet.id, page, "Skipping tweet already listed on an earlier page");
            }
        }

        info!(page, received, total = tweets.len(), "Fetched page {}", page);

        match result.meta.next_token {
            Some(next) => {
                cursor = Some(next);
                page += 1;
            }
            None => break,
        }
    }

    info!("Fetched {} total tweets", tweets.len());

    Ok(tweets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockCall, MockTimelineApi};
    use crate::types::ApiReply;

    fn account() -> AccountIdentity {
        AccountIdentity {
            id: "42".to_string(),
            username: "someone".to_string(),
        }
    }

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_empty_timeline_single_request() {
        let api = MockTimelineApi::new().with_page(&[], None);

        let tweets = fetch_all_tweets(&api, &account()).await.unwrap();
        assert!(tweets.is_empty());
        assert_eq!(api.listing_call_count(), 1);
    }

    #[tokio::test]
    async fn test_concatenates_pages_in_order() {
        let api = MockTimelineApi::new()
            .with_page(
                &[("5", "2016-01-01T00:00:00.000Z"), ("4", "2015-12-01T00:00:00.000Z")],
                Some("t1"),
            )
            .with_page(&[("3", "2015-06-01T00:00:00.000Z")], Some("t2"))
            .with_page(
                &[("2", "2015-02-01T00:00:00.000Z"), ("1", "2015-01-01T00:00:00.000Z")],
                None,
            );

        let tweets = fetch_all_tweets(&api, &account()).await.unwrap();
        assert_eq!(ids(&tweets), vec!["5", "4", "3", "2", "1"]);
        assert_eq!(api.listing_call_count(), 3);
    }

    #[tokio::test]
    async fn test_passes_each_cursor_once() {
        let api = MockTimelineApi::new()
            .with_page(&[("1", "2015-01-01T00:00:00.000Z")], Some("abc"))
            .with_page(&[("2", "2015-01-02T00:00:00.000Z")], Some("def"))
            .with_page(&[("3", "2015-01-03T00:00:00.000Z")], None);

        fetch_all_tweets(&api, &account()).await.unwrap();

        let cursors: Vec<Option<String>> = api
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::UserTweets { user_id, cursor } => {
                    assert_eq!(user_id, "42");
                    Some(cursor)
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            cursors,
            vec![None, Some("abc".to_string()), Some("def".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failed_page_is_fatal_with_page_number() {
        let api = MockTimelineApi::new()
            .with_page(&[("1", "2015-01-01T00:00:00.000Z")], Some("abc"))
            .with_page_reply(ApiReply::new(429, r#"{"title":"Too Many Requests"}"#));

        match fetch_all_tweets(&api, &account()).await {
            Err(PurgeError::FetchPage { page, status, body }) => {
                assert_eq!(page, 2);
                assert_eq!(status, 429);
                assert!(body.contains("Too Many Requests"));
            }
            other => panic!("Expected FetchPage, got {:?}", other),
        }
        assert_eq!(api.listing_call_count(), 2);
    }

    #[tokio::test]
    async fn test_first_page_failure_reports_page_one() {
        let api = MockTimelineApi::new().with_page_reply(ApiReply::new(401, "Unauthorized"));

        let err = fetch_all_tweets(&api, &account()).await.unwrap_err();
        assert!(matches!(err, PurgeError::FetchPage { page: 1, status: 401, .. }));
    }

    #[tokio::test]
    async fn test_duplicate_ids_across_pages_are_dropped() {
        let api = MockTimelineApi::new()
            .with_page(
                &[("2", "2015-01-02T00:00:00.000Z"), ("1", "2015-01-01T00:00:00.000Z")],
                Some("abc"),
            )
            .with_page(&[("1", "2015-01-01T00:00:00.000Z")], None);

        let tweets = fetch_all_tweets(&api, &account()).await.unwrap();
        assert_eq!(ids(&tweets), vec!["2", "1"]);
    }

    #[tokio::test]
    async fn test_garbage_page_body_is_fatal() {
        let api = MockTimelineApi::new().with_page_reply(ApiReply::ok("<html>oops</html>"));

        let err = fetch_all_tweets(&api, &account()).await.unwrap_err();
        assert!(matches!(err, PurgeError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_timeline_mode_enumerates_everything() {
        let posts: Vec<Post> = (0..250)
            .map(|i| Post {
                id: i.to_string(),
                created_at: "2015-01-01T00:00:00.000Z".to_string(),
                text: None,
            })
            .collect();
        let api = MockTimelineApi::with_timeline(posts.clone(), 100);

        let tweets = fetch_all_tweets(&api, &account()).await.unwrap();
        assert_eq!(tweets, posts);
        assert_eq!(api.listing_call_count(), 3);
    }
}
