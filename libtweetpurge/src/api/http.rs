//! reqwest-backed [`TimelineApi`]

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method};
use secrecy::{ExposeSecret, SecretString};

use crate::api::{TimelineApi, PAGE_SIZE};
use crate::auth::{BearerSigner, OAuth1Signer, RequestSigner};
use crate::config::{ApiConfig, Config};
use crate::error::Result;
use crate::types::{ApiReply, PaginationCursor};

pub struct HttpTimelineApi {
    client: Client,
    base_url: String,
    /// Signs identity and delete calls
    user_signer: Box<dyn RequestSigner>,
    /// Signs timeline listing calls
    app_signer: Box<dyn RequestSigner>,
}

impl HttpTimelineApi {
    /// Create a client with explicit signers
    pub fn new(
        api: &ApiConfig,
        user_signer: Box<dyn RequestSigner>,
        app_signer: Box<dyn RequestSigner>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(api.timeout())
            .user_agent(format!("tweet-purge/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            user_signer,
            app_signer,
        })
    }

    /// OAuth 1.0a for user context, bearer for the listing
    pub fn from_config(config: &Config) -> Result<Self> {
        let credentials = &config.credentials;
        let bearer = SecretString::from(credentials.bearer_token.expose_secret().to_string());

        Self::new(
            &config.api,
            Box::new(OAuth1Signer::from_credentials(credentials)),
            Box::new(BearerSigner::new(bearer)),
        )
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        signer: &dyn RequestSigner,
    ) -> Result<ApiReply> {
        let url = format!("{}{}", self.base_url, path);
        let authorization = signer.authorization(method.as_str(), &url, query)?;

        tracing::debug!(method = %method, path, "Calling Twitter API");

        let mut request = self
            .client
            .request(method, &url)
            .header(AUTHORIZATION, authorization);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(status, path, "Twitter API replied");

        Ok(ApiReply { status, body })
    }
}

#[async_trait]
impl TimelineApi for HttpTimelineApi {
    async fn me(&self) -> Result<ApiReply> {
        self.send(
            Method::GET,
            "/2/users/me",
            &[("user.fields", "id,username")],
            self.user_signer.as_ref(),
        )
        .await
    }

    async fn user_tweets(
        &self,
        user_id: &str,
        cursor: Option<&PaginationCursor>,
    ) -> Result<ApiReply> {
        let path = format!("/2/users/{}/tweets", user_id);
        let page_size = PAGE_SIZE.to_string();

        let mut query = vec![
            ("max_results", page_size.as_str()),
            ("tweet.fields", "created_at"),
        ];
        if let Some(cursor) = cursor {
            query.push(("pagination_token", cursor.as_str()));
        }

        self.send(Method::GET, &path, &query, self.app_signer.as_ref())
            .await
    }

    async fn delete_tweet(&self, post_id: &str) -> Result<ApiReply> {
        let path = format!("/2/tweets/{}", post_id);
        self.send(Method::DELETE, &path, &[], self.user_signer.as_ref())
            .await
    }
}
