//! Request signing
//!
//! Two schemes are needed against the v2 API: OAuth 1.0a user context for
//! the identity lookup and deletions, and an app-only bearer token for the
//! timeline listing. Both sit behind [`RequestSigner`], which turns a
//! request description into an `Authorization` header value.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;

use crate::config::Credentials;
use crate::error::{PurgeError, Result};

/// RFC 3986 unreserved characters (`ALPHA / DIGIT / - . _ ~`) pass through,
/// everything else is encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Produces the `Authorization` header for one request
pub trait RequestSigner: Send + Sync {
    /// # Arguments
    ///
    /// * `method` - HTTP method, e.g. `GET`
    /// * `url` - Absolute URL without the query string
    /// * `query` - Query parameters that will be sent with the request
    fn authorization(&self, method: &str, url: &str, query: &[(&str, &str)]) -> Result<String>;
}

/// App-only bearer token authentication
pub struct BearerSigner {
    token: SecretString,
}

impl BearerSigner {
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }
}

impl RequestSigner for BearerSigner {
    fn authorization(&self, _method: &str, _url: &str, _query: &[(&str, &str)]) -> Result<String> {
        Ok(format!("Bearer {}", self.token.expose_secret()))
    }
}

/// OAuth 1.0a HMAC-SHA1 signer
pub struct OAuth1Signer {
    consumer_key: SecretString,
    consumer_secret: SecretString,
    access_token: SecretString,
    access_secret: SecretString,
}

impl OAuth1Signer {
    pub fn new(
        consumer_key: SecretString,
        consumer_secret: SecretString,
        access_token: SecretString,
        access_secret: SecretString,
    ) -> Self {
        Self {
            consumer_key,
            consumer_secret,
            access_token,
            access_secret,
        }
    }

    /// Build a signer from the user-context half of the credentials
    pub fn from_credentials(credentials: &Credentials) -> Self {
        let copy = |secret: &SecretString| SecretString::from(secret.expose_secret().to_string());
        Self::new(
            copy(&credentials.consumer_key),
            copy(&credentials.consumer_secret),
            copy(&credentials.access_token),
            copy(&credentials.access_secret),
        )
    }

    /// Sign with an explicit nonce and timestamp
    pub fn sign_with(
        &self,
        method: &str,
        url: &str,
        query: &[(&str, &str)],
        nonce: &str,
        timestamp: i64,
    ) -> Result<String> {
        let timestamp = timestamp.to_string();
        let mut oauth_params: Vec<(&str, &str)> = vec![
            ("oauth_consumer_key", self.consumer_key.expose_secret()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.access_token.expose_secret()),
            ("oauth_version", "1.0"),
        ];

        // Sorting happens on the encoded pairs (RFC 5849 section 3.4.1.3.2)
        let mut encoded: Vec<(String, String)> = oauth_params
            .iter()
            .chain(query.iter())
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .collect();
        encoded.sort();

        let param_string = encoded
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.to_uppercase(),
            percent_encode(url),
            percent_encode(&param_string)
        );

        let signing_key = format!(
            "{}&{}",
            percent_encode(self.consumer_secret.expose_secret()),
            percent_encode(self.access_secret.expose_secret())
        );

        let signature = hmac_sha1(&signing_key, &base_string)?;
        oauth_params.push(("oauth_signature", signature.as_str()));
        oauth_params.sort();

        let header = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {}", header))
    }
}

impl RequestSigner for OAuth1Signer {
    fn authorization(&self, method: &str, url: &str, query: &[(&str, &str)]) -> Result<String> {
        let timestamp = chrono::Utc::now().timestamp();
        self.sign_with(method, url, query, &generate_nonce(), timestamp)
    }
}

fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

/// 16 random bytes, hex encoded
fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn hmac_sha1(key: &str, data: &str) -> Result<String> {
    type HmacSha1 = Hmac<Sha1>;

    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| PurgeError::Signing(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}
