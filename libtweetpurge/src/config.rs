//! Configuration management for tweet-purge
//!
//! Secrets come from the environment only. Everything else (API endpoint,
//! timeout, cutoff) can be set in an optional TOML file:
//!
//! ```toml
//! [api]
//! base_url = "https://api.twitter.com"
//! timeout_secs = 30
//!
//! [purge]
//! cutoff = "2015-07-01T00:00:00Z"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub const BEARER_TOKEN_VAR: &str = "BEARER_TOKEN";
pub const CONSUMER_KEY_VAR: &str = "CONSUMER_KEY";
pub const CONSUMER_SECRET_VAR: &str = "CONSUMER_SECRET";
pub const ACCESS_TOKEN_VAR: &str = "ACCESS_TOKEN";
pub const ACCESS_SECRET_VAR: &str = "ACCESS_SECRET";

/// Overrides the config file location
pub const CONFIG_PATH_VAR: &str = "TWEETPURGE_CONFIG";

/// 2015-07-01T00:00:00Z
const DEFAULT_CUTOFF_UNIX: i64 = 1_435_708_800;

#[derive(Debug)]
pub struct Config {
    pub credentials: Credentials,
    pub api: ApiConfig,
    pub purge: PurgeConfig,
}

/// API credentials. Two schemes are in play: OAuth 1.0a user context for
/// identity and deletion, app-only bearer for the timeline listing.
#[derive(Debug)]
pub struct Credentials {
    pub bearer_token: SecretString,
    pub consumer_key: SecretString,
    pub consumer_secret: SecretString,
    pub access_token: SecretString,
    pub access_secret: SecretString,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeConfig {
    /// Tweets created strictly before this instant are deleted
    #[serde(default = "default_cutoff")]
    pub cutoff: DateTime<Utc>,
}

/// The non-secret part of the configuration, as stored on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub purge: PurgeConfig,
}

fn default_base_url() -> String {
    "https://api.twitter.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_cutoff() -> DateTime<Utc> {
    DateTime::from_timestamp(DEFAULT_CUTOFF_UNIX, 0).unwrap_or_default()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            cutoff: default_cutoff(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Credentials {
    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| -> Result<SecretString> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => Ok(SecretString::from(value)),
                _ => Err(ConfigError::MissingVar(name.to_string()).into()),
            }
        };

        Ok(Self {
            bearer_token: require(BEARER_TOKEN_VAR)?,
            consumer_key: require(CONSUMER_KEY_VAR)?,
            consumer_secret: require(CONSUMER_SECRET_VAR)?,
            access_token: require(ACCESS_TOKEN_VAR)?,
            access_secret: require(ACCESS_SECRET_VAR)?,
        })
    }
}

impl Settings {
    /// Load settings from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let settings: Settings = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `$TWEETPURGE_CONFIG` or the default location,
    /// falling back to built-in defaults when no file exists
    pub fn load() -> Result<Self> {
        match resolve_config_path()? {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                message: format!("expected an http(s) URL, got {:?}", self.api.base_url),
            }
            .into());
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl Config {
    /// Build the run configuration from on-disk settings and the environment
    pub fn load() -> Result<Self> {
        Ok(Self::from_parts(Settings::load()?, Credentials::from_env()?))
    }

    /// Like [`Config::load`], but reads settings from `path`
    pub fn load_from_path(path: &Path) -> Result<Self> {
        Ok(Self::from_parts(
            Settings::load_from_path(path)?,
            Credentials::from_env()?,
        ))
    }

    pub fn from_parts(settings: Settings, credentials: Credentials) -> Self {
        Self {
            credentials,
            api: settings.api,
            purge: settings.purge,
        }
    }
}

/// Resolve the configuration file path using the XDG config directory
///
/// An explicit `$TWEETPURGE_CONFIG` is always returned (and must exist);
/// the default location is only returned if the file is there.
pub fn resolve_config_path() -> Result<Option<PathBuf>> {
    if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
        return Ok(Some(PathBuf::from(shellexpand::tilde(&path).to_string())));
    }

    Ok(dirs::config_dir()
        .map(|dir| dir.join("tweet-purge").join("config.toml"))
        .filter(|path| path.exists()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PurgeError;
    use chrono::TimeZone;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn full_env() -> HashMap<&'static str, String> {
        [
            (BEARER_TOKEN_VAR, "bearer"),
            (CONSUMER_KEY_VAR, "ck"),
            (CONSUMER_SECRET_VAR, "cs"),
            (ACCESS_TOKEN_VAR, "at"),
            (ACCESS_SECRET_VAR, "as"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.api.base_url, "https://api.twitter.com");
        assert_eq!(settings.api.timeout(), Duration::from_secs(30));
        assert_eq!(
            settings.purge.cutoff,
            Utc.with_ymd_and_hms(2015, 7, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_credentials_from_lookup() {
        let env = full_env();
        let creds = Credentials::from_lookup(|name| env.get(name).cloned()).unwrap();
        assert_eq!(creds.bearer_token.expose_secret(), "bearer");
        assert_eq!(creds.consumer_key.expose_secret(), "ck");
        assert_eq!(creds.access_secret.expose_secret(), "as");
    }

    #[test]
    fn test_credentials_missing_var() {
        let mut env = full_env();
        env.remove(CONSUMER_SECRET_VAR);

        let err = Credentials::from_lookup(|name| env.get(name).cloned()).unwrap_err();
        match err {
            PurgeError::Config(ConfigError::MissingVar(name)) => {
                assert_eq!(name, CONSUMER_SECRET_VAR)
            }
            other => panic!("Expected MissingVar, got {:?}", other),
        }
    }

    #[test]
    fn test_credentials_blank_var_counts_as_missing() {
        let mut env = full_env();
        env.insert(BEARER_TOKEN_VAR, "   ".to_string());

        let err = Credentials::from_lookup(|name| env.get(name).cloned()).unwrap_err();
        assert!(err.to_string().contains(BEARER_TOKEN_VAR));
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let env = full_env();
        let creds = Credentials::from_lookup(|name| env.get(name).cloned()).unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("bearer\""));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_load_settings_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[api]
base_url = "http://127.0.0.1:8080"
timeout_secs = 5

[purge]
cutoff = "2020-01-01T00:00:00Z"
"#,
        )
        .unwrap();

        let settings = Settings::load_from_path(&path).unwrap();
        assert_eq!(settings.api.base_url, "http://127.0.0.1:8080");
        assert_eq!(settings.api.timeout_secs, 5);
        assert_eq!(
            settings.purge.cutoff,
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[purge]\ncutoff = \"2018-03-04T05:06:07Z\"\n").unwrap();

        let settings = Settings::load_from_path(&path).unwrap();
        assert_eq!(settings.api.base_url, "https://api.twitter.com");
        assert_eq!(settings.api.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nbase_url = \"api.twitter.com\"\n").unwrap();

        let err = Settings::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("api.base_url"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[api]\ntimeout_secs = 0\n").unwrap();

        let err = Settings::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("api.timeout_secs"));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = Settings::load_from_path(&temp_dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, PurgeError::Config(ConfigError::ReadError(_))));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[api\nbase_url = ").unwrap();

        let err = Settings::load_from_path(&path).unwrap_err();
        assert!(matches!(err, PurgeError::Config(ConfigError::ParseError(_))));
    }
}
