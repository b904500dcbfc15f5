//! Connection settings for the production transport.
//!
//! Settings come from the same environment variables the Xen Orchestra
//! tooling already uses:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `XOA_URL` | Base URL of the Xen Orchestra server | required |
//! | `XOA_USER` | Account used by `session.signInWithPassword` | none |
//! | `XOA_PASSWORD` | Password for `XOA_USER` | none |
//! | `XOA_TIMEOUT_SECS` | Whole-request timeout | `30` |

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Path of the JSON-RPC endpoint, relative to the base URL.
pub const API_PATH: &str = "api";

/// Configuration problems detected before any request is sent.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is absent.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// The base URL could not be parsed or uses an unsupported scheme.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl {
        /// The offending input.
        url: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A numeric setting did not parse.
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue {
        /// Setting name.
        name: &'static str,
        /// The offending input.
        value: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Settings for [`crate::HttpCaller`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL of the server (`http`/`https`; `ws`/`wss` are mapped to them).
    pub url: Url,
    /// Sign-in account, if any.
    pub username: Option<String>,
    /// Sign-in password, if any.
    pub password: Option<String>,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl HttpConfig {
    /// Builds a config for `url` with no credentials and the default timeout.
    pub fn new(url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            url: parse_base_url(url)?,
            username: None,
            password: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Sets sign-in credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads `XOA_URL`, `XOA_USER`, `XOA_PASSWORD` and `XOA_TIMEOUT_SECS`
    /// from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`HttpConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("XOA_URL").ok_or(ConfigError::Missing("XOA_URL"))?;
        let mut config = Self::new(&url)?;
        config.username = lookup("XOA_USER");
        config.password = lookup("XOA_PASSWORD");

        if let Some(raw) = lookup("XOA_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: "XOA_TIMEOUT_SECS",
                value: raw.clone(),
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Full URL of the JSON-RPC endpoint.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        self.url.join(API_PATH).map_err(|e| ConfigError::InvalidUrl {
            url: self.url.to_string(),
            reason: e.to_string(),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "http",
        "https" | "wss" => "https",
        other => return Err(invalid(format!("unsupported scheme `{other}`"))),
    };
    if url.scheme() != scheme && url.set_scheme(scheme).is_err() {
        return Err(invalid(format!("cannot switch scheme to `{scheme}`")));
    }

    // `join` replaces the last path segment unless the path ends in '/'.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
