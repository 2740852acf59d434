//! Configuration structures for Proxmox VE clients.
//!
//! This module provides the connection and authentication settings a client is built from,
//! including validation of the endpoint URL and the TLS trust decision.

use crate::client::{DEFAULT_LOGIN_EXPIRY_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// How the client authenticates against the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// `user@realm` + password, exchanged for a session ticket.
    #[default]
    Password,
    /// `user@realm!tokenid` + token secret, sent on every request.
    Token,
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password => f.write_str("password"),
            Self::Token => f.write_str("token"),
        }
    }
}

/// Configuration for a Proxmox VE client instance.
///
/// The secret is never serialized and is redacted from `Debug` output.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PveClientConfig {
    /// API base URL (e.g., "https://pve.example.com:8006")
    #[validate(url)]
    pub base_url: String,

    /// Authentication mode
    #[serde(default)]
    pub auth_method: AuthMethod,

    /// `user@realm` for password auth, `user@realm!tokenid` for token auth
    #[validate(length(min = 1))]
    pub principal: String,

    /// Password or token secret
    #[serde(skip_serializing)]
    pub secret: SecretString,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Optional path to a PEM CA certificate to trust
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<PathBuf>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long a login ticket is trusted before re-authenticating, in seconds
    #[validate(range(min = 1, max = 7200))]
    #[serde(default = "default_login_expiry_secs")]
    pub login_expiry_secs: u64,
}

const fn default_tls_verify() -> bool {
    true
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_login_expiry_secs() -> u64 {
    DEFAULT_LOGIN_EXPIRY_SECS
}

impl PveClientConfig {
    /// Create a new client configuration.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The API endpoint (e.g., "https://pve.example.com:8006")
    /// * `principal` - `user@realm` or `user@realm!tokenid`
    /// * `secret` - Password or token secret
    /// * `auth_method` - Which of the two the principal/secret pair is
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the URL is empty or invalid, or the
    /// principal is empty.
    pub fn new(
        base_url: impl Into<String>,
        principal: impl Into<String>,
        secret: impl Into<String>,
        auth_method: AuthMethod,
    ) -> Result<Self, Error> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(Error::InvalidConfiguration("base URL required".to_string()));
        }

        let config = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_method,
            principal: principal.into(),
            secret: SecretString::from(secret.into()),
            tls_verify: default_tls_verify(),
            tls_ca_cert: None,
            request_timeout_secs: default_request_timeout_secs(),
            login_expiry_secs: default_login_expiry_secs(),
        };

        config.validate()?;
        config.parse_base_url()?;

        Ok(config)
    }

    /// Configuration for username/password (ticket) authentication.
    ///
    /// # Errors
    ///
    /// See [`PveClientConfig::new`].
    pub fn password(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, Error> {
        Self::new(base_url, username, password, AuthMethod::Password)
    }

    /// Configuration for API token authentication.
    ///
    /// # Errors
    ///
    /// See [`PveClientConfig::new`].
    pub fn token(
        base_url: impl Into<String>,
        token_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, Error> {
        Self::new(base_url, token_id, secret, AuthMethod::Token)
    }

    /// Set whether to verify TLS certificates.
    ///
    /// Disabling verification trusts any certificate the server presents.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set custom CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set the login ticket lifetime in seconds.
    #[must_use]
    pub const fn with_login_expiry(mut self, seconds: u64) -> Self {
        self.login_expiry_secs = seconds;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the login expiry as a Duration.
    #[must_use]
    pub const fn login_expiry(&self) -> Duration {
        Duration::from_secs(self.login_expiry_secs)
    }

    /// Borrow the secret for building auth material.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        self.secret.expose_secret()
    }

    /// Parse and validate the base URL.
    ///
    /// Only `http` and `https` are accepted; a trailing slash is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the URL cannot be parsed or cannot carry
    /// API paths.
    pub fn parse_base_url(&self) -> Result<Url, Error> {
        let url = Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|e| Error::InvalidConfiguration(format!("Invalid base URL: {}", e)))?;

        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(Error::InvalidConfiguration(format!(
                "Invalid base URL: unsupported scheme `{}`",
                url.scheme()
            )));
        }

        Ok(url)
    }
}
