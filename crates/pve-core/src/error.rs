//! Error types for Proxmox VE operations.
//!
//! Every failure surfaced by the client funnels into [`Error`]. Remote failures keep the HTTP
//! status code and whatever structured detail the API's `errors` envelope carried.

use std::collections::BTreeMap;
use thiserror::Error;

/// Field/category name to error detail, as found in the API's `{"errors": {...}}` envelope.
pub type ApiErrors = BTreeMap<String, serde_json::Value>;

/// Main error type for Proxmox VE operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The client configuration was rejected before any network I/O happened
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A call argument was rejected before any network I/O happened
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The password login handshake failed
    #[error("Authentication failed: status={status} body={body}")]
    AuthenticationFailed {
        /// HTTP status returned by the ticket endpoint
        status: u16,
        /// Response body, truncated for diagnostics
        body: String,
    },

    /// Network-level failure (DNS, connect, timeout, body read)
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The API answered with status >= 400
    #[error("Proxmox API error: status={status} errors={errors:?}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Parsed `errors` map; empty when the body could not be parsed
        errors: ApiErrors,
    },

    /// The response succeeded but its `data` payload did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The caller's cancellation token fired
    #[error("Request canceled")]
    Canceled,

    /// The caller's deadline elapsed
    #[error("Request deadline exceeded")]
    DeadlineExceeded,
}

/// Specialized result type for Proxmox VE operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::AuthenticationFailed { .. } => "AUTHENTICATION_FAILED",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Api { .. } => "API_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Canceled => "CANCELED",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
        }
    }

    /// HTTP status attached to this error, if the server produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::AuthenticationFailed { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true for transport failures caused by the request timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }

    /// Returns true when the remote API reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidConfiguration(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::InvalidConfiguration(err.to_string())
    }
}
