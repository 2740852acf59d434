//! Authentication material and the ticket login exchange.

use pve_core::client::{AUTH_COOKIE_NAME, LOGIN_ERROR_BODY_LIMIT, TOKEN_AUTH_SCHEME};
use pve_core::{AuthMethod, Error, PveClientConfig, Result};
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Credentials a client authenticates with.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Exchanged for a session ticket at `/access/ticket`.
    Password {
        /// `user@realm`
        username: String,
        /// Account password
        password: SecretString,
    },
    /// Sent verbatim on every request.
    Token {
        /// `user@realm!tokenid`
        token_id: String,
        /// Token secret (UUID)
        secret: SecretString,
    },
}

impl Credentials {
    /// Build credentials from a client configuration.
    #[must_use]
    pub fn from_config(config: &PveClientConfig) -> Self {
        let principal = config.principal.clone();
        let secret = config.secret.clone();
        match config.auth_method {
            AuthMethod::Password => Self::Password {
                username: principal,
                password: secret,
            },
            AuthMethod::Token => Self::Token {
                token_id: principal,
                secret,
            },
        }
    }

    /// Which authentication mode these credentials use.
    #[must_use]
    pub const fn method(&self) -> AuthMethod {
        match self {
            Self::Password { .. } => AuthMethod::Password,
            Self::Token { .. } => AuthMethod::Token,
        }
    }

    /// `user@realm` or `user@realm!tokenid`.
    #[must_use]
    pub fn principal(&self) -> &str {
        match self {
            Self::Password { username, .. } => username,
            Self::Token { token_id, .. } => token_id,
        }
    }
}

/// `Authorization: PVEAPIToken=<token_id>=<secret>`, marked sensitive.
pub(crate) fn token_header(token_id: &str, secret: &SecretString) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!(
        "{TOKEN_AUTH_SCHEME}={token_id}={}",
        secret.expose_secret()
    ))
    .map_err(|_| {
        Error::InvalidConfiguration("API token contains characters not allowed in a header".into())
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// `Cookie: PVEAuthCookie=<value>`, marked sensitive.
pub(crate) fn cookie_header(value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(&format!("{AUTH_COOKIE_NAME}={value}"))
        .map_err(|_| Error::AuthenticationFailed {
            status: 200,
            body: "session ticket is not a valid cookie value".into(),
        })?;
    header.set_sensitive(true);
    Ok(header)
}

/// Material returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Ticket {
    pub ticket: String,
    pub csrf_token: String,
    pub cookie: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TicketEnvelope {
    data: TicketData,
}

#[derive(Debug, Deserialize)]
struct TicketData {
    ticket: String,
    #[serde(rename = "CSRFPreventionToken", default)]
    csrf_prevention_token: String,
}

/// Decode the ticket endpoint's response body.
///
/// A ticket, CSRF token or cookie that cannot be sent back as a header value is rejected.
pub(crate) fn parse_ticket(body: &[u8], cookie: Option<String>) -> Result<Ticket> {
    let envelope: TicketEnvelope =
        serde_json::from_slice(body).map_err(|_| authentication_failed(200, body))?;

    if envelope.data.ticket.is_empty() {
        return Err(authentication_failed(200, body));
    }

    // Both values are replayed as headers on every request.
    let unusable = |value: &str| HeaderValue::from_str(value).is_err();
    if unusable(&envelope.data.ticket)
        || unusable(&envelope.data.csrf_prevention_token)
        || cookie.as_deref().is_some_and(unusable)
    {
        return Err(authentication_failed(200, body));
    }

    Ok(Ticket {
        ticket: envelope.data.ticket,
        csrf_token: envelope.data.csrf_prevention_token,
        cookie,
    })
}

/// [`Error::AuthenticationFailed`] carrying at most [`LOGIN_ERROR_BODY_LIMIT`] bytes of body.
pub(crate) fn authentication_failed(status: u16, body: &[u8]) -> Error {
    let mut end = body.len().min(LOGIN_ERROR_BODY_LIMIT);
    let text = loop {
        match std::str::from_utf8(&body[..end]) {
            Ok(text) => break text.to_string(),
            Err(err) if err.error_len().is_none() => end = err.valid_up_to(),
            Err(_) => break String::from_utf8_lossy(&body[..end]).into_owned(),
        }
    };

    Error::AuthenticationFailed { status, body: text }
}
