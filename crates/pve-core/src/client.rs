//! HTTP client utilities.
//!
//! This module holds the transport defaults and wire constants shared by Proxmox VE
//! clients, and builds the underlying [`reqwest::Client`] from a [`PveClientConfig`].

use crate::config::PveClientConfig;
use crate::{Error, Result};
use reqwest::{Certificate, Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, warn};

/// Default per-request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default connect timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default lifetime trusted for a login ticket (seconds)
pub const DEFAULT_LOGIN_EXPIRY_SECS: u64 = 3600;

/// Maximum number of body bytes kept in authentication error messages
pub const LOGIN_ERROR_BODY_LIMIT: usize = 512;

/// Name of the session cookie issued by the ticket endpoint
pub const AUTH_COOKIE_NAME: &str = "PVEAuthCookie";

/// Header carrying the anti-forgery token on state-changing requests
pub const CSRF_HEADER: &str = "CSRFPreventionToken";

/// Scheme used in the `Authorization` header for API tokens
pub const TOKEN_AUTH_SCHEME: &str = "PVEAPIToken";

/// Build the HTTP transport for a client.
///
/// Cookies are never stored by the transport; the session cookie is attached explicitly
/// from the client's credential state.
///
/// # Errors
///
/// Returns [`Error::InvalidConfiguration`] if the CA certificate cannot be read or parsed,
/// or the transport cannot be constructed.
pub fn build_http_client(config: &PveClientConfig, user_agent: &str) -> Result<Client> {
    let mut builder = ClientBuilder::new()
        .user_agent(user_agent)
        .timeout(config.timeout())
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));

    if !config.tls_verify {
        warn!(base_url = %config.base_url, "TLS certificate verification disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let Some(ca_cert) = &config.tls_ca_cert {
        debug!("loading CA certificate from {}", ca_cert.display());
        let bytes = std::fs::read(ca_cert).map_err(|err| {
            Error::InvalidConfiguration(format!(
                "Failed to read CA certificate {}: {err}",
                ca_cert.display()
            ))
        })?;
        let cert = Certificate::from_pem(&bytes)
            .map_err(|err| Error::InvalidConfiguration(format!("Invalid CA certificate: {err}")))?;
        builder = builder.add_root_certificate(cert);
    }

    builder
        .build()
        .map_err(|err| Error::InvalidConfiguration(format!("Failed to build HTTP client: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_timeout_constants() {
        assert_eq!(DEFAULT_REQUEST_TIMEOUT_SECS, 60);
        assert_eq!(DEFAULT_CONNECT_TIMEOUT_SECS, 10);
        assert_eq!(DEFAULT_LOGIN_EXPIRY_SECS, 3600);
    }

    #[test]
    fn test_build_http_client() {
        let config = PveClientConfig::password("https://pve.example.com", "root@pam", "pw")
            .unwrap()
            .with_tls_verify(false);
        assert!(build_http_client(&config, "pve-core-test").is_ok());
    }

    #[test]
    fn test_missing_ca_cert_rejected() {
        let config = PveClientConfig::password("https://pve.example.com", "root@pam", "pw")
            .unwrap()
            .with_ca_cert(PathBuf::from("/nonexistent/pve-root-ca.pem"));
        let err = build_http_client(&config, "pve-core-test").unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }
}
