//! Response envelope handling.
//!
//! Every API response wraps its payload: `{"data": ...}` on success and
//! `{"errors": {...}}` on failure. Decoding happens in two steps, first the envelope, then
//! the payload into the caller's type.

use pve_core::{ApiErrors, Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt::Display;

#[derive(Debug, Deserialize)]
struct DataEnvelope {
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Option<ApiErrors>,
}

/// Build the error for a response with status >= 400.
///
/// The body is parsed on a best-effort basis; anything unparseable yields an empty map so
/// the status code always survives.
#[must_use]
pub fn api_error(status: u16, body: &[u8]) -> Error {
    let errors = serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.errors)
        .unwrap_or_default();

    Error::Api { status, errors }
}

/// Decode the `data` member of a successful response into `T`.
///
/// Returns `Ok(None)` for an empty body, a missing `data` member, or `data: null`.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the body is not an envelope or `data` does not match `T`.
pub fn decode_data<T>(body: &[u8], context: impl Display) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    if body.is_empty() {
        return Ok(None);
    }

    let envelope: DataEnvelope = serde_json::from_slice(body)
        .map_err(|err| Error::Decode(format!("invalid JSON envelope for `{context}`: {err}")))?;

    match envelope.data {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(data) => serde_json::from_value(data)
            .map(Some)
            .map_err(|err| Error::Decode(format!("unexpected data for `{context}`: {err}"))),
    }
}

/// Apply the status check and, on success, decode the payload.
///
/// # Errors
///
/// Returns [`Error::Api`] for status >= 400, otherwise as [`decode_data`].
pub fn unwrap_response<T>(status: u16, body: &[u8], context: impl Display) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    if status >= 400 {
        return Err(api_error(status, body));
    }

    decode_data(body, context)
}
