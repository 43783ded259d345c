//! Local inspection of JWT access tokens.
//!
//! Signatures are NOT verified here: the server is the authority on token
//! validity. The client only reads the `exp` claim to decide whether a stored
//! session is still worth presenting.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

use crate::error::Error;

/// Unverified claims decoded from a JWT payload.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    inner: JsonValue,
}

impl TokenClaims {
    /// Gets a claim value by key.
    #[must_use]
    pub fn get_claim(&self, key: &str) -> Option<&JsonValue> {
        self.inner.get(key)
    }

    /// Gets the inner JSON value.
    #[must_use]
    pub fn as_json(&self) -> &JsonValue {
        &self.inner
    }

    /// The `sub` claim, if present and a string.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.inner.get("sub").and_then(JsonValue::as_str)
    }

    /// The `exp` claim as a timestamp. `None` if missing, non-numeric or out of range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        let exp = self.inner.get("exp")?;
        let secs = exp
            .as_i64()
            .or_else(|| exp.as_f64().map(|f| f.floor() as i64))?;
        OffsetDateTime::from_unix_timestamp(secs).ok()
    }
}

/// Decodes the payload segment of a JWT without verifying it.
///
/// # Errors
///
/// Returns `Error::Token` if the token does not have three segments, the
/// payload is not base64url, or it is not a JSON object.
pub fn decode_claims(token: &str) -> Result<TokenClaims, Error> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::Token("invalid token format".into()));
    };

    // Tolerate issuers that pad their segments.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| Error::Token("invalid payload encoding".into()))?;
    let inner: JsonValue =
        serde_json::from_slice(&bytes).map_err(|_| Error::Token("invalid payload".into()))?;
    if !inner.is_object() {
        return Err(Error::Token("invalid payload".into()));
    }

    Ok(TokenClaims { inner })
}

/// Whether `token` is expired at `now`.
///
/// Fails closed: a token that cannot be decoded, or carries no usable `exp`
/// claim, counts as expired.
#[must_use]
pub fn is_expired_at(token: &str, now: OffsetDateTime) -> bool {
    match decode_claims(token) {
        Ok(claims) => claims.expires_at().is_none_or(|exp| exp <= now),
        Err(e) => {
            tracing::debug!(error = %e, "Treating undecodable token as expired");
            true
        }
    }
}

/// Whether `token` is expired right now. See [`is_expired_at`].
#[must_use]
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, OffsetDateTime::now_utc())
}
