//! Bearer token decoding and validation.
//!
//! Duolingo issues long-lived JWTs; this module only reads the payload
//! segment to recover the subject id and expiry. No signature verification
//! is performed — the remote API is the authority on whether a token is
//! actually accepted.

use base64::Engine;
use serde::Deserialize;

use crate::error::{FarmError, Result};

/// Decoded claims of a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Subject (the Duolingo user id).
    pub sub: u64,
    /// Issued-at, unix seconds.
    pub iat: Option<i64>,
    /// Expiry, unix seconds. Absent on most Duolingo tokens.
    pub exp: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: Option<u64>,
    iat: Option<i64>,
    exp: Option<i64>,
}

/// Decode the payload segment of a JWT into an [`Identity`].
///
/// Fails with [`FarmError::MalformedToken`] when the token has no payload
/// segment, the segment is not base64url, the payload is not JSON, or the
/// `sub` claim is missing.
pub fn decode(token: &str) -> Result<Identity> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| FarmError::MalformedToken("missing payload segment".to_owned()))?;

    // Tolerate both padded and unpadded encodings.
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| FarmError::MalformedToken(format!("payload is not base64url: {e}")))?;

    let claims: RawClaims = serde_json::from_slice(&bytes)
        .map_err(|e| FarmError::MalformedToken(format!("payload is not a JSON object: {e}")))?;

    let sub = claims
        .sub
        .ok_or_else(|| FarmError::MalformedToken("missing sub claim".to_owned()))?;

    Ok(Identity {
        sub,
        iat: claims.iat,
        exp: claims.exp,
    })
}

/// Validate that a token is well-formed and not expired.
///
/// An absent `exp` claim never fails validation; Duolingo tokens usually
/// omit it.
pub fn validate(token: &str) -> Result<()> {
    validate_at(token, chrono::Utc::now().timestamp())
}

fn validate_at(token: &str, now: i64) -> Result<()> {
    if token.trim().is_empty() {
        return Err(FarmError::MalformedToken("token is empty".to_owned()));
    }
    let identity = decode(token)?;
    if let Some(exp) = identity.exp
        && exp < now
    {
        return Err(FarmError::ExpiredToken { expired_at: exp });
    }
    Ok(())
}
