//! Identity token decoding.
//!
//! The identity provider's client library hands over a signed JWT once it
//! has validated the sign-in. Only the payload is decoded here; the
//! signature is never checked locally. Whether a user may use the app is
//! decided by the permission oracle, not by the token.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use tasklog_core::Email;

use crate::error::TokenError;

/// A signed identity token as issued by the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    /// Wraps a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decodes the token's claims without verifying its signature.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::MissingClaim` if the payload carries no `email`.
    /// Returns `TokenError::Malformed` if the token does not have three
    /// segments, its payload is not base64-encoded JSON, or its `email` is
    /// not an email address.
    pub fn decode_unverified(&self) -> Result<IdentityClaims, TokenError> {
        let parts: Vec<&str> = self.0.split('.').collect();
        if parts.len() != 3 {
            return Err(TokenError::Malformed {
                reason: format!("expected 3 segments, found {}", parts.len()),
            });
        }

        // JWTs use base64url; accept the standard alphabet and padding as well.
        let segment = parts[1].trim_end_matches('=');
        let payload_bytes = URL_SAFE_NO_PAD
            .decode(segment)
            .or_else(|_| STANDARD_NO_PAD.decode(segment))
            .map_err(|e| TokenError::Malformed {
                reason: format!("payload is not base64: {e}"),
            })?;

        let raw: RawClaims =
            serde_json::from_slice(&payload_bytes).map_err(|e| TokenError::Malformed {
                reason: format!("payload is not a claims object: {e}"),
            })?;

        IdentityClaims::try_from(raw)
    }
}

// Tokens are bearer credentials; keep them out of logs.
impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IdentityToken").field(&"<redacted>").finish()
    }
}

impl From<String> for IdentityToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Payload as it appears on the wire; every claim is optional here.
#[derive(Debug, Deserialize)]
struct RawClaims {
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
    iat: Option<i64>,
    exp: Option<i64>,
}

/// Claims extracted from an identity token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    email: Email,
    name: Option<String>,
    picture: Option<String>,
    issued_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
}

impl TryFrom<RawClaims> for IdentityClaims {
    type Error = TokenError;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let email = raw
            .email
            .ok_or_else(|| TokenError::MissingClaim {
                claim: "email".to_string(),
            })?
            .parse::<Email>()
            .map_err(|e| TokenError::Malformed {
                reason: e.to_string(),
            })?;

        Ok(Self {
            email,
            name: raw.name,
            picture: raw.picture,
            issued_at: raw.iat.and_then(|secs| DateTime::from_timestamp(secs, 0)),
            expires_at: raw.exp.and_then(|secs| DateTime::from_timestamp(secs, 0)),
        })
    }
}

impl IdentityClaims {
    /// Returns the subject's email address.
    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Returns the subject's display name, if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the subject's picture URL, if present.
    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }

    /// Returns when the token was issued, if present.
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }

    /// Returns when the token expires, if present.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns true unless `now` is strictly before the expiry.
    ///
    /// A token without an `exp` claim counts as expired.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            None => true,
        }
    }
}

/// Builds an unsigned token around `payload` for tests.
#[cfg(test)]
pub(crate) fn unsigned_token(payload: &serde_json::Value) -> IdentityToken {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    IdentityToken::new(format!("{header}.{body}.c2lnbmF0dXJl"))
}
