//! Error types for the session crate.
//!
//! - `TokenError`: the identity token could not be decoded
//! - `StoreError`: the session store could not be read or written
//! - `DenyReason`: why the authenticator or the session gate refused access

use std::fmt;
use tasklog_core::RemoteError;

/// Errors from decoding an identity token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token is not a well-formed three-segment token with a JSON payload.
    Malformed { reason: String },
    /// A required claim is absent or unusable.
    MissingClaim { claim: String },
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { reason } => write!(f, "malformed token: {reason}"),
            Self::MissingClaim { claim } => write!(f, "missing required claim: {claim}"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Errors from session store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Reading or writing the backing storage failed.
    Io { reason: String },
    /// The backing storage holds data that cannot be parsed.
    Corrupt { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { reason } => write!(f, "session storage I/O failed: {reason}"),
            Self::Corrupt { reason } => write!(f, "session storage is corrupt: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Why access was refused.
///
/// Every variant leads to the same observable result: the session record is
/// cleared and the caller is sent back to login. `Display` renders the
/// message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// No session record is stored.
    NoSession,
    /// The credential or the stored token could not be decoded.
    MalformedToken(TokenError),
    /// The stored token is past its expiry.
    TokenExpired,
    /// The permission oracle refused a new sign-in.
    PermissionDenied,
    /// The permission oracle refused an existing session.
    AccessRevoked,
    /// The permission check itself failed.
    CheckFailed(RemoteError),
    /// The session record could not be read or written.
    Storage(StoreError),
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSession => write!(f, "not signed in"),
            Self::MalformedToken(err) => write!(f, "invalid sign-in token ({err})"),
            Self::TokenExpired => write!(f, "your session has expired, please sign in again"),
            Self::PermissionDenied => write!(
                f,
                "You do not have permission to access this application. \
                 Please contact the administrator."
            ),
            Self::AccessRevoked => write!(
                f,
                "Your access to this application has been revoked. \
                 Please contact the administrator."
            ),
            Self::CheckFailed(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl From<TokenError> for DenyReason {
    fn from(err: TokenError) -> Self {
        Self::MalformedToken(err)
    }
}

impl From<RemoteError> for DenyReason {
    fn from(err: RemoteError) -> Self {
        Self::CheckFailed(err)
    }
}

impl From<StoreError> for DenyReason {
    fn from(err: StoreError) -> Self {
        Self::Storage(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_error_display() {
        let err = TokenError::MissingClaim {
            claim: "email".to_string(),
        };
        assert!(err.to_string().contains("missing required claim"));
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::Io {
            reason: "permission denied (os error 13)".to_string(),
        };
        assert!(err.to_string().contains("I/O failed"));
    }

    #[test]
    fn check_failed_surfaces_server_message() {
        let reason = DenyReason::from(RemoteError::Rejected {
            message: "revoked".to_string(),
        });
        assert_eq!(reason.to_string(), "revoked");
    }

    #[test]
    fn permission_denied_message() {
        assert!(
            DenyReason::PermissionDenied
                .to_string()
                .contains("do not have permission")
        );
        assert!(DenyReason::AccessRevoked.to_string().contains("revoked"));
    }
}
