//! The session gate, run before every protected operation.
//!
//! The gate has two states and keeps nothing between runs apart from the
//! session record itself:
//!
//! - no record, or a record whose token cannot be decoded: denied
//! - a record: the token must be unexpired and the permission oracle must
//!   answer true, otherwise denied
//!
//! Every denial clears the stored record.

use chrono::{DateTime, Utc};
use tasklog_core::Email;
use tracing::{debug, info, instrument, warn};

use crate::error::DenyReason;
use crate::oracle::PermissionOracle;
use crate::record::SessionRecord;
use crate::store::SessionStore;

/// Where the caller should go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// The sign-in screen.
    Login,
    /// The protected task logger.
    TaskLogger,
}

/// Result of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// The session is valid and permitted for `email`, the address decoded
    /// from the stored token and checked with the permission oracle.
    Allowed { record: SessionRecord, email: Email },
    /// The session was refused and has been cleared.
    Denied(DenyReason),
}

impl GateOutcome {
    /// Returns where the caller should go after this outcome.
    #[must_use]
    pub fn destination(&self) -> Destination {
        match self {
            Self::Allowed { .. } => Destination::TaskLogger,
            Self::Denied(_) => Destination::Login,
        }
    }

    /// Returns true if access was allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Re-validates the stored session on every protected invocation.
pub struct SessionGate<'a> {
    store: &'a dyn SessionStore,
    oracle: &'a dyn PermissionOracle,
}

impl<'a> SessionGate<'a> {
    /// Creates a gate over the given store and oracle.
    #[must_use]
    pub fn new(store: &'a dyn SessionStore, oracle: &'a dyn PermissionOracle) -> Self {
        Self { store, oracle }
    }

    /// Checks the stored session against the current time.
    pub async fn guard(&self) -> GateOutcome {
        self.guard_at(Utc::now()).await
    }

    /// Checks the stored session as of `now`.
    #[instrument(skip(self))]
    pub async fn guard_at(&self, now: DateTime<Utc>) -> GateOutcome {
        let record = match SessionRecord::load(self.store).await {
            Ok(Some(record)) => record,
            Ok(None) => return self.deny(DenyReason::NoSession).await,
            Err(e) => {
                warn!(error = %e, "failed to read session record");
                return self.deny(DenyReason::Storage(e)).await;
            }
        };

        let claims = match record.token().decode_unverified() {
            Ok(claims) => claims,
            Err(e) => {
                warn!(error = %e, "stored token could not be decoded");
                return self.deny(DenyReason::MalformedToken(e)).await;
            }
        };

        if claims.is_expired_at(now) {
            info!(email = %claims.email(), "stored session has expired");
            return self.deny(DenyReason::TokenExpired).await;
        }

        match self.oracle.check_permission(claims.email()).await {
            Ok(true) => {
                debug!(email = %claims.email(), "session allowed");
                GateOutcome::Allowed {
                    record,
                    email: claims.email().clone(),
                }
            }
            Ok(false) => {
                info!(email = %claims.email(), "access revoked");
                self.deny(DenyReason::AccessRevoked).await
            }
            Err(e) => {
                warn!(email = %claims.email(), error = %e, "permission check failed");
                self.deny(DenyReason::CheckFailed(e)).await
            }
        }
    }

    async fn deny(&self, reason: DenyReason) -> GateOutcome {
        if let Err(e) = SessionRecord::clear(self.store).await {
            warn!(error = %e, "failed to clear session record");
        }
        GateOutcome::Denied(reason)
    }
}
