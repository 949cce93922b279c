//! The permission oracle seam.

use async_trait::async_trait;
use tasklog_core::{Email, RemoteError};

/// Remote authority deciding whether an email may use the application.
///
/// Answers are never cached: every sign-in and every gate check asks again,
/// so a revocation takes effect on the next invocation.
#[async_trait]
pub trait PermissionOracle: Send + Sync {
    /// Returns whether `email` currently has permission.
    ///
    /// # Errors
    ///
    /// Returns an error if the oracle could not be reached, answered with an
    /// unexpected payload, or reported an error of its own.
    async fn check_permission(&self, email: &Email) -> Result<bool, RemoteError>;
}
