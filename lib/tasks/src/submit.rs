//! Task submission.
//!
//! Sends the form's entry to the task log and classifies what came back.
//! Failures carry a structured [`FailureKind`]; a permission-class failure
//! means the session must be ended.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::fmt;
use std::time::Duration;
use tasklog_core::{Email, RemoteError};
use tasklog_session::{Destination, SessionRecord, SessionStore, StoreError};
use tracing::{info, instrument, warn};

use crate::form::{TaskEntry, TaskForm};
use crate::summary::UserSummary;

/// Delay before a forced logout, so the user can read why.
pub const DEFAULT_LOGOUT_DELAY: Duration = Duration::from_secs(3);

/// Remote task log.
#[async_trait]
pub trait TaskLog: Send + Sync {
    /// Appends `entry` to the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the log could not be reached or refused the entry.
    async fn submit_task(&self, entry: &TaskEntry) -> Result<(), RemoteError>;

    /// Fetches the running totals for `email`.
    ///
    /// # Errors
    ///
    /// Returns an error if the log could not be reached or reported an error.
    async fn user_summary(&self, email: &Email) -> Result<UserSummary, RemoteError>;
}

/// Category of a failed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The failure mentions permission or access. Ends the session.
    PermissionDenied,
    /// Anything else. The session is kept.
    Other,
}

impl FailureKind {
    /// Classifies a failure by its message.
    ///
    /// The task endpoint reports failures as free text only, so this is the
    /// one place where the message wording is inspected.
    #[must_use]
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("permission") || lower.contains("access") {
            Self::PermissionDenied
        } else {
            Self::Other
        }
    }
}

/// A failed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitFailure {
    kind: FailureKind,
    message: String,
}

impl SubmitFailure {
    /// Creates a failure with an explicit kind.
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the failure category.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Returns the underlying message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if the session must be ended.
    #[must_use]
    pub fn forces_logout(&self) -> bool {
        self.kind == FailureKind::PermissionDenied
    }
}

impl From<RemoteError> for SubmitFailure {
    fn from(err: RemoteError) -> Self {
        let message = err.to_string();
        Self::new(FailureKind::classify(&message), message)
    }
}

impl fmt::Display for SubmitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::PermissionDenied => write!(f, "Access denied: {}", self.message),
            FailureKind::Other => write!(f, "Error: {}", self.message),
        }
    }
}

/// Result of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The entry was saved and the form reset.
    Saved,
    /// The entry was not saved; the form is unchanged.
    Failed(SubmitFailure),
}

/// Submits task entries on behalf of a signed-in user.
pub struct TaskSubmitter<'a> {
    log: &'a dyn TaskLog,
}

impl<'a> TaskSubmitter<'a> {
    /// Creates a submitter writing to `log`.
    #[must_use]
    pub fn new(log: &'a dyn TaskLog) -> Self {
        Self { log }
    }

    /// Submits the form's entry for the session's user.
    ///
    /// On success the form is reset to `now`.
    #[instrument(skip_all, fields(task = %form.task()))]
    pub async fn submit(
        &self,
        form: &mut TaskForm,
        session: &SessionRecord,
        now: NaiveDateTime,
    ) -> SubmitOutcome {
        if session.email().is_empty() {
            return SubmitOutcome::Failed(SubmitFailure::new(
                FailureKind::Other,
                "User email not found. Please log in again.",
            ));
        }

        let entry = form.entry(session.email(), session.token().as_str());
        match self.log.submit_task(&entry).await {
            Ok(()) => {
                info!(date = %entry.date, time = %entry.time, "task saved");
                form.reset(now);
                SubmitOutcome::Saved
            }
            Err(e) => {
                let failure = SubmitFailure::from(e);
                warn!(kind = ?failure.kind(), message = %failure.message(), "task submission failed");
                SubmitOutcome::Failed(failure)
            }
        }
    }
}

/// Ends the session after `delay`.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub async fn forced_logout(
    store: &dyn SessionStore,
    delay: Duration,
) -> Result<Destination, StoreError> {
    tokio::time::sleep(delay).await;
    SessionRecord::clear(store).await?;
    info!("session ended after permission failure");
    Ok(Destination::Login)
}
