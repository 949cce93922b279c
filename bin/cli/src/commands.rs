//! Command handlers.
//!
//! `login` runs the authenticator; every other protected command runs the
//! session gate first and stops at the login screen if it denies.

use chrono::Local;
use clap::Args;
use rootcause::Report;
use std::io::Write;
use std::time::Duration;
use tasklog_core::Email;
use tasklog_session::{
    Authenticator, GateOutcome, LoginOutcome, PermissionOracle, ProviderCallback, SessionGate,
    SessionRecord, SessionStore,
};
use tasklog_tasks::{SubmitOutcome, SummaryView, TaskForm, TaskLog, TaskSubmitter, forced_logout};
use tracing::{info, warn};

use crate::error::CliError;

/// Result of a command.
pub type CommandResult = tasklog_core::Result<(), CliError>;

/// Everything a command needs.
pub struct Context<'a> {
    pub store: &'a dyn SessionStore,
    pub oracle: &'a dyn PermissionOracle,
    pub log: &'a dyn TaskLog,
    /// Task names offered by the form. Empty accepts any name.
    pub task_options: Vec<String>,
    pub logout_delay: Duration,
}

/// Arguments of `submit`.
#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    /// Task name
    #[arg(short, long)]
    pub task: String,

    /// Date the task was done, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    /// Time the task was done, HH:MM (defaults to now)
    #[arg(long)]
    pub time: Option<String>,
}

/// Signs in with `credential`, or resumes the stored session without one.
pub async fn login(
    ctx: &Context<'_>,
    credential: Option<&str>,
    out: &mut dyn Write,
) -> CommandResult {
    let auth = Authenticator::new(ctx.store, ctx.oracle);
    let outcome = match credential {
        Some(credential) => auth.authenticate(&ProviderCallback::new(credential)).await,
        None => auth.resume().await,
    };

    match outcome {
        LoginOutcome::Authenticated(record) => {
            writeln!(out, "Access granted. Signed in as {}.", who(&record))
                .map_err(CliError::from)?;
            Ok(())
        }
        LoginOutcome::Denied(reason) => Err(CliError::NotSignedIn {
            reason: reason.to_string(),
        }
        .into()),
    }
}

/// Shows who is signed in and their totals.
pub async fn status(ctx: &Context<'_>, out: &mut dyn Write) -> CommandResult {
    let (record, email) = require_session(ctx).await?;
    writeln!(out, "Signed in as {}.", who(&record)).map_err(CliError::from)?;
    print_summary(ctx, &email, out).await
}

/// Shows the signed-in user's totals.
pub async fn summary(ctx: &Context<'_>, out: &mut dyn Write) -> CommandResult {
    let (_, email) = require_session(ctx).await?;
    print_summary(ctx, &email, out).await
}

/// Logs a task for the signed-in user.
///
/// A permission-class failure signs the user out after the configured delay.
pub async fn submit(ctx: &Context<'_>, args: &SubmitArgs, out: &mut dyn Write) -> CommandResult {
    let (record, _) = require_session(ctx).await?;

    let now = Local::now().naive_local();
    let options = if ctx.task_options.is_empty() {
        vec![args.task.clone()]
    } else {
        ctx.task_options.clone()
    };
    let mut form = TaskForm::new(options, now).map_err(CliError::from)?;
    form.select(&args.task).map_err(CliError::from)?;
    if let Some(date) = &args.date {
        form.set_date(date).map_err(CliError::from)?;
    }
    if let Some(time) = &args.time {
        form.set_time(time).map_err(CliError::from)?;
    }

    match TaskSubmitter::new(ctx.log).submit(&mut form, &record, now).await {
        SubmitOutcome::Saved => {
            writeln!(out, "Task saved successfully!").map_err(CliError::from)?;
            Ok(())
        }
        SubmitOutcome::Failed(failure) => {
            writeln!(out, "{failure}").map_err(CliError::from)?;
            if failure.forces_logout() {
                writeln!(out, "Signing out in {}s...", ctx.logout_delay.as_secs())
                    .map_err(CliError::from)?;
                forced_logout(ctx.store, ctx.logout_delay)
                    .await
                    .map_err(|e| CliError::Storage {
                        details: e.to_string(),
                    })?;
            }
            Err(CliError::SubmitFailed {
                message: failure.to_string(),
            }
            .into())
        }
    }
}

/// Clears the stored session.
pub async fn logout(ctx: &Context<'_>, out: &mut dyn Write) -> CommandResult {
    Authenticator::new(ctx.store, ctx.oracle)
        .logout()
        .await
        .map_err(|e| CliError::Storage {
            details: e.to_string(),
        })?;
    writeln!(out, "Signed out.").map_err(CliError::from)?;
    Ok(())
}

/// Runs the session gate, returning the record and the email it checked.
async fn require_session(
    ctx: &Context<'_>,
) -> Result<(SessionRecord, Email), Report<CliError>> {
    match SessionGate::new(ctx.store, ctx.oracle).guard().await {
        GateOutcome::Allowed { record, email } => Ok((record, email)),
        GateOutcome::Denied(reason) => {
            info!(reason = %reason, "session gate denied access");
            Err(CliError::NotSignedIn {
                reason: reason.to_string(),
            }
            .into())
        }
    }
}

async fn print_summary(ctx: &Context<'_>, email: &Email, out: &mut dyn Write) -> CommandResult {
    let result = ctx.log.user_summary(email).await;
    if let Err(e) = &result {
        warn!(error = %e, "failed to load user summary");
    }
    writeln!(out, "{}", SummaryView::render(&result)).map_err(CliError::from)?;
    Ok(())
}

fn who(record: &SessionRecord) -> String {
    if record.name().is_empty() {
        record.email().to_string()
    } else {
        format!("{} <{}>", record.name(), record.email())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::Utc;
    use std::sync::Mutex;
    use tasklog_core::RemoteError;
    use tasklog_session::{FileSessionStore, MemorySessionStore, StorageKey};
    use tasklog_tasks::{TaskEntry, UserSummary};

    /// Endpoint fake: fixed permission and submission answers.
    struct FakeEndpoint {
        permitted: bool,
        submit_answer: Result<(), RemoteError>,
        submitted: Mutex<Vec<TaskEntry>>,
        summaries_for: Mutex<Vec<String>>,
    }

    impl FakeEndpoint {
        fn new(permitted: bool, submit_answer: Result<(), RemoteError>) -> Self {
            Self {
                permitted,
                submit_answer,
                submitted: Mutex::new(Vec::new()),
                summaries_for: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PermissionOracle for FakeEndpoint {
        async fn check_permission(&self, _email: &Email) -> Result<bool, RemoteError> {
            Ok(self.permitted)
        }
    }

    #[async_trait]
    impl TaskLog for FakeEndpoint {
        async fn submit_task(&self, entry: &TaskEntry) -> Result<(), RemoteError> {
            self.submitted.lock().unwrap().push(entry.clone());
            self.submit_answer.clone()
        }

        async fn user_summary(&self, email: &Email) -> Result<UserSummary, RemoteError> {
            self.summaries_for.lock().unwrap().push(email.to_string());
            Ok(UserSummary {
                total_earnings: 12345.0,
                task_count: 7,
                last_updated: "2026-03-14T10:07:00Z".to_string(),
            })
        }
    }

    fn credential() -> String {
        let exp = Utc::now().timestamp() + 3600;
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "email": "alice@example.com",
                "name": "Alice",
                "picture": "",
                "exp": exp,
            })
            .to_string(),
        );
        format!("{header}.{body}.c2ln")
    }

    fn context<'a>(store: &'a dyn SessionStore, endpoint: &'a FakeEndpoint) -> Context<'a> {
        Context {
            store,
            oracle: endpoint,
            log: endpoint,
            task_options: vec!["Dishes".to_string(), "Laundry".to_string()],
            logout_delay: Duration::from_secs(3),
        }
    }

    fn submit_args(task: &str) -> SubmitArgs {
        SubmitArgs {
            task: task.to_string(),
            date: Some("2026-03-14".to_string()),
            time: Some("09:30".to_string()),
        }
    }

    async fn signed_in(store: &dyn SessionStore, endpoint: &FakeEndpoint) {
        let mut out = Vec::new();
        login(&context(store, endpoint), Some(credential().as_str()), &mut out)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn login_then_status_shows_summary() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        let endpoint = FakeEndpoint::new(true, Ok(()));

        let mut out = Vec::new();
        login(&context(&store, &endpoint), Some(credential().as_str()), &mut out)
            .await
            .unwrap();
        status(&context(&store, &endpoint), &mut out).await.unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Access granted. Signed in as Alice <alice@example.com>."));
        assert!(printed.contains("12 345 Ft"));
        assert!(printed.contains("7"));
    }

    #[tokio::test]
    async fn summary_uses_token_email_not_stored_email() {
        let store = MemorySessionStore::new();
        let endpoint = FakeEndpoint::new(true, Ok(()));
        signed_in(&store, &endpoint).await;
        store
            .set(StorageKey::Email, "mallory@example.com")
            .await
            .unwrap();

        let mut out = Vec::new();
        status(&context(&store, &endpoint), &mut out).await.unwrap();
        summary(&context(&store, &endpoint), &mut out).await.unwrap();

        assert_eq!(
            endpoint.summaries_for.lock().unwrap().clone(),
            vec!["alice@example.com", "alice@example.com"]
        );
    }

    #[tokio::test]
    async fn protected_commands_require_session() {
        let store = MemorySessionStore::new();
        let endpoint = FakeEndpoint::new(true, Ok(()));
        let mut out = Vec::new();

        assert!(status(&context(&store, &endpoint), &mut out).await.is_err());
        assert!(summary(&context(&store, &endpoint), &mut out).await.is_err());
        assert!(
            submit(&context(&store, &endpoint), &submit_args("Dishes"), &mut out)
                .await
                .is_err()
        );
        assert!(endpoint.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_sends_entry() {
        let store = MemorySessionStore::new();
        let endpoint = FakeEndpoint::new(true, Ok(()));
        signed_in(&store, &endpoint).await;

        let mut out = Vec::new();
        submit(&context(&store, &endpoint), &submit_args("Laundry"), &mut out)
            .await
            .unwrap();

        let submitted = endpoint.submitted.lock().unwrap().clone();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].task, "Laundry");
        assert_eq!(submitted[0].date, "2026-03-14");
        assert_eq!(submitted[0].time, "09:30");
        assert!(String::from_utf8(out).unwrap().contains("Task saved successfully!"));
    }

    #[tokio::test]
    async fn unknown_task_is_rejected_locally() {
        let store = MemorySessionStore::new();
        let endpoint = FakeEndpoint::new(true, Ok(()));
        signed_in(&store, &endpoint).await;

        let mut out = Vec::new();
        let result = submit(&context(&store, &endpoint), &submit_args("Gardening"), &mut out).await;

        assert!(result.is_err());
        assert!(endpoint.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn any_task_accepted_without_configured_options() {
        let store = MemorySessionStore::new();
        let endpoint = FakeEndpoint::new(true, Ok(()));
        signed_in(&store, &endpoint).await;

        let mut ctx = context(&store, &endpoint);
        ctx.task_options.clear();
        let mut out = Vec::new();
        submit(&ctx, &submit_args("Gardening"), &mut out).await.unwrap();

        assert_eq!(endpoint.submitted.lock().unwrap()[0].task, "Gardening");
    }

    #[tokio::test(start_paused = true)]
    async fn permission_failure_signs_out() {
        let store = MemorySessionStore::new();
        let endpoint = FakeEndpoint::new(
            true,
            Err(RemoteError::Rejected {
                message: "Permission revoked".to_string(),
            }),
        );
        signed_in(&store, &endpoint).await;

        let mut out = Vec::new();
        let result = submit(&context(&store, &endpoint), &submit_args("Dishes"), &mut out).await;

        assert!(result.is_err());
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Access denied: Permission revoked"));
        assert!(printed.contains("Signing out in 3s"));
        assert_eq!(store.get(StorageKey::Token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn other_failure_keeps_session() {
        let store = MemorySessionStore::new();
        let endpoint = FakeEndpoint::new(true, Err(RemoteError::Status { code: 500 }));
        signed_in(&store, &endpoint).await;

        let mut out = Vec::new();
        let result = submit(&context(&store, &endpoint), &submit_args("Dishes"), &mut out).await;

        assert!(result.is_err());
        assert!(
            String::from_utf8(out)
                .unwrap()
                .contains("Error: Server responded with 500")
        );
        assert!(store.get(StorageKey::Token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn refused_login_leaves_nothing_stored() {
        let store = MemorySessionStore::new();
        let endpoint = FakeEndpoint::new(false, Ok(()));

        let mut out = Vec::new();
        let result = login(&context(&store, &endpoint), Some(credential().as_str()), &mut out).await;

        assert!(result.is_err());
        assert_eq!(store.get(StorageKey::Token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let store = MemorySessionStore::new();
        let endpoint = FakeEndpoint::new(true, Ok(()));
        signed_in(&store, &endpoint).await;

        let mut out = Vec::new();
        logout(&context(&store, &endpoint), &mut out).await.unwrap();

        assert_eq!(store.get(StorageKey::Token).await.unwrap(), None);
        assert!(String::from_utf8(out).unwrap().contains("Signed out."));
    }
}
