//! Error types for CLI commands.

use std::fmt;
use tasklog_tasks::FormError;

/// Errors surfaced to the user by a command.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded.
    Config { details: String },
    /// The endpoint client could not be created.
    Endpoint { details: String },
    /// No valid, permitted session; the user must sign in.
    NotSignedIn { reason: String },
    /// The task form rejected the input.
    Form(FormError),
    /// The task was not saved.
    SubmitFailed { message: String },
    /// The session store could not be written.
    Storage { details: String },
    /// Writing to the terminal failed.
    Output { details: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "invalid configuration: {}", details),
            Self::Endpoint { details } => write!(f, "{}", details),
            Self::NotSignedIn { reason } => {
                write!(f, "{}\nSign in with `tasklog login --credential <TOKEN>`.", reason)
            }
            Self::Form(e) => write!(f, "{}", e),
            Self::SubmitFailed { message } => write!(f, "{}", message),
            Self::Storage { details } => write!(f, "session storage error: {}", details),
            Self::Output { details } => write!(f, "failed to write output: {}", details),
        }
    }
}

impl std::error::Error for CliError {}

impl From<FormError> for CliError {
    fn from(e: FormError) -> Self {
        Self::Form(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::Output {
            details: e.to_string(),
        }
    }
}
