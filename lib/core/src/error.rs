//! Error handling foundation for tasklog.
//!
//! This module provides the `Result` type alias using rootcause and the
//! [`RemoteError`] taxonomy shared by every call to the remote endpoint.
//! Each crate defines its own domain-specific error types in their own
//! error modules; the CLI wraps them in a [`rootcause::Report`] at the
//! command boundary.

use rootcause::Report;
use std::fmt;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

/// Errors from a call to the remote task-log endpoint.
///
/// Shared by every remote operation (permission check, task submission,
/// user summary). `Display` renders the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never produced a response.
    Transport { reason: String },
    /// The endpoint answered with a non-success HTTP status.
    Status { code: u16 },
    /// The response body was not the expected JSON.
    MalformedResponse { reason: String },
    /// The endpoint answered `status: "error"`.
    Rejected { message: String },
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { reason } => write!(f, "failed to reach server: {reason}"),
            Self::Status { code } => write!(f, "Server responded with {code}"),
            Self::MalformedResponse { .. } => write!(f, "Invalid response format from server"),
            Self::Rejected { message } => f.write_str(message),
        }
    }
}

impl std::error::Error for RemoteError {}
