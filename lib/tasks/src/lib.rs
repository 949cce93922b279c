//! Task logging for tasklog.
//!
//! This crate provides:
//! - The entry form (`TaskForm`) and the submitted payload (`TaskEntry`)
//! - The remote task log seam (`TaskLog`)
//! - Submission with structured failure classification (`TaskSubmitter`)
//! - The user's running totals (`UserSummary`, `SummaryView`)

pub mod form;
pub mod submit;
pub mod summary;

// Re-export main types at crate root
pub use form::{FormError, TaskEntry, TaskForm};
pub use submit::{
    DEFAULT_LOGOUT_DELAY, FailureKind, SubmitFailure, SubmitOutcome, TaskLog, TaskSubmitter,
    forced_logout,
};
pub use summary::{SummaryView, UserSummary, format_forints};
