//! The signed-in user's running totals.

use chrono::{DateTime, Local, TimeZone};
use serde::Deserialize;
use std::fmt;
use tasklog_core::RemoteError;

/// Totals reported by the task log.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Earnings in forints.
    pub total_earnings: f64,
    /// Number of tasks logged.
    pub task_count: u64,
    /// When the totals were last recomputed, as sent by the server.
    pub last_updated: String,
}

/// Formats `amount` as whole forints with space-grouped thousands.
///
/// ```
/// assert_eq!(tasklog_tasks::format_forints(12345.4), "12 345 Ft");
/// ```
#[must_use]
pub fn format_forints(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let digits = (rounded.abs() as u64).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if negative {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    grouped.push_str(" Ft");
    grouped
}

/// The three summary lines as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub earnings: String,
    pub task_count: String,
    pub last_updated: String,
}

impl SummaryView {
    /// Renders a summary fetch result in local time.
    #[must_use]
    pub fn render(result: &Result<UserSummary, RemoteError>) -> Self {
        Self::render_in(result, &Local)
    }

    /// Renders a summary fetch result in `tz`.
    ///
    /// A timestamp that is not RFC 3339 is shown as sent.
    #[must_use]
    pub fn render_in<Tz>(result: &Result<UserSummary, RemoteError>, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match result {
            Ok(summary) => {
                let when = DateTime::parse_from_rfc3339(&summary.last_updated)
                    .map(|t| {
                        t.with_timezone(tz)
                            .format("%Y-%m-%d %H:%M:%S")
                            .to_string()
                    })
                    .unwrap_or_else(|_| summary.last_updated.clone());
                Self {
                    earnings: format_forints(summary.total_earnings),
                    task_count: summary.task_count.to_string(),
                    last_updated: format!("Updated: {when}"),
                }
            }
            Err(e) => Self {
                earnings: format_forints(0.0),
                task_count: "0".to_string(),
                last_updated: format!("Error loading data: {e}"),
            },
        }
    }
}

impl fmt::Display for SummaryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Earnings: {}", self.earnings)?;
        writeln!(f, "Tasks:    {}", self.task_count)?;
        write!(f, "{}", self.last_updated)
    }
}
