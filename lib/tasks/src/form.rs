//! The task entry form.
//!
//! A form offers a fixed list of task names and carries the date and time
//! the task was done. After a successful submission it resets to the first
//! task and the current date and time.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;
use std::fmt;

/// Wire format of the date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Wire format of the time field.
pub const TIME_FORMAT: &str = "%H:%M";

/// Errors from editing the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// The form was created without any task options.
    NoOptions,
    /// The task is not one of the offered options.
    UnknownTask { task: String },
    /// The date is not `YYYY-MM-DD`.
    InvalidDate { input: String },
    /// The time is not `HH:MM`.
    InvalidTime { input: String },
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOptions => write!(f, "no task options configured"),
            Self::UnknownTask { task } => write!(f, "unknown task '{task}'"),
            Self::InvalidDate { input } => {
                write!(f, "invalid date '{input}', expected YYYY-MM-DD")
            }
            Self::InvalidTime { input } => write!(f, "invalid time '{input}', expected HH:MM"),
        }
    }
}

impl std::error::Error for FormError {}

/// The task logger's entry form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    options: Vec<String>,
    selected: usize,
    date: NaiveDate,
    time: NaiveTime,
}

impl TaskForm {
    /// Creates a form offering `options`, reset to `now`.
    ///
    /// # Errors
    ///
    /// Returns `FormError::NoOptions` if `options` is empty.
    pub fn new(options: Vec<String>, now: NaiveDateTime) -> Result<Self, FormError> {
        if options.is_empty() {
            return Err(FormError::NoOptions);
        }
        let mut form = Self {
            options,
            selected: 0,
            date: now.date(),
            time: NaiveTime::MIN,
        };
        form.reset(now);
        Ok(form)
    }

    /// Returns the offered task names.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Returns the index of the selected task.
    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Returns the selected task name.
    #[must_use]
    pub fn task(&self) -> &str {
        &self.options[self.selected]
    }

    /// Returns the date field.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the time field, at minute precision.
    #[must_use]
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Selects the task named `task`.
    ///
    /// # Errors
    ///
    /// Returns `FormError::UnknownTask` if it is not an offered option.
    pub fn select(&mut self, task: &str) -> Result<(), FormError> {
        let index = self
            .options
            .iter()
            .position(|option| option == task)
            .ok_or_else(|| FormError::UnknownTask {
                task: task.to_string(),
            })?;
        self.selected = index;
        Ok(())
    }

    /// Sets the date field from `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns `FormError::InvalidDate` if the input does not parse.
    pub fn set_date(&mut self, input: &str) -> Result<(), FormError> {
        self.date =
            NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| {
                FormError::InvalidDate {
                    input: input.to_string(),
                }
            })?;
        Ok(())
    }

    /// Sets the time field from `HH:MM`.
    ///
    /// # Errors
    ///
    /// Returns `FormError::InvalidTime` if the input does not parse.
    pub fn set_time(&mut self, input: &str) -> Result<(), FormError> {
        self.time =
            NaiveTime::parse_from_str(input.trim(), TIME_FORMAT).map_err(|_| {
                FormError::InvalidTime {
                    input: input.to_string(),
                }
            })?;
        Ok(())
    }

    /// Selects the first task and sets date and time to `now`.
    pub fn reset(&mut self, now: NaiveDateTime) {
        self.selected = 0;
        self.date = now.date();
        self.time = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(NaiveTime::MIN);
    }

    /// Builds the entry to submit for `email`, authenticated by `token`.
    #[must_use]
    pub fn entry(&self, email: &str, token: &str) -> TaskEntry {
        TaskEntry {
            task: self.task().to_string(),
            date: self.date.format(DATE_FORMAT).to_string(),
            time: self.time.format(TIME_FORMAT).to_string(),
            email: email.to_string(),
            token: token.to_string(),
        }
    }
}

/// Body of a task submission.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct TaskEntry {
    /// The task name.
    pub task: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`.
    pub time: String,
    /// The submitting user's email.
    pub email: String,
    /// The submitting user's identity token.
    pub token: String,
}

impl fmt::Debug for TaskEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskEntry")
            .field("task", &self.task)
            .field("date", &self.date)
            .field("time", &self.time)
            .field("email", &self.email)
            .field("token", &"<redacted>")
            .finish()
    }
}
