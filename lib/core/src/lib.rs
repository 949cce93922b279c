//! Core domain types and utilities for tasklog.
//!
//! This crate provides the foundational types and error handling shared by
//! the session, task and endpoint crates.

pub mod email;
pub mod error;

pub use email::{Email, ParseEmailError};
pub use error::{RemoteError, Result};
