//! HTTP client for the tasklog remote endpoint.
//!
//! One spreadsheet-backed endpoint answers the permission check, task
//! submissions and the user summary. [`EndpointClient`] implements both
//! [`tasklog_session::PermissionOracle`] and [`tasklog_tasks::TaskLog`].

mod client;
mod error;
pub mod types;

pub use client::EndpointClient;
pub use error::EndpointError;
