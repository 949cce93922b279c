//! Endpoint client construction errors.

use std::fmt;

/// Errors building an [`EndpointClient`](crate::EndpointClient).
#[derive(Debug)]
pub enum EndpointError {
    /// The configured endpoint URL does not parse.
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Parser details.
        details: String,
    },
    /// The HTTP client could not be built.
    ClientBuild {
        /// Error details.
        details: String,
    },
}

impl fmt::Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl { url, details } => {
                write!(f, "invalid endpoint URL '{}': {}", url, details)
            }
            Self::ClientBuild { details } => {
                write!(f, "failed to build HTTP client: {}", details)
            }
        }
    }
}

impl std::error::Error for EndpointError {}
