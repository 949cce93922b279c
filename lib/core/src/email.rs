//! Email address type used as the user identity throughout tasklog.
//!
//! The identity provider asserts the email; the permission oracle and the
//! task endpoint key everything on it. Only the shape is checked here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a string is not a usable email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEmailError {
    /// The rejected input.
    pub input: String,
    /// Why the input was rejected.
    pub reason: &'static str,
}

impl fmt::Display for ParseEmailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid email '{}': {}", self.input, self.reason)
    }
}

impl std::error::Error for ParseEmailError {}

/// An email address with a non-empty local part and domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Returns the email as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = ParseEmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl TryFrom<String> for Email {
    type Error = ParseEmailError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let trimmed = s.trim();
        let reject = |reason| ParseEmailError {
            input: s.clone(),
            reason,
        };

        if trimmed.is_empty() {
            return Err(reject("empty"));
        }
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(reject("missing '@'"));
        };
        if local.is_empty() || domain.is_empty() {
            return Err(reject("missing local part or domain"));
        }

        Ok(Self(trimmed.to_string()))
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_address() {
        let email: Email = "alice@example.com".parse().expect("should parse");
        assert_eq!(email.as_str(), "alice@example.com");
        assert_eq!(email.to_string(), "alice@example.com");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let email: Email = "  bob@example.com\n".parse().expect("should parse");
        assert_eq!(email.as_str(), "bob@example.com");
    }

    #[test]
    fn rejects_empty() {
        let err = "   ".parse::<Email>().unwrap_err();
        assert_eq!(err.reason, "empty");
    }

    #[test]
    fn rejects_missing_at() {
        assert!("alice.example.com".parse::<Email>().is_err());
    }

    #[test]
    fn rejects_missing_parts() {
        assert!("@example.com".parse::<Email>().is_err());
        assert!("alice@".parse::<Email>().is_err());
    }

    #[test]
    fn deserialize_validates() {
        let parsed: Result<Email, _> = serde_json::from_str("\"not-an-email\"");
        assert!(parsed.is_err());

        let parsed: Email = serde_json::from_str("\"carol@example.com\"").expect("deserialize");
        assert_eq!(parsed.as_str(), "carol@example.com");
    }
}
