//! Wire types of the remote endpoint and their interpretation.
//!
//! Responses carry a `status` of `"success"` or `"error"`, with an
//! optional human-readable `message` on error. The permission answer is
//! read even when `status` is absent.

use serde::Deserialize;
use tasklog_core::RemoteError;
use tasklog_tasks::UserSummary;

/// `action` query value for the permission check.
pub const ACTION_VERIFY_PERMISSION: &str = "verifyPermission";
/// `action` query value for the user summary.
pub const ACTION_USER_SUMMARY: &str = "getUserSummary";

const STATUS_ERROR: &str = "error";
const STATUS_SUCCESS: &str = "success";

/// Answer to `verifyPermission`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub has_permission: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Answer to a task submission.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Answer to `getUserSummary`.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryResponse {
    pub status: String,
    #[serde(default)]
    pub summary: Option<UserSummary>,
    #[serde(default)]
    pub message: Option<String>,
}

fn rejected(message: Option<String>, default: &str) -> RemoteError {
    RemoteError::Rejected {
        message: message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| default.to_string()),
    }
}

fn decode<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, RemoteError> {
    serde_json::from_str(body).map_err(|e| RemoteError::MalformedResponse {
        reason: e.to_string(),
    })
}

/// Interprets a `verifyPermission` body.
///
/// Only an explicit `hasPermission: true` grants access.
pub fn parse_permission(body: &str) -> Result<bool, RemoteError> {
    let response: PermissionResponse = decode(body)?;
    if response.status == STATUS_ERROR {
        return Err(rejected(response.message, "Permission check failed"));
    }
    Ok(response.has_permission == Some(true))
}

/// Interprets a task submission body.
pub fn parse_submission(body: &str) -> Result<(), RemoteError> {
    let response: StatusResponse = decode(body)?;
    if response.status == STATUS_SUCCESS {
        Ok(())
    } else {
        Err(rejected(response.message, "Failed to save data"))
    }
}

/// Interprets a `getUserSummary` body.
pub fn parse_summary(body: &str) -> Result<UserSummary, RemoteError> {
    let response: SummaryResponse = decode(body)?;
    if response.status == STATUS_ERROR {
        return Err(rejected(response.message, "Failed to get summary data"));
    }
    response.summary.ok_or_else(|| RemoteError::MalformedResponse {
        reason: "missing summary".to_string(),
    })
}
