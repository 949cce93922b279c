//! HTTP client for the remote task-log endpoint.

use crate::error::EndpointError;
use crate::types::{
    ACTION_USER_SUMMARY, ACTION_VERIFY_PERMISSION, parse_permission, parse_submission,
    parse_summary,
};
use async_trait::async_trait;
use reqwest::{Request, Url};
use rootcause::Report;
use std::time::Duration;
use tasklog_core::{Email, RemoteError};
use tasklog_session::PermissionOracle;
use tasklog_tasks::{TaskEntry, TaskLog, UserSummary};
use tracing::{debug, instrument, warn};

/// Client for the single remote endpoint.
///
/// The permission check, task submission and user summary share one URL and
/// are told apart by method and the `action` query parameter.
#[derive(Clone)]
pub struct EndpointClient {
    http: reqwest::Client,
    url: Url,
}

impl EndpointClient {
    /// Creates a client for `url`.
    ///
    /// Without a `timeout` requests wait as long as the server takes.
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self, Report<EndpointError>> {
        let url = Url::parse(url).map_err(|e| EndpointError::InvalidUrl {
            url: url.to_string(),
            details: e.to_string(),
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| EndpointError::ClientBuild {
            details: e.to_string(),
        })?;

        Ok(Self { http, url })
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn permission_request(&self, email: &Email) -> reqwest::Result<Request> {
        self.http
            .get(self.url.clone())
            .query(&[("action", ACTION_VERIFY_PERMISSION), ("email", email.as_str())])
            .build()
    }

    fn submission_request(&self, entry: &TaskEntry) -> reqwest::Result<Request> {
        self.http.post(self.url.clone()).json(entry).build()
    }

    fn summary_request(&self, email: &Email) -> reqwest::Result<Request> {
        self.http
            .get(self.url.clone())
            .query(&[("action", ACTION_USER_SUMMARY), ("email", email.as_str())])
            .build()
    }

    /// Sends `request` and returns the body of a successful response.
    async fn execute(&self, request: reqwest::Result<Request>) -> Result<String, RemoteError> {
        let request = request.map_err(transport)?;
        debug!(method = %request.method(), url = %request.url(), "sending request");

        let response = self.http.execute(request).await.map_err(|e| {
            warn!(error = %e, timeout = e.is_timeout(), "request failed");
            transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "endpoint returned error status");
            return Err(RemoteError::Status {
                code: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        debug!(body = %body, "endpoint response");
        Ok(body)
    }
}

fn transport(e: reqwest::Error) -> RemoteError {
    RemoteError::Transport {
        reason: e.to_string(),
    }
}

#[async_trait]
impl PermissionOracle for EndpointClient {
    #[instrument(skip_all, fields(email = %email))]
    async fn check_permission(&self, email: &Email) -> Result<bool, RemoteError> {
        let body = self.execute(self.permission_request(email)).await?;
        let allowed = parse_permission(&body)?;
        debug!(allowed, "permission check result");
        Ok(allowed)
    }
}

#[async_trait]
impl TaskLog for EndpointClient {
    #[instrument(skip_all, fields(task = %entry.task))]
    async fn submit_task(&self, entry: &TaskEntry) -> Result<(), RemoteError> {
        let body = self.execute(self.submission_request(entry)).await?;
        parse_submission(&body)
    }

    #[instrument(skip_all, fields(email = %email))]
    async fn user_summary(&self, email: &Email) -> Result<UserSummary, RemoteError> {
        let body = self.execute(self.summary_request(email)).await?;
        parse_summary(&body)
    }
}
