//! Sign-in handling.
//!
//! The identity provider calls back with a signed credential. The
//! authenticator decodes it, asks the permission oracle about the email it
//! carries, and only then writes the session record.

use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::claims::IdentityToken;
use crate::error::{DenyReason, StoreError};
use crate::gate::{Destination, GateOutcome, SessionGate};
use crate::oracle::PermissionOracle;
use crate::record::SessionRecord;
use crate::store::SessionStore;

/// Payload delivered by the identity provider after sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderCallback {
    /// The signed identity token.
    pub credential: String,
}

impl ProviderCallback {
    /// Wraps a raw credential string.
    #[must_use]
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
        }
    }
}

/// Result of a sign-in attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The session record was written.
    Authenticated(SessionRecord),
    /// Sign-in was refused; any previous record has been cleared.
    Denied(DenyReason),
}

impl LoginOutcome {
    /// Returns where the caller should go after this outcome.
    #[must_use]
    pub fn destination(&self) -> Destination {
        match self {
            Self::Authenticated(_) => Destination::TaskLogger,
            Self::Denied(_) => Destination::Login,
        }
    }
}

impl From<GateOutcome> for LoginOutcome {
    fn from(outcome: GateOutcome) -> Self {
        match outcome {
            GateOutcome::Allowed { record, .. } => Self::Authenticated(record),
            GateOutcome::Denied(reason) => Self::Denied(reason),
        }
    }
}

/// Turns provider callbacks into session records.
pub struct Authenticator<'a> {
    store: &'a dyn SessionStore,
    oracle: &'a dyn PermissionOracle,
}

impl<'a> Authenticator<'a> {
    /// Creates an authenticator over the given store and oracle.
    #[must_use]
    pub fn new(store: &'a dyn SessionStore, oracle: &'a dyn PermissionOracle) -> Self {
        Self { store, oracle }
    }

    /// Handles a provider callback.
    ///
    /// The credential's signature is not checked; the provider's client
    /// library has already validated it before calling back.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, callback: &ProviderCallback) -> LoginOutcome {
        let token = IdentityToken::new(callback.credential.clone());
        let claims = match token.decode_unverified() {
            Ok(claims) => claims,
            Err(e) => {
                warn!(error = %e, "provider credential could not be decoded");
                return self.deny(e.into()).await;
            }
        };

        match self.oracle.check_permission(claims.email()).await {
            Ok(true) => {}
            Ok(false) => {
                info!(email = %claims.email(), "sign-in refused by permission oracle");
                return self.deny(DenyReason::PermissionDenied).await;
            }
            Err(e) => {
                warn!(email = %claims.email(), error = %e, "permission check failed");
                return self.deny(e.into()).await;
            }
        }

        let record = SessionRecord::from_claims(token, &claims);
        if let Err(e) = record.save(self.store).await {
            warn!(error = %e, "failed to persist session record");
            return self.deny(e.into()).await;
        }

        info!(email = %claims.email(), "signed in");
        LoginOutcome::Authenticated(record)
    }

    /// Resumes a stored session, if one is still valid and permitted.
    ///
    /// Runs the session gate, which clears the record on any failure.
    pub async fn resume(&self) -> LoginOutcome {
        SessionGate::new(self.store, self.oracle).guard().await.into()
    }

    /// Clears the session record and returns the login destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub async fn logout(&self) -> Result<Destination, StoreError> {
        SessionRecord::clear(self.store).await?;
        info!("signed out");
        Ok(Destination::Login)
    }

    async fn deny(&self, reason: DenyReason) -> LoginOutcome {
        if let Err(e) = SessionRecord::clear(self.store).await {
            warn!(error = %e, "failed to clear session record");
        }
        LoginOutcome::Denied(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::unsigned_token;
    use crate::error::TokenError;
    use crate::store::{MemorySessionStore, StorageKey};
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::sync::Mutex;
    use tasklog_core::{Email, RemoteError};

    /// Oracle answering from a fixed script, recording the emails asked about.
    struct ScriptedOracle {
        answer: Result<bool, RemoteError>,
        asked: Mutex<Vec<String>>,
    }

    impl ScriptedOracle {
        fn answering(answer: Result<bool, RemoteError>) -> Self {
            Self {
                answer,
                asked: Mutex::new(Vec::new()),
            }
        }

        fn asked(&self) -> Vec<String> {
            self.asked.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PermissionOracle for ScriptedOracle {
        async fn check_permission(&self, email: &Email) -> Result<bool, RemoteError> {
            self.asked.lock().unwrap().push(email.to_string());
            self.answer.clone()
        }
    }

    fn credential(email: &str) -> ProviderCallback {
        let now = Utc::now();
        let token = unsigned_token(&json!({
            "email": email,
            "name": "Alice",
            "picture": "https://example.com/a.png",
            "iat": now.timestamp(),
            "exp": (now + Duration::hours(1)).timestamp(),
        }));
        ProviderCallback::new(token.as_str())
    }

    async fn seed_previous_session(store: &MemorySessionStore) {
        store.set(StorageKey::Token, "old.token.value").await.unwrap();
        store
            .set(StorageKey::Email, "previous@example.com")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn granted_sign_in_writes_record() {
        let store = MemorySessionStore::new();
        let oracle = ScriptedOracle::answering(Ok(true));
        let callback = credential("alice@example.com");

        let outcome = Authenticator::new(&store, &oracle)
            .authenticate(&callback)
            .await;

        assert_eq!(outcome.destination(), Destination::TaskLogger);
        assert_eq!(oracle.asked(), vec!["alice@example.com"]);
        assert_eq!(
            store.get(StorageKey::Token).await.unwrap().as_deref(),
            Some(callback.credential.as_str())
        );
        assert_eq!(
            store.get(StorageKey::Email).await.unwrap().as_deref(),
            Some("alice@example.com")
        );
        assert_eq!(
            store.get(StorageKey::Name).await.unwrap().as_deref(),
            Some("Alice")
        );
        assert_eq!(
            store.get(StorageKey::Picture).await.unwrap().as_deref(),
            Some("https://example.com/a.png")
        );
    }

    #[tokio::test]
    async fn refused_sign_in_clears_previous_record() {
        let store = MemorySessionStore::new();
        seed_previous_session(&store).await;
        let oracle = ScriptedOracle::answering(Ok(false));

        let outcome = Authenticator::new(&store, &oracle)
            .authenticate(&credential("alice@example.com"))
            .await;

        assert_eq!(outcome, LoginOutcome::Denied(DenyReason::PermissionDenied));
        assert_eq!(outcome.destination(), Destination::Login);
        assert_eq!(SessionRecord::load(&store).await.unwrap(), None);
        assert_eq!(store.get(StorageKey::Email).await.unwrap(), None);
    }

    #[tokio::test]
    async fn server_error_message_is_surfaced_and_nothing_written() {
        let store = MemorySessionStore::new();
        let oracle = ScriptedOracle::answering(Err(RemoteError::Rejected {
            message: "revoked".to_string(),
        }));

        let outcome = Authenticator::new(&store, &oracle)
            .authenticate(&credential("alice@example.com"))
            .await;

        match outcome {
            LoginOutcome::Denied(reason) => assert_eq!(reason.to_string(), "revoked"),
            other => panic!("expected Denied, got {other:?}"),
        }
        for key in StorageKey::ALL {
            assert_eq!(store.get(key).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn malformed_credential_is_denied_without_oracle_call() {
        let store = MemorySessionStore::new();
        seed_previous_session(&store).await;
        let oracle = ScriptedOracle::answering(Ok(true));

        let outcome = Authenticator::new(&store, &oracle)
            .authenticate(&ProviderCallback::new("not-a-jwt"))
            .await;

        assert!(matches!(
            outcome,
            LoginOutcome::Denied(DenyReason::MalformedToken(TokenError::Malformed { .. }))
        ));
        assert!(oracle.asked().is_empty());
        assert_eq!(SessionRecord::load(&store).await.unwrap(), None);
    }

    #[tokio::test]
    async fn callback_deserializes_from_provider_json() {
        let callback: ProviderCallback =
            serde_json::from_str(r#"{"credential":"a.b.c","select_by":"btn"}"#).unwrap();
        assert_eq!(callback.credential, "a.b.c");
    }

    #[tokio::test]
    async fn resume_allows_valid_session() {
        let store = MemorySessionStore::new();
        let oracle = ScriptedOracle::answering(Ok(true));
        let auth = Authenticator::new(&store, &oracle);
        auth.authenticate(&credential("alice@example.com")).await;

        let outcome = auth.resume().await;

        assert_eq!(outcome.destination(), Destination::TaskLogger);
        assert_eq!(oracle.asked().len(), 2);
    }

    #[tokio::test]
    async fn resume_without_session_stays_on_login() {
        let store = MemorySessionStore::new();
        let oracle = ScriptedOracle::answering(Ok(true));

        let outcome = Authenticator::new(&store, &oracle).resume().await;

        assert_eq!(outcome, LoginOutcome::Denied(DenyReason::NoSession));
    }

    #[tokio::test]
    async fn logout_clears_record() {
        let store = MemorySessionStore::new();
        let oracle = ScriptedOracle::answering(Ok(true));
        let auth = Authenticator::new(&store, &oracle);
        auth.authenticate(&credential("alice@example.com")).await;

        let destination = auth.logout().await.unwrap();

        assert_eq!(destination, Destination::Login);
        assert_eq!(SessionRecord::load(&store).await.unwrap(), None);
        // Logging out twice is harmless.
        auth.logout().await.unwrap();
    }
}
