//! The locally persisted session record.
//!
//! A record is written once a sign-in has been granted and read back on
//! every protected invocation. It is deleted on logout, on expiry and on
//! any denial.

use tracing::debug;

use crate::claims::{IdentityClaims, IdentityToken};
use crate::error::StoreError;
use crate::store::{SessionStore, StorageKey};

/// Proof of a previously granted sign-in.
///
/// Fields mirror the stored strings. `name` and `picture` are empty when the
/// token carried no such claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    token: IdentityToken,
    email: String,
    name: String,
    picture: String,
}

impl SessionRecord {
    /// Creates a record from a token and its decoded claims.
    #[must_use]
    pub fn from_claims(token: IdentityToken, claims: &IdentityClaims) -> Self {
        Self {
            token,
            email: claims.email().to_string(),
            name: claims.name().unwrap_or_default().to_string(),
            picture: claims.picture().unwrap_or_default().to_string(),
        }
    }

    /// Creates a record with all fields specified.
    #[must_use]
    pub fn with_all_fields(
        token: IdentityToken,
        email: impl Into<String>,
        name: impl Into<String>,
        picture: impl Into<String>,
    ) -> Self {
        Self {
            token,
            email: email.into(),
            name: name.into(),
            picture: picture.into(),
        }
    }

    /// Returns the stored identity token.
    #[must_use]
    pub fn token(&self) -> &IdentityToken {
        &self.token
    }

    /// Returns the stored email. May be empty if the store was edited.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the stored display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stored picture URL.
    #[must_use]
    pub fn picture(&self) -> &str {
        &self.picture
    }

    /// Loads the record from `store`.
    ///
    /// Returns `None` when no token is stored. Missing profile keys load as
    /// empty strings.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn load(store: &dyn SessionStore) -> Result<Option<Self>, StoreError> {
        let Some(token) = store.get(StorageKey::Token).await? else {
            return Ok(None);
        };

        Ok(Some(Self {
            token: IdentityToken::new(token),
            email: store.get(StorageKey::Email).await?.unwrap_or_default(),
            name: store.get(StorageKey::Name).await?.unwrap_or_default(),
            picture: store.get(StorageKey::Picture).await?.unwrap_or_default(),
        }))
    }

    /// Writes the record to `store`, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub async fn save(&self, store: &dyn SessionStore) -> Result<(), StoreError> {
        store.set(StorageKey::Token, self.token.as_str()).await?;
        store.set(StorageKey::Email, &self.email).await?;
        store.set(StorageKey::Name, &self.name).await?;
        store.set(StorageKey::Picture, &self.picture).await?;
        debug!(email = %self.email, "session record saved");
        Ok(())
    }

    /// Removes any record from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub async fn clear(store: &dyn SessionStore) -> Result<(), StoreError> {
        store.clear().await?;
        debug!("session record cleared");
        Ok(())
    }
}
