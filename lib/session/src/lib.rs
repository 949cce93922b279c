//! Sign-in and session gating for tasklog.
//!
//! This crate provides:
//! - Identity token decoding (`IdentityToken`, `IdentityClaims`)
//! - The persisted session record (`SessionRecord`) and its storage
//!   (`SessionStore`, `MemorySessionStore`, `FileSessionStore`)
//! - The permission oracle seam (`PermissionOracle`)
//! - The sign-in flow (`Authenticator`) and the per-invocation check
//!   (`SessionGate`)
//!
//! # Access Model
//!
//! No protected operation proceeds unless a session record exists, its token
//! is unexpired, and the permission oracle has just answered true for the
//! token's email. Any failure clears the record.
//!
//! # Example
//!
//! ```
//! use tasklog_session::{MemorySessionStore, PermissionOracle, SessionGate, GateOutcome};
//! use tasklog_core::{Email, RemoteError};
//!
//! struct AllowEveryone;
//!
//! #[async_trait::async_trait]
//! impl PermissionOracle for AllowEveryone {
//!     async fn check_permission(&self, _email: &Email) -> Result<bool, RemoteError> {
//!         Ok(true)
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = MemorySessionStore::new();
//! let outcome = SessionGate::new(&store, &AllowEveryone).guard().await;
//!
//! // Nothing stored yet, so the gate sends the caller to login.
//! assert!(matches!(outcome, GateOutcome::Denied(_)));
//! # });
//! ```

pub mod authenticator;
pub mod claims;
pub mod error;
pub mod gate;
pub mod oracle;
pub mod record;
pub mod store;

// Re-export main types at crate root
pub use authenticator::{Authenticator, LoginOutcome, ProviderCallback};
pub use claims::{IdentityClaims, IdentityToken};
pub use error::{DenyReason, StoreError, TokenError};
pub use gate::{Destination, GateOutcome, SessionGate};
pub use oracle::PermissionOracle;
pub use record::SessionRecord;
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StorageKey};
