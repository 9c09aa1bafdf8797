//! Account persistence for the credential lifecycle.
//!
//! The production deployment sits in front of a document database; this
//! crate defines the storage contract the lifecycle service needs
//! (`AccountStore`) plus an in-memory implementation that doubles as the
//! arbitration point for tests and single-process deployments.

pub mod memory;
pub mod model;

pub use memory::MemoryStore;
pub use model::{Account, AccountKind};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("An account with this email already exists")]
    DuplicateEmail,

    #[error("An account with this username already exists")]
    DuplicateUsername,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Token state changed concurrently")]
    TokenConflict,

    #[error("Store error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage contract for account records.
///
/// Token updates are conditional: they re-match the token value they are
/// replacing or consuming, so two racing requests cannot both win. The
/// loser observes [`StoreError::TokenConflict`].
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist a new account. Email and username must be unique per kind.
    async fn insert(&self, account: Account) -> Result<Account>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>>;

    /// Email is the unique login/reset lookup key, matched per kind.
    async fn find_by_email(&self, kind: AccountKind, email: &str) -> Result<Option<Account>>;

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<Account>>;

    async fn find_by_verification_token(&self, token: &str) -> Result<Option<Account>>;

    /// Replace the stored reset token, matching on the previous value.
    /// `token`/`expires_at` of `None` clears the token (compensating write
    /// after a failed mail dispatch, or invalidation of a stale token).
    async fn replace_reset_token(
        &self,
        id: Uuid,
        previous: Option<&str>,
        token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()>;

    /// Consume a reset token: replace the password hash and clear the token
    /// and its expiry as one update. Fails if the token no longer matches.
    async fn consume_reset_token(&self, id: Uuid, token: &str, new_hash: String) -> Result<()>;

    /// Consume a verification token: clear it and mark the account verified
    /// as one update. Fails if the token no longer matches.
    async fn consume_verification_token(&self, id: Uuid, token: &str) -> Result<()>;
}

#[async_trait]
impl<T: AccountStore + ?Sized> AccountStore for std::sync::Arc<T> {
    async fn insert(&self, account: Account) -> Result<Account> {
        (**self).insert(account).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        (**self).find_by_id(id).await
    }

    async fn find_by_email(&self, kind: AccountKind, email: &str) -> Result<Option<Account>> {
        (**self).find_by_email(kind, email).await
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<Account>> {
        (**self).find_by_reset_token(token).await
    }

    async fn find_by_verification_token(&self, token: &str) -> Result<Option<Account>> {
        (**self).find_by_verification_token(token).await
    }

    async fn replace_reset_token(
        &self,
        id: Uuid,
        previous: Option<&str>,
        token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        (**self)
            .replace_reset_token(id, previous, token, expires_at)
            .await
    }

    async fn consume_reset_token(&self, id: Uuid, token: &str, new_hash: String) -> Result<()> {
        (**self).consume_reset_token(id, token, new_hash).await
    }

    async fn consume_verification_token(&self, id: Uuid, token: &str) -> Result<()> {
        (**self).consume_verification_token(id, token).await
    }
}
