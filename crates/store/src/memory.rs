use crate::{Account, AccountKind, AccountStore, Result, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory account store.
///
/// A `RwLock`-guarded map keyed by account id. Every mutation happens under
/// one write-lock acquisition, which gives the conditional token updates
/// their atomicity.
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert(&self, account: Account) -> Result<Account> {
        let mut accounts = self.accounts.write().await;
        for existing in accounts.values() {
            if existing.kind != account.kind {
                continue;
            }
            if existing.email == account.email {
                return Err(StoreError::DuplicateEmail);
            }
            if existing.username == account.username {
                return Err(StoreError::DuplicateUsername);
            }
        }
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, kind: AccountKind, email: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.kind == kind && a.email == email)
            .cloned())
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn find_by_verification_token(&self, token: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.verification_token.as_deref() == Some(token))
            .cloned())
    }

    async fn replace_reset_token(
        &self,
        id: Uuid,
        previous: Option<&str>,
        token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or(StoreError::AccountNotFound)?;
        if account.reset_token.as_deref() != previous {
            return Err(StoreError::TokenConflict);
        }
        account.reset_token = token;
        account.reset_token_expires_at = expires_at;
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn consume_reset_token(&self, id: Uuid, token: &str, new_hash: String) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or(StoreError::AccountNotFound)?;
        if account.reset_token.as_deref() != Some(token) {
            return Err(StoreError::TokenConflict);
        }
        account.password_hash = new_hash;
        account.reset_token = None;
        account.reset_token_expires_at = None;
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn consume_verification_token(&self, id: Uuid, token: &str) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or(StoreError::AccountNotFound)?;
        if account.verification_token.as_deref() != Some(token) {
            return Err(StoreError::TokenConflict);
        }
        account.verification_token = None;
        account.is_verified = true;
        account.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn member(email: &str, username: &str) -> Account {
        Account::new(
            AccountKind::Member,
            email.to_string(),
            username.to_string(),
            "$argon2id$stub".to_string(),
            "member".to_string(),
            Some(format!("verify-{username}")),
        )
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email_per_kind() {
        let store = MemoryStore::new();
        store.insert(member("a@example.com", "a")).await.unwrap();

        let err = store
            .insert(member("a@example.com", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));

        // Same email under the other kind is a different namespace.
        let mut user = member("a@example.com", "a");
        user.kind = AccountKind::User;
        store.insert(user).await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_username() {
        let store = MemoryStore::new();
        store.insert(member("a@example.com", "same")).await.unwrap();
        let err = store
            .insert(member("b@example.com", "same"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername));
    }

    #[tokio::test]
    async fn test_replace_reset_token_is_conditional() {
        let store = MemoryStore::new();
        let acct = store.insert(member("a@example.com", "a")).await.unwrap();
        let expires = Utc::now() + Duration::hours(1);

        store
            .replace_reset_token(acct.id, None, Some("first".to_string()), Some(expires))
            .await
            .unwrap();

        // A second writer still expecting no token loses the race.
        let err = store
            .replace_reset_token(acct.id, None, Some("second".to_string()), Some(expires))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TokenConflict));

        // Matching the current value succeeds.
        store
            .replace_reset_token(acct.id, Some("first"), Some("second".to_string()), Some(expires))
            .await
            .unwrap();
        let found = store.find_by_reset_token("second").await.unwrap().unwrap();
        assert_eq!(found.id, acct.id);
        assert!(store.find_by_reset_token("first").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_consume_reset_token_clears_token_and_expiry() {
        let store = MemoryStore::new();
        let acct = store.insert(member("a@example.com", "a")).await.unwrap();
        store
            .replace_reset_token(
                acct.id,
                None,
                Some("tok".to_string()),
                Some(Utc::now() + Duration::hours(1)),
            )
            .await
            .unwrap();

        store
            .consume_reset_token(acct.id, "tok", "$argon2id$new".to_string())
            .await
            .unwrap();

        let updated = store.find_by_id(acct.id).await.unwrap().unwrap();
        assert_eq!(updated.password_hash, "$argon2id$new");
        assert!(updated.reset_token.is_none());
        assert!(updated.reset_token_expires_at.is_none());

        // Consuming again fails: the token did not survive the reset.
        let err = store
            .consume_reset_token(acct.id, "tok", "$argon2id$other".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TokenConflict));
    }

    #[tokio::test]
    async fn test_consume_verification_token_is_single_use() {
        let store = MemoryStore::new();
        let acct = store.insert(member("a@example.com", "a")).await.unwrap();
        let token = acct.verification_token.clone().unwrap();

        store.consume_verification_token(acct.id, &token).await.unwrap();

        let updated = store.find_by_id(acct.id).await.unwrap().unwrap();
        assert!(updated.is_verified);
        assert!(updated.verification_token.is_none());
        assert!(store
            .find_by_verification_token(&token)
            .await
            .unwrap()
            .is_none());

        let err = store
            .consume_verification_token(acct.id, &token)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TokenConflict));
    }
}
