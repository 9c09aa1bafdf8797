use chrono::{Duration, Utc};
use flockkit_store::{Account, AccountKind};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account id)
    pub sub: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub kind: AccountKind,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn new(account: &Account, ttl_seconds: i64) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::seconds(ttl_seconds);

        Self {
            sub: account.id.to_string(),
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role.clone(),
            kind: account.kind,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Issue a signed session token for an authenticated account.
///
/// The secret comes from configuration; config load already rejected empty
/// secrets, and this guards the same invariant for direct construction.
pub fn issue_token(account: &Account, secret: &str, ttl_seconds: i64) -> Result<String> {
    if secret.trim().is_empty() {
        return Err(AuthError::TokenGeneration(
            "signing secret is not configured".to_string(),
        ));
    }

    let claims = Claims::new(account, ttl_seconds);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verify a session token's signature and expiry and return its claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AuthError::TokenValidation(e.to_string()))?;

    let claims = token_data.claims;

    if claims.is_expired() {
        return Err(AuthError::TokenExpired);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new(
            AccountKind::User,
            "admin@example.com".to_string(),
            "admin".to_string(),
            "$argon2id$stub".to_string(),
            "admin".to_string(),
            None,
        )
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let secret = "test_secret";
        let acct = account();

        let token = issue_token(&acct, secret, 3600).unwrap();
        let claims = verify_token(&token, secret).unwrap();

        assert_eq!(claims.sub, acct.id.to_string());
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.kind, AccountKind::User);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(&account(), "correct_secret", 3600).unwrap();
        assert!(verify_token(&token, "wrong_secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token(&account(), "test_secret", -60).unwrap();
        assert!(verify_token(&token, "test_secret").is_err());
    }

    #[test]
    fn test_empty_secret_fails_closed() {
        let result = issue_token(&account(), "", 3600);
        assert!(matches!(result, Err(AuthError::TokenGeneration(_))));
        assert!(matches!(
            issue_token(&account(), "   ", 3600),
            Err(AuthError::TokenGeneration(_))
        ));
    }
}
