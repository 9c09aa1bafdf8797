use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two account populations served by the lifecycle: administrative
/// users and congregant members. Both share one record shape; policy
/// differences hang off this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    #[serde(alias = "users")]
    User,
    #[serde(alias = "members")]
    Member,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::User => "user",
            AccountKind::Member => "member",
        }
    }

    /// Members must confirm their email before they can log in; users
    /// are provisioned by staff and skip the gate.
    pub fn requires_verification(&self) -> bool {
        matches!(self, AccountKind::Member)
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored credential record.
///
/// The password hash never leaves the server: it is skipped on
/// serialization, so handlers can return the account as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub kind: AccountKind,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub verification_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account record. The caller supplies an already-hashed
    /// password and, for kinds that require it, a verification token.
    pub fn new(
        kind: AccountKind,
        email: String,
        username: String,
        password_hash: String,
        role: String,
        verification_token: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            email,
            username,
            password_hash,
            role,
            is_verified: false,
            verification_token,
            reset_token: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A reset token is usable only while its expiry is in the future.
    pub fn reset_token_usable(&self, now: DateTime<Utc>) -> bool {
        match (&self.reset_token, self.reset_token_expires_at) {
            (Some(_), Some(expires_at)) => expires_at > now,
            _ => false,
        }
    }
}
