use crate::{
    error::{AuthError, Result},
    jwt::issue_token,
    password::{hash_password, verify_password},
    token::{generate_token, is_well_formed},
};
use chrono::{Duration, Utc};
use flockkit_mail::{LinkBuilder, Mailer};
use flockkit_store::{Account, AccountKind, AccountStore};

/// Minimum accepted password length, checked before any hashing or lookup.
const MIN_PASSWORD_LEN: usize = 6;

/// Orchestrates the credential lifecycle: registration, login,
/// password-reset request/perform, and email verification.
///
/// Generic over the account store and the mail collaborator; both account
/// kinds flow through the same code, with kind-specific policy confined to
/// [`AccountKind`].
pub struct CredentialService<S, M> {
    store: S,
    mailer: M,
    links: LinkBuilder,
    jwt_secret: String,
    session_ttl_seconds: i64,
    reset_token_ttl_seconds: i64,
}

impl<S, M> CredentialService<S, M>
where
    S: AccountStore,
    M: Mailer,
{
    pub fn new(
        store: S,
        mailer: M,
        links: LinkBuilder,
        jwt_secret: String,
        session_ttl_seconds: i64,
        reset_token_ttl_seconds: i64,
    ) -> Self {
        Self {
            store,
            mailer,
            links,
            jwt_secret,
            session_ttl_seconds,
            reset_token_ttl_seconds,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Register a new account. The password is hashed before anything is
    /// persisted; kinds that require verification get a verification token
    /// and a mailed link.
    pub async fn register(
        &self,
        kind: AccountKind,
        email: &str,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<Account> {
        let email = normalize_email(email);
        let mut errors = validate_email(&email);
        errors.extend(validate_password(password));
        if username.trim().is_empty() {
            errors.push("Username must not be empty".to_string());
        }
        if !errors.is_empty() {
            return Err(AuthError::validation(errors));
        }

        let password_hash = hash_password(password)?;
        let verification_token = kind.requires_verification().then(generate_token);

        let account = Account::new(
            kind,
            email,
            username.trim().to_string(),
            password_hash,
            role.to_string(),
            verification_token.clone(),
        );

        let account = match self.store.insert(account).await {
            Ok(account) => account,
            Err(e @ (flockkit_store::StoreError::DuplicateEmail
            | flockkit_store::StoreError::DuplicateUsername)) => {
                return Err(AuthError::validation(vec![e.to_string()]));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(token) = verification_token {
            let link = self.links.email_verification(&token);
            self.mailer
                .send_email_verification(&account.email, &link)
                .await?;
        }

        tracing::info!(kind = %kind, account = %account.id, "account registered");
        Ok(account)
    }

    /// Authenticate and mint a session token.
    ///
    /// Unknown email and wrong password return the same generic error so
    /// the response does not reveal which field was wrong. An unverified
    /// account of a kind that gates on verification gets a distinct
    /// "verify your email" outcome.
    pub async fn login(
        &self,
        kind: AccountKind,
        email: &str,
        password: &str,
    ) -> Result<(String, Account)> {
        let email = normalize_email(email);
        let mut errors = validate_email(&email);
        errors.extend(validate_password(password));
        if !errors.is_empty() {
            return Err(AuthError::validation(errors));
        }

        let account = self
            .store
            .find_by_email(kind, &email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if kind.requires_verification() && !account.is_verified {
            return Err(AuthError::Unverified);
        }

        if !verify_password(password, &account.password_hash)? {
            tracing::warn!(kind = %kind, "login failed: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let token = issue_token(&account, &self.jwt_secret, self.session_ttl_seconds)?;
        tracing::info!(kind = %kind, account = %account.id, "login succeeded");
        Ok((token, account))
    }

    /// Mint a reset token for the account behind `email` and mail the link.
    ///
    /// The persist is conditional on the previously stored token value, so
    /// two concurrent requests cannot both win; the loser surfaces as a
    /// conflict instead of silently overwriting. A failed dispatch rolls
    /// the token back before the error is returned, so the caller is never
    /// told "email sent" state exists when it does not.
    pub async fn request_password_reset(&self, kind: AccountKind, email: &str) -> Result<()> {
        let email = normalize_email(email);
        let account = self
            .store
            .find_by_email(kind, &email)
            .await?
            .ok_or(AuthError::NotFound("email"))?;

        // Any existing token, expired or not, is invalidated by the swap.
        let previous = account.reset_token.clone();
        let token = generate_token();
        let expires_at = Utc::now() + Duration::seconds(self.reset_token_ttl_seconds);

        self.store
            .replace_reset_token(
                account.id,
                previous.as_deref(),
                Some(token.clone()),
                Some(expires_at),
            )
            .await?;

        let link = self.links.password_reset(&token);
        if let Err(e) = self.mailer.send_password_reset(&account.email, &link).await {
            tracing::error!(account = %account.id, error = %e, "reset mail dispatch failed");
            self.store
                .replace_reset_token(account.id, Some(&token), None, None)
                .await?;
            return Err(e.into());
        }

        tracing::info!(kind = %kind, account = %account.id, "password reset requested");
        Ok(())
    }

    /// Consume a reset token and replace the password.
    ///
    /// Malformed tokens are rejected on shape alone, before any store
    /// access. The hash replacement and the token clearing are one store
    /// update; a token never survives a successful reset.
    pub async fn perform_password_reset(&self, token: &str, new_password: &str) -> Result<()> {
        if !is_well_formed(token) {
            return Err(AuthError::InvalidToken("Malformed reset token"));
        }

        let errors = validate_password(new_password);
        if !errors.is_empty() {
            return Err(AuthError::validation(errors));
        }

        let account = self
            .store
            .find_by_reset_token(token)
            .await?
            .ok_or(AuthError::InvalidToken("Reset token not found"))?;

        if !account.reset_token_usable(Utc::now()) {
            return Err(AuthError::InvalidToken("Invalid or expired reset token"));
        }

        let new_hash = hash_password(new_password)?;
        self.store
            .consume_reset_token(account.id, token, new_hash)
            .await
            .map_err(|e| match e {
                // Consumed between lookup and update.
                flockkit_store::StoreError::TokenConflict => {
                    AuthError::InvalidToken("Invalid or expired reset token")
                }
                other => AuthError::Store(other),
            })?;

        tracing::info!(account = %account.id, "password reset completed");
        Ok(())
    }

    /// Consume a verification token. After the one successful call the
    /// token is gone, so a replay reads as not-found.
    pub async fn verify_email(&self, token: &str) -> Result<Account> {
        let account = self
            .store
            .find_by_verification_token(token)
            .await?
            .ok_or(AuthError::NotFound("verification token"))?;

        self.store
            .consume_verification_token(account.id, token)
            .await
            .map_err(|e| match e {
                flockkit_store::StoreError::TokenConflict => {
                    AuthError::NotFound("verification token")
                }
                other => AuthError::Store(other),
            })?;

        tracing::info!(account = %account.id, "email verified");
        self.store
            .find_by_id(account.id)
            .await?
            .ok_or(AuthError::NotFound("account"))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let well_formed = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    }) && !email.contains(char::is_whitespace);
    if !well_formed {
        errors.push("Email must be a valid email address".to_string());
    }
    errors
}

fn validate_password(password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if password.len() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    errors
}
