use flockkit_mail::MailError;
use flockkit_store::StoreError;
use thiserror::Error;

/// Error taxonomy for the credential lifecycle.
///
/// Request-shape problems (`Validation`), domain misses (`NotFound`,
/// `InvalidToken`), authentication outcomes (`InvalidCredentials`,
/// `Unverified`, `Forbidden`) and infrastructure failures each map to one
/// HTTP status at the API boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Covers both unknown-email and wrong-password so a caller cannot
    /// tell which field was wrong.
    #[error("Invalid Credentials")]
    InvalidCredentials,

    #[error("Please verify your email before logging in")]
    Unverified,

    #[error("{0}")]
    InvalidToken(&'static str),

    #[error("Missing or invalid authorization")]
    Forbidden,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Token validation failed: {0}")]
    TokenValidation(String),

    #[error("Token expired")]
    TokenExpired,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Mail(#[from] MailError),
}

impl AuthError {
    /// Messages returned for each individual validation failure.
    pub fn validation(messages: Vec<String>) -> Self {
        AuthError::Validation(messages)
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
