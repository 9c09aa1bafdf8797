//! Credential lifecycle: password hashing, opaque reset/verification
//! tokens, session token issue/verify, and the service that orchestrates
//! login, password reset, and email verification over an account store.

mod error;
mod jwt;
mod password;
mod token;

pub mod service;

pub use error::{AuthError, Result};
pub use jwt::{Claims, issue_token, verify_token};
pub use password::{hash_password, verify_password};
pub use service::CredentialService;
pub use token::{TOKEN_LEN, generate_token, is_well_formed};
