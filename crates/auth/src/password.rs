use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand_core::OsRng;

use crate::error::{AuthError, Result};

/// Hash a password with Argon2 and a fresh random salt.
///
/// The salt is embedded in the returned PHC string; the work factor is the
/// library default and never derived from request input.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against a stored PHC digest. A mismatch is `Ok(false)`;
/// only an unparseable digest is an error.
pub fn verify_password(password: &str, digest: &str) -> Result<bool> {
    let parsed = PasswordHash::new(digest).map_err(|e| AuthError::Hashing(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ_between_hashes() {
        let first = hash_password("same password").unwrap();
        let second = hash_password("same password").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("same password", &first).unwrap());
        assert!(verify_password("same password", &second).unwrap());
    }

    #[test]
    fn test_malformed_digest_is_an_error() {
        assert!(verify_password("anything", "not a phc string").is_err());
    }
}
