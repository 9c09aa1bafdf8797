use rand_core::{OsRng, RngCore};
use std::fmt::Write;

/// Raw entropy per opaque token.
const TOKEN_BYTES: usize = 32;

/// Hex characters in a well-formed token.
pub const TOKEN_LEN: usize = TOKEN_BYTES * 2;

/// Generate an opaque single-use token: 32 CSPRNG bytes, lowercase hex.
/// Used for both password-reset and email-verification tokens; the caller
/// owns storage and expiry.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);

    bytes.iter().fold(
        String::with_capacity(TOKEN_LEN),
        |mut token, byte| {
            let _ = write!(token, "{byte:02x}");
            token
        },
    )
}

/// Shape check for inbound tokens, so malformed values are rejected before
/// any store lookup.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_well_formed() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(is_well_formed(&token));
    }

    #[test]
    fn test_generated_tokens_differ() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_shape_check_rejects_malformed_tokens() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("abc123"));
        // Uppercase hex is not the shape we emit.
        assert!(!is_well_formed(&generate_token().to_uppercase()));
        // Right length, non-hex character.
        let mut token = generate_token();
        token.replace_range(0..1, "g");
        assert!(!is_well_formed(&token));
    }
}
