use argon2::{
    password_hash::{phc::PasswordHash, PasswordHasher, PasswordVerifier},
    Argon2, Params,
};
use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

/// Session tokens are this many random bytes, hex-encoded on the wire.
const TOKEN_BYTES: usize = 32;

/// INSECURE_PASSWORD_HASHING swaps in throwaway argon2 parameters so that
/// signup-heavy test runs don't spend their time hashing. Never set this in
/// production.
static INSECURE_HASHING: LazyLock<bool> =
    LazyLock::new(|| std::env::var("INSECURE_PASSWORD_HASHING").is_ok());

pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .expect("Failed to generate random bytes");
    hex::encode(bytes)
}

/// Only the SHA-256 of a session token is stored; a leaked sessions table
/// does not yield usable bearer tokens.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn argon2_instance() -> Argon2<'static> {
    if *INSECURE_HASHING {
        let params = Params::new(1024, 1, 1, None).expect("static argon2 params are valid");
        Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
    } else {
        Argon2::default()
    }
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let hash = argon2_instance().hash_password(password.as_bytes())?;
    Ok(hash.to_string())
}

/// A hash that fails to parse counts as a mismatch rather than an error;
/// login treats both the same way.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    argon2_instance()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_hex_of_the_expected_width() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn consecutive_tokens_differ() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn token_hashing_is_deterministic() {
        let token = "a-session-token";
        assert_eq!(hash_token(token), hash_token(token));
        assert_ne!(hash_token(token), hash_token("another-token"));
    }

    #[test]
    fn unparseable_hash_is_a_mismatch_not_a_panic() {
        assert!(!verify_password("secret", "not-a-phc-string"));
        assert!(!verify_password("secret", ""));
    }
}
