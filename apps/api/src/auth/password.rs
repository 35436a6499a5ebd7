//! Password hashing with Argon2id. Hashes are stored as PHC strings, so the
//! parameters travel with the hash and `verify_password` needs no configuration.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

const MIN_PASSWORD_CHARS: usize = 8;
const MAX_PASSWORD_CHARS: usize = 128;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Returns `Ok(false)` on a wrong password and `Err` only when the stored hash is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::InvalidHash(e.to_string())),
    }
}

/// True when `hash` is a PHC string produced by one of the Argon2 variants.
pub fn is_argon2_hash(hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| parsed.algorithm.as_str().starts_with("argon2"))
        .unwrap_or(false)
}

pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_CHARS {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters long"
        ));
    }
    if len > MAX_PASSWORD_CHARS {
        return Err(format!(
            "Password must be at most {MAX_PASSWORD_CHARS} characters long"
        ));
    }
    if !password.chars().any(char::is_alphabetic) {
        return Err("Password must contain at least one letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_argon2id_phc() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(is_argon2_hash(&hash));
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = hash_password("same-pass-1").unwrap();
        let b = hash_password("same-pass-1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_correct_and_wrong() {
        let hash = hash_password("correct-horse-1").unwrap();
        assert!(verify_password("correct-horse-1", &hash).unwrap());
        assert!(!verify_password("wrong-horse-1", &hash).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash_errors() {
        assert!(verify_password("whatever1", "not-a-hash").is_err());
    }

    #[test]
    fn test_bcrypt_hash_is_not_argon2() {
        assert!(!is_argon2_hash(
            "$2b$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy"
        ));
        assert!(!is_argon2_hash("plaintext"));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("abc12345").is_ok());
        assert!(validate_password("short1").unwrap_err().contains("at least 8"));
        assert!(validate_password("12345678").unwrap_err().contains("letter"));
        assert!(validate_password("abcdefgh").unwrap_err().contains("digit"));
        assert!(validate_password(&"a1".repeat(65)).unwrap_err().contains("at most"));
    }
}
