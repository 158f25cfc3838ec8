//! Password hashing and verification using Argon2id.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to hash password: {0}")]
pub struct PasswordError(String);

/// Hash a password with a fresh random salt.
///
/// Returns the PHC-formatted string (algorithm, parameters, salt and digest).
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError(e.to_string()))
}

/// A stored hash that cannot be parsed never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is not in PHC format: {}", e);
            false
        }
    }
}

/// [`hash_password`] on the blocking pool; Argon2 is deliberately slow.
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError(e.to_string()))?
}

/// [`verify_password`] on the blocking pool. A failed join never verifies.
pub async fn verify_password_blocking(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret1").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
    }

    #[test]
    fn test_different_salts() {
        let hash1 = hash_password("same-password").unwrap();
        let hash2 = hash_password("same-password").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("same-password", &hash1));
        assert!(verify_password("same-password", &hash2));
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let hash = hash_password_blocking("secret1".to_string()).await.unwrap();
        assert!(verify_password_blocking("secret1".to_string(), hash.clone()).await);
        assert!(!verify_password_blocking("nope".to_string(), hash).await);
    }

    #[test]
    fn test_invalid_hash_format() {
        assert!(!verify_password("password", "not-a-valid-hash"));
        // A bare SHA-256 hex digest is not accepted as a stored hash.
        assert!(!verify_password(
            "password",
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        ));
    }
}
