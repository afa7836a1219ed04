//! Password hashing and secret generation
//!
//! Passwords are stored as Argon2id PHC strings. Clear-text input lives in a
//! [`ClearPassword`], which wipes its buffer when dropped.

use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{BizdeskError, BizdeskResult};

const MIN_PASSWORD_LEN: usize = 8;

/// A clear-text password, zeroed on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ClearPassword(String);

impl ClearPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn validate(&self) -> BizdeskResult<()> {
        if self.0.chars().count() < MIN_PASSWORD_LEN {
            return Err(BizdeskError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for ClearPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClearPassword([REDACTED])")
    }
}

/// Hash a password with Argon2id and a fresh random salt
pub fn hash_password(password: &ClearPassword) -> BizdeskResult<String> {
    password.validate()?;

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_str().as_bytes(), &salt)
        .map_err(|e| BizdeskError::Auth(format!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Check a password against a stored PHC string
pub fn verify_password(password: &ClearPassword, stored: &str) -> BizdeskResult<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| BizdeskError::Auth(format!("Stored password hash is invalid: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_str().as_bytes(), &parsed)
        .is_ok())
}

/// Random secret of `bytes` bytes, base64 encoded
pub fn generate_secret(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    let encoded = STANDARD.encode(&buf);
    buf.zeroize();
    encoded
}

/// Single-use two-factor recovery codes
pub fn generate_recovery_codes(count: usize) -> Vec<String> {
    (0..count)
        .map(|_| {
            let mut buf = [0u8; 6];
            OsRng.fill_bytes(&mut buf);
            URL_SAFE_NO_PAD.encode(buf)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = ClearPassword::new("correct horse battery");
        let hash = hash_password(&password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&password, &hash).unwrap());
        assert!(!verify_password(&ClearPassword::new("wrong password"), &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_hashes() {
        let password = ClearPassword::new("correct horse battery");
        assert_ne!(
            hash_password(&password).unwrap(),
            hash_password(&password).unwrap()
        );
    }

    #[test]
    fn test_short_password_rejected() {
        let err = hash_password(&ClearPassword::new("short")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_invalid_stored_hash() {
        assert!(verify_password(&ClearPassword::new("whatever1"), "plain").is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let password = ClearPassword::new("hunter22!");
        assert!(!format!("{:?}", password).contains("hunter"));
    }

    #[test]
    fn test_generated_secrets() {
        let a = generate_secret(20);
        let b = generate_secret(20);
        assert_ne!(a, b);
        assert_eq!(STANDARD.decode(&a).unwrap().len(), 20);

        let codes = generate_recovery_codes(8);
        assert_eq!(codes.len(), 8);
        assert!(codes.iter().all(|c| c.len() == 8));
    }
}
