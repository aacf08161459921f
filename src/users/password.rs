//! Salted argon2id hashes in PHC string form (`$argon2id$v=19$...`).

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::error::{AccountError, Result};

fn hashing_failed(context: &'static str) -> impl FnOnce(password_hash::Error) -> AccountError {
    move |e| {
        error!(error = %e, context, "argon2 failure");
        AccountError::PasswordHash(format!("{context}: {e}"))
    }
}

/// Hashes `plain` with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(hashing_failed("hash"))
}

/// `Ok(false)` on mismatch; `Err` only when `stored` is not a PHC string.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(hashing_failed("parse stored hash"))?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(hashing_failed("verify")(e)),
    }
}
