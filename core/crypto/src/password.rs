//! Password hashing for share-link protection.
//!
//! PBKDF2-HMAC-SHA256 with a per-password random salt. The stored form is
//! base64 of `salt || derived_key`, so a single string carries everything
//! verification needs.

use base64::{engine::general_purpose::STANDARD, Engine};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use seallink_common::{Error, Result};

/// PBKDF2 iteration count (OWASP 2023 recommendation for HMAC-SHA256).
pub const PBKDF2_ITERATIONS: u32 = 600_000;

const SALT_LEN: usize = 32;
const KEY_LEN: usize = 32;

/// Hash a password into its stored form.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut key);

    let mut stored = Vec::with_capacity(SALT_LEN + KEY_LEN);
    stored.extend_from_slice(&salt);
    stored.extend_from_slice(&key);
    STANDARD.encode(stored)
}

/// Verify a password attempt against a stored hash in constant time.
///
/// # Errors
/// Returns a validation error when the stored hash is malformed; a wrong
/// password is `Ok(false)`, never an error.
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let decoded = STANDARD
        .decode(stored)
        .map_err(|_| Error::Validation("stored password hash is not valid base64".to_string()))?;
    if decoded.len() != SALT_LEN + KEY_LEN {
        return Err(Error::Validation(format!(
            "stored password hash has wrong length: {}",
            decoded.len()
        )));
    }
    let (salt, expected) = decoded.split_at(SALT_LEN);

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);

    Ok(key.ct_eq(expected).into())
}
