//! Authenticated encryption primitives.
//!
//! All three supported ciphers use a 96-bit nonce, generated fresh per call
//! and never reused with the same key. The authentication tag is held
//! separately from the ciphertext, matching the stored-record layout.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes128Gcm, Aes256Gcm, Nonce,
};
use chacha20poly1305::ChaCha20Poly1305;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::keys::SymmetricKey;
use seallink_common::{Error, Result, SymmetricAlgorithm};

/// Nonce size for all supported AEAD ciphers (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Authentication tag size (16 bytes).
pub const TAG_SIZE: usize = 16;

/// Result of an AEAD encryption.
///
/// `key` is populated only when the call generated a fresh key; it is the
/// only way to later decrypt and must never be silently discarded.
pub struct AeadOutput {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_SIZE],
    pub tag: [u8; TAG_SIZE],
    pub algorithm: SymmetricAlgorithm,
    pub key: Option<SymmetricKey>,
}

fn encrypt_combined(
    algorithm: SymmetricAlgorithm,
    key: &SymmetricKey,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let failed = |_| Error::Crypto("encryption failed".to_string());
    let bad_key = |_| Error::Crypto("cipher rejected key".to_string());

    match algorithm {
        SymmetricAlgorithm::Aes128Gcm => Aes128Gcm::new_from_slice(key.as_bytes())
            .map_err(bad_key)?
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(failed),
        SymmetricAlgorithm::Aes256Gcm => Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(bad_key)?
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(failed),
        SymmetricAlgorithm::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(bad_key)?
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(failed),
    }
}

fn decrypt_combined(
    algorithm: SymmetricAlgorithm,
    key: &SymmetricKey,
    nonce: &[u8],
    combined: &[u8],
) -> Result<Vec<u8>> {
    let tampered =
        |_| Error::Authentication("data may have been tampered with".to_string());
    let bad_key = |_| Error::Crypto("cipher rejected key".to_string());

    match algorithm {
        SymmetricAlgorithm::Aes128Gcm => Aes128Gcm::new_from_slice(key.as_bytes())
            .map_err(bad_key)?
            .decrypt(Nonce::from_slice(nonce), combined)
            .map_err(tampered),
        SymmetricAlgorithm::Aes256Gcm => Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(bad_key)?
            .decrypt(Nonce::from_slice(nonce), combined)
            .map_err(tampered),
        SymmetricAlgorithm::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(bad_key)?
            .decrypt(Nonce::from_slice(nonce), combined)
            .map_err(tampered),
    }
}

/// Encrypt plaintext with the given AEAD algorithm.
///
/// # Preconditions
/// - `key`, if supplied, must match the algorithm's key size
///
/// # Postconditions
/// - A fresh random 96-bit nonce is used
/// - When `key` is `None`, a fresh key is generated and returned in the output
///
/// # Errors
/// - Validation error on key size mismatch, before any cipher work
pub fn encrypt(
    algorithm: SymmetricAlgorithm,
    plaintext: &[u8],
    key: Option<&SymmetricKey>,
) -> Result<AeadOutput> {
    let (key, generated) = match key {
        Some(k) => {
            k.expect_for(algorithm)?;
            (k.clone(), false)
        }
        None => (SymmetricKey::generate(algorithm), true),
    };

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let mut combined = encrypt_combined(algorithm, &key, &nonce, plaintext)?;

    // The cipher appends the tag; split it off.
    let tag_start = combined.len() - TAG_SIZE;
    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&combined[tag_start..]);
    combined.truncate(tag_start);

    Ok(AeadOutput {
        ciphertext: combined,
        nonce,
        tag,
        algorithm,
        key: generated.then_some(key),
    })
}

/// Decrypt an AEAD ciphertext and verify its authentication tag.
///
/// # Errors
/// - Validation error on malformed key, nonce, or tag lengths
/// - [`Error::Authentication`] when the tag does not verify; the plaintext
///   must be discarded and the attempt never retried
pub fn decrypt(
    algorithm: SymmetricAlgorithm,
    ciphertext: &[u8],
    key: &SymmetricKey,
    nonce: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>> {
    key.expect_for(algorithm)?;
    if nonce.len() != NONCE_SIZE {
        return Err(Error::Validation(format!(
            "invalid nonce length: expected {NONCE_SIZE}, got {}",
            nonce.len()
        )));
    }
    if tag.len() != TAG_SIZE {
        return Err(Error::Validation(format!(
            "invalid tag length: expected {TAG_SIZE}, got {}",
            tag.len()
        )));
    }

    let mut combined = Vec::with_capacity(ciphertext.len() + TAG_SIZE);
    combined.extend_from_slice(ciphertext);
    combined.extend_from_slice(tag);

    decrypt_combined(algorithm, key, nonce, &combined)
}
