//! Hybrid encryption: AEAD payload with an RSA-wrapped content key.
//!
//! The content key travels as the OAEP ciphertext of its base64 text form.
//! Only the wrapped key is stored; the raw key exists solely in memory for
//! the duration of the call.

use ::rsa::traits::PublicKeyParts;
use ::rsa::{RsaPrivateKey, RsaPublicKey};
use base64::{engine::general_purpose::STANDARD, Engine};
use zeroize::Zeroize;

use crate::aead::{self, NONCE_SIZE, TAG_SIZE};
use crate::keys::SymmetricKey;
use crate::rsa as rsa_transport;
use seallink_common::{Algorithm, AsymmetricAlgorithm, Error, Result, SymmetricAlgorithm};

/// Result of a hybrid encryption.
pub struct HybridOutput {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_SIZE],
    pub tag: [u8; TAG_SIZE],
    /// OAEP ciphertext wrapping the content key.
    pub encrypted_key: Vec<u8>,
    pub algorithm: Algorithm,
}

/// Encrypt `plaintext` under a fresh content key, wrapping that key for
/// the holder of `public`.
pub fn encrypt(
    symmetric: SymmetricAlgorithm,
    public: &RsaPublicKey,
    plaintext: &[u8],
) -> Result<HybridOutput> {
    let out = aead::encrypt(symmetric, plaintext, None)?;
    let key = out
        .key
        .as_ref()
        .ok_or_else(|| Error::Crypto("content key was not generated".to_string()))?;

    let mut key_text = STANDARD.encode(key.as_bytes());
    let encrypted_key = rsa_transport::encrypt(public, key_text.as_bytes())?;
    key_text.zeroize();

    Ok(HybridOutput {
        ciphertext: out.ciphertext,
        nonce: out.nonce,
        tag: out.tag,
        encrypted_key,
        algorithm: Algorithm::Hybrid {
            symmetric,
            asymmetric: AsymmetricAlgorithm::Rsa {
                modulus_bits: public.size() * 8,
            },
        },
    })
}

/// Unwrap the content key and decrypt the payload.
///
/// # Errors
/// - [`Error::KeyUnwrap`] when the wrapped key cannot be recovered; this is
///   distinct from payload tampering
/// - [`Error::Authentication`] when the AEAD tag does not verify
pub fn decrypt(
    symmetric: SymmetricAlgorithm,
    private: &RsaPrivateKey,
    ciphertext: &[u8],
    nonce: &[u8],
    tag: &[u8],
    encrypted_key: &[u8],
) -> Result<Vec<u8>> {
    let mut key_text = rsa_transport::decrypt(private, encrypted_key)
        .map_err(|_| Error::KeyUnwrap("wrapped content key could not be recovered".to_string()))?;
    let key_bytes = STANDARD
        .decode(&key_text)
        .map_err(|_| Error::KeyUnwrap("wrapped content key is not valid base64".to_string()))?;
    key_text.zeroize();

    let key = SymmetricKey::from_bytes(key_bytes);
    aead::decrypt(symmetric, ciphertext, &key, nonce, tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::RsaKeypair;
    use std::sync::OnceLock;

    fn keypair() -> &'static RsaKeypair {
        static KEYPAIR: OnceLock<RsaKeypair> = OnceLock::new();
        KEYPAIR.get_or_init(|| RsaKeypair::generate(2048).unwrap())
    }

    #[test]
    fn test_roundtrip() {
        let kp = keypair();
        let out = encrypt(SymmetricAlgorithm::Aes256Gcm, kp.public(), b"Top secret document")
            .unwrap();
        assert_eq!(
            out.algorithm.to_string(),
            "Hybrid-AES-256-GCM-RSA-2048"
        );

        let plaintext = decrypt(
            SymmetricAlgorithm::Aes256Gcm,
            kp.private(),
            &out.ciphertext,
            &out.nonce,
            &out.tag,
            &out.encrypted_key,
        )
        .unwrap();
        assert_eq!(plaintext, b"Top secret document");
    }

    #[test]
    fn test_corrupted_wrapped_key_is_key_unwrap_error() {
        let kp = keypair();
        let out = encrypt(SymmetricAlgorithm::Aes256Gcm, kp.public(), b"data").unwrap();

        let mut bad_key = out.encrypted_key.clone();
        bad_key[0] ^= 0xFF;
        let result = decrypt(
            SymmetricAlgorithm::Aes256Gcm,
            kp.private(),
            &out.ciphertext,
            &out.nonce,
            &out.tag,
            &bad_key,
        );
        assert!(matches!(result, Err(Error::KeyUnwrap(_))));
    }

    #[test]
    fn test_tampered_payload_is_authentication_error() {
        let kp = keypair();
        let out = encrypt(SymmetricAlgorithm::Aes256Gcm, kp.public(), b"payload").unwrap();

        let mut tampered = out.ciphertext.clone();
        tampered[0] ^= 0x01;
        let result = decrypt(
            SymmetricAlgorithm::Aes256Gcm,
            kp.private(),
            &tampered,
            &out.nonce,
            &out.tag,
            &out.encrypted_key,
        );
        assert!(matches!(result, Err(Error::Authentication(_))));
    }

    #[test]
    fn test_wrong_private_key_cannot_unwrap() {
        let kp = keypair();
        let other = RsaKeypair::generate(2048).unwrap();
        let out = encrypt(SymmetricAlgorithm::ChaCha20Poly1305, kp.public(), b"data").unwrap();

        let result = decrypt(
            SymmetricAlgorithm::ChaCha20Poly1305,
            other.private(),
            &out.ciphertext,
            &out.nonce,
            &out.tag,
            &out.encrypted_key,
        );
        assert!(matches!(result, Err(Error::KeyUnwrap(_))));
    }
}
