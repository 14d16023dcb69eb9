//! RSA key transport and signatures.
//!
//! Encryption uses OAEP with SHA-256; signatures use PSS with SHA-512.
//! Moduli below 2048 bits are rejected at generation time.

use ::rsa::pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding,
};
use ::rsa::pss::{Signature as PssSignature, SigningKey, VerifyingKey};
use ::rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use ::rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use rand::rngs::OsRng;
use sha2::{Sha256, Sha512};

use seallink_common::{Error, Result};

/// Minimum acceptable RSA modulus size in bits.
pub const MIN_MODULUS_BITS: usize = 2048;

/// Long-lived RSA keypair used for signing and hybrid key transport.
pub struct RsaKeypair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl RsaKeypair {
    /// Generate a new keypair.
    ///
    /// # Errors
    /// - Validation error when `bits < 2048`
    /// - Crypto error on generation failure
    pub fn generate(bits: usize) -> Result<Self> {
        if bits < MIN_MODULUS_BITS {
            return Err(Error::Validation(format!(
                "RSA key size must be at least {MIN_MODULUS_BITS} bits"
            )));
        }
        let private = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| Error::Crypto(format!("RSA key generation failed: {e}")))?;
        let public = RsaPublicKey::from(&private);
        Ok(Self { private, public })
    }

    /// The public half.
    pub fn public(&self) -> &RsaPublicKey {
        &self.public
    }

    /// The private half.
    pub fn private(&self) -> &RsaPrivateKey {
        &self.private
    }

    /// Export the public key as SPKI PEM.
    pub fn public_key_pem(&self) -> Result<String> {
        self.public
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| Error::Serialization(format!("public key PEM encoding failed: {e}")))
    }

    /// Export the private key as PKCS#8 PEM.
    ///
    /// # Security
    /// The caller is responsible for protecting the returned material.
    pub fn private_key_pem(&self) -> Result<String> {
        self.private
            .to_pkcs8_pem(LineEnding::LF)
            .map(|pem| pem.to_string())
            .map_err(|e| Error::Serialization(format!("private key PEM encoding failed: {e}")))
    }

    /// Load a keypair from a PKCS#8 private key PEM.
    pub fn from_private_key_pem(pem: &str) -> Result<Self> {
        let private = RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|e| Error::Validation(format!("malformed private key PEM: {e}")))?;
        let public = RsaPublicKey::from(&private);
        Ok(Self { private, public })
    }
}

/// Load a public key from an SPKI PEM.
pub fn public_key_from_pem(pem: &str) -> Result<RsaPublicKey> {
    RsaPublicKey::from_public_key_pem(pem)
        .map_err(|e| Error::Validation(format!("malformed public key PEM: {e}")))
}

/// Encrypt a short payload with OAEP-SHA256.
///
/// RSA can only encrypt payloads smaller than the modulus; larger data goes
/// through the hybrid path instead.
pub fn encrypt(public: &RsaPublicKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    public
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext)
        .map_err(|e| Error::Crypto(format!("RSA encryption failed: {e}")))
}

/// Decrypt an OAEP-SHA256 ciphertext.
pub fn decrypt(private: &RsaPrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
    private
        .decrypt(Oaep::new::<Sha256>(), ciphertext)
        .map_err(|e| Error::Crypto(format!("RSA decryption failed: {e}")))
}

/// Sign data with PSS-SHA512.
pub fn sign(private: &RsaPrivateKey, data: &[u8]) -> Result<Vec<u8>> {
    let key = SigningKey::<Sha512>::new(private.clone());
    key.try_sign_with_rng(&mut OsRng, data)
        .map(|sig| sig.to_vec())
        .map_err(|e| Error::Crypto(format!("signing failed: {e}")))
}

/// Verify a PSS-SHA512 signature.
///
/// Any signature not produced with matching padding and hash parameters
/// fails verification; malformed signatures simply return `false`.
pub fn verify(public: &RsaPublicKey, data: &[u8], signature: &[u8]) -> bool {
    let Ok(sig) = PssSignature::try_from(signature) else {
        return false;
    };
    VerifyingKey::<Sha512>::new(public.clone())
        .verify(data, &sig)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    // Key generation is expensive; share one keypair across tests.
    fn keypair() -> &'static RsaKeypair {
        static KEYPAIR: OnceLock<RsaKeypair> = OnceLock::new();
        KEYPAIR.get_or_init(|| RsaKeypair::generate(2048).unwrap())
    }

    #[test]
    fn test_small_modulus_rejected() {
        assert!(matches!(
            RsaKeypair::generate(1024),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let kp = keypair();
        let ct = encrypt(kp.public(), b"wrapped key material").unwrap();
        let pt = decrypt(kp.private(), &ct).unwrap();
        assert_eq!(pt, b"wrapped key material");
    }

    #[test]
    fn test_oaep_randomized() {
        let kp = keypair();
        let a = encrypt(kp.public(), b"same input").unwrap();
        let b = encrypt(kp.public(), b"same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_sign_verify() {
        let kp = keypair();
        let sig = sign(kp.private(), b"signed payload").unwrap();
        assert!(verify(kp.public(), b"signed payload", &sig));
        assert!(!verify(kp.public(), b"altered payload", &sig));
    }

    #[test]
    fn test_corrupted_signature_fails() {
        let kp = keypair();
        let mut sig = sign(kp.private(), b"payload").unwrap();
        sig[10] ^= 0xFF;
        assert!(!verify(kp.public(), b"payload", &sig));
        assert!(!verify(kp.public(), b"payload", b"not a signature"));
    }

    #[test]
    fn test_pem_roundtrip() {
        let kp = keypair();
        let pem = kp.private_key_pem().unwrap();
        let restored = RsaKeypair::from_private_key_pem(&pem).unwrap();

        let sig = sign(restored.private(), b"data").unwrap();
        assert!(verify(kp.public(), b"data", &sig));

        let public_pem = kp.public_key_pem().unwrap();
        let public = public_key_from_pem(&public_pem).unwrap();
        assert!(verify(&public, b"data", &sig));
    }
}
