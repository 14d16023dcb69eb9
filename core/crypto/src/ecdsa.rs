//! ECDSA signatures over the NIST prime curves.
//!
//! Messages are prehashed with SHA-512 regardless of curve; signatures are
//! exchanged in DER form so verifiers do not need to know the curve's
//! scalar width up front.

use sha2::{Digest, Sha512};
use signature::hazmat::{PrehashSigner, PrehashVerifier};
use signature::SignatureEncoding;

use seallink_common::{EcCurve, Error, Result};

/// ECDSA signing keypair on one of the supported curves.
pub enum EcdsaKeypair {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    P521(p521::ecdsa::SigningKey),
}

/// Verification half of an [`EcdsaKeypair`].
pub enum EcdsaPublicKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
    P521(p521::ecdsa::VerifyingKey),
}

impl EcdsaKeypair {
    /// Generate a fresh keypair on the given curve.
    pub fn generate(curve: EcCurve) -> Self {
        let mut rng = rand::rngs::OsRng;
        match curve {
            EcCurve::P256 => Self::P256(p256::ecdsa::SigningKey::random(&mut rng)),
            EcCurve::P384 => Self::P384(p384::ecdsa::SigningKey::random(&mut rng)),
            EcCurve::P521 => Self::P521(p521::ecdsa::SigningKey::random(&mut rng)),
        }
    }

    /// The curve this keypair lives on.
    pub fn curve(&self) -> EcCurve {
        match self {
            Self::P256(_) => EcCurve::P256,
            Self::P384(_) => EcCurve::P384,
            Self::P521(_) => EcCurve::P521,
        }
    }

    /// The verification half.
    pub fn public_key(&self) -> EcdsaPublicKey {
        match self {
            Self::P256(k) => EcdsaPublicKey::P256(*k.verifying_key()),
            Self::P384(k) => EcdsaPublicKey::P384(*k.verifying_key()),
            // p521 0.13.3 gates `verifying_key()` behind a nonexistent
            // "verifying" feature; `From<&SigningKey>` is the same conversion.
            Self::P521(k) => EcdsaPublicKey::P521(p521::ecdsa::VerifyingKey::from(k)),
        }
    }

    /// Sign `data`, returning a DER-encoded signature.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let digest = Sha512::digest(data);
        let failed = |e| Error::Crypto(format!("signing failed: {e}"));
        match self {
            Self::P256(k) => {
                let sig: p256::ecdsa::Signature = k.sign_prehash(&digest).map_err(failed)?;
                Ok(sig.to_der().to_vec())
            }
            Self::P384(k) => {
                let sig: p384::ecdsa::Signature = k.sign_prehash(&digest).map_err(failed)?;
                Ok(sig.to_der().to_vec())
            }
            Self::P521(k) => {
                let sig: p521::ecdsa::Signature = k.sign_prehash(&digest).map_err(failed)?;
                Ok(sig.to_der().to_vec())
            }
        }
    }
}

impl EcdsaPublicKey {
    /// Verify a DER-encoded signature over `data`.
    ///
    /// Malformed signatures return `false` rather than erroring.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let digest = Sha512::digest(data);
        match self {
            Self::P256(k) => p256::ecdsa::Signature::from_der(signature)
                .map(|sig| k.verify_prehash(&digest, &sig).is_ok())
                .unwrap_or(false),
            Self::P384(k) => p384::ecdsa::Signature::from_der(signature)
                .map(|sig| k.verify_prehash(&digest, &sig).is_ok())
                .unwrap_or(false),
            Self::P521(k) => p521::ecdsa::Signature::from_der(signature)
                .map(|sig| k.verify_prehash(&digest, &sig).is_ok())
                .unwrap_or(false),
        }
    }
}
