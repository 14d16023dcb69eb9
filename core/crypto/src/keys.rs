//! Key types with secure memory handling.
//!
//! Symmetric keys automatically zeroize their memory on drop to prevent
//! sensitive data from persisting in memory.

use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use seallink_common::{Error, Result, SymmetricAlgorithm};

/// Symmetric AEAD key.
///
/// Holds raw key bytes for any supported symmetric algorithm. The expected
/// length depends on the algorithm and is validated before use.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: Vec<u8>,
}

impl SymmetricKey {
    /// Generate a fresh random key of the algorithm's key size.
    pub fn generate(algorithm: SymmetricAlgorithm) -> Self {
        let mut bytes = vec![0u8; algorithm.key_bytes()];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Wrap existing key bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the key is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Validate that this key matches the algorithm's key size.
    ///
    /// # Errors
    /// Returns a validation error before any cipher work is attempted.
    pub fn expect_for(&self, algorithm: SymmetricAlgorithm) -> Result<()> {
        let expected = algorithm.key_bytes();
        if self.bytes.len() != expected {
            return Err(Error::Validation(format!(
                "invalid key length for {}: expected {}, got {}",
                algorithm,
                expected,
                self.bytes.len()
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey([REDACTED])")
    }
}
