//! Cryptographic primitives for SealLink.
//!
//! This module provides:
//! - Authenticated encryption (AES-128-GCM, AES-256-GCM, ChaCha20-Poly1305)
//! - RSA key transport (OAEP) and signatures (PSS)
//! - ECDSA signatures over P-256/P-384/P-521
//! - SHA-2 and SHA-3 hashing with constant-time digest verification
//! - Hybrid encryption (AEAD payload + RSA-wrapped key)
//! - PBKDF2 password hashing for share-link protection
//!
//! # Security Guarantees
//! - All symmetric key material is automatically zeroized on drop
//! - No plaintext or key material is ever logged
//! - Constant-time operations for sensitive comparisons
//! - AEAD tag failures surface as [`seallink_common::Error::Authentication`];
//!   callers must treat them as "plaintext must not be trusted"

pub mod aead;
pub mod ecdsa;
pub mod hash;
pub mod hybrid;
pub mod keys;
pub mod password;
pub mod rsa;

pub use aead::{AeadOutput, NONCE_SIZE, TAG_SIZE};
pub use ecdsa::{EcdsaKeypair, EcdsaPublicKey};
pub use hash::{digest_hex, verify_digest};
pub use hybrid::HybridOutput;
pub use keys::SymmetricKey;
pub use password::{hash_password, verify_password};
pub use rsa::RsaKeypair;
