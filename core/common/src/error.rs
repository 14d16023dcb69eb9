//! Common error types for SealLink.

use thiserror::Error;

/// Top-level error type for SealLink operations.
///
/// Verification outcomes (hash, signature, Merkle root) are deliberately not
/// errors: decryption still returns plaintext and reports them as booleans,
/// leaving the accept/reject decision to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or inconsistent policy configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// AEAD authentication tag did not verify; the plaintext must not be trusted.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// RSA unwrap of a transported symmetric key failed (wrong private key or
    /// corrupted wrapped key). Distinct from payload authentication failure.
    #[error("Key unwrap failed: {0}")]
    KeyUnwrap(String),

    /// Access-control gate rejected the operation before any cryptographic work.
    #[error("Access denied: {0}")]
    AccessDenied(DenyReason),

    /// Malformed input rejected before any cryptographic work begins.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Cryptographic operation failed.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Reason a share access attempt was denied.
///
/// Each sub-reason renders a distinct message so an API layer can map it to
/// a precise status instead of a generic "forbidden".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The share link's expiration time has passed.
    Expired,
    /// The download limit has been reached.
    LimitReached,
    /// The share link was deactivated by revocation or cleanup.
    Inactive,
    /// The share link requires a password and none was supplied.
    PasswordRequired,
    /// The supplied password did not match.
    IncorrectPassword,
    /// Too many failed attempts; temporarily locked.
    TemporarilyLocked,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Self::Expired => "share link has expired",
            Self::LimitReached => "download limit reached",
            Self::Inactive => "share link is no longer active",
            Self::PasswordRequired => "password required",
            Self::IncorrectPassword => "incorrect password",
            Self::TemporarilyLocked => "too many failed attempts, temporarily locked",
        };
        f.write_str(msg)
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
