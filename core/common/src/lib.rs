//! Common utilities and types shared across SealLink modules.
//!
//! This module provides foundational types that are used throughout the codebase,
//! ensuring consistency and type safety: the error taxonomy, sensitivity tiers,
//! algorithm identifiers, and encryption policies.

pub mod encoding;
pub mod error;
pub mod types;

pub use error::{DenyReason, Error, Result};
pub use types::{
    Algorithm, AsymmetricAlgorithm, Classification, EcCurve, EncryptionPolicy, HashAlgorithm,
    MfaRequirement, PolicyUpdate, SensitivityLevel, SymmetricAlgorithm,
};
