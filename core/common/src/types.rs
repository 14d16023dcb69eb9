//! Shared domain types: sensitivity tiers, algorithm identifiers, and policies.
//!
//! Algorithm identifiers are closed enums rather than free-form strings, so
//! dispatch on them is exhaustive and unsupported names are rejected at the
//! boundary during parsing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Data sensitivity tier.
///
/// Totally ordered: `public < internal < confidential < highly_sensitive`.
/// Immutable once assigned to a record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityLevel {
    Public,
    Internal,
    Confidential,
    HighlySensitive,
}

impl SensitivityLevel {
    /// All tiers, lowest to highest.
    pub const ALL: [Self; 4] = [
        Self::Public,
        Self::Internal,
        Self::Confidential,
        Self::HighlySensitive,
    ];
}

impl fmt::Display for SensitivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Confidential => "confidential",
            Self::HighlySensitive => "highly_sensitive",
        };
        f.write_str(name)
    }
}

impl FromStr for SensitivityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "internal" => Ok(Self::Internal),
            "confidential" => Ok(Self::Confidential),
            "highly_sensitive" => Ok(Self::HighlySensitive),
            other => Err(Error::Validation(format!(
                "unknown sensitivity level: {other}"
            ))),
        }
    }
}

/// MFA requirement attached to a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MfaRequirement {
    None,
    Recommended,
    Conditional,
    Required,
}

/// Symmetric AEAD algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymmetricAlgorithm {
    #[serde(rename = "AES-128-GCM")]
    Aes128Gcm,
    #[serde(rename = "AES-256-GCM")]
    Aes256Gcm,
    #[serde(rename = "ChaCha20-Poly1305")]
    ChaCha20Poly1305,
}

impl SymmetricAlgorithm {
    /// Key length in bytes.
    pub fn key_bytes(&self) -> usize {
        match self {
            Self::Aes128Gcm => 16,
            Self::Aes256Gcm | Self::ChaCha20Poly1305 => 32,
        }
    }

    /// Key length in bits.
    pub fn key_bits(&self) -> u32 {
        (self.key_bytes() * 8) as u32
    }
}

impl fmt::Display for SymmetricAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Aes128Gcm => "AES-128-GCM",
            Self::Aes256Gcm => "AES-256-GCM",
            Self::ChaCha20Poly1305 => "ChaCha20-Poly1305",
        };
        f.write_str(name)
    }
}

impl FromStr for SymmetricAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "AES-128-GCM" => Ok(Self::Aes128Gcm),
            "AES-256-GCM" => Ok(Self::Aes256Gcm),
            "ChaCha20-Poly1305" => Ok(Self::ChaCha20Poly1305),
            other => Err(Error::Validation(format!(
                "unsupported symmetric algorithm: {other}"
            ))),
        }
    }
}

/// Asymmetric algorithm used for hybrid key transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AsymmetricAlgorithm {
    Rsa { modulus_bits: usize },
}

impl AsymmetricAlgorithm {
    /// Modulus size in bits.
    pub fn key_bits(&self) -> usize {
        match self {
            Self::Rsa { modulus_bits } => *modulus_bits,
        }
    }
}

impl fmt::Display for AsymmetricAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsa { modulus_bits } => write!(f, "RSA-{modulus_bits}"),
        }
    }
}

impl FromStr for AsymmetricAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bits = s
            .strip_prefix("RSA-")
            .and_then(|b| b.parse::<usize>().ok())
            .ok_or_else(|| {
                Error::Validation(format!("unsupported asymmetric algorithm: {s}"))
            })?;
        Ok(Self::Rsa { modulus_bits: bits })
    }
}

impl From<AsymmetricAlgorithm> for String {
    fn from(a: AsymmetricAlgorithm) -> Self {
        a.to_string()
    }
}

impl TryFrom<String> for AsymmetricAlgorithm {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Complete algorithm identifier stored on an encrypted record.
///
/// Carries everything needed to select the decrypt path; there is no
/// string matching on algorithm names anywhere past the parse boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Algorithm {
    /// Standalone AEAD encryption; the record stores the raw key.
    Symmetric(SymmetricAlgorithm),
    /// Hybrid encryption; the record stores the RSA-wrapped key.
    Hybrid {
        symmetric: SymmetricAlgorithm,
        asymmetric: AsymmetricAlgorithm,
    },
}

impl Algorithm {
    /// The symmetric algorithm that protects the payload.
    pub fn symmetric(&self) -> SymmetricAlgorithm {
        match self {
            Self::Symmetric(s) => *s,
            Self::Hybrid { symmetric, .. } => *symmetric,
        }
    }

    /// Whether the record's key material is RSA-wrapped.
    pub fn is_hybrid(&self) -> bool {
        matches!(self, Self::Hybrid { .. })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symmetric(s) => write!(f, "{s}"),
            Self::Hybrid {
                symmetric,
                asymmetric,
            } => write!(f, "Hybrid-{symmetric}-{asymmetric}"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(rest) = s.strip_prefix("Hybrid-") {
            // e.g. "AES-256-GCM-RSA-2048"
            let split = rest.find("-RSA-").ok_or_else(|| {
                Error::Validation(format!("unsupported algorithm: {s}"))
            })?;
            let symmetric = rest[..split].parse()?;
            let asymmetric = rest[split + 1..].parse()?;
            Ok(Self::Hybrid {
                symmetric,
                asymmetric,
            })
        } else {
            Ok(Self::Symmetric(s.parse()?))
        }
    }
}

impl From<Algorithm> for String {
    fn from(a: Algorithm) -> Self {
        a.to_string()
    }
}

impl TryFrom<String> for Algorithm {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Hash algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "SHA-256")]
    Sha256,
    #[serde(rename = "SHA-512")]
    Sha512,
    #[serde(rename = "SHA3-256")]
    Sha3_256,
    #[serde(rename = "SHA3-512")]
    Sha3_512,
}

impl HashAlgorithm {
    /// Digest length in bytes.
    pub fn digest_bytes(&self) -> usize {
        match self {
            Self::Sha256 | Self::Sha3_256 => 32,
            Self::Sha512 | Self::Sha3_512 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sha256 => "SHA-256",
            Self::Sha512 => "SHA-512",
            Self::Sha3_256 => "SHA3-256",
            Self::Sha3_512 => "SHA3-512",
        };
        f.write_str(name)
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SHA-256" => Ok(Self::Sha256),
            "SHA-512" => Ok(Self::Sha512),
            "SHA3-256" => Ok(Self::Sha3_256),
            "SHA3-512" => Ok(Self::Sha3_512),
            other => Err(Error::Validation(format!(
                "unsupported hash algorithm: {other}"
            ))),
        }
    }
}

/// Elliptic curve used for ECDSA signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EcCurve {
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "P-384")]
    P384,
    #[serde(rename = "P-521")]
    P521,
}

impl fmt::Display for EcCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        };
        f.write_str(name)
    }
}

impl FromStr for EcCurve {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "P-256" => Ok(Self::P256),
            "P-384" => Ok(Self::P384),
            "P-521" => Ok(Self::P521),
            other => Err(Error::Validation(format!("unsupported curve: {other}"))),
        }
    }
}

/// Cryptographic policy for one sensitivity tier.
///
/// Exactly one policy exists per tier. `asymmetric` is present iff the
/// hybrid encryption path is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptionPolicy {
    pub sensitivity_level: SensitivityLevel,
    pub symmetric_algorithm: SymmetricAlgorithm,
    pub key_size_bits: u32,
    pub asymmetric: Option<AsymmetricAlgorithm>,
    pub hash_algorithm: HashAlgorithm,
    pub signature_required: bool,
    pub mfa_requirement: MfaRequirement,
    pub description: String,
}

impl EncryptionPolicy {
    /// Whether this policy routes through hybrid encryption.
    pub fn requires_hybrid(&self) -> bool {
        self.asymmetric.is_some()
    }

    /// Check internal consistency before the policy is stored.
    pub fn validate(&self) -> Result<()> {
        if self.key_size_bits != self.symmetric_algorithm.key_bits() {
            return Err(Error::Validation(format!(
                "key size {} does not match {} ({} bits)",
                self.key_size_bits,
                self.symmetric_algorithm,
                self.symmetric_algorithm.key_bits()
            )));
        }
        if let Some(asym) = &self.asymmetric {
            if asym.key_bits() < 2048 {
                return Err(Error::Validation(format!(
                    "asymmetric key size {} is below the 2048-bit minimum",
                    asym.key_bits()
                )));
            }
        }
        Ok(())
    }
}

/// Partial policy update applied by administrative operations.
///
/// The nested option on `asymmetric` distinguishes "leave unchanged"
/// from "clear the hybrid requirement".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyUpdate {
    pub symmetric_algorithm: Option<SymmetricAlgorithm>,
    pub key_size_bits: Option<u32>,
    pub asymmetric: Option<Option<AsymmetricAlgorithm>>,
    pub hash_algorithm: Option<HashAlgorithm>,
    pub signature_required: Option<bool>,
    pub mfa_requirement: Option<MfaRequirement>,
    pub description: Option<String>,
}

/// Sensitivity classification produced by an external classifier.
///
/// The confidence score is opaque metadata; it is stored, never acted on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub level: SensitivityLevel,
    pub confidence: Option<f64>,
}

impl Classification {
    pub fn new(level: SensitivityLevel, confidence: Option<f64>) -> Self {
        Self { level, confidence }
    }
}
