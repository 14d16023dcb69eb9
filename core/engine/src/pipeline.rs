//! Policy-driven encryption pipeline.
//!
//! Encryption resolves the record's policy, derives integrity metadata from
//! the plaintext, then dispatches to the symmetric or hybrid path. Decryption
//! reverses the path and reports verification outcomes as booleans: a failed
//! hash or signature check does not withhold the plaintext, it flags it.
//! Only an AEAD tag failure aborts, since that plaintext cannot be trusted
//! at all.

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use seallink_common::{Algorithm, Classification, Error, Result};
use seallink_crypto::{aead, hash, hybrid, rsa, RsaKeypair, SymmetricKey};
use seallink_integrity::MerkleTree;
use seallink_storage::{DataRecord, DataStore};

use crate::config::EngineConfig;
use crate::policy::PolicyResolver;

/// Decryption outcome.
///
/// `signature_verified` and `merkle_verified` are `None` when the record
/// carries no signature or Merkle root to check.
#[derive(Debug)]
pub struct Decryption {
    pub plaintext: Vec<u8>,
    pub hash_verified: bool,
    pub signature_verified: Option<bool>,
    pub merkle_verified: Option<bool>,
}

impl Decryption {
    /// Whether every verification that could run passed.
    pub fn fully_verified(&self) -> bool {
        self.hash_verified
            && self.signature_verified.unwrap_or(true)
            && self.merkle_verified.unwrap_or(true)
    }
}

/// Encrypts and decrypts records according to per-tier policies.
pub struct EncryptionPipeline {
    policies: PolicyResolver,
    store: Arc<dyn DataStore>,
    keypair: RsaKeypair,
    merkle_chunk_size: usize,
}

impl EncryptionPipeline {
    /// Build a pipeline with a freshly generated service keypair.
    pub fn new(
        policies: PolicyResolver,
        store: Arc<dyn DataStore>,
        config: &EngineConfig,
    ) -> Result<Self> {
        let keypair = RsaKeypair::generate(config.service_key_bits)?;
        Ok(Self::with_keypair(policies, store, keypair, config))
    }

    /// Build a pipeline around an existing service keypair.
    pub fn with_keypair(
        policies: PolicyResolver,
        store: Arc<dyn DataStore>,
        keypair: RsaKeypair,
        config: &EngineConfig,
    ) -> Self {
        Self {
            policies,
            store,
            keypair,
            merkle_chunk_size: config.merkle_chunk_size,
        }
    }

    /// The policy resolver this pipeline encrypts under.
    pub fn policies(&self) -> &PolicyResolver {
        &self.policies
    }

    /// Encrypt `content` under the policy for its classification and
    /// persist the resulting record.
    pub fn encrypt(&self, content: &[u8], classification: Classification) -> Result<DataRecord> {
        let policy = self.policies.resolve(classification.level)?;

        let content_hash = hash::digest_hex(policy.hash_algorithm, content);
        let merkle_root = MerkleTree::new(content, self.merkle_chunk_size).root();
        let signature = policy
            .signature_required
            .then(|| rsa::sign(self.keypair.private(), content))
            .transpose()?;

        let record = if policy.requires_hybrid() {
            let out = hybrid::encrypt(policy.symmetric_algorithm, self.keypair.public(), content)?;
            DataRecord {
                id: Uuid::new_v4(),
                sensitivity_level: classification.level,
                confidence: classification.confidence,
                algorithm: out.algorithm,
                ciphertext: out.ciphertext,
                nonce: out.nonce.to_vec(),
                tag: out.tag.to_vec(),
                key: None,
                encrypted_key: Some(out.encrypted_key),
                hash_algorithm: policy.hash_algorithm,
                content_hash,
                signature,
                merkle_root: Some(merkle_root),
                created_at: chrono::Utc::now(),
            }
        } else {
            let out = aead::encrypt(policy.symmetric_algorithm, content, None)?;
            let key = out
                .key
                .ok_or_else(|| Error::Crypto("content key was not generated".to_string()))?;
            DataRecord {
                id: Uuid::new_v4(),
                sensitivity_level: classification.level,
                confidence: classification.confidence,
                algorithm: Algorithm::Symmetric(out.algorithm),
                ciphertext: out.ciphertext,
                nonce: out.nonce.to_vec(),
                tag: out.tag.to_vec(),
                key: Some(key.as_bytes().to_vec()),
                encrypted_key: None,
                hash_algorithm: policy.hash_algorithm,
                content_hash,
                signature,
                merkle_root: Some(merkle_root),
                created_at: chrono::Utc::now(),
            }
        };

        info!(
            id = %record.id,
            level = %record.sensitivity_level,
            algorithm = %record.algorithm,
            size = content.len(),
            "encrypted record"
        );
        self.store.save(record.clone())?;
        Ok(record)
    }

    /// Load a record and decrypt it.
    pub fn decrypt(&self, id: &Uuid) -> Result<Decryption> {
        let record = self.store.load(id)?;
        self.decrypt_record(&record)
    }

    /// Decrypt a record and run every verification it carries.
    ///
    /// # Errors
    /// - [`Error::Authentication`] when the AEAD tag fails
    /// - [`Error::KeyUnwrap`] when a hybrid record's wrapped key cannot be
    ///   recovered
    /// - Validation error when the record's key material is missing
    pub fn decrypt_record(&self, record: &DataRecord) -> Result<Decryption> {
        let plaintext = match record.algorithm {
            Algorithm::Symmetric(symmetric) => {
                let key_bytes = record.key.clone().ok_or_else(|| {
                    Error::Validation("symmetric record is missing its key".to_string())
                })?;
                let key = SymmetricKey::from_bytes(key_bytes);
                aead::decrypt(symmetric, &record.ciphertext, &key, &record.nonce, &record.tag)?
            }
            Algorithm::Hybrid { symmetric, .. } => {
                let encrypted_key = record.encrypted_key.as_deref().ok_or_else(|| {
                    Error::Validation("hybrid record is missing its wrapped key".to_string())
                })?;
                hybrid::decrypt(
                    symmetric,
                    self.keypair.private(),
                    &record.ciphertext,
                    &record.nonce,
                    &record.tag,
                    encrypted_key,
                )?
            }
        };

        let hash_verified =
            hash::verify_digest(record.hash_algorithm, &plaintext, &record.content_hash);
        let signature_verified = record
            .signature
            .as_ref()
            .map(|sig| rsa::verify(self.keypair.public(), &plaintext, sig));
        let merkle_verified = record
            .merkle_root
            .as_ref()
            .map(|root| MerkleTree::verify_root(&plaintext, self.merkle_chunk_size, root));

        if !hash_verified {
            warn!(id = %record.id, "content hash mismatch on decrypt");
        }
        if signature_verified == Some(false) {
            warn!(id = %record.id, "signature verification failed on decrypt");
        }
        if merkle_verified == Some(false) {
            warn!(id = %record.id, "merkle root mismatch on decrypt");
        }
        debug!(id = %record.id, size = plaintext.len(), "decrypted record");

        Ok(Decryption {
            plaintext,
            hash_verified,
            signature_verified,
            merkle_verified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seallink_common::SensitivityLevel;
    use seallink_storage::{MemoryDataStore, MemoryPolicyStore};
    use std::sync::OnceLock;

    fn service_keypair() -> RsaKeypair {
        static PEM: OnceLock<String> = OnceLock::new();
        let pem = PEM.get_or_init(|| {
            RsaKeypair::generate(2048)
                .and_then(|kp| kp.private_key_pem())
                .unwrap()
        });
        RsaKeypair::from_private_key_pem(pem).unwrap()
    }

    fn pipeline() -> (EncryptionPipeline, Arc<MemoryDataStore>) {
        let policies = PolicyResolver::new(Arc::new(MemoryPolicyStore::new()));
        policies.seed_defaults().unwrap();
        let store = Arc::new(MemoryDataStore::new());
        let pipeline = EncryptionPipeline::with_keypair(
            policies,
            store.clone(),
            service_keypair(),
            &EngineConfig::default(),
        );
        (pipeline, store)
    }

    fn classify(level: SensitivityLevel) -> Classification {
        Classification::new(level, Some(0.9))
    }

    #[test]
    fn test_public_roundtrip() {
        let (pipeline, store) = pipeline();
        let record = pipeline
            .encrypt(b"hello world", classify(SensitivityLevel::Public))
            .unwrap();

        assert_eq!(record.algorithm.to_string(), "AES-128-GCM");
        assert!(record.signature.is_none());
        assert!(record.key.is_some());
        assert_eq!(store.len(), 1);

        let out = pipeline.decrypt(&record.id).unwrap();
        assert_eq!(out.plaintext, b"hello world");
        assert!(out.hash_verified);
        assert_eq!(out.signature_verified, None);
        assert_eq!(out.merkle_verified, Some(true));
        assert!(out.fully_verified());
    }

    #[test]
    fn test_highly_sensitive_uses_hybrid_with_signature() {
        let (pipeline, _) = pipeline();
        let record = pipeline
            .encrypt(b"launch codes", classify(SensitivityLevel::HighlySensitive))
            .unwrap();

        assert_eq!(record.algorithm.to_string(), "Hybrid-AES-256-GCM-RSA-2048");
        assert!(record.key.is_none());
        assert!(record.encrypted_key.is_some());
        assert!(record.signature.is_some());

        let out = pipeline.decrypt(&record.id).unwrap();
        assert_eq!(out.plaintext, b"launch codes");
        assert_eq!(out.signature_verified, Some(true));
        assert!(out.fully_verified());
    }

    #[test]
    fn test_confidential_signs_without_hybrid() {
        let (pipeline, _) = pipeline();
        let record = pipeline
            .encrypt(b"quarterly numbers", classify(SensitivityLevel::Confidential))
            .unwrap();
        assert!(record.signature.is_some());
        assert!(record.encrypted_key.is_none());
    }

    #[test]
    fn test_missing_policy_fails_closed() {
        let policies = PolicyResolver::new(Arc::new(MemoryPolicyStore::new()));
        let store = Arc::new(MemoryDataStore::new());
        let pipeline = EncryptionPipeline::with_keypair(
            policies,
            store,
            service_keypair(),
            &EngineConfig::default(),
        );
        assert!(matches!(
            pipeline.encrypt(b"data", classify(SensitivityLevel::Internal)),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_stale_hash_flags_but_returns_plaintext() {
        let (pipeline, _) = pipeline();
        let mut record = pipeline
            .encrypt(b"original", classify(SensitivityLevel::Internal))
            .unwrap();
        record.content_hash = "00".repeat(32);

        let out = pipeline.decrypt_record(&record).unwrap();
        assert_eq!(out.plaintext, b"original");
        assert!(!out.hash_verified);
        assert!(!out.fully_verified());
    }

    #[test]
    fn test_stale_merkle_root_flags() {
        let (pipeline, _) = pipeline();
        let mut record = pipeline
            .encrypt(b"original", classify(SensitivityLevel::Internal))
            .unwrap();
        record.merkle_root = Some("deadbeef".to_string());

        let out = pipeline.decrypt_record(&record).unwrap();
        assert_eq!(out.merkle_verified, Some(false));
    }

    #[test]
    fn test_tampered_ciphertext_aborts() {
        let (pipeline, _) = pipeline();
        let mut record = pipeline
            .encrypt(b"payload", classify(SensitivityLevel::Internal))
            .unwrap();
        record.ciphertext[0] ^= 0x01;

        assert!(matches!(
            pipeline.decrypt_record(&record),
            Err(Error::Authentication(_))
        ));
    }

    #[test]
    fn test_empty_content() {
        let (pipeline, _) = pipeline();
        let record = pipeline
            .encrypt(b"", classify(SensitivityLevel::Public))
            .unwrap();
        assert_eq!(record.merkle_root.as_deref(), Some(""));

        let out = pipeline.decrypt(&record.id).unwrap();
        assert!(out.plaintext.is_empty());
        assert!(out.fully_verified());
    }

    #[test]
    fn test_classification_confidence_is_stored_verbatim() {
        let (pipeline, _) = pipeline();
        let record = pipeline
            .encrypt(
                b"data",
                Classification::new(SensitivityLevel::Internal, Some(0.42)),
            )
            .unwrap();
        assert_eq!(record.confidence, Some(0.42));
    }
}
