//! Policy resolution.
//!
//! Every sensitivity tier maps to exactly one encryption policy. Missing
//! policies are a configuration error, never a fallback to some implicit
//! default: encrypting under weaker parameters than an operator intended
//! is worse than failing loudly.

use std::sync::Arc;
use tracing::info;

use seallink_common::{
    Algorithm, AsymmetricAlgorithm, EncryptionPolicy, HashAlgorithm, MfaRequirement,
    PolicyUpdate, Result, SensitivityLevel, SymmetricAlgorithm,
};
use seallink_storage::PolicyStore;

/// The standard per-tier policies seeded into a fresh store.
pub fn default_policies() -> [EncryptionPolicy; 4] {
    [
        EncryptionPolicy {
            sensitivity_level: SensitivityLevel::Public,
            symmetric_algorithm: SymmetricAlgorithm::Aes128Gcm,
            key_size_bits: 128,
            asymmetric: None,
            hash_algorithm: HashAlgorithm::Sha256,
            signature_required: false,
            mfa_requirement: MfaRequirement::None,
            description: "Baseline protection for public data".to_string(),
        },
        EncryptionPolicy {
            sensitivity_level: SensitivityLevel::Internal,
            symmetric_algorithm: SymmetricAlgorithm::Aes256Gcm,
            key_size_bits: 256,
            asymmetric: None,
            hash_algorithm: HashAlgorithm::Sha256,
            signature_required: false,
            mfa_requirement: MfaRequirement::None,
            description: "Standard protection for internal data".to_string(),
        },
        EncryptionPolicy {
            sensitivity_level: SensitivityLevel::Confidential,
            symmetric_algorithm: SymmetricAlgorithm::Aes256Gcm,
            key_size_bits: 256,
            asymmetric: None,
            hash_algorithm: HashAlgorithm::Sha512,
            signature_required: true,
            mfa_requirement: MfaRequirement::Conditional,
            description: "Strong protection with signatures for confidential data".to_string(),
        },
        EncryptionPolicy {
            sensitivity_level: SensitivityLevel::HighlySensitive,
            symmetric_algorithm: SymmetricAlgorithm::Aes256Gcm,
            key_size_bits: 256,
            asymmetric: Some(AsymmetricAlgorithm::Rsa { modulus_bits: 2048 }),
            hash_algorithm: HashAlgorithm::Sha512,
            signature_required: true,
            mfa_requirement: MfaRequirement::Required,
            description: "Hybrid encryption with signatures for highly sensitive data"
                .to_string(),
        },
    ]
}

/// Resolves sensitivity tiers to encryption policies.
#[derive(Clone)]
pub struct PolicyResolver {
    store: Arc<dyn PolicyStore>,
}

impl PolicyResolver {
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self { store }
    }

    /// Seed the standard policies for any tier that has none. Idempotent;
    /// operator-tuned policies are never overwritten.
    pub fn seed_defaults(&self) -> Result<()> {
        let mut seeded = 0;
        for policy in default_policies() {
            if self.store.get(policy.sensitivity_level).is_err() {
                self.store.upsert(policy)?;
                seeded += 1;
            }
        }
        if seeded > 0 {
            info!(seeded, "seeded default encryption policies");
        }
        Ok(())
    }

    /// The policy for a tier.
    ///
    /// # Errors
    /// Configuration error when the tier has no policy.
    pub fn resolve(&self, level: SensitivityLevel) -> Result<EncryptionPolicy> {
        self.store.get(level)
    }

    /// All configured policies, ordered by tier.
    pub fn list(&self) -> Result<Vec<EncryptionPolicy>> {
        self.store.list()
    }

    /// Apply a partial update to a tier's policy.
    pub fn update(
        &self,
        level: SensitivityLevel,
        update: PolicyUpdate,
    ) -> Result<EncryptionPolicy> {
        let updated = self.store.update(level, update)?;
        info!(level = %level, algorithm = %self.algorithm_for(&updated), "policy updated");
        Ok(updated)
    }

    /// The full algorithm identifier a policy selects.
    pub fn algorithm_for(&self, policy: &EncryptionPolicy) -> Algorithm {
        match policy.asymmetric {
            Some(asymmetric) => Algorithm::Hybrid {
                symmetric: policy.symmetric_algorithm,
                asymmetric,
            },
            None => Algorithm::Symmetric(policy.symmetric_algorithm),
        }
    }

    // Lookup conveniences for callers that only need one policy attribute.
    // Each falls back to the most protective answer when the tier has no
    // policy, so a misconfigured store cannot relax a requirement.

    pub fn requires_signature(&self, level: SensitivityLevel) -> bool {
        self.resolve(level)
            .map(|p| p.signature_required)
            .unwrap_or(true)
    }

    pub fn requires_hybrid(&self, level: SensitivityLevel) -> bool {
        self.resolve(level)
            .map(|p| p.requires_hybrid())
            .unwrap_or(true)
    }

    pub fn hash_algorithm(&self, level: SensitivityLevel) -> HashAlgorithm {
        self.resolve(level)
            .map(|p| p.hash_algorithm)
            .unwrap_or(HashAlgorithm::Sha512)
    }

    pub fn mfa_requirement(&self, level: SensitivityLevel) -> MfaRequirement {
        self.resolve(level)
            .map(|p| p.mfa_requirement)
            .unwrap_or(MfaRequirement::Required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seallink_common::Error;
    use seallink_storage::MemoryPolicyStore;

    fn resolver() -> PolicyResolver {
        let resolver = PolicyResolver::new(Arc::new(MemoryPolicyStore::new()));
        resolver.seed_defaults().unwrap();
        resolver
    }

    #[test]
    fn test_seeded_tiers_resolve() {
        let resolver = resolver();
        for level in SensitivityLevel::ALL {
            let policy = resolver.resolve(level).unwrap();
            assert_eq!(policy.sensitivity_level, level);
            assert!(policy.validate().is_ok());
        }
    }

    #[test]
    fn test_default_tier_parameters() {
        let resolver = resolver();

        let public = resolver.resolve(SensitivityLevel::Public).unwrap();
        assert_eq!(public.symmetric_algorithm, SymmetricAlgorithm::Aes128Gcm);
        assert!(!public.signature_required);

        let confidential = resolver.resolve(SensitivityLevel::Confidential).unwrap();
        assert_eq!(confidential.hash_algorithm, HashAlgorithm::Sha512);
        assert!(confidential.signature_required);
        assert!(!confidential.requires_hybrid());

        let top = resolver.resolve(SensitivityLevel::HighlySensitive).unwrap();
        assert!(top.requires_hybrid());
        assert_eq!(top.mfa_requirement, MfaRequirement::Required);
        assert_eq!(
            resolver.algorithm_for(&top).to_string(),
            "Hybrid-AES-256-GCM-RSA-2048"
        );
    }

    #[test]
    fn test_unseeded_store_is_configuration_error() {
        let resolver = PolicyResolver::new(Arc::new(MemoryPolicyStore::new()));
        assert!(matches!(
            resolver.resolve(SensitivityLevel::Public),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_seeding_preserves_operator_changes() {
        let resolver = resolver();
        resolver
            .update(
                SensitivityLevel::Public,
                PolicyUpdate {
                    signature_required: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        resolver.seed_defaults().unwrap();
        assert!(resolver
            .resolve(SensitivityLevel::Public)
            .unwrap()
            .signature_required);
    }

    #[test]
    fn test_attribute_helpers_fail_protective() {
        let resolver = PolicyResolver::new(Arc::new(MemoryPolicyStore::new()));
        // No policies at all: every helper answers with the strict value.
        assert!(resolver.requires_signature(SensitivityLevel::Public));
        assert!(resolver.requires_hybrid(SensitivityLevel::Public));
        assert_eq!(
            resolver.hash_algorithm(SensitivityLevel::Public),
            HashAlgorithm::Sha512
        );
        assert_eq!(
            resolver.mfa_requirement(SensitivityLevel::Public),
            MfaRequirement::Required
        );

        resolver.seed_defaults().unwrap();
        assert!(!resolver.requires_signature(SensitivityLevel::Public));
        assert_eq!(
            resolver.mfa_requirement(SensitivityLevel::Public),
            MfaRequirement::None
        );
    }

    #[test]
    fn test_update_flows_through() {
        let resolver = resolver();
        let updated = resolver
            .update(
                SensitivityLevel::Internal,
                PolicyUpdate {
                    symmetric_algorithm: Some(SymmetricAlgorithm::ChaCha20Poly1305),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(
            updated.symmetric_algorithm,
            SymmetricAlgorithm::ChaCha20Poly1305
        );
        assert_eq!(
            resolver
                .resolve(SensitivityLevel::Internal)
                .unwrap()
                .symmetric_algorithm,
            SymmetricAlgorithm::ChaCha20Poly1305
        );
    }
}
