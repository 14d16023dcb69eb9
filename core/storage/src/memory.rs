//! In-memory storage backends.
//!
//! Backing maps sit behind `RwLock`s; a poisoned lock is recovered rather
//! than propagated, since the data is plain-old-data and a panicking writer
//! cannot leave it half-updated in a way reads would misinterpret.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::records::{DataRecord, ShareRecord};
use crate::store::{DataStore, PolicyStore, ShareStore};
use seallink_common::{
    EncryptionPolicy, Error, PolicyUpdate, Result, SensitivityLevel,
};

/// In-memory [`DataStore`].
#[derive(Default)]
pub struct MemoryDataStore {
    records: RwLock<HashMap<Uuid, DataRecord>>,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DataStore for MemoryDataStore {
    fn save(&self, record: DataRecord) -> Result<()> {
        self.records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(record.id, record);
        Ok(())
    }

    fn load(&self, id: &Uuid) -> Result<DataRecord> {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("data record {id}")))
    }
}

/// In-memory [`ShareStore`] keyed by token.
#[derive(Default)]
pub struct MemoryShareStore {
    shares: RwLock<HashMap<String, ShareRecord>>,
}

impl MemoryShareStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShareStore for MemoryShareStore {
    fn save(&self, share: ShareRecord) -> Result<()> {
        self.shares
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(share.token.clone(), share);
        Ok(())
    }

    fn find_by_token(&self, token: &str) -> Result<ShareRecord> {
        self.shares
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("share {token}")))
    }

    fn record_download(&self, token: &str) -> Result<u32> {
        let mut shares = self.shares.write().unwrap_or_else(|e| e.into_inner());
        let share = shares
            .get_mut(token)
            .ok_or_else(|| Error::NotFound(format!("share {token}")))?;

        // Re-check under the write lock; the caller's earlier gate may have
        // raced another download.
        let now = Utc::now();
        share.can_access(now)?;
        share.download_count += 1;
        share.last_accessed = Some(now);
        Ok(share.download_count)
    }

    fn deactivate(&self, token: &str) -> Result<()> {
        let mut shares = self.shares.write().unwrap_or_else(|e| e.into_inner());
        let share = shares
            .get_mut(token)
            .ok_or_else(|| Error::NotFound(format!("share {token}")))?;
        share.is_active = false;
        Ok(())
    }

    fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut shares = self.shares.write().unwrap_or_else(|e| e.into_inner());
        let mut count = 0;
        for share in shares.values_mut() {
            if share.is_active && share.is_expired(now) {
                share.is_active = false;
                count += 1;
            }
        }
        Ok(count)
    }
}

/// In-memory [`PolicyStore`].
#[derive(Default)]
pub struct MemoryPolicyStore {
    policies: RwLock<HashMap<SensitivityLevel, EncryptionPolicy>>,
}

impl MemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PolicyStore for MemoryPolicyStore {
    fn get(&self, level: SensitivityLevel) -> Result<EncryptionPolicy> {
        self.policies
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&level)
            .cloned()
            .ok_or_else(|| {
                Error::Configuration(format!("no encryption policy configured for {level}"))
            })
    }

    fn list(&self) -> Result<Vec<EncryptionPolicy>> {
        let policies = self.policies.read().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<EncryptionPolicy> = policies.values().cloned().collect();
        all.sort_by_key(|p| p.sensitivity_level);
        Ok(all)
    }

    fn upsert(&self, policy: EncryptionPolicy) -> Result<()> {
        policy.validate()?;
        self.policies
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(policy.sensitivity_level, policy);
        Ok(())
    }

    fn update(&self, level: SensitivityLevel, update: PolicyUpdate) -> Result<EncryptionPolicy> {
        let mut policies = self.policies.write().unwrap_or_else(|e| e.into_inner());
        let current = policies.get(&level).ok_or_else(|| {
            Error::Configuration(format!("no encryption policy configured for {level}"))
        })?;

        let mut updated = current.clone();
        if let Some(alg) = update.symmetric_algorithm {
            updated.symmetric_algorithm = alg;
            // Keep the recorded key size coherent unless explicitly set below.
            updated.key_size_bits = alg.key_bits();
        }
        if let Some(bits) = update.key_size_bits {
            updated.key_size_bits = bits;
        }
        if let Some(asym) = update.asymmetric {
            updated.asymmetric = asym;
        }
        if let Some(hash) = update.hash_algorithm {
            updated.hash_algorithm = hash;
        }
        if let Some(required) = update.signature_required {
            updated.signature_required = required;
        }
        if let Some(mfa) = update.mfa_requirement {
            updated.mfa_requirement = mfa;
        }
        if let Some(description) = update.description {
            updated.description = description;
        }

        updated.validate()?;
        policies.insert(level, updated.clone());
        Ok(updated)
    }
}
