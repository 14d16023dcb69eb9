//! Storage traits the engine is written against.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::records::{DataRecord, ShareRecord};
use seallink_common::{EncryptionPolicy, PolicyUpdate, Result, SensitivityLevel};

/// Persistence for encrypted data records.
pub trait DataStore: Send + Sync {
    /// Persist a record, replacing any record with the same id.
    fn save(&self, record: DataRecord) -> Result<()>;

    /// Load a record by id.
    ///
    /// # Errors
    /// NotFound when no record has this id.
    fn load(&self, id: &Uuid) -> Result<DataRecord>;
}

/// Persistence for share links.
pub trait ShareStore: Send + Sync {
    /// Persist a share, replacing any share with the same id.
    fn save(&self, share: ShareRecord) -> Result<()>;

    /// Look up a share by its public token.
    fn find_by_token(&self, token: &str) -> Result<ShareRecord>;

    /// Atomically re-check the download limit and increment the counter.
    ///
    /// The check and the increment happen under one lock so two concurrent
    /// downloads of a share with one remaining slot cannot both succeed.
    /// Returns the new download count.
    fn record_download(&self, token: &str) -> Result<u32>;

    /// Permanently deactivate a share. Idempotent.
    fn deactivate(&self, token: &str) -> Result<()>;

    /// Deactivate every active share whose expiry has passed.
    /// Returns how many shares were deactivated.
    fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}

/// Persistence for per-tier encryption policies.
pub trait PolicyStore: Send + Sync {
    /// Fetch the policy for a tier.
    ///
    /// # Errors
    /// Configuration error when no policy exists for the tier; a missing
    /// policy is never silently defaulted.
    fn get(&self, level: SensitivityLevel) -> Result<EncryptionPolicy>;

    /// All stored policies, ordered by tier.
    fn list(&self) -> Result<Vec<EncryptionPolicy>>;

    /// Insert or replace the policy for its tier.
    fn upsert(&self, policy: EncryptionPolicy) -> Result<()>;

    /// Apply a partial update to a tier's policy and return the result.
    fn update(&self, level: SensitivityLevel, update: PolicyUpdate) -> Result<EncryptionPolicy>;
}
