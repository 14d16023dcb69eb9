//! Stored record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use seallink_common::encoding::{base64_bytes, base64_opt};
use seallink_common::{Algorithm, DenyReason, Error, HashAlgorithm, Result, SensitivityLevel};

/// An encrypted payload together with everything needed to decrypt and
/// verify it.
///
/// Exactly one of `key` and `encrypted_key` is present: `key` holds the raw
/// content key for symmetric records, `encrypted_key` the RSA-wrapped key
/// for hybrid records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataRecord {
    pub id: Uuid,
    pub sensitivity_level: SensitivityLevel,
    pub confidence: Option<f64>,
    pub algorithm: Algorithm,
    #[serde(with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub nonce: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub tag: Vec<u8>,
    #[serde(with = "base64_opt")]
    pub key: Option<Vec<u8>>,
    #[serde(with = "base64_opt")]
    pub encrypted_key: Option<Vec<u8>>,
    pub hash_algorithm: HashAlgorithm,
    /// Hex digest of the plaintext.
    pub content_hash: String,
    #[serde(with = "base64_opt")]
    pub signature: Option<Vec<u8>>,
    /// Merkle root of the plaintext chunks, when chunk integrity is tracked.
    pub merkle_root: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a share link at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareState {
    Active,
    Expired,
    LimitReached,
    Deactivated,
}

/// A share link granting access to one data record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareRecord {
    pub id: Uuid,
    /// URL-safe token; the only public handle for the share.
    pub token: String,
    pub data_id: Uuid,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    /// Plaintext size in bytes.
    pub content_size: usize,
    pub password_hash: Option<String>,
    pub max_downloads: Option<u32>,
    pub download_count: u32,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl ShareRecord {
    /// Whether the expiration time has passed. A share expires strictly
    /// after its expiry instant; at the instant itself it is still active.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }

    /// Whether the download limit has been consumed.
    pub fn is_limit_reached(&self) -> bool {
        self.max_downloads
            .is_some_and(|max| self.download_count >= max)
    }

    /// Current lifecycle state.
    ///
    /// Deactivation wins over every other state; a deactivated share reports
    /// `Deactivated` even after its expiry passes.
    pub fn state(&self, now: DateTime<Utc>) -> ShareState {
        if !self.is_active {
            ShareState::Deactivated
        } else if self.is_expired(now) {
            ShareState::Expired
        } else if self.is_limit_reached() {
            ShareState::LimitReached
        } else {
            ShareState::Active
        }
    }

    /// The state gate: fail unless the share is currently active.
    ///
    /// Runs before any password check so a revoked or exhausted share never
    /// reveals whether a password would have been correct.
    pub fn can_access(&self, now: DateTime<Utc>) -> Result<()> {
        match self.state(now) {
            ShareState::Active => Ok(()),
            ShareState::Expired => Err(Error::AccessDenied(DenyReason::Expired)),
            ShareState::LimitReached => Err(Error::AccessDenied(DenyReason::LimitReached)),
            ShareState::Deactivated => Err(Error::AccessDenied(DenyReason::Inactive)),
        }
    }

    /// Downloads remaining, or `None` when unlimited.
    pub fn remaining_downloads(&self) -> Option<u32> {
        self.max_downloads
            .map(|max| max.saturating_sub(self.download_count))
    }

    /// Public metadata snapshot. Never includes the password hash.
    pub fn metadata(&self, now: DateTime<Utc>) -> ShareMetadata {
        ShareMetadata {
            token: self.token.clone(),
            state: self.state(now),
            filename: self.filename.clone(),
            content_type: self.content_type.clone(),
            content_size: self.content_size,
            has_password: self.password_hash.is_some(),
            max_downloads: self.max_downloads,
            download_count: self.download_count,
            remaining_downloads: self.remaining_downloads(),
            expires_at: self.expires_at,
            created_at: self.created_at,
            last_accessed: self.last_accessed,
        }
    }
}

/// Safe-to-expose view of a share link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareMetadata {
    pub token: String,
    pub state: ShareState,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub content_size: usize,
    pub has_password: bool,
    pub max_downloads: Option<u32>,
    pub download_count: u32,
    pub remaining_downloads: Option<u32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn share() -> ShareRecord {
        ShareRecord {
            id: Uuid::new_v4(),
            token: "abc123".to_string(),
            data_id: Uuid::new_v4(),
            filename: Some("report.pdf".to_string()),
            content_type: Some("application/pdf".to_string()),
            content_size: 1024,
            password_hash: None,
            max_downloads: None,
            download_count: 0,
            expires_at: None,
            is_active: true,
            created_at: Utc::now(),
            last_accessed: None,
        }
    }

    #[test]
    fn test_fresh_share_is_active() {
        let s = share();
        let now = Utc::now();
        assert_eq!(s.state(now), ShareState::Active);
        assert!(s.can_access(now).is_ok());
        assert_eq!(s.remaining_downloads(), None);
    }

    #[test]
    fn test_expired_share() {
        let mut s = share();
        let now = Utc::now();
        s.expires_at = Some(now - Duration::seconds(1));
        assert_eq!(s.state(now), ShareState::Expired);
        assert!(matches!(
            s.can_access(now),
            Err(Error::AccessDenied(DenyReason::Expired))
        ));
    }

    #[test]
    fn test_still_active_at_expiry_instant() {
        let mut s = share();
        let now = Utc::now();
        s.expires_at = Some(now);
        assert_eq!(s.state(now), ShareState::Active);
        assert_eq!(
            s.state(now + Duration::nanoseconds(1)),
            ShareState::Expired
        );
    }

    #[test]
    fn test_limit_reached() {
        let mut s = share();
        s.max_downloads = Some(2);
        s.download_count = 2;
        let now = Utc::now();
        assert_eq!(s.state(now), ShareState::LimitReached);
        assert_eq!(s.remaining_downloads(), Some(0));
        assert!(matches!(
            s.can_access(now),
            Err(Error::AccessDenied(DenyReason::LimitReached))
        ));
    }

    #[test]
    fn test_deactivation_wins_over_expiry() {
        let mut s = share();
        let now = Utc::now();
        s.is_active = false;
        s.expires_at = Some(now - Duration::hours(1));
        assert_eq!(s.state(now), ShareState::Deactivated);
        assert!(matches!(
            s.can_access(now),
            Err(Error::AccessDenied(DenyReason::Inactive))
        ));
    }

    #[test]
    fn test_metadata_never_carries_password_hash() {
        let mut s = share();
        s.password_hash = Some("stored-pbkdf2-hash".to_string());
        let meta = s.metadata(Utc::now());
        assert!(meta.has_password);
        let json = serde_json::to_string(&meta).unwrap();
        assert!(!json.contains("stored-pbkdf2-hash"));
    }
}
