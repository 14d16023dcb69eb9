//! Share links: expiring, download-limited, optionally password-protected
//! access to encrypted content.
//!
//! Gates run in a fixed order: lifecycle state, then lockout, then password.
//! A revoked or exhausted share therefore never leaks whether a password
//! attempt would have succeeded, and locked-out callers get the lockout
//! answer even with the right password.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use seallink_common::{
    Algorithm, DenyReason, Error, HashAlgorithm, Result, SensitivityLevel, SymmetricAlgorithm,
};
use seallink_crypto::{aead, hash, password, SymmetricKey};
use seallink_integrity::MerkleTree;
use seallink_storage::{DataRecord, DataStore, ShareMetadata, ShareRecord, ShareStore};

use crate::config::EngineConfig;
use crate::limiter::AttemptTracker;

/// Parameters for creating a share link.
#[derive(Debug, Clone, Default)]
pub struct CreateShareRequest {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub password: Option<String>,
    pub max_downloads: Option<u32>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Content retrieved through a share link.
#[derive(Debug)]
pub struct ShareDecryption {
    pub plaintext: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub hash_verified: bool,
    pub merkle_verified: bool,
    pub download_count: u32,
    pub remaining_downloads: Option<u32>,
}

/// Creates and serves share links.
pub struct ShareService {
    data_store: Arc<dyn DataStore>,
    share_store: Arc<dyn ShareStore>,
    tracker: Option<Arc<AttemptTracker>>,
    merkle_chunk_size: usize,
    token_bytes: usize,
}

impl ShareService {
    pub fn new(
        data_store: Arc<dyn DataStore>,
        share_store: Arc<dyn ShareStore>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            data_store,
            share_store,
            tracker: None,
            merkle_chunk_size: config.merkle_chunk_size,
            token_bytes: config.share_token_bytes,
        }
    }

    /// Enable failed-attempt lockout for password-protected shares.
    pub fn with_tracker(mut self, tracker: Arc<AttemptTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    fn generate_token(&self) -> String {
        let mut bytes = vec![0u8; self.token_bytes];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Encrypt `content` and create a share link for it.
    ///
    /// Shared content is always protected with AES-256-GCM and tracked with
    /// a SHA-256 content hash plus a Merkle root, independent of any tier
    /// policy; the link itself is the access boundary.
    pub fn create_share(&self, content: &[u8], request: CreateShareRequest) -> Result<ShareRecord> {
        let out = aead::encrypt(SymmetricAlgorithm::Aes256Gcm, content, None)?;
        let key = out
            .key
            .ok_or_else(|| Error::Crypto("content key was not generated".to_string()))?;

        let record = DataRecord {
            id: Uuid::new_v4(),
            sensitivity_level: SensitivityLevel::Internal,
            confidence: None,
            algorithm: Algorithm::Symmetric(SymmetricAlgorithm::Aes256Gcm),
            ciphertext: out.ciphertext,
            nonce: out.nonce.to_vec(),
            tag: out.tag.to_vec(),
            key: Some(key.as_bytes().to_vec()),
            encrypted_key: None,
            hash_algorithm: HashAlgorithm::Sha256,
            content_hash: hash::digest_hex(HashAlgorithm::Sha256, content),
            signature: None,
            merkle_root: Some(MerkleTree::new(content, self.merkle_chunk_size).root()),
            created_at: Utc::now(),
        };
        self.data_store.save(record.clone())?;

        let share = ShareRecord {
            id: Uuid::new_v4(),
            token: self.generate_token(),
            data_id: record.id,
            filename: request.filename,
            content_type: request.content_type,
            content_size: content.len(),
            password_hash: request.password.as_deref().map(password::hash_password),
            max_downloads: request.max_downloads,
            download_count: 0,
            expires_at: request.expires_at,
            is_active: true,
            created_at: Utc::now(),
            last_accessed: None,
        };
        self.share_store.save(share.clone())?;

        info!(
            token = %share.token,
            protected = share.password_hash.is_some(),
            max_downloads = ?share.max_downloads,
            "created share link"
        );
        Ok(share)
    }

    /// Open a share link and return its decrypted content.
    ///
    /// # Errors
    /// [`Error::AccessDenied`] with a precise [`DenyReason`] when any gate
    /// rejects the attempt.
    pub fn open_share(&self, token: &str, attempt: Option<&str>) -> Result<ShareDecryption> {
        let share = self.share_store.find_by_token(token)?;
        let now = Utc::now();

        share.can_access(now)?;
        if let Some(tracker) = &self.tracker {
            tracker.check(token)?;
        }
        self.check_password(&share, attempt)?;

        let record = self.data_store.load(&share.data_id)?;
        let key_bytes = record.key.clone().ok_or_else(|| {
            Error::Validation("shared record is missing its key".to_string())
        })?;
        let key = SymmetricKey::from_bytes(key_bytes);
        let plaintext = aead::decrypt(
            record.algorithm.symmetric(),
            &record.ciphertext,
            &key,
            &record.nonce,
            &record.tag,
        )?;

        let hash_verified =
            hash::verify_digest(record.hash_algorithm, &plaintext, &record.content_hash);
        let merkle_verified = record
            .merkle_root
            .as_ref()
            .map(|root| MerkleTree::verify_root(&plaintext, self.merkle_chunk_size, root))
            .unwrap_or(true);
        if !hash_verified || !merkle_verified {
            warn!(token = %token, "integrity check failed for shared content");
        }

        // The store re-checks the limit under its own lock; a concurrent
        // download may have consumed the last slot since the gate above.
        let download_count = self.share_store.record_download(token)?;
        let remaining_downloads = share
            .max_downloads
            .map(|max| max.saturating_sub(download_count));

        info!(token = %token, download_count, "share link opened");
        Ok(ShareDecryption {
            plaintext,
            filename: share.filename,
            content_type: share.content_type,
            hash_verified,
            merkle_verified,
            download_count,
            remaining_downloads,
        })
    }

    fn check_password(&self, share: &ShareRecord, attempt: Option<&str>) -> Result<()> {
        let Some(stored) = &share.password_hash else {
            return Ok(());
        };
        let Some(attempt) = attempt else {
            return Err(Error::AccessDenied(DenyReason::PasswordRequired));
        };
        if password::verify_password(attempt, stored)? {
            if let Some(tracker) = &self.tracker {
                tracker.record_success(&share.token);
            }
            Ok(())
        } else {
            if let Some(tracker) = &self.tracker {
                tracker.record_failure(&share.token);
            }
            warn!(token = %share.token, "incorrect share password");
            Err(Error::AccessDenied(DenyReason::IncorrectPassword))
        }
    }

    /// Public metadata for a share link. Safe to expose without a password.
    pub fn metadata(&self, token: &str) -> Result<ShareMetadata> {
        Ok(self.share_store.find_by_token(token)?.metadata(Utc::now()))
    }

    /// Permanently deactivate a share link.
    pub fn deactivate(&self, token: &str) -> Result<()> {
        self.share_store.deactivate(token)?;
        info!(token = %token, "share link deactivated");
        Ok(())
    }

    /// Sweep expired shares, marking them inactive.
    pub fn cleanup_expired(&self) -> Result<usize> {
        let swept = self.share_store.deactivate_expired(Utc::now())?;
        if swept > 0 {
            info!(swept, "deactivated expired share links");
        }
        Ok(swept)
    }
}
