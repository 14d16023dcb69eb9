//! Failed-attempt tracking for password-protected shares.
//!
//! Failures are counted per share token over a sliding window; hitting the
//! threshold locks the token out for a fixed period. Successful entry
//! clears the token's history. State is process-local and injectable, so
//! tests control it directly instead of reaching into globals.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

use seallink_common::{DenyReason, Error, Result};

use crate::config::EngineConfig;

#[derive(Debug, Default)]
struct AttemptState {
    failures: Vec<DateTime<Utc>>,
    locked_until: Option<DateTime<Utc>>,
}

/// Tracks failed password attempts and enforces temporary lockouts.
pub struct AttemptTracker {
    max_failures: u32,
    window: Duration,
    lockout: Duration,
    state: Mutex<HashMap<String, AttemptState>>,
}

impl AttemptTracker {
    pub fn new(max_failures: u32, window: Duration, lockout: Duration) -> Self {
        Self {
            max_failures,
            window,
            lockout,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Build a tracker from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.max_password_failures,
            Duration::seconds(config.failure_window_secs),
            Duration::seconds(config.lockout_secs),
        )
    }

    /// Gate an attempt: errors while the key is locked out.
    pub fn check(&self, key: &str) -> Result<()> {
        if self.is_locked(key) {
            return Err(Error::AccessDenied(DenyReason::TemporarilyLocked));
        }
        Ok(())
    }

    /// Whether the key is currently locked out.
    pub fn is_locked(&self, key: &str) -> bool {
        let now = Utc::now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.get_mut(key) {
            Some(entry) => match entry.locked_until {
                Some(until) if now < until => true,
                Some(_) => {
                    // Lockout elapsed; start clean.
                    entry.locked_until = None;
                    entry.failures.clear();
                    false
                }
                None => false,
            },
            None => false,
        }
    }

    /// Record a failed attempt, locking the key once the threshold is hit
    /// within the window.
    pub fn record_failure(&self, key: &str) {
        let now = Utc::now();
        let window_start = now - self.window;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let entry = state.entry(key.to_string()).or_default();

        entry.failures.retain(|at| *at > window_start);
        entry.failures.push(now);

        if entry.failures.len() >= self.max_failures as usize {
            entry.locked_until = Some(now + self.lockout);
            warn!(
                failures = entry.failures.len(),
                lockout_secs = self.lockout.num_seconds(),
                "password attempt threshold hit, share temporarily locked"
            );
        }
    }

    /// Clear a key's history after a successful attempt.
    pub fn record_success(&self, key: &str) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }
}
