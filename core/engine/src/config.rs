//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tunable engine parameters.
///
/// Defaults match the production deployment; tests override individual
/// fields with struct update syntax.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Modulus size for the service RSA keypair.
    pub service_key_bits: usize,
    /// Random bytes per share token (base64url-encoded, so 24 bytes
    /// yields a 32-character token).
    pub share_token_bytes: usize,
    /// Chunk size for Merkle integrity trees.
    pub merkle_chunk_size: usize,
    /// Failed password attempts tolerated within the window before lockout.
    pub max_password_failures: u32,
    /// Sliding window for counting failures, in seconds.
    pub failure_window_secs: i64,
    /// Lockout duration once the failure threshold is hit, in seconds.
    pub lockout_secs: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            service_key_bits: 2048,
            share_token_bytes: 24,
            merkle_chunk_size: 4096,
            max_password_failures: 5,
            failure_window_secs: 300,
            lockout_secs: 900,
        }
    }
}
