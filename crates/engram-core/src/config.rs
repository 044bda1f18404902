//! Configuration for replica synchronization.
//!
//! # Examples
//!
//! ```
//! use engram_core::SyncConfig;
//!
//! let config = SyncConfig::default();
//! assert!(config.strict_causal_order);
//! assert_eq!(config.max_delta_batch, 100);
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DELTA_BATCH;

/// Configuration for the delta sync engine.
///
/// Owned by the host application; this core never reads it from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Reject deltas whose clock is ahead of the local replica's causal
    /// history. Default: true. Turning this off lets a host apply deltas
    /// out of order and rely on state-carrying merges alone.
    pub strict_causal_order: bool,
    /// Maximum number of deltas applied per batch call. Default: 100.
    pub max_delta_batch: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            strict_causal_order: true,
            max_delta_batch: DEFAULT_DELTA_BATCH,
        }
    }
}
