//! Agent identity for multi-agent replication.
//!
//! # Examples
//!
//! ```
//! use engram_core::AgentId;
//!
//! let fresh = AgentId::generate();
//! assert!(!fresh.as_str().is_empty());
//!
//! let named = AgentId::from("agent-1");
//! assert_eq!(named.as_str(), "agent-1");
//! ```

use serde::{Deserialize, Serialize};

/// Opaque identifier naming a replica owner.
///
/// Wraps a `String` for type safety. The lexicographic ordering of agent
/// identifiers is load-bearing: it is the deterministic tie-breaker for
/// last-writer-wins merges, so `Ord` follows the inner string exactly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(String);

impl AgentId {
    /// Create a fresh agent identity with a random UUID v4.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// View the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
