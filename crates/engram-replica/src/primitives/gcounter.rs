//! Grow-only counter (G-Counter).
//!
//! Each agent accumulates into its own slot; the effective value is the sum
//! of all slots. Merge takes the per-agent maximum — each slot is itself
//! monotonic, so max-of-maxes loses nothing and is idempotent.
//!
//! Used for fields that only ever accumulate, e.g. access counts.
//!
//! # Examples
//!
//! ```
//! use engram_core::AgentId;
//! use engram_replica::GCounter;
//!
//! let alice = AgentId::from("alice");
//! let bob = AgentId::from("bob");
//!
//! let mut a = GCounter::new();
//! a.bump(&alice);
//! a.bump(&alice);
//!
//! let mut b = GCounter::new();
//! b.bump(&bob);
//!
//! a.merge(&b);
//! assert_eq!(a.value(), 3);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use engram_core::{AgentId, EngramResult, ReplicaError};

/// A grow-only counter with one monotonic slot per agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GCounter {
    slots: BTreeMap<AgentId, u64>,
}

impl GCounter {
    /// Create a new empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment `agent`'s slot by one, returning the slot's new value.
    pub fn bump(&mut self, agent: &AgentId) -> u64 {
        let slot = self.slots.entry(agent.clone()).or_insert(0);
        *slot += 1;
        *slot
    }

    /// Add `amount` to `agent`'s slot, returning the slot's new value.
    ///
    /// A negative `amount` is a caller bug and is rejected with
    /// [`ReplicaError::NegativeIncrement`] — never clamped.
    pub fn increment(&mut self, agent: &AgentId, amount: i64) -> EngramResult<u64> {
        if amount < 0 {
            return Err(ReplicaError::NegativeIncrement(amount));
        }
        let slot = self.slots.entry(agent.clone()).or_insert(0);
        *slot += amount as u64;
        Ok(*slot)
    }

    /// Effective value: sum over all agent slots.
    pub fn value(&self) -> u64 {
        self.slots.values().sum()
    }

    /// One agent's slot (0 if absent).
    pub fn slot(&self, agent: &AgentId) -> u64 {
        self.slots.get(agent).copied().unwrap_or(0)
    }

    /// Raise `agent`'s slot to at least `value`. This is a join with a
    /// single-slot state, used to seed a wrapper from a plain snapshot.
    pub(crate) fn join_slot(&mut self, agent: &AgentId, value: u64) {
        let slot = self.slots.entry(agent.clone()).or_insert(0);
        *slot = (*slot).max(value);
    }

    /// Merge with another counter: per-agent maximum, not the sum.
    pub fn merge(&mut self, other: &Self) {
        for (agent, &value) in &other.slots {
            let slot = self.slots.entry(agent.clone()).or_insert(0);
            *slot = (*slot).max(value);
        }
    }
}
