//! Last-writer-wins register (LWW-Register).
//!
//! Holds a single `(value, timestamp, agent)` triple. Local `set` stores
//! unconditionally — a local writer owns its replica; ordering is merge's
//! job. On merge the incoming triple wins iff its timestamp is strictly
//! greater, or the timestamps are equal and the incoming agent identifier is
//! lexicographically greater. The tie-break is what keeps two agents writing
//! at the same wall-clock instant deterministic in every merge order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use engram_core::AgentId;

/// A last-writer-wins register over `(timestamp, agent)` total order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LwwRegister<T> {
    value: T,
    timestamp: DateTime<Utc>,
    agent: AgentId,
}

impl<T: Clone> LwwRegister<T> {
    /// Create a register holding an initial write.
    pub fn new(value: T, timestamp: DateTime<Utc>, agent: AgentId) -> Self {
        Self {
            value,
            timestamp,
            agent,
        }
    }

    /// Store a local write unconditionally.
    pub fn set(&mut self, value: T, timestamp: DateTime<Utc>, agent: AgentId) {
        self.value = value;
        self.timestamp = timestamp;
        self.agent = agent;
    }

    /// The current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Timestamp of the current value.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Agent that wrote the current value.
    pub fn agent(&self) -> &AgentId {
        &self.agent
    }

    /// Merge with another register: the incoming triple replaces the current
    /// one iff it is greater in `(timestamp, agent)` order.
    pub fn merge(&mut self, other: &Self) {
        if other.timestamp > self.timestamp
            || (other.timestamp == self.timestamp && other.agent > self.agent)
        {
            self.value = other.value.clone();
            self.timestamp = other.timestamp;
            self.agent = other.agent.clone();
        }
    }
}

impl<T: PartialEq> PartialEq for LwwRegister<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
            && self.timestamp == other.timestamp
            && self.agent == other.agent
    }
}

impl<T: Eq> Eq for LwwRegister<T> {}
