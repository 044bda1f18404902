//! Multi-value register (MV-Register).
//!
//! Accumulates every write as a `(value, timestamp, agent)` triple and merges
//! by set union, so no concurrent write is ever silently discarded. The only
//! operation that is not an automatic CRDT derivation is [`MvRegister::resolve`]:
//! an explicit, externally triggered collapse to one triple. Merge never
//! resolves on its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use engram_core::AgentId;

/// One write held by a multi-value register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MvEntry<T> {
    /// The written value.
    pub value: T,
    /// When it was written.
    pub timestamp: DateTime<Utc>,
    /// Who wrote it.
    pub agent: AgentId,
}

/// A register that keeps every write until explicitly resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MvRegister<T> {
    entries: Vec<MvEntry<T>>,
}

impl<T> Default for MvRegister<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Clone + PartialEq> MvRegister<T> {
    /// Create an empty register.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create a register seeded with one write.
    pub fn seeded(value: T, timestamp: DateTime<Utc>, agent: AgentId) -> Self {
        Self {
            entries: vec![MvEntry {
                value,
                timestamp,
                agent,
            }],
        }
    }

    /// Record a write. Prior triples are kept; an exact duplicate is not
    /// added twice.
    pub fn set(&mut self, value: T, timestamp: DateTime<Utc>, agent: AgentId) {
        let entry = MvEntry {
            value,
            timestamp,
            agent,
        };
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    /// All values currently held, in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|e| &e.value)
    }

    /// All triples currently held.
    pub fn entries(&self) -> &[MvEntry<T>] {
        &self.entries
    }

    /// True when more than one distinct value is present.
    pub fn is_conflicted(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.value != self.entries[0].value)
    }

    /// True if the register holds no writes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Explicitly collapse to a single triple signed by the resolving agent.
    ///
    /// This is the only path that discards triples. It is never invoked from
    /// `merge`.
    pub fn resolve(&mut self, value: T, timestamp: DateTime<Utc>, agent: AgentId) {
        self.entries.clear();
        self.entries.push(MvEntry {
            value,
            timestamp,
            agent,
        });
    }

    /// Merge with another register: set union of triples.
    pub fn merge(&mut self, other: &Self) {
        for entry in &other.entries {
            if !self.entries.contains(entry) {
                self.entries.push(entry.clone());
            }
        }
    }
}

impl<T: Clone + Ord> MvRegister<T> {
    /// Deterministic projection of an unresolved register: the triple
    /// greatest by `(value, timestamp, agent)` total order.
    ///
    /// Deterministic-but-arbitrary on purpose — every replica projects the
    /// same winner regardless of merge history. Callers surface the conflict
    /// separately via [`MvRegister::is_conflicted`].
    pub fn winner(&self) -> Option<&MvEntry<T>> {
        self.entries
            .iter()
            .max_by(|a, b| (&a.value, a.timestamp, &a.agent).cmp(&(&b.value, b.timestamp, &b.agent)))
    }
}

/// Order-independent comparison: the same set of triples in any insertion
/// order is the same register state.
impl<T: PartialEq> PartialEq for MvRegister<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|e| other.entries.contains(e))
    }
}
