//! Observed-remove set (OR-Set) with add-wins semantics.
//!
//! Every add mints a unique tag; remove tombstones only the tags this replica
//! has observed, so an add performed concurrently elsewhere survives the
//! remove. Tags are allocated from a per-agent counter carried inside the set
//! — no global registry, and uniqueness survives merging because the
//! allocation map joins by max.
//!
//! Tombstones are retained indefinitely; compaction belongs to the layers
//! above this core.
//!
//! # Examples
//!
//! ```
//! use engram_core::AgentId;
//! use engram_replica::OrSet;
//!
//! let alice = AgentId::from("alice");
//!
//! let mut set = OrSet::new();
//! set.add("hello".to_string(), &alice);
//! assert!(set.contains(&"hello".to_string()));
//!
//! set.remove(&"hello".to_string());
//! assert!(!set.contains(&"hello".to_string()));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use engram_core::AgentId;

/// Unique identity of one add operation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AddTag {
    /// The agent that performed the add.
    pub agent: AgentId,
    /// That agent's add sequence number within this set.
    pub seq: u64,
}

/// An observed-remove set. Elements are kept ordered so iteration and the
/// serialized form are deterministic across replicas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrSet<T: Ord> {
    /// Element → tags from every add of that element.
    entries: BTreeMap<T, BTreeSet<AddTag>>,
    /// Tags retired by remove operations.
    tombstones: BTreeSet<AddTag>,
    /// Per-agent tag allocation high-water marks, joined by max on merge.
    alloc: BTreeMap<AgentId, u64>,
}

impl<T: Ord + Clone> OrSet<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            tombstones: BTreeSet::new(),
            alloc: BTreeMap::new(),
        }
    }

    /// Add an element on behalf of `agent`, minting a fresh tag for this add.
    pub fn add(&mut self, value: T, agent: &AgentId) -> AddTag {
        let next = self.alloc.entry(agent.clone()).or_insert(0);
        *next += 1;
        let tag = AddTag {
            agent: agent.clone(),
            seq: *next,
        };
        self.entries.entry(value).or_default().insert(tag.clone());
        tag
    }

    /// Remove an element by tombstoning every tag observed for it right now.
    ///
    /// Tags added concurrently elsewhere are untouched — after a merge the
    /// element comes back (add-wins).
    pub fn remove(&mut self, value: &T) {
        if let Some(tags) = self.entries.get(value) {
            self.tombstones.extend(tags.iter().cloned());
        }
    }

    /// True iff the element has at least one live (non-tombstoned) tag.
    pub fn contains(&self, value: &T) -> bool {
        self.entries
            .get(value)
            .is_some_and(|tags| tags.iter().any(|t| !self.tombstones.contains(t)))
    }

    /// Iterate over present elements in their natural order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries
            .iter()
            .filter(|(_, tags)| tags.iter().any(|t| !self.tombstones.contains(t)))
            .map(|(value, _)| value)
    }

    /// Number of present elements.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// True if no element is present.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Merge with another set: union of adds, union of tombstones, join of
    /// allocation marks. An element is present afterwards iff some add-tag
    /// escaped the merged tombstone set.
    pub fn merge(&mut self, other: &Self) {
        for (value, tags) in &other.entries {
            self.entries
                .entry(value.clone())
                .or_default()
                .extend(tags.iter().cloned());
        }
        self.tombstones.extend(other.tombstones.iter().cloned());
        for (agent, &mark) in &other.alloc {
            let entry = self.alloc.entry(agent.clone()).or_insert(0);
            *entry = (*entry).max(mark);
        }
    }
}

impl<T: Ord + Clone> Default for OrSet<T> {
    fn default() -> Self {
        Self::new()
    }
}
