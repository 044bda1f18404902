//! # engram-replica
//!
//! CRDT primitives and replicated structures for conflict-free multi-agent
//! memory convergence. Any two replicas that have exchanged state — in any
//! order, any number of times — hold the identical state.
//!
//! ## Primitives
//!
//! - [`VectorClock`] — causal ordering (happens-before, concurrency, dominance)
//! - [`GCounter`] — grow-only counter (per-agent slots, merge = per-agent max)
//! - [`LwwRegister`] — last-writer-wins register (timestamp + agent tie-break)
//! - [`MvRegister`] — multi-value register (concurrent writes preserved until resolved)
//! - [`OrSet`] — observed-remove set (add-wins)
//! - [`MaxRegister`] — max-wins register (value only strengthens)
//!
//! ## Higher-level structures
//!
//! - [`ReplicatedRecord`] — per-field CRDT wrapper for a knowledge record
//! - [`FieldDelta`] / [`RecordDelta`] / [`SyncEngine`] — field-level delta sync
//! - [`CausalGraph`] — replicated relationship graph with cycle repair
//!
//! ## Guarantees
//!
//! Every merge in this crate is commutative, associative, and idempotent.
//! Merge over well-formed inputs is total; only boundary misuse returns a
//! [`engram_core::ReplicaError`]. This crate performs no I/O, spawns no
//! threads, and takes no locks — a host sharing one replica across threads
//! must serialize access itself.

pub mod clock;
pub mod graph;
pub mod primitives;
pub mod record;
pub mod sync;

pub use clock::VectorClock;
pub use graph::{CausalEdge, CausalGraph};
pub use primitives::{AddTag, GCounter, LwwRegister, MaxRegister, MvEntry, MvRegister, OrSet};
pub use record::ReplicatedRecord;
pub use sync::{FieldDelta, RecordDelta, SyncEngine};
