//! Record-level replication.
//!
//! Wraps every [`engram_core::KnowledgeRecord`] field in the CRDT matching
//! its mutation semantics and provides round-trip conversion plus
//! field-by-field merge.

pub mod replicated;

pub use replicated::ReplicatedRecord;
