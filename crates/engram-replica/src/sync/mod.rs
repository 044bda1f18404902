//! Field-level delta sync.
//!
//! A delta carries the full post-merge state of each changed field, so
//! applying one is just another CRDT merge: idempotent and tolerant of
//! reordering or redelivery by the transport.

pub mod engine;
pub mod field_delta;

pub use engine::{RecordDelta, SyncEngine};
pub use field_delta::FieldDelta;
