//! # engram-core
//!
//! Foundation crate for the Engram multi-agent memory system.
//! Defines the plain knowledge record model, agent identity, provenance,
//! errors, config, and constants. The replication crate builds on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod record;

// Re-export the most commonly used types at the crate root.
pub use config::SyncConfig;
pub use errors::{EngramResult, ReplicaError};
pub use models::agent::AgentId;
pub use record::{Confidence, Importance, KnowledgeRecord, RecordKind};
