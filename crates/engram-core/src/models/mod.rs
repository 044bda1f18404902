//! Shared model types: agent identity, provenance, causal relations.

pub mod agent;
pub mod provenance;
pub mod relation;

pub use agent::AgentId;
pub use provenance::{ProvenanceAction, ProvenanceHop};
pub use relation::RelationKind;
