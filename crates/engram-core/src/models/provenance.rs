//! Provenance types: the chain of custody a record accumulates as it moves
//! between agents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::agent::AgentId;

/// A single hop in a record's provenance trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceHop {
    /// The agent that performed this action.
    pub agent: AgentId,
    /// What action was taken.
    pub action: ProvenanceAction,
    /// When this hop occurred.
    pub timestamp: DateTime<Utc>,
}

impl ProvenanceHop {
    /// Record an action performed by `agent` right now.
    pub fn now(agent: AgentId, action: ProvenanceAction) -> Self {
        Self {
            agent,
            action,
            timestamp: Utc::now(),
        }
    }
}

/// Actions that can appear in a provenance trail.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProvenanceAction {
    /// Record was created at this hop.
    Created,
    /// Record content or metadata was updated.
    Updated,
    /// Record was merged with a peer replica.
    Merged,
    /// Record was reclassified to a different kind.
    Reclassified,
    /// A conflicted field was explicitly resolved.
    Resolved,
    /// Record was archived.
    Archived,
}
