use serde::{Deserialize, Serialize};

/// Classification of a knowledge record.
///
/// Derives `Ord` in declaration order; the replication layer uses that total
/// order to project a deterministic winner out of concurrent
/// reclassifications, so the variant order must stay stable.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// A specific event or observation.
    Episodic,
    /// Distilled, durable knowledge.
    #[default]
    Semantic,
    /// How-to knowledge, steps, and workflows.
    Procedural,
    /// A decision and its rationale.
    Decision,
    /// A derived conclusion or pattern.
    Insight,
    /// A pointer to external material.
    Reference,
}
