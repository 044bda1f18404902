//! Causal relation taxonomy for edges between records.

use serde::{Deserialize, Serialize};

/// The kind of causal relationship an edge asserts between two records.
///
/// Ordering is part of the public contract: cycle repair breaks strength ties
/// by the lexicographically least `(source, target, relation)` key, so the
/// variant order here must stay stable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// X directly caused Y.
    Caused,
    /// X made Y possible (necessary but not sufficient).
    Enabled,
    /// X prevented Y from happening.
    Prevented,
    /// X and Y are in conflict.
    Contradicts,
    /// X replaces Y (newer version).
    Supersedes,
    /// X provides evidence for Y.
    Supports,
    /// Y was derived from X (transformation).
    DerivedFrom,
    /// X triggered Y (event-based).
    TriggeredBy,
}

impl RelationKind {
    /// All variants, for iteration.
    pub const ALL: [RelationKind; 8] = [
        Self::Caused,
        Self::Enabled,
        Self::Prevented,
        Self::Contradicts,
        Self::Supersedes,
        Self::Supports,
        Self::DerivedFrom,
        Self::TriggeredBy,
    ];

    /// String name matching the serde rename.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Caused => "caused",
            Self::Enabled => "enabled",
            Self::Prevented => "prevented",
            Self::Contradicts => "contradicts",
            Self::Supersedes => "supersedes",
            Self::Supports => "supports",
            Self::DerivedFrom => "derived_from",
            Self::TriggeredBy => "triggered_by",
        }
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
