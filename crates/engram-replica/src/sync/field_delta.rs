//! Per-field change descriptors for delta sync.
//!
//! A closed union over the record's field kinds — the primitive set is fixed
//! at compile time, so no runtime polymorphism is needed. Each variant
//! carries the full merged state of its field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::primitives::{GCounter, LwwRegister, MaxRegister, MvRegister, OrSet};
use engram_core::models::provenance::ProvenanceHop;
use engram_core::record::{Confidence, Importance, RecordKind};

/// One changed field, tagged by field identity, carrying the state the
/// receiver should merge in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "state")]
#[serde(rename_all = "snake_case")]
pub enum FieldDelta {
    Kind(MvRegister<RecordKind>),
    Content(LwwRegister<String>),
    Summary(LwwRegister<String>),
    ValidFrom(LwwRegister<DateTime<Utc>>),
    ValidUntil(LwwRegister<Option<DateTime<Utc>>>),
    Importance(LwwRegister<Importance>),
    Archived(LwwRegister<bool>),
    SupersededBy(LwwRegister<Option<String>>),
    Confidence(MaxRegister<Confidence>),
    LastAccessed(MaxRegister<DateTime<Utc>>),
    AccessCount(GCounter),
    Tags(OrSet<String>),
    RelatedRecords(OrSet<String>),
    SourceRefs(OrSet<String>),
    EntityRefs(OrSet<String>),
    Supersedes(OrSet<String>),
    Provenance(Vec<ProvenanceHop>),
}

impl FieldDelta {
    /// Stable field name, for logging and queue inspection.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Kind(_) => "kind",
            Self::Content(_) => "content",
            Self::Summary(_) => "summary",
            Self::ValidFrom(_) => "valid_from",
            Self::ValidUntil(_) => "valid_until",
            Self::Importance(_) => "importance",
            Self::Archived(_) => "archived",
            Self::SupersededBy(_) => "superseded_by",
            Self::Confidence(_) => "confidence",
            Self::LastAccessed(_) => "last_accessed",
            Self::AccessCount(_) => "access_count",
            Self::Tags(_) => "tags",
            Self::RelatedRecords(_) => "related_records",
            Self::SourceRefs(_) => "source_refs",
            Self::EntityRefs(_) => "entity_refs",
            Self::Supersedes(_) => "supersedes",
            Self::Provenance(_) => "provenance",
        }
    }
}
