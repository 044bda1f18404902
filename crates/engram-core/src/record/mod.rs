//! The plain knowledge record model.
//!
//! A [`KnowledgeRecord`] is the unreplicated view of a single piece of
//! knowledge. The replication crate wraps each field in the CRDT matching its
//! mutation semantics and projects back into this shape on read.

pub mod confidence;
pub mod importance;
pub mod kind;

pub use confidence::Confidence;
pub use importance::Importance;
pub use kind::RecordKind;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::agent::AgentId;

/// The universal knowledge record. Every record in the system has this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    /// UUID v4 identifier. Immutable once assigned.
    pub id: String,
    /// Classification of this record.
    pub kind: RecordKind,
    /// The record body.
    pub content: String,
    /// Short summary of the content.
    pub summary: String,
    /// When this record was created. Immutable.
    pub created_at: DateTime<Utc>,
    /// Start of the validity window.
    pub valid_from: DateTime<Utc>,
    /// Optional end of the validity window.
    pub valid_until: Option<DateTime<Utc>>,
    /// Confidence score, clamped to [0.0, 1.0].
    pub confidence: Confidence,
    /// Importance level.
    pub importance: Importance,
    /// Number of times accessed, across all agents.
    pub access_count: u64,
    /// Last time this record was accessed.
    pub last_accessed: DateTime<Utc>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Identifiers of related records.
    pub related_records: Vec<String>,
    /// References to source material (files, documents, URLs).
    pub source_refs: Vec<String>,
    /// Named entities mentioned in the content.
    pub entity_refs: Vec<String>,
    /// Whether this record has been archived.
    pub archived: bool,
    /// Identifier of the record that supersedes this one.
    pub superseded_by: Option<String>,
    /// Identifiers of records this one supersedes.
    pub supersedes: Vec<String>,
    /// Set by projection when an unresolved concurrent write was collapsed
    /// deterministically. Cleared once the conflict is explicitly resolved.
    #[serde(default)]
    pub conflicted: bool,
    /// blake3 hash of the content, for dedup and change detection.
    pub content_hash: String,
    /// Agent that created this record. Immutable.
    pub origin_agent: AgentId,
}

impl KnowledgeRecord {
    /// Create a new record with a fresh UUID, stamped now, owned by `origin`.
    pub fn new(kind: RecordKind, content: String, summary: String, origin: AgentId) -> Self {
        let now = Utc::now();
        let content_hash = Self::hash_content(&content);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            content,
            summary,
            created_at: now,
            valid_from: now,
            valid_until: None,
            confidence: Confidence::default(),
            importance: Importance::default(),
            access_count: 0,
            last_accessed: now,
            tags: Vec::new(),
            related_records: Vec::new(),
            source_refs: Vec::new(),
            entity_refs: Vec::new(),
            archived: false,
            superseded_by: None,
            supersedes: Vec::new(),
            conflicted: false,
            content_hash,
            origin_agent: origin,
        }
    }

    /// Compute the blake3 content hash.
    pub fn hash_content(content: &str) -> String {
        blake3::hash(content.as_bytes()).to_hex().to_string()
    }

    /// Structural comparison: same content hash, kind, summary, confidence,
    /// importance, and tags.
    ///
    /// Distinct from `PartialEq`, which only compares identifiers.
    pub fn content_eq(&self, other: &Self) -> bool {
        self.content_hash == other.content_hash
            && self.kind == other.kind
            && self.summary == other.summary
            && self.confidence == other.confidence
            && self.importance == other.importance
            && self.tags == other.tags
    }
}

/// Identity equality: two records are equal if they have the same identifier.
///
/// A record's identity is its UUID, not its content. For structural
/// comparison, use [`KnowledgeRecord::content_eq`].
impl PartialEq for KnowledgeRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
