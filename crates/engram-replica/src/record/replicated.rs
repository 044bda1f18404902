//! Per-field CRDT wrapper for [`KnowledgeRecord`].
//!
//! # Field-to-CRDT mapping
//!
//! | Field                                  | CRDT           | Merge semantics                  |
//! |----------------------------------------|----------------|----------------------------------|
//! | `id`, `created_at`, `origin_agent`     | Immutable      | Copied, never merged             |
//! | `kind`                                 | MvRegister     | Concurrent reclassification kept |
//! | `content`, `summary`                   | LwwRegister    | Last edit wins                   |
//! | `valid_from`, `valid_until`            | LwwRegister    | Can be corrected                 |
//! | `importance`, `archived`               | LwwRegister    | Last explicit change wins        |
//! | `superseded_by`                        | LwwRegister    | Explicit supersession            |
//! | `confidence`, `last_accessed`          | MaxRegister    | Only strengthens                 |
//! | `access_count`                         | GCounter       | Per-agent slots, sum for total   |
//! | `tags`, link collections, `supersedes` | OrSet          | Add wins over concurrent remove  |
//! | `provenance`                           | Append-only    | Deduplicated union of hops       |
//! | `clock`                                | VectorClock    | Component-wise max               |
//!
//! The merge of the whole wrapper is commutative, associative, and idempotent
//! because every constituent field merge is, and fields never read each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::VectorClock;
use crate::primitives::{GCounter, LwwRegister, MaxRegister, MvRegister, OrSet};
use engram_core::models::provenance::ProvenanceHop;
use engram_core::record::{Confidence, Importance, KnowledgeRecord, RecordKind};
use engram_core::AgentId;

/// One knowledge record, replicated: every mutable field wrapped in the CRDT
/// matching its mutation semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicatedRecord {
    // Immutable identity, set once at creation.
    /// UUID v4 identifier.
    pub id: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// Agent that created this record.
    pub origin_agent: AgentId,

    /// Classification. Concurrent reclassifications accumulate until an
    /// explicit resolve; projection picks a deterministic winner and flags
    /// the plain record as conflicted.
    pub kind: MvRegister<RecordKind>,
    /// The record body.
    pub content: LwwRegister<String>,
    /// Short summary of the content.
    pub summary: LwwRegister<String>,
    /// Start of the validity window.
    pub valid_from: LwwRegister<DateTime<Utc>>,
    /// Optional end of the validity window.
    pub valid_until: LwwRegister<Option<DateTime<Utc>>>,
    /// Importance level.
    pub importance: LwwRegister<Importance>,
    /// Archived flag.
    pub archived: LwwRegister<bool>,
    /// Identifier of the record that supersedes this one.
    pub superseded_by: LwwRegister<Option<String>>,

    /// Confidence — only explicit boosts propagate.
    pub confidence: MaxRegister<Confidence>,
    /// Most recent access wins.
    pub last_accessed: MaxRegister<DateTime<Utc>>,

    /// Per-agent access counters.
    pub access_count: GCounter,

    /// Free-form tags.
    pub tags: OrSet<String>,
    /// Identifiers of related records.
    pub related_records: OrSet<String>,
    /// References to source material.
    pub source_refs: OrSet<String>,
    /// Named entities mentioned in the content.
    pub entity_refs: OrSet<String>,
    /// Identifiers of records this one supersedes.
    pub supersedes: OrSet<String>,

    /// Append-only chain of custody, kept in `(timestamp, agent, action)`
    /// order so every replica holds the identical sequence.
    pub provenance: Vec<ProvenanceHop>,

    /// Causal context for delta sync.
    pub clock: VectorClock,
}

impl ReplicatedRecord {
    /// Wrap a plain record, stamping every seeded write with `agent` and the
    /// current wall-clock time.
    ///
    /// The plain access count is attributed to the creating agent's slot so
    /// the round trip through [`ReplicatedRecord::to_record`] is exact.
    /// Replicas obtained by merging this state share that slot, so counts do
    /// not inflate.
    pub fn from_record(record: &KnowledgeRecord, agent: &AgentId) -> Self {
        let now = Utc::now();

        let mut access_count = GCounter::new();
        access_count.join_slot(agent, record.access_count);

        let mut tags = OrSet::new();
        for tag in &record.tags {
            tags.add(tag.clone(), agent);
        }
        let mut related_records = OrSet::new();
        for id in &record.related_records {
            related_records.add(id.clone(), agent);
        }
        let mut source_refs = OrSet::new();
        for r in &record.source_refs {
            source_refs.add(r.clone(), agent);
        }
        let mut entity_refs = OrSet::new();
        for r in &record.entity_refs {
            entity_refs.add(r.clone(), agent);
        }
        let mut supersedes = OrSet::new();
        for id in &record.supersedes {
            supersedes.add(id.clone(), agent);
        }

        let mut clock = VectorClock::new();
        clock.advance(agent);

        Self {
            id: record.id.clone(),
            created_at: record.created_at,
            origin_agent: record.origin_agent.clone(),
            kind: MvRegister::seeded(record.kind, now, agent.clone()),
            content: LwwRegister::new(record.content.clone(), now, agent.clone()),
            summary: LwwRegister::new(record.summary.clone(), now, agent.clone()),
            valid_from: LwwRegister::new(record.valid_from, now, agent.clone()),
            valid_until: LwwRegister::new(record.valid_until, now, agent.clone()),
            importance: LwwRegister::new(record.importance, now, agent.clone()),
            archived: LwwRegister::new(record.archived, now, agent.clone()),
            superseded_by: LwwRegister::new(record.superseded_by.clone(), now, agent.clone()),
            confidence: MaxRegister::new(record.confidence),
            last_accessed: MaxRegister::new(record.last_accessed),
            access_count,
            tags,
            related_records,
            source_refs,
            entity_refs,
            supersedes,
            provenance: Vec::new(),
            clock,
        }
    }

    /// Project the current state back into a plain record. Total: never
    /// fails, never drops data.
    ///
    /// An unresolved `kind` register projects its deterministic winner and
    /// sets `conflicted` on the output. Collections come out in their natural
    /// order. The content hash is recomputed from the projected content.
    pub fn to_record(&self) -> KnowledgeRecord {
        let kind = self
            .kind
            .winner()
            .map(|entry| entry.value)
            .unwrap_or_default();
        let content = self.content.get().clone();
        let content_hash = KnowledgeRecord::hash_content(&content);

        KnowledgeRecord {
            id: self.id.clone(),
            kind,
            content,
            summary: self.summary.get().clone(),
            created_at: self.created_at,
            valid_from: *self.valid_from.get(),
            valid_until: *self.valid_until.get(),
            confidence: *self.confidence.get(),
            importance: *self.importance.get(),
            access_count: self.access_count.value(),
            last_accessed: *self.last_accessed.get(),
            tags: self.tags.iter().cloned().collect(),
            related_records: self.related_records.iter().cloned().collect(),
            source_refs: self.source_refs.iter().cloned().collect(),
            entity_refs: self.entity_refs.iter().cloned().collect(),
            archived: *self.archived.get(),
            superseded_by: self.superseded_by.get().clone(),
            supersedes: self.supersedes.iter().cloned().collect(),
            conflicted: self.kind.is_conflicted(),
            content_hash,
            origin_agent: self.origin_agent.clone(),
        }
    }

    /// Merge with a peer replica of the same record: every field merges
    /// independently, then the clocks merge.
    pub fn merge(&mut self, other: &Self) {
        // Immutable fields are not touched; both sides must describe the
        // same record.
        self.kind.merge(&other.kind);
        self.content.merge(&other.content);
        self.summary.merge(&other.summary);
        self.valid_from.merge(&other.valid_from);
        self.valid_until.merge(&other.valid_until);
        self.importance.merge(&other.importance);
        self.archived.merge(&other.archived);
        self.superseded_by.merge(&other.superseded_by);

        self.confidence.merge(&other.confidence);
        self.last_accessed.merge(&other.last_accessed);

        self.access_count.merge(&other.access_count);

        self.tags.merge(&other.tags);
        self.related_records.merge(&other.related_records);
        self.source_refs.merge(&other.source_refs);
        self.entity_refs.merge(&other.entity_refs);
        self.supersedes.merge(&other.supersedes);

        merge_provenance(&mut self.provenance, &other.provenance);

        self.clock.merge(&other.clock);
    }

    /// Record a local access: bump this agent's counter, advance the access
    /// timestamp, advance the clock.
    pub fn record_access(&mut self, agent: &AgentId) {
        self.access_count.bump(agent);
        self.last_accessed.set(Utc::now());
        self.clock.advance(agent);
    }

    /// Append a hop to the provenance trail, keeping the canonical order.
    pub fn push_hop(&mut self, hop: ProvenanceHop) {
        if !self.provenance.contains(&hop) {
            self.provenance.push(hop);
            sort_provenance(&mut self.provenance);
        }
    }
}

/// Deduplicated union of two provenance trails in canonical order.
pub(crate) fn merge_provenance(local: &mut Vec<ProvenanceHop>, remote: &[ProvenanceHop]) {
    for hop in remote {
        if !local.contains(hop) {
            local.push(hop.clone());
        }
    }
    sort_provenance(local);
}

fn sort_provenance(hops: &mut [ProvenanceHop]) {
    hops.sort_by(|a, b| {
        (a.timestamp, &a.agent, a.action).cmp(&(b.timestamp, &b.agent, b.action))
    });
}
