//! Stateless sync orchestrator.
//!
//! Computes field-level deltas between two replicas of the same record and
//! applies them with causal-order validation. Holds no state of its own:
//! every operation is a pure function of its inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::field_delta::FieldDelta;
use crate::clock::VectorClock;
use crate::primitives::{GCounter, LwwRegister, MaxRegister, MvRegister, OrSet};
use crate::record::replicated::{merge_provenance, ReplicatedRecord};
use engram_core::record::{Confidence, Importance, RecordKind};
use engram_core::{AgentId, EngramResult, ReplicaError, SyncConfig};

/// The changes one replica is missing, as a transportable payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDelta {
    /// The record this delta applies to.
    pub record_id: String,
    /// The agent that produced this delta.
    pub source_agent: AgentId,
    /// The producer's vector clock at delta creation.
    pub clock: VectorClock,
    /// Changed fields, each carrying its merged state.
    pub fields: Vec<FieldDelta>,
    /// When this delta was created.
    pub created_at: DateTime<Utc>,
}

impl RecordDelta {
    /// True when the remote already had everything.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Stateless merge and delta orchestrator for [`ReplicatedRecord`]s.
pub struct SyncEngine;

impl SyncEngine {
    /// Merge two replicas of the same record into a fresh state.
    ///
    /// Pure: both inputs are read-only; the result is a new value.
    pub fn merge_records(local: &ReplicatedRecord, remote: &ReplicatedRecord) -> ReplicatedRecord {
        let mut merged = local.clone();
        merged.merge(remote);
        merged
    }

    /// Compute the fields `remote` is missing from `local`'s state.
    ///
    /// For each field the merged state is compared against `remote`'s current
    /// state; only fields that would actually change are included. Sending
    /// the resulting delta instead of the full wrapper is the transport
    /// layer's bandwidth win.
    pub fn compute_delta(
        local: &ReplicatedRecord,
        remote: &ReplicatedRecord,
        source: &AgentId,
    ) -> EngramResult<RecordDelta> {
        if local.id != remote.id {
            return Err(ReplicaError::RecordIdentityMismatch {
                local: local.id.clone(),
                remote: remote.id.clone(),
            });
        }

        let mut fields = Vec::new();

        push_if_changed(&mut fields, &local.kind, &remote.kind, FieldDelta::Kind);
        push_if_changed(&mut fields, &local.content, &remote.content, FieldDelta::Content);
        push_if_changed(&mut fields, &local.summary, &remote.summary, FieldDelta::Summary);
        push_if_changed(
            &mut fields,
            &local.valid_from,
            &remote.valid_from,
            FieldDelta::ValidFrom,
        );
        push_if_changed(
            &mut fields,
            &local.valid_until,
            &remote.valid_until,
            FieldDelta::ValidUntil,
        );
        push_if_changed(
            &mut fields,
            &local.importance,
            &remote.importance,
            FieldDelta::Importance,
        );
        push_if_changed(&mut fields, &local.archived, &remote.archived, FieldDelta::Archived);
        push_if_changed(
            &mut fields,
            &local.superseded_by,
            &remote.superseded_by,
            FieldDelta::SupersededBy,
        );
        push_if_changed(
            &mut fields,
            &local.confidence,
            &remote.confidence,
            FieldDelta::Confidence,
        );
        push_if_changed(
            &mut fields,
            &local.last_accessed,
            &remote.last_accessed,
            FieldDelta::LastAccessed,
        );
        push_if_changed(
            &mut fields,
            &local.access_count,
            &remote.access_count,
            FieldDelta::AccessCount,
        );
        push_if_changed(&mut fields, &local.tags, &remote.tags, FieldDelta::Tags);
        push_if_changed(
            &mut fields,
            &local.related_records,
            &remote.related_records,
            FieldDelta::RelatedRecords,
        );
        push_if_changed(
            &mut fields,
            &local.source_refs,
            &remote.source_refs,
            FieldDelta::SourceRefs,
        );
        push_if_changed(
            &mut fields,
            &local.entity_refs,
            &remote.entity_refs,
            FieldDelta::EntityRefs,
        );
        push_if_changed(
            &mut fields,
            &local.supersedes,
            &remote.supersedes,
            FieldDelta::Supersedes,
        );

        // Provenance: union, included only when the remote is missing hops.
        let mut joined = remote.provenance.clone();
        merge_provenance(&mut joined, &local.provenance);
        if joined != remote.provenance {
            fields.push(FieldDelta::Provenance(joined));
        }

        Ok(RecordDelta {
            record_id: local.id.clone(),
            source_agent: source.clone(),
            clock: local.clock.clone(),
            fields,
            created_at: Utc::now(),
        })
    }

    /// Apply a delta to a local replica, returning the number of fields
    /// applied.
    ///
    /// With `strict_causal_order` on, the delta's clock — excluding the
    /// source agent's own entry — must be covered by the local clock: a delta
    /// built on history this replica has not seen is rejected rather than
    /// applied out of order. Because every field carries full CRDT state,
    /// application is idempotent; redelivery is harmless.
    #[instrument(skip(local, delta, config), fields(record_id = %delta.record_id))]
    pub fn apply_delta(
        local: &mut ReplicatedRecord,
        delta: &RecordDelta,
        config: &SyncConfig,
    ) -> EngramResult<usize> {
        if local.id != delta.record_id {
            return Err(ReplicaError::RecordIdentityMismatch {
                local: local.id.clone(),
                remote: delta.record_id.clone(),
            });
        }

        if config.strict_causal_order {
            for agent in delta.clock.agents() {
                if agent == &delta.source_agent {
                    continue;
                }
                let required = delta.clock.entry(agent);
                let observed = local.clock.entry(agent);
                if required > observed {
                    return Err(ReplicaError::CausalOrderViolation {
                        agent: agent.to_string(),
                        required,
                        observed,
                    });
                }
            }
        }

        for field in &delta.fields {
            match field {
                FieldDelta::Kind(state) => local.kind.merge(state),
                FieldDelta::Content(state) => local.content.merge(state),
                FieldDelta::Summary(state) => local.summary.merge(state),
                FieldDelta::ValidFrom(state) => local.valid_from.merge(state),
                FieldDelta::ValidUntil(state) => local.valid_until.merge(state),
                FieldDelta::Importance(state) => local.importance.merge(state),
                FieldDelta::Archived(state) => local.archived.merge(state),
                FieldDelta::SupersededBy(state) => local.superseded_by.merge(state),
                FieldDelta::Confidence(state) => local.confidence.merge(state),
                FieldDelta::LastAccessed(state) => local.last_accessed.merge(state),
                FieldDelta::AccessCount(state) => local.access_count.merge(state),
                FieldDelta::Tags(state) => local.tags.merge(state),
                FieldDelta::RelatedRecords(state) => local.related_records.merge(state),
                FieldDelta::SourceRefs(state) => local.source_refs.merge(state),
                FieldDelta::EntityRefs(state) => local.entity_refs.merge(state),
                FieldDelta::Supersedes(state) => local.supersedes.merge(state),
                FieldDelta::Provenance(hops) => merge_provenance(&mut local.provenance, hops),
            }
            debug!(field = field.field_name(), "field delta applied");
        }

        local.clock.merge(&delta.clock);

        Ok(delta.fields.len())
    }

    /// Apply a queue of deltas, up to `config.max_delta_batch` per call.
    ///
    /// Returns the number of deltas applied; callers drain a longer queue by
    /// calling again. The first error aborts the batch — deltas already
    /// applied stay applied, which is safe because application is idempotent.
    pub fn apply_batch(
        local: &mut ReplicatedRecord,
        deltas: &[RecordDelta],
        config: &SyncConfig,
    ) -> EngramResult<usize> {
        let take = deltas.len().min(config.max_delta_batch);
        for delta in &deltas[..take] {
            Self::apply_delta(local, delta, config)?;
        }
        Ok(take)
    }
}

/// Merge `local`'s field state into a copy of `remote`'s; push a delta iff
/// the remote side would change.
fn push_if_changed<P, F>(fields: &mut Vec<FieldDelta>, local: &P, remote: &P, wrap: F)
where
    P: Clone + PartialEq + Mergeable,
    F: FnOnce(P) -> FieldDelta,
{
    let mut joined = remote.clone();
    joined.merge_from(local);
    if joined != *remote {
        fields.push(wrap(joined));
    }
}

/// Internal convergence hook so the delta loop can treat the five primitive
/// shapes uniformly without a public polymorphic surface.
trait Mergeable {
    fn merge_from(&mut self, other: &Self);
}

macro_rules! impl_mergeable {
    ($($ty:ty),* $(,)?) => {
        $(impl Mergeable for $ty {
            fn merge_from(&mut self, other: &Self) {
                self.merge(other);
            }
        })*
    };
}

impl_mergeable!(
    MvRegister<RecordKind>,
    LwwRegister<String>,
    LwwRegister<DateTime<Utc>>,
    LwwRegister<Option<DateTime<Utc>>>,
    LwwRegister<Importance>,
    LwwRegister<bool>,
    LwwRegister<Option<String>>,
    MaxRegister<Confidence>,
    MaxRegister<DateTime<Utc>>,
    GCounter,
    OrSet<String>,
);
