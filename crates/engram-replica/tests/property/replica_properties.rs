//! Property tests: the three merge laws — commutativity, associativity,
//! idempotency — for every primitive, the clock, the record wrapper, and the
//! graph, over arbitrary generated states.

use chrono::{DateTime, Utc};
use proptest::prelude::*;

use engram_core::models::relation::RelationKind;
use engram_core::{AgentId, Confidence, Importance, KnowledgeRecord, RecordKind};
use engram_replica::{
    CausalGraph, GCounter, LwwRegister, MaxRegister, MvRegister, OrSet, ReplicatedRecord,
    VectorClock,
};

fn agent(i: u8) -> AgentId {
    AgentId::from(format!("agent-{i}"))
}

fn ts(offset: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000 + offset, 0).expect("valid timestamp")
}

/// Structural view of a projection. `KnowledgeRecord` equality is
/// identity-only, so convergence checks compare the serialized form instead.
fn projected(replica: &ReplicatedRecord) -> serde_json::Value {
    serde_json::to_value(replica.to_record()).expect("projection serializes")
}

// =============================================================================
// Generators
// =============================================================================

fn gcounter_strategy() -> impl Strategy<Value = GCounter> {
    prop::collection::vec((0u8..5, 0i64..50), 0..20).prop_map(|ops| {
        let mut counter = GCounter::new();
        for (who, amount) in ops {
            counter.increment(&agent(who), amount).expect("non-negative");
        }
        counter
    })
}

/// LWW registers with the value derived from `(timestamp, agent)` so two
/// generated registers can never disagree about what a given write said.
fn lww_strategy() -> impl Strategy<Value = LwwRegister<String>> {
    (0i64..500, 0u8..5).prop_map(|(offset, who)| {
        LwwRegister::new(format!("v{offset}-{who}"), ts(offset), agent(who))
    })
}

fn mv_strategy() -> impl Strategy<Value = MvRegister<u32>> {
    prop::collection::vec((0u32..10, 0i64..100, 0u8..5), 1..8).prop_map(|writes| {
        let mut reg = MvRegister::new();
        for (value, offset, who) in writes {
            reg.set(value, ts(offset), agent(who));
        }
        reg
    })
}

/// OR-Set built by a random add/remove script. `agent_base` keeps the agent
/// spaces of independently generated sets disjoint — a real agent mutates one
/// replica, so two unrelated replicas never mint the same tag.
fn or_set_strategy_from(agent_base: u8) -> impl Strategy<Value = OrSet<String>> {
    prop::collection::vec((any::<bool>(), 0u8..10, 0u8..5), 0..30).prop_map(move |ops| {
        let mut set = OrSet::new();
        for (is_add, value, who) in ops {
            let element = format!("elem-{value}");
            if is_add {
                set.add(element, &agent(agent_base + who));
            } else {
                set.remove(&element);
            }
        }
        set
    })
}

fn or_set_strategy() -> impl Strategy<Value = OrSet<String>> {
    or_set_strategy_from(0)
}

fn max_strategy() -> impl Strategy<Value = MaxRegister<u32>> {
    (0u32..1000).prop_map(MaxRegister::new)
}

fn clock_strategy() -> impl Strategy<Value = VectorClock> {
    prop::collection::vec(0u8..5, 0..30).prop_map(|ops| {
        let mut clock = VectorClock::new();
        for who in ops {
            clock.advance(&agent(who));
        }
        clock
    })
}

// =============================================================================
// Law assertions, shared across primitives
// =============================================================================

macro_rules! merge_laws {
    ($name:ident, $strategy:expr) => {
        mod $name {
            use super::*;

            proptest! {
                #[test]
                fn commutative(a in $strategy, b in $strategy) {
                    let mut ab = a.clone();
                    ab.merge(&b);
                    let mut ba = b.clone();
                    ba.merge(&a);
                    prop_assert_eq!(ab, ba);
                }

                #[test]
                fn associative(a in $strategy, b in $strategy, c in $strategy) {
                    let mut bc = b.clone();
                    bc.merge(&c);
                    let mut a_bc = a.clone();
                    a_bc.merge(&bc);

                    let mut ab = a.clone();
                    ab.merge(&b);
                    ab.merge(&c);

                    prop_assert_eq!(a_bc, ab);
                }

                #[test]
                fn idempotent(a in $strategy) {
                    let mut merged = a.clone();
                    merged.merge(&a);
                    prop_assert_eq!(merged, a);
                }
            }
        }
    };
}

merge_laws!(gcounter_laws, gcounter_strategy());
merge_laws!(lww_laws, lww_strategy());
merge_laws!(mv_laws, mv_strategy());
merge_laws!(or_set_laws, or_set_strategy());
merge_laws!(max_laws, max_strategy());
merge_laws!(clock_laws, clock_strategy());

// =============================================================================
// Clock partial order
// =============================================================================

proptest! {
    #[test]
    fn clock_happens_before_is_irreflexive_and_asymmetric(
        a in clock_strategy(),
        b in clock_strategy(),
    ) {
        prop_assert!(!a.happens_before(&a));
        if a.happens_before(&b) {
            prop_assert!(!b.happens_before(&a));
        }
    }

    #[test]
    fn clock_merge_dominates_both_inputs(a in clock_strategy(), b in clock_strategy()) {
        let mut merged = a.clone();
        merged.merge(&b);
        prop_assert!(merged.dominates(&a));
        prop_assert!(merged.dominates(&b));
    }
}

// =============================================================================
// OrSet semantics
// =============================================================================

proptest! {
    #[test]
    fn or_set_merge_never_loses_present_elements(
        a in or_set_strategy_from(0),
        b in or_set_strategy_from(100),
    ) {
        // `b` can only tombstone tags it has observed, and these two sets
        // share no history — so nothing present in `a` can disappear.
        let mut merged = a.clone();
        merged.merge(&b);
        for element in a.iter() {
            prop_assert!(merged.contains(element));
        }
    }
}

// =============================================================================
// Record wrapper laws over random mutation scripts
// =============================================================================

/// One local mutation applied to a replica.
#[derive(Debug, Clone)]
enum RecordOp {
    Summary(u8),
    Content(u8),
    AddTag(u8),
    RemoveTag(u8),
    Access,
    Boost(u32),
    Reclassify(u8),
    Archive(bool),
}

fn record_op_strategy() -> impl Strategy<Value = RecordOp> {
    prop_oneof![
        (0u8..20).prop_map(RecordOp::Summary),
        (0u8..20).prop_map(RecordOp::Content),
        (0u8..8).prop_map(RecordOp::AddTag),
        (0u8..8).prop_map(RecordOp::RemoveTag),
        Just(RecordOp::Access),
        (0u32..1000).prop_map(RecordOp::Boost),
        (0u8..3).prop_map(RecordOp::Reclassify),
        any::<bool>().prop_map(RecordOp::Archive),
    ]
}

/// Apply a script to a replica as agent `who`. Timestamps are unique per
/// (agent, step), so last-writer-wins outcomes are never ambiguous.
fn apply_ops(replica: &mut ReplicatedRecord, who: u8, ops: &[RecordOp]) {
    let owner = agent(who);
    for (step, op) in ops.iter().enumerate() {
        let t = ts((step as i64) * 10 + who as i64);
        match op {
            RecordOp::Summary(n) => {
                replica
                    .summary
                    .set(format!("summary-{who}-{n}"), t, owner.clone())
            }
            RecordOp::Content(n) => {
                replica
                    .content
                    .set(format!("content-{who}-{n}"), t, owner.clone())
            }
            RecordOp::AddTag(n) => {
                replica.tags.add(format!("tag-{n}"), &owner);
            }
            RecordOp::RemoveTag(n) => replica.tags.remove(&format!("tag-{n}")),
            RecordOp::Access => replica.record_access(&owner),
            RecordOp::Boost(n) => replica
                .confidence
                .set(Confidence::new(*n as f64 / 1000.0)),
            RecordOp::Reclassify(n) => {
                let kind = match *n {
                    0 => RecordKind::Insight,
                    1 => RecordKind::Decision,
                    _ => RecordKind::Procedural,
                };
                replica.kind.set(kind, t, owner.clone());
            }
            RecordOp::Archive(flag) => replica.archived.set(*flag, t, owner.clone()),
        }
        replica.clock.advance(&owner);
    }
}

fn base_replica() -> ReplicatedRecord {
    let mut record = KnowledgeRecord::new(
        RecordKind::Semantic,
        "base content".to_string(),
        "base summary".to_string(),
        agent(0),
    );
    record.id = "prop-record".to_string();
    record.importance = Importance::Normal;
    ReplicatedRecord::from_record(&record, &agent(0))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn record_merge_commutative(
        ops_a in prop::collection::vec(record_op_strategy(), 0..40),
        ops_b in prop::collection::vec(record_op_strategy(), 0..40),
    ) {
        let seed = base_replica();
        let mut a = seed.clone();
        let mut b = seed.clone();
        apply_ops(&mut a, 1, &ops_a);
        apply_ops(&mut b, 2, &ops_b);

        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b.clone();
        ba.merge(&a);

        prop_assert_eq!(&ab, &ba);
        prop_assert_eq!(projected(&ab), projected(&ba));
    }

    #[test]
    fn record_merge_associative(
        ops_a in prop::collection::vec(record_op_strategy(), 0..25),
        ops_b in prop::collection::vec(record_op_strategy(), 0..25),
        ops_c in prop::collection::vec(record_op_strategy(), 0..25),
    ) {
        let seed = base_replica();
        let mut a = seed.clone();
        let mut b = seed.clone();
        let mut c = seed.clone();
        apply_ops(&mut a, 1, &ops_a);
        apply_ops(&mut b, 2, &ops_b);
        apply_ops(&mut c, 3, &ops_c);

        let mut bc = b.clone();
        bc.merge(&c);
        let mut a_bc = a.clone();
        a_bc.merge(&bc);

        let mut ab = a.clone();
        ab.merge(&b);
        ab.merge(&c);

        prop_assert_eq!(a_bc, ab);
    }

    #[test]
    fn record_merge_idempotent(
        ops in prop::collection::vec(record_op_strategy(), 0..40),
    ) {
        let mut a = base_replica();
        apply_ops(&mut a, 1, &ops);

        let before = a.clone();
        a.merge(&before);
        prop_assert_eq!(a, before);
    }

    #[test]
    fn record_three_replicas_converge_in_any_merge_order(
        ops_a in prop::collection::vec(record_op_strategy(), 0..25),
        ops_b in prop::collection::vec(record_op_strategy(), 0..25),
        ops_c in prop::collection::vec(record_op_strategy(), 0..25),
    ) {
        let seed = base_replica();
        let mut a = seed.clone();
        let mut b = seed.clone();
        let mut c = seed.clone();
        apply_ops(&mut a, 1, &ops_a);
        apply_ops(&mut b, 2, &ops_b);
        apply_ops(&mut c, 3, &ops_c);

        // Order 1: a ← b ← c
        let mut one = a.clone();
        one.merge(&b);
        one.merge(&c);

        // Order 2: c ← a ← b
        let mut two = c.clone();
        two.merge(&a);
        two.merge(&b);

        // Order 3: b ← c ← a
        let mut three = b.clone();
        three.merge(&c);
        three.merge(&a);

        prop_assert_eq!(&one, &two);
        prop_assert_eq!(&two, &three);
        prop_assert_eq!(projected(&one), projected(&three));
    }
}

// =============================================================================
// Graph: merge always repairs to acyclic, identically on both sides
// =============================================================================

fn edge_list_strategy() -> impl Strategy<Value = Vec<(u8, u8, u32)>> {
    prop::collection::vec((0u8..10, 0u8..10, 0u32..1000), 0..25)
}

fn build_graph(edges: &[(u8, u8, u32)], who: &AgentId) -> CausalGraph {
    let mut graph = CausalGraph::new();
    for &(s, t, strength) in edges {
        // Locally cyclic additions are rejected; that is part of the model.
        let _ = graph.add_edge(
            &format!("n{s}"),
            &format!("n{t}"),
            RelationKind::Caused,
            strength as f64 / 1000.0,
            who,
        );
    }
    graph
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn graph_merge_is_acyclic_and_symmetric(
        edges_a in edge_list_strategy(),
        edges_b in edge_list_strategy(),
    ) {
        let g1 = build_graph(&edges_a, &agent(1));
        let g2 = build_graph(&edges_b, &agent(2));

        let mut m12 = g1.clone();
        m12.merge(&g2);
        let mut m21 = g2.clone();
        m21.merge(&g1);

        prop_assert!(m12.find_cycle().is_none());
        prop_assert!(m21.find_cycle().is_none());
        prop_assert_eq!(m12, m21);
    }

    #[test]
    fn graph_merge_idempotent(edges in edge_list_strategy()) {
        let mut graph = build_graph(&edges, &agent(1));
        let before = graph.clone();
        graph.merge(&before);
        prop_assert_eq!(graph, before);
    }
}
