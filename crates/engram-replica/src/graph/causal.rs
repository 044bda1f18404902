//! A replicated directed graph with cycle repair.
//!
//! Two replicas can each add edges that are locally acyclic yet form a cycle
//! once merged. The local pre-check on `add_edge` is therefore advisory only;
//! correctness comes from [`CausalGraph::resolve_cycles`], which runs after
//! every merge and removes the weakest edge of each cycle with a
//! deterministic tie-break, so every replica repairs to the identical graph.
//!
//! # Examples
//!
//! ```
//! use engram_core::{AgentId, models::relation::RelationKind};
//! use engram_replica::CausalGraph;
//!
//! let agent = AgentId::from("agent-1");
//! let mut graph = CausalGraph::new();
//! graph.add_edge("A", "B", RelationKind::Caused, 0.8, &agent).unwrap();
//! graph.add_edge("B", "C", RelationKind::Enabled, 0.6, &agent).unwrap();
//!
//! // C→A would close a cycle visible locally, so it is rejected:
//! assert!(graph.add_edge("C", "A", RelationKind::Caused, 0.5, &agent).is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

use crate::primitives::{MaxRegister, OrSet};
use engram_core::constants::{STRENGTH_MAX, STRENGTH_MIN};
use engram_core::models::relation::RelationKind;
use engram_core::{AgentId, EngramResult, ReplicaError};

/// A directed, relation-kinded edge between two records.
///
/// `Ord` follows `(source, target, relation)`; cycle repair uses this order
/// to break ties among equally weak edges.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CausalEdge {
    /// Source record identifier.
    pub source: String,
    /// Target record identifier.
    pub target: String,
    /// What the edge asserts.
    pub relation: RelationKind,
}

impl CausalEdge {
    /// Construct an edge.
    pub fn new(source: &str, target: &str, relation: RelationKind) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            relation,
        }
    }
}

impl std::fmt::Display for CausalEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -[{}]-> {}", self.source, self.relation, self.target)
    }
}

/// A replicated causal graph: OR-Set edge membership plus max-wins strengths.
///
/// The stored state may transiently contain cycles immediately after an
/// OR-Set union; `merge` always runs repair before returning, so queries only
/// ever see an acyclic graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CausalGraph {
    edges: OrSet<CausalEdge>,
    strengths: BTreeMap<CausalEdge, MaxRegister<f64>>,
}

impl CausalGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge with the given strength on behalf of `agent`.
    ///
    /// Self-loops and edges that would close a locally visible cycle are
    /// rejected. The check is a heuristic for local hygiene only — peers can
    /// still reintroduce cycles through merge, which repair then removes.
    /// Strength is clamped to [0.0, 1.0]; an out-of-range or non-finite value
    /// from a misbehaving caller degrades gracefully instead of halting
    /// convergence.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        relation: RelationKind,
        strength: f64,
        agent: &AgentId,
    ) -> EngramResult<()> {
        let edge = CausalEdge::new(source, target, relation);

        if source == target {
            return Err(ReplicaError::CycleRejected(edge.to_string()));
        }
        if self.would_create_cycle(&edge) {
            return Err(ReplicaError::CycleRejected(edge.to_string()));
        }

        let strength = clamp_strength(strength);
        self.edges.add(edge.clone(), agent);
        self.strengths
            .entry(edge)
            .and_modify(|reg| reg.set(strength))
            .or_insert_with(|| MaxRegister::new(strength));

        Ok(())
    }

    /// Remove an edge (OR-Set remove: tombstones the tags observed here).
    pub fn remove_edge(&mut self, source: &str, target: &str, relation: RelationKind) {
        self.edges.remove(&CausalEdge::new(source, target, relation));
    }

    /// Raise the strength of an edge. Decreases are silently ignored.
    pub fn update_strength(
        &mut self,
        source: &str,
        target: &str,
        relation: RelationKind,
        strength: f64,
    ) {
        let edge = CausalEdge::new(source, target, relation);
        if let Some(reg) = self.strengths.get_mut(&edge) {
            reg.set(clamp_strength(strength));
        }
    }

    /// Strength of a present edge, if any.
    pub fn strength(&self, source: &str, target: &str, relation: RelationKind) -> Option<f64> {
        let edge = CausalEdge::new(source, target, relation);
        if !self.edges.contains(&edge) {
            return None;
        }
        self.strengths.get(&edge).map(|reg| *reg.get())
    }

    /// True iff the edge is present.
    pub fn contains_edge(&self, source: &str, target: &str, relation: RelationKind) -> bool {
        self.edges.contains(&CausalEdge::new(source, target, relation))
    }

    /// All present edges, in their natural order.
    pub fn edges(&self) -> Vec<&CausalEdge> {
        self.edges.iter().collect()
    }

    /// Number of present edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All record identifiers that appear as an endpoint of a present edge.
    pub fn nodes(&self) -> HashSet<&str> {
        let mut nodes = HashSet::new();
        for edge in self.edges.iter() {
            nodes.insert(edge.source.as_str());
            nodes.insert(edge.target.as_str());
        }
        nodes
    }

    /// Merge with a peer graph, then repair any cycles the union introduced.
    ///
    /// Total: well-formed inputs cannot fail.
    pub fn merge(&mut self, other: &Self) {
        self.edges.merge(&other.edges);
        for (edge, reg) in &other.strengths {
            // Re-clamp on the way in: a peer's serialized state is not
            // trusted to respect the bounds.
            let incoming = MaxRegister::new(clamp_strength(*reg.get()));
            self.strengths
                .entry(edge.clone())
                .and_modify(|mine| mine.merge(&incoming))
                .or_insert(incoming);
        }
        self.resolve_cycles();
    }

    /// Pure reachability check: would adding `edge` close a cycle visible in
    /// this replica right now?
    ///
    /// Advisory only — never relied on for correctness after a merge.
    pub fn would_create_cycle(&self, edge: &CausalEdge) -> bool {
        // Walk forward from the target; a cycle appears iff the source is
        // reachable from it.
        let adjacency = self.adjacency();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = vec![edge.target.as_str()];

        while let Some(node) = stack.pop() {
            if node == edge.source {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            if let Some(next) = adjacency.get(node) {
                stack.extend(next.iter().map(|e| e.target.as_str()));
            }
        }
        false
    }

    /// Find one cycle among the present edges, if any.
    ///
    /// Deterministic: nodes and neighbors are visited in sorted order, so
    /// every replica discovers the same cycle first.
    pub fn find_cycle(&self) -> Option<Vec<CausalEdge>> {
        let adjacency = self.adjacency();
        let mut roots: Vec<&str> = self.nodes().into_iter().collect();
        roots.sort_unstable();

        let mut done: HashSet<&str> = HashSet::new();
        for root in roots {
            if done.contains(root) {
                continue;
            }
            if let Some(cycle) = dfs_cycle(root, &adjacency, &mut done) {
                return Some(cycle);
            }
        }
        None
    }

    /// Remove the weakest edge of every cycle until the graph is acyclic.
    ///
    /// Ties among equally weak edges break toward the least
    /// `(source, target, relation)` key, so repair converges to the same
    /// graph on every replica regardless of merge or discovery order.
    /// Terminates: every pass removes one edge from a finite set.
    pub fn resolve_cycles(&mut self) {
        while let Some(cycle) = self.find_cycle() {
            let weakest = cycle
                .iter()
                .min_by(|a, b| {
                    self.stored_strength(a)
                        .partial_cmp(&self.stored_strength(b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| a.cmp(b))
                })
                .cloned();
            if let Some(edge) = weakest {
                debug!(edge = %edge, "cycle repair removing weakest edge");
                self.edges.remove(&edge);
            } else {
                break; // Unreachable: find_cycle returns non-empty cycles.
            }
        }
    }

    /// Strength used for repair decisions; absent registers rank weakest.
    fn stored_strength(&self, edge: &CausalEdge) -> f64 {
        self.strengths
            .get(edge)
            .map(|reg| *reg.get())
            .unwrap_or(STRENGTH_MIN)
    }

    /// Adjacency view over present edges, neighbors in natural edge order.
    fn adjacency(&self) -> HashMap<&str, Vec<&CausalEdge>> {
        let mut adjacency: HashMap<&str, Vec<&CausalEdge>> = HashMap::new();
        for edge in self.edges.iter() {
            adjacency.entry(edge.source.as_str()).or_default().push(edge);
        }
        adjacency
    }
}

fn clamp_strength(strength: f64) -> f64 {
    if !strength.is_finite() {
        warn!(strength, "non-finite edge strength replaced with minimum");
        return STRENGTH_MIN;
    }
    if !(STRENGTH_MIN..=STRENGTH_MAX).contains(&strength) {
        warn!(strength, "edge strength clamped to [0, 1]");
    }
    strength.clamp(STRENGTH_MIN, STRENGTH_MAX)
}

/// Iterative DFS from `root`; returns the first cycle found as its edge list.
fn dfs_cycle<'a>(
    root: &'a str,
    adjacency: &HashMap<&'a str, Vec<&'a CausalEdge>>,
    done: &mut HashSet<&'a str>,
) -> Option<Vec<CausalEdge>> {
    // Explicit stack of (node, next-neighbor-index); `path` mirrors the
    // chain of edges taken to reach the current node.
    let mut stack: Vec<(&'a str, usize)> = vec![(root, 0)];
    let mut on_path: HashSet<&'a str> = HashSet::new();
    on_path.insert(root);
    let mut path: Vec<&'a CausalEdge> = Vec::new();

    while let Some(&(node, index)) = stack.last() {
        let neighbors = adjacency.get(node).map(Vec::as_slice).unwrap_or(&[]);
        match neighbors.get(index) {
            Some(&edge) => {
                if let Some(frame) = stack.last_mut() {
                    frame.1 += 1;
                }
                let next = edge.target.as_str();
                if on_path.contains(next) {
                    // Cycle: the path segment from `next` onward, plus this edge.
                    let start = path
                        .iter()
                        .position(|e| e.source == next)
                        .unwrap_or(path.len());
                    let mut cycle: Vec<CausalEdge> =
                        path[start..].iter().map(|e| (*e).clone()).collect();
                    cycle.push(edge.clone());
                    return Some(cycle);
                }
                if !done.contains(next) {
                    on_path.insert(next);
                    path.push(edge);
                    stack.push((next, 0));
                }
            }
            None => {
                done.insert(node);
                on_path.remove(node);
                stack.pop();
                path.pop();
            }
        }
    }
    None
}
