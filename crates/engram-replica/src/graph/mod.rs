//! Replicated causal graph.
//!
//! Directed relationship edges between records, themselves replicated:
//! membership via the OR-Set, strength via max-wins registers, and a
//! deterministic post-merge repair pass that restores acyclicity.

pub mod causal;

pub use causal::{CausalEdge, CausalGraph};
