//! Error types for the replication core.
//!
//! Merge over well-formed inputs is total and never returns an error.
//! These variants cover misuse at the API boundary only.

/// Errors raised at the replication API boundary.
#[derive(Debug, thiserror::Error)]
pub enum ReplicaError {
    /// A grow-only counter was asked to go backwards.
    #[error("negative increment rejected: {0}")]
    NegativeIncrement(i64),

    /// Two replicas of different records were handed to a record-level operation.
    #[error("record identity mismatch: local {local}, remote {remote}")]
    RecordIdentityMismatch {
        /// Identifier held by the local replica.
        local: String,
        /// Identifier carried by the remote state or delta.
        remote: String,
    },

    /// A delta's clock claims causal history the local replica has not seen.
    #[error("causal order violation: delta requires {agent} at {required}, local clock has {observed}")]
    CausalOrderViolation {
        /// The agent whose entry is ahead of the local clock.
        agent: String,
        /// Clock value the delta was produced under.
        required: u64,
        /// Clock value the local replica has observed.
        observed: u64,
    },

    /// A locally added edge would close a cycle visible in this replica.
    #[error("edge rejected, would create cycle: {0}")]
    CycleRejected(String),
}

/// Convenience alias used across the workspace.
pub type EngramResult<T> = Result<T, ReplicaError>;
