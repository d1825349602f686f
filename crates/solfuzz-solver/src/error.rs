//! Solver error types.
//!
//! Every error here is fatal for the current resolution attempt. Variants
//! fall into two tiers:
//! - contract violations: a collaborator handed the solver malformed input
//!   (a node inserted out of order, an unknown edge rank, a missing
//!   candidate list)
//! - invariant failures: the solver or its conversion tables are wrong (no
//!   real head, a node left untyped, a constraint not satisfied)
//!
//! The generation loop is expected to discard the candidate program on any
//! of them.

use solfuzz_core::{CoreError, NodeId, Type};
use thiserror::Error;

/// Errors produced by the dependency DAGs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    // -- contract violations --
    /// A node was inserted at a position different from its id.
    #[error("node {id} inserted at position {position}")]
    NodeOutOfOrder { id: NodeId, position: usize },

    /// An edge endpoint does not exist in the store.
    #[error("node {id} is not in the DAG")]
    UnknownNode { id: NodeId },

    /// An edge rank other than hard or `"weak"`.
    #[error("edge rank '{rank}' is not supported")]
    UnsupportedRank { rank: String },

    /// Topology was mutated after head detection.
    #[error("graph topology is frozen after head detection")]
    TopologyFrozen,

    /// `get_heads` was called twice.
    #[error("heads have already been detected")]
    HeadsAlreadyDetected,

    /// A head assignment names a node that is not a real head.
    #[error("node {id} is not a real head")]
    NotARealHead { id: NodeId },

    /// A real head has no candidate type list.
    #[error("real head {head} has no candidate types")]
    MissingCandidates { head: NodeId },

    /// A real head's candidate list is empty.
    #[error("real head {head} has an empty candidate list")]
    EmptyCandidates { head: NodeId },

    /// The store already holds as many nodes as `NodeId` can address.
    #[error("cannot add node {count}: node ids are limited to u32")]
    NodeIdOverflow { count: usize },

    // -- invariant failures --
    /// Head detection found no real head.
    #[error("no real heads in the DAG")]
    NoRealHeads,

    /// Head detection left a node without a depth.
    #[error("node {id} does not have a depth")]
    MissingDepth { id: NodeId },

    /// Resolution was requested before head detection.
    #[error("heads have not been detected yet")]
    HeadsNotDetected,

    /// A real head was not seeded before `resolve`.
    #[error("real head {head} has not been seeded with a type")]
    UnseededHead { head: NodeId },

    /// A node is still untyped where a type is required.
    #[error("node {id} is not resolved")]
    UnresolvedNode { id: NodeId },

    /// A type has no entry in the conversion table consulted for a weak edge.
    #[error("node {id} of type {ty} has no weak conversion entry")]
    NoConversionEntry { id: NodeId, ty: Type },

    /// A conversion table entry is empty.
    #[error("node {id} of type {ty} has no available conversion types")]
    NoConversionCandidates { id: NodeId, ty: Type },

    /// A weak edge's endpoint types are not related by the conversion tables.
    #[error("weak type constraint not satisfied: {from} of {from_ty} --> {to} of {to_ty}")]
    WeakConstraintViolated {
        from: NodeId,
        from_ty: Type,
        to: NodeId,
        to_ty: Type,
    },

    /// A hard edge's endpoint types differ.
    #[error("hard type constraint not satisfied: {from} of {from_ty} --> {to} of {to_ty}")]
    HardConstraintViolated {
        from: NodeId,
        from_ty: Type,
        to: NodeId,
        to_ty: Type,
    },

    /// The head-type product exceeds the configured cap.
    #[error("{count} head type combinations exceed the limit of {limit}")]
    TooManyCombinations { count: u128, limit: usize },

    /// A conversion table entry did not parse as a type.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SolverError {
    /// Returns `true` if this error blames the caller's input rather than
    /// the solver itself.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            SolverError::NodeOutOfOrder { .. }
                | SolverError::NodeIdOverflow { .. }
                | SolverError::UnknownNode { .. }
                | SolverError::UnsupportedRank { .. }
                | SolverError::TopologyFrozen
                | SolverError::HeadsAlreadyDetected
                | SolverError::NotARealHead { .. }
                | SolverError::MissingCandidates { .. }
                | SolverError::EmptyCandidates { .. }
        )
    }
}
