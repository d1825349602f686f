//! Per-vertex storage for the dependency DAG.

use smallvec::SmallVec;
use solfuzz_core::NodeId;

/// Neighbour list in insertion order. Most program points have few
/// dependents, so lists stay inline.
pub type Neighbors = SmallVec<[NodeId; 4]>;

/// A vertex of a dependency DAG. Pure storage: the DAG owns all behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    /// Must equal the node's position in the DAG store.
    pub id: NodeId,
    pub inbound: usize,
    pub outbound: usize,
    pub predecessors: Neighbors,
    pub successors: Neighbors,
    /// Longest labeled distance from the owning head; `-1` until head
    /// detection assigns one.
    pub depth: i64,
    pub conflict: bool,
    /// Reset by every resolution attempt.
    pub resolved: bool,
}

impl DependencyNode {
    pub const UNSET_DEPTH: i64 = -1;

    pub fn new(id: impl Into<NodeId>) -> Self {
        DependencyNode {
            id: id.into(),
            inbound: 0,
            outbound: 0,
            predecessors: Neighbors::new(),
            successors: Neighbors::new(),
            depth: Self::UNSET_DEPTH,
            conflict: false,
            resolved: false,
        }
    }

    /// Returns `true` if nothing points into this node.
    pub fn is_head(&self) -> bool {
        self.inbound == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_node_is_unlabeled_head() {
        let node = DependencyNode::new(3u32);
        assert_eq!(node.id, NodeId(3));
        assert_eq!(node.depth, DependencyNode::UNSET_DEPTH);
        assert!(node.is_head());
        assert!(!node.conflict);
        assert!(!node.resolved);
        assert!(node.successors.is_empty());
    }
}
