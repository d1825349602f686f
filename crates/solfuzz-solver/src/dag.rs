//! Generic dependency DAG with head classification.
//!
//! Nodes are stored densely: a node's [`NodeId`] is its position in the
//! store, and insertion order is checked rather than inferred. Edges point
//! from the program point whose type is decided first to the point that
//! depends on it.
//!
//! # Heads
//!
//! Every zero-inbound node is a declaration. [`DependencyDag::get_heads`]
//! splits the declarations into:
//! - **real heads**, whose types are chosen externally and seed resolution
//! - **nominal heads**, declarations that reach some node through a path no
//!   longer than another head's path to it. Seeding them independently could
//!   contradict a constraint only visible along the longer path, so they are
//!   typed backwards from their dependents instead.
//!
//! All walks use an explicit stack and visit neighbours in insertion order,
//! exactly as the equivalent recursion would. Which head wins a node depends
//! on that order.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solfuzz_core::NodeId;
use tracing::debug;

use crate::error::SolverError;
use crate::node::DependencyNode;

/// Strength of a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeRank {
    /// The dependent copies the type verbatim.
    #[default]
    Hard,
    /// The dependent may differ by a legal implicit conversion.
    Weak,
}

impl EdgeRank {
    /// Parses an optional rank label: no label is a hard edge, `"weak"` is a
    /// weak edge, anything else is rejected.
    pub fn from_label(label: Option<&str>) -> Result<EdgeRank, SolverError> {
        match label {
            None => Ok(EdgeRank::Hard),
            Some(label) => label.parse(),
        }
    }
}

impl FromStr for EdgeRank {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weak" => Ok(EdgeRank::Weak),
            other => Err(SolverError::UnsupportedRank {
                rank: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for EdgeRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeRank::Hard => write!(f, "hard"),
            EdgeRank::Weak => write!(f, "weak"),
        }
    }
}

/// Frame of the conflict-depth repair walk.
struct FixFrame {
    id: NodeId,
    next: usize,
    depth: i64,
}

/// A dependency DAG over dense node ids.
#[derive(Debug, Clone)]
pub struct DependencyDag {
    /// Label used in diagnostics.
    name: String,
    /// Nodes indexed by `NodeId.0`.
    nodes: Vec<DependencyNode>,
    /// The head each node was last labeled from.
    owners: Vec<Option<NodeId>>,
    real_heads: BTreeSet<NodeId>,
    nominal_heads: BTreeSet<NodeId>,
    /// `(head, node)` pairs where the head reaches the node along more than
    /// one path.
    multiple_dominance: BTreeSet<(NodeId, NodeId)>,
    heads_detected: bool,
}

impl DependencyDag {
    pub fn new(name: impl Into<String>) -> Self {
        DependencyDag {
            name: name.into(),
            nodes: Vec::new(),
            owners: Vec::new(),
            real_heads: BTreeSet::new(),
            nominal_heads: BTreeSet::new(),
            multiple_dominance: BTreeSet::new(),
            heads_detected: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Appends a node. Its id must equal the current node count.
    pub fn insert(&mut self, node: DependencyNode) -> Result<(), SolverError> {
        if self.heads_detected {
            return Err(SolverError::TopologyFrozen);
        }
        let position = self.nodes.len();
        if node.id.index() != position {
            return Err(SolverError::NodeOutOfOrder {
                id: node.id,
                position,
            });
        }
        self.nodes.push(node);
        self.owners.push(None);
        Ok(())
    }

    /// Records a directed edge `from -> to` and updates degree counters.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), SolverError> {
        if self.heads_detected {
            return Err(SolverError::TopologyFrozen);
        }
        self.check_node(from)?;
        self.check_node(to)?;
        let target = &mut self.nodes[to.index()];
        target.predecessors.push(from);
        target.inbound += 1;
        let source = &mut self.nodes[from.index()];
        source.successors.push(to);
        source.outbound += 1;
        Ok(())
    }

    pub(crate) fn check_node(&self, id: NodeId) -> Result<(), SolverError> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(SolverError::UnknownNode { id })
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&DependencyNode> {
        self.nodes.get(id.index())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut DependencyNode> {
        self.nodes.get_mut(id.index())
    }

    pub fn nodes(&self) -> &[DependencyNode] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [DependencyNode] {
        &mut self.nodes
    }

    /// Iterates every edge `(from, to)`, grouped by source in id order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes
            .iter()
            .flat_map(|node| node.successors.iter().map(move |&to| (node.id, to)))
    }

    pub fn heads_detected(&self) -> bool {
        self.heads_detected
    }

    pub fn real_heads(&self) -> &BTreeSet<NodeId> {
        &self.real_heads
    }

    pub fn nominal_heads(&self) -> &BTreeSet<NodeId> {
        &self.nominal_heads
    }

    /// The head a node was last labeled from.
    pub fn owner(&self, id: NodeId) -> Option<NodeId> {
        self.owners.get(id.index()).copied().flatten()
    }

    pub fn multiple_dominance(&self) -> &BTreeSet<(NodeId, NodeId)> {
        &self.multiple_dominance
    }

    // -----------------------------------------------------------------------
    // Head detection
    // -----------------------------------------------------------------------

    /// Classifies the declarations into real and nominal heads and assigns
    /// every node a depth. Must be called once, after all edges exist.
    pub fn get_heads(&mut self) -> Result<(), SolverError> {
        if self.heads_detected {
            return Err(SolverError::HeadsAlreadyDetected);
        }
        self.heads_detected = true;

        let decls: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|node| node.is_head())
            .map(|node| node.id)
            .collect();
        for &decl in &decls {
            self.nodes[decl.index()].depth = 0;
            self.owners[decl.index()] = Some(decl);
        }

        for &decl in &decls {
            let mut stack: Vec<(NodeId, i64)> = self.nodes[decl.index()]
                .successors
                .iter()
                .rev()
                .map(|&next| (next, 1))
                .collect();
            while let Some((id, depth)) = stack.pop() {
                if self.label(decl, id, depth) {
                    let node = &self.nodes[id.index()];
                    stack.extend(node.successors.iter().rev().map(|&next| (next, depth + 1)));
                }
            }
        }

        self.real_heads = decls
            .iter()
            .copied()
            .filter(|decl| !self.nominal_heads.contains(decl))
            .collect();

        // Nominal heads were labeled before the longer paths through their
        // subtrees were known.
        let nominal: Vec<NodeId> = self.nominal_heads.iter().copied().collect();
        for head in nominal {
            let depth = self.fix_depth(head);
            self.nodes[head.index()].depth = depth;
        }

        if self.real_heads.is_empty() {
            return Err(SolverError::NoRealHeads);
        }
        if let Some(node) = self.nodes.iter().find(|n| n.depth == DependencyNode::UNSET_DEPTH) {
            return Err(SolverError::MissingDepth { id: node.id });
        }

        for node in &self.nodes {
            debug!(
                dag = %self.name,
                id = %node.id,
                inbound = node.inbound,
                outbound = node.outbound,
                depth = node.depth,
                head = ?self.owner(node.id),
                "constraint node"
            );
        }
        debug!(
            dag = %self.name,
            real = ?self.real_heads,
            nominal = ?self.nominal_heads,
            "heads detected"
        );
        Ok(())
    }

    /// One step of the labeling walk: `head` reaches `id` at `depth`.
    /// Returns whether the walk continues into `id`'s successors.
    fn label(&mut self, head: NodeId, id: NodeId, depth: i64) -> bool {
        let idx = id.index();
        let current = self.nodes[idx].depth;
        if current == DependencyNode::UNSET_DEPTH {
            self.nodes[idx].depth = depth;
            self.owners[idx] = Some(head);
            return true;
        }

        self.nodes[idx].conflict = true;
        let owner = self.owners[idx];
        if current < depth {
            // A strictly longer path arrived: its head dominates the old owner.
            self.nodes[idx].depth = depth;
            match owner {
                Some(prev) if prev != head => {
                    self.nominal_heads.insert(prev);
                    self.owners[idx] = Some(head);
                }
                _ => {
                    self.multiple_dominance.insert((head, id));
                }
            }
            true
        } else {
            if owner != Some(head) {
                self.nominal_heads.insert(head);
            } else {
                self.multiple_dominance.insert((head, id));
            }
            false
        }
    }

    /// Conflict-depth repair: the largest `depth(s) - 1` over the subtree,
    /// memoized through the conflict flag.
    fn fix_depth(&mut self, root: NodeId) -> i64 {
        let root_node = &self.nodes[root.index()];
        if root_node.conflict {
            return root_node.depth;
        }

        let mut stack = vec![FixFrame {
            id: root,
            next: 0,
            depth: root_node.depth,
        }];
        let mut returned = None;
        while let Some(frame) = stack.last_mut() {
            if let Some(child_depth) = returned.take() {
                frame.depth = frame.depth.max(child_depth - 1);
            }
            let node = &self.nodes[frame.id.index()];
            match node.successors.get(frame.next).copied() {
                Some(child) => {
                    frame.next += 1;
                    let child_node = &self.nodes[child.index()];
                    if child_node.conflict {
                        frame.depth = frame.depth.max(child_node.depth - 1);
                    } else {
                        stack.push(FixFrame {
                            id: child,
                            next: 0,
                            depth: child_node.depth,
                        });
                    }
                }
                None => {
                    self.nodes[frame.id.index()].conflict = true;
                    returned = Some(frame.depth);
                    stack.pop();
                }
            }
        }
        returned.unwrap_or(DependencyNode::UNSET_DEPTH)
    }
}
