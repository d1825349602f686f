//! Type dependency DAG: propagates concrete types from heads to every node.
//!
//! A resolution attempt runs in four steps:
//! 1. [`TypeDependencyDag::resolve_heads`] (or the lazy
//!    [`TypeDependencyDag::head_combinations`]) enumerates every combination
//!    of candidate types for the real heads
//! 2. [`TypeDependencyDag::seed_heads`] writes one combination into the
//!    resolved-type map
//! 3. [`TypeDependencyDag::resolve`] broadcasts the head types forward along
//!    longest paths, then backward to nominal heads and dominated paths
//! 4. [`TypeDependencyDag::verify`] checks every edge against the resolved
//!    types
//!
//! [`TypeDependencyDag::init_resolution`] resets the per-attempt state so the
//! next combination reuses the same topology.
//!
//! Hard edges copy the type verbatim. Weak edges pick uniformly at random
//! from the conversion tables in [`crate::conversion`], using the DAG's own
//! seeded PRNG so an attempt is reproducible from its [`SolverConfig`].

use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use solfuzz_core::{LatticeValue, NodeId, Type};
use tracing::{debug, trace};

use crate::config::SolverConfig;
use crate::conversion::{is_legal_narrowing, narrow_legal, widen_legal};
use crate::dag::{DependencyDag, EdgeRank};
use crate::error::SolverError;
use crate::node::DependencyNode;

/// One type per real head.
pub type HeadAssignment = IndexMap<NodeId, Type>;

/// Ordered candidate types per real head, supplied by the declaration layer.
pub type HeadCandidates = IndexMap<NodeId, Vec<Type>>;

/// Which conversion table a weak edge consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The resolved node is the source of the weak edge: its dependent takes
    /// a narrowing of its type.
    From,
    /// The resolved node is the target of the weak edge: its source takes a
    /// widening of its type.
    To,
}

/// The type dependency DAG of one generation attempt.
#[derive(Debug, Clone)]
pub struct TypeDependencyDag {
    dag: DependencyDag,
    /// Weak edges keyed by `(from, to)`.
    weak: HashSet<(NodeId, NodeId)>,
    resolved_types: BTreeMap<NodeId, Type>,
    config: SolverConfig,
    rng: ChaCha8Rng,
}

impl Default for TypeDependencyDag {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl TypeDependencyDag {
    pub fn new(config: SolverConfig) -> Self {
        TypeDependencyDag {
            dag: DependencyDag::new("TypeDependence"),
            weak: HashSet::new(),
            resolved_types: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(config.random_seed),
            config,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The underlying topology.
    pub fn dag(&self) -> &DependencyDag {
        &self.dag
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Appends a node. Its id must equal the current node count.
    pub fn insert(&mut self, node: DependencyNode) -> Result<(), SolverError> {
        self.dag.insert(node)
    }

    /// Appends a fresh node with the next dense id.
    pub fn new_node(&mut self) -> Result<NodeId, SolverError> {
        let id = next_node_id(self.dag.len())?;
        self.dag.insert(DependencyNode::new(id))?;
        Ok(id)
    }

    /// Records `from -> to`. A weak edge lets `to` take a narrowing of
    /// `from`'s type instead of a copy.
    pub fn connect(&mut self, from: NodeId, to: NodeId, rank: EdgeRank) -> Result<(), SolverError> {
        self.dag.connect(from, to)?;
        if rank == EdgeRank::Weak {
            self.weak.insert((from, to));
        }
        Ok(())
    }

    /// Classifies heads. See [`DependencyDag::get_heads`].
    pub fn get_heads(&mut self) -> Result<(), SolverError> {
        self.dag.get_heads()
    }

    pub fn is_weak(&self, from: NodeId, to: NodeId) -> bool {
        self.weak.contains(&(from, to))
    }

    pub fn weak_edges(&self) -> &HashSet<(NodeId, NodeId)> {
        &self.weak
    }

    // -----------------------------------------------------------------------
    // Resolution state
    // -----------------------------------------------------------------------

    /// The resolved-type map of the current attempt.
    pub fn resolved_types(&self) -> &BTreeMap<NodeId, Type> {
        &self.resolved_types
    }

    pub fn resolved_type(&self, id: NodeId) -> Option<&Type> {
        self.resolved_types.get(&id)
    }

    pub fn is_resolved(&self, id: NodeId) -> bool {
        self.dag.node(id).is_some_and(|node| node.resolved)
    }

    /// Clears resolved flags and types. Topology and weak edges persist.
    pub fn init_resolution(&mut self) {
        for node in self.dag.nodes_mut() {
            node.resolved = false;
        }
        self.resolved_types.clear();
    }

    /// Writes one head-type combination into the resolved-type map.
    pub fn seed_heads(&mut self, assignment: &HeadAssignment) -> Result<(), SolverError> {
        if !self.dag.heads_detected() {
            return Err(SolverError::HeadsNotDetected);
        }
        if let Some(&id) = assignment
            .keys()
            .find(|id| !self.dag.real_heads().contains(*id))
        {
            return Err(SolverError::NotARealHead { id });
        }
        for (&head, &ty) in assignment {
            self.assign(head, ty);
        }
        Ok(())
    }

    fn assign(&mut self, id: NodeId, ty: Type) {
        self.resolved_types.insert(id, ty);
        if let Some(node) = self.dag.node_mut(id) {
            node.resolved = true;
        }
    }

    fn type_of(&self, id: NodeId) -> Result<Type, SolverError> {
        self.resolved_types
            .get(&id)
            .copied()
            .ok_or(SolverError::UnresolvedNode { id })
    }

    // -----------------------------------------------------------------------
    // Weak edges
    // -----------------------------------------------------------------------

    /// Picks a type for the other end of a weak edge touching `id`.
    ///
    /// With [`Direction::From`], `id` is the source and the result is one of
    /// its legal narrowings; with [`Direction::To`], `id` is the target and
    /// the result is one of its legal widening sources.
    pub fn resolve_weak(&mut self, id: NodeId, direction: Direction) -> Result<Type, SolverError> {
        let ty = self.type_of(id)?;
        let key = ty.key();
        let legal = match direction {
            Direction::From => narrow_legal(&key),
            Direction::To => widen_legal(&key),
        }
        .ok_or(SolverError::NoConversionEntry { id, ty })?;
        if legal.is_empty() {
            return Err(SolverError::NoConversionCandidates { id, ty });
        }
        let candidates = legal
            .iter()
            .map(|name| name.parse::<Type>())
            .collect::<Result<Vec<_>, _>>()?;
        let choice = candidates[self.rng.gen_range(0..candidates.len())];
        debug!(node = %id, from = %ty, ?direction, chosen = %choice, "weak edge resolved");
        Ok(choice)
    }

    /// Type flowing forward along `pred -> succ`.
    fn forward_type(&mut self, pred: NodeId, succ: NodeId) -> Result<Type, SolverError> {
        if self.is_weak(pred, succ) {
            self.resolve_weak(pred, Direction::From)
        } else {
            self.type_of(pred)
        }
    }

    /// Type flowing backward along `pred -> node`.
    fn backward_type(&mut self, pred: NodeId, node: NodeId) -> Result<Type, SolverError> {
        if self.is_weak(pred, node) {
            self.resolve_weak(node, Direction::To)
        } else {
            self.type_of(node)
        }
    }

    // -----------------------------------------------------------------------
    // Propagation
    // -----------------------------------------------------------------------

    /// Types every node from the seeded real heads.
    ///
    /// Fails if heads were not detected, a real head is unseeded, a weak
    /// edge has no legal conversion, or a node is left untyped.
    pub fn resolve(&mut self) -> Result<(), SolverError> {
        if !self.dag.heads_detected() {
            return Err(SolverError::HeadsNotDetected);
        }
        let real_heads: Vec<NodeId> = self.dag.real_heads().iter().copied().collect();
        if let Some(&head) = real_heads.iter().find(|&&head| !self.is_resolved(head)) {
            return Err(SolverError::UnseededHead { head });
        }

        for &head in &real_heads {
            self.forward_broadcast(head)?;
        }
        self.backward_broadcast()?;

        // Nodes reachable only through nominal heads are still untyped.
        let nominal: Vec<NodeId> = self.dag.nominal_heads().iter().copied().collect();
        let mut resolved = self.resolved_count();
        while resolved < self.dag.len() {
            let mut visited = vec![false; self.dag.len()];
            for &head in &nominal {
                if self.is_resolved(head) {
                    visited[head.index()] = true;
                    self.fill_from(head, &mut visited)?;
                }
            }
            self.backward_broadcast()?;
            let now = self.resolved_count();
            if now == resolved {
                break;
            }
            resolved = now;
        }

        match self.dag.nodes().iter().find(|node| !node.resolved) {
            Some(node) => Err(SolverError::UnresolvedNode { id: node.id }),
            None => Ok(()),
        }
    }

    fn resolved_count(&self) -> usize {
        self.dag.nodes().iter().filter(|node| node.resolved).count()
    }

    /// Depth-first walk from `head` along the edges that lie on a longest
    /// path from it, i.e. where the walk depth equals the successor's
    /// head-detection depth. Every such arrival writes the successor's type,
    /// so a later arrival overwrites an earlier one. Shorter arrivals are
    /// skipped and do not continue.
    fn forward_broadcast(&mut self, head: NodeId) -> Result<(), SolverError> {
        let mut stack: Vec<(NodeId, NodeId, i64)> = self
            .successors(head)
            .into_iter()
            .rev()
            .map(|next| (head, next, 1))
            .collect();
        while let Some((pred, succ, depth)) = stack.pop() {
            if Some(depth) != self.dag.node(succ).map(|node| node.depth) {
                continue;
            }
            let ty = self.forward_type(pred, succ)?;
            trace!(from = %pred, to = %succ, ty = %ty, depth, "forward");
            self.assign(succ, ty);
            stack.extend(
                self.successors(succ)
                    .into_iter()
                    .rev()
                    .map(|next| (succ, next, depth + 1)),
            );
        }
        Ok(())
    }

    /// Depth-first walk from a resolved nominal head that types unresolved
    /// successors and walks through resolved ones, each node at most once.
    fn fill_from(&mut self, head: NodeId, visited: &mut [bool]) -> Result<(), SolverError> {
        let mut stack: Vec<(NodeId, NodeId)> = self
            .successors(head)
            .into_iter()
            .rev()
            .map(|next| (head, next))
            .collect();
        while let Some((pred, succ)) = stack.pop() {
            if visited[succ.index()] {
                continue;
            }
            visited[succ.index()] = true;
            if !self.is_resolved(succ) {
                let ty = self.forward_type(pred, succ)?;
                trace!(from = %pred, to = %succ, ty = %ty, "fill");
                self.assign(succ, ty);
            }
            stack.extend(
                self.successors(succ)
                    .into_iter()
                    .rev()
                    .map(|next| (succ, next)),
            );
        }
        Ok(())
    }

    /// Types unresolved predecessors of resolved nodes, visiting node ids in
    /// ascending order and each node at most once.
    fn backward_broadcast(&mut self) -> Result<(), SolverError> {
        let mut visited = vec![false; self.dag.len()];
        for idx in 0..self.dag.len() {
            let root = NodeId(idx as u32);
            if visited[idx] || !self.is_resolved(root) {
                continue;
            }
            visited[idx] = true;
            let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
            while let Some(&(node, next)) = stack.last() {
                let prev = match self.predecessor(node, next) {
                    Some(prev) => prev,
                    None => {
                        stack.pop();
                        continue;
                    }
                };
                if let Some(frame) = stack.last_mut() {
                    frame.1 += 1;
                }
                if self.is_resolved(prev) {
                    continue;
                }
                let ty = self.backward_type(prev, node)?;
                trace!(from = %node, to = %prev, ty = %ty, "backward");
                self.assign(prev, ty);
                visited[prev.index()] = true;
                stack.push((prev, 0));
            }
        }
        Ok(())
    }

    fn successors(&self, id: NodeId) -> Vec<NodeId> {
        self.dag
            .node(id)
            .map(|node| node.successors.to_vec())
            .unwrap_or_default()
    }

    fn predecessor(&self, id: NodeId, nth: usize) -> Option<NodeId> {
        self.dag
            .node(id)
            .and_then(|node| node.predecessors.get(nth).copied())
    }

    // -----------------------------------------------------------------------
    // Head-type enumeration
    // -----------------------------------------------------------------------

    /// Every combination of candidate types for the real heads.
    ///
    /// Heads are taken in ascending id order and the first head varies
    /// fastest. Fails if a real head has no (or an empty) candidate list, or
    /// if the product exceeds [`SolverConfig::max_head_combinations`].
    pub fn resolve_heads(&self, candidates: &HeadCandidates) -> Result<Vec<HeadAssignment>, SolverError> {
        let combinations = self.head_combinations(candidates)?;
        let count = combinations.total();
        let limit = self.config.max_head_combinations;
        if count > limit as u128 {
            return Err(SolverError::TooManyCombinations { count, limit });
        }
        Ok(combinations.collect())
    }

    /// Lazy form of [`resolve_heads`](Self::resolve_heads), without the cap.
    pub fn head_combinations(&self, candidates: &HeadCandidates) -> Result<HeadCombinations, SolverError> {
        if !self.dag.heads_detected() {
            return Err(SolverError::HeadsNotDetected);
        }
        let mut heads = Vec::with_capacity(self.dag.real_heads().len());
        for &head in self.dag.real_heads() {
            let types = candidates
                .get(&head)
                .ok_or(SolverError::MissingCandidates { head })?;
            if types.is_empty() {
                return Err(SolverError::EmptyCandidates { head });
            }
            heads.push((head, types.clone()));
        }
        Ok(HeadCombinations::new(heads))
    }

    // -----------------------------------------------------------------------
    // Verification
    // -----------------------------------------------------------------------

    /// Checks that every node is typed and every edge is satisfied: hard
    /// edges carry identical types, weak edges a legal narrowing.
    pub fn verify(&self) -> Result<(), SolverError> {
        for node in self.dag.nodes() {
            if !node.resolved {
                return Err(SolverError::UnresolvedNode { id: node.id });
            }
            self.type_of(node.id)?;
        }
        for (from, to) in self.dag.edges() {
            let from_ty = self.type_of(from)?;
            let to_ty = self.type_of(to)?;
            let (from_key, to_key) = (from_ty.key(), to_ty.key());
            let satisfied = if self.is_weak(from, to) {
                is_legal_narrowing(&to_key, &to_key)
                    && (narrow_legal(&from_key).is_none() || is_legal_narrowing(&from_key, &to_key))
            } else {
                from_key == to_key
            };
            if satisfied {
                continue;
            }
            return Err(if self.is_weak(from, to) {
                SolverError::WeakConstraintViolated {
                    from,
                    from_ty,
                    to,
                    to_ty,
                }
            } else {
                SolverError::HardConstraintViolated {
                    from,
                    from_ty,
                    to,
                    to_ty,
                }
            });
        }
        Ok(())
    }
}

/// The id of a node appended to a store holding `len` nodes.
fn next_node_id(len: usize) -> Result<NodeId, SolverError> {
    u32::try_from(len)
        .map(NodeId)
        .map_err(|_| SolverError::NodeIdOverflow { count: len })
}

/// Iterator over head-type combinations; the first head varies fastest.
#[derive(Debug, Clone)]
pub struct HeadCombinations {
    heads: Vec<(NodeId, Vec<Type>)>,
    indices: Vec<usize>,
    done: bool,
}

impl HeadCombinations {
    fn new(heads: Vec<(NodeId, Vec<Type>)>) -> Self {
        let done = heads.is_empty() || heads.iter().any(|(_, types)| types.is_empty());
        HeadCombinations {
            indices: vec![0; heads.len()],
            heads,
            done,
        }
    }

    /// Total number of combinations, saturating.
    pub fn total(&self) -> u128 {
        self.heads
            .iter()
            .fold(1u128, |acc, (_, types)| acc.saturating_mul(types.len() as u128))
    }
}

impl Iterator for HeadCombinations {
    type Item = HeadAssignment;

    fn next(&mut self) -> Option<HeadAssignment> {
        if self.done {
            return None;
        }
        let current = self
            .heads
            .iter()
            .zip(&self.indices)
            .map(|((head, types), &i)| (*head, types[i]))
            .collect();

        // Advance the odometer.
        self.done = true;
        for (slot, (_, types)) in self.indices.iter_mut().zip(&self.heads) {
            *slot += 1;
            if *slot < types.len() {
                self.done = false;
                break;
            }
            *slot = 0;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use solfuzz_core::{all_integer_types, IntWidth};

    fn ty(s: &str) -> Type {
        s.parse().unwrap()
    }

    /// Builds a DAG with nodes `0..n`; the flag marks weak edges.
    fn build(n: u32, edges: &[(u32, u32, bool)]) -> TypeDependencyDag {
        let mut dag = TypeDependencyDag::new(SolverConfig::with_seed(7));
        for _ in 0..n {
            dag.new_node().unwrap();
        }
        for &(from, to, weak) in edges {
            let rank = if weak { EdgeRank::Weak } else { EdgeRank::Hard };
            dag.connect(NodeId(from), NodeId(to), rank).unwrap();
        }
        dag.get_heads().unwrap();
        dag
    }

    fn seed(dag: &mut TypeDependencyDag, heads: &[(u32, &str)]) {
        let assignment: HeadAssignment = heads.iter().map(|&(id, t)| (NodeId(id), ty(t))).collect();
        dag.seed_heads(&assignment).unwrap();
    }

    fn type_key(dag: &TypeDependencyDag, id: u32) -> String {
        dag.resolved_type(NodeId(id)).unwrap().key()
    }

    // -----------------------------------------------------------------------
    // resolve_weak
    // -----------------------------------------------------------------------

    #[test]
    fn weak_from_picks_a_narrowing() {
        let mut dag = build(2, &[(0, 1, true)]);
        seed(&mut dag, &[(0, "uint64")]);
        for _ in 0..32 {
            let t = dag.resolve_weak(NodeId(0), Direction::From).unwrap();
            assert!(ty("uint64").is_super_of(&t), "{t} is not a narrowing of uint64");
        }
    }

    #[test]
    fn weak_to_picks_a_widening() {
        let mut dag = build(2, &[(0, 1, true)]);
        seed(&mut dag, &[(0, "int128")]);
        for _ in 0..32 {
            let t = dag.resolve_weak(NodeId(0), Direction::To).unwrap();
            assert!(t == ty("int128") || t == ty("int256"));
        }
    }

    #[test]
    fn weak_on_unresolved_node_fails() {
        let mut dag = build(2, &[(0, 1, true)]);
        assert_eq!(
            dag.resolve_weak(NodeId(1), Direction::From),
            Err(SolverError::UnresolvedNode { id: NodeId(1) })
        );
    }

    #[test]
    fn weak_on_type_without_entry_fails() {
        let mut dag = build(2, &[(0, 1, true)]);
        seed(&mut dag, &[(0, "address")]);
        assert_eq!(
            dag.resolve_weak(NodeId(0), Direction::From),
            Err(SolverError::NoConversionEntry {
                id: NodeId(0),
                ty: ty("address")
            })
        );
        assert!(dag.resolve().is_err());
    }

    // -----------------------------------------------------------------------
    // resolve
    // -----------------------------------------------------------------------

    #[test]
    fn resolve_before_head_detection_fails() {
        let mut dag = TypeDependencyDag::default();
        dag.new_node().unwrap();
        assert_eq!(dag.resolve(), Err(SolverError::HeadsNotDetected));
        assert_eq!(dag.verify(), Err(SolverError::UnresolvedNode { id: NodeId(0) }));
    }

    #[test]
    fn resolve_before_seeding_fails() {
        let mut dag = build(3, &[(0, 1, false), (1, 2, false)]);
        assert_eq!(dag.resolve(), Err(SolverError::UnseededHead { head: NodeId(0) }));
        assert!(dag.resolved_types().is_empty());
    }

    #[test]
    fn seeding_a_non_head_fails() {
        let mut dag = build(2, &[(0, 1, false)]);
        let assignment: HeadAssignment = [(NodeId(1), ty("bool"))].into_iter().collect();
        assert_eq!(
            dag.seed_heads(&assignment),
            Err(SolverError::NotARealHead { id: NodeId(1) })
        );
    }

    #[test]
    fn hard_edges_copy_the_head_type() {
        let mut dag = build(4, &[(0, 1, false), (1, 2, false), (0, 3, false)]);
        seed(&mut dag, &[(0, "address payable")]);
        dag.resolve().unwrap();
        dag.verify().unwrap();
        for id in 0..4 {
            assert_eq!(type_key(&dag, id), "address payable");
        }
    }

    #[test]
    fn nominal_head_is_typed_backwards() {
        // 0 -> 1 <- 3 -> 4, node 2 isolated.
        let mut dag = build(5, &[(0, 1, false), (3, 1, false), (3, 4, false)]);
        seed(&mut dag, &[(0, "uint16"), (2, "bool")]);
        dag.resolve().unwrap();
        dag.verify().unwrap();
        assert_eq!(type_key(&dag, 3), "uint16");
        assert_eq!(type_key(&dag, 4), "uint16");
        assert_eq!(type_key(&dag, 2), "bool");
    }

    #[test]
    fn nodes_below_a_nominal_head_are_filled() {
        // 0 -> 2 -> 3 and 1 -> 5 -> 3 arrive at equal length, so 1 is
        // nominal; 5 -> 4 is only reachable through it.
        let mut dag = build(
            6,
            &[(0, 2, false), (2, 3, false), (1, 5, false), (5, 3, false), (5, 4, false)],
        );
        assert_eq!(dag.dag().real_heads().iter().map(|h| h.0).collect::<Vec<_>>(), vec![0]);
        seed(&mut dag, &[(0, "int32")]);
        dag.resolve().unwrap();
        dag.verify().unwrap();
        for id in 0..6 {
            assert_eq!(type_key(&dag, id), "int32", "node {id}");
        }
    }

    #[test]
    fn weak_chain_narrows_monotonically() {
        let mut dag = build(4, &[(0, 1, true), (1, 2, true), (2, 3, true)]);
        seed(&mut dag, &[(0, "uint256")]);
        dag.resolve().unwrap();
        dag.verify().unwrap();
        let widths: Vec<IntWidth> = (0..4)
            .map(|id| dag.resolved_type(NodeId(id)).unwrap().width().unwrap())
            .collect();
        assert!(widths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn narrowest_head_resolves_dominated_graph() {
        let mut dag = build(
            7,
            &[
                (0, 2, false),
                (2, 3, true),
                (0, 6, false),
                (3, 4, false),
                (4, 5, true),
                (5, 6, false),
                (1, 5, false),
            ],
        );
        seed(&mut dag, &[(0, "uint8")]);
        dag.resolve().unwrap();
        dag.verify().unwrap();
        assert_eq!(dag.resolved_types().len(), 7);
        assert!(dag.resolved_types().values().all(|t| *t == ty("uint8")));
    }

    /// Conflict graphs: some node is reached both by a short path and by a
    /// longer one, with weak edges on at least one of them.
    const CONFLICT_GRAPHS: &[(u32, &[(u32, u32, bool)])] = &[
        // short weak edge, longer hard path
        (3, &[(0, 1, true), (0, 2, false), (2, 1, false)]),
        // short weak edge, longer path with a weak step
        (4, &[(0, 1, true), (0, 2, true), (2, 3, false), (3, 1, false)]),
        // dominated declaration with weak steps on the long path
        (
            7,
            &[
                (0, 2, false),
                (2, 3, true),
                (0, 6, false),
                (3, 4, false),
                (4, 5, true),
                (5, 6, false),
                (1, 5, false),
            ],
        ),
        // ownership taken over along an all-weak path
        (5, &[(0, 1, true), (3, 2, true), (2, 1, true), (4, 3, true)]),
    ];

    #[test]
    fn longer_hard_path_overrides_short_weak_edge() {
        let mut dag = build(3, &[(0, 1, true), (0, 2, false), (2, 1, false)]);
        assert_eq!(dag.dag().node(NodeId(1)).unwrap().depth, 2);
        seed(&mut dag, &[(0, "uint256")]);
        dag.resolve().unwrap();
        dag.verify().unwrap();
        for id in 0..3 {
            assert_eq!(type_key(&dag, id), "uint256", "node {id}");
        }
    }

    #[test]
    fn short_edge_does_not_overwrite_a_long_weak_path() {
        let mut dag = build(
            7,
            &[
                (0, 2, false),
                (2, 3, true),
                (0, 6, false),
                (3, 4, false),
                (4, 5, true),
                (5, 6, false),
                (1, 5, false),
            ],
        );
        for _ in 0..16 {
            dag.init_resolution();
            seed(&mut dag, &[(0, "uint256")]);
            dag.resolve().unwrap();
            dag.verify().unwrap();
            assert_eq!(dag.resolved_type(NodeId(6)), dag.resolved_type(NodeId(5)));
            assert_eq!(dag.resolved_type(NodeId(1)), dag.resolved_type(NodeId(5)));
        }
    }

    proptest! {
        #[test]
        fn wide_heads_verify_on_conflict_graphs(
            seed_value in any::<u64>(),
            graph in 0..CONFLICT_GRAPHS.len(),
            head_ty in prop::sample::select(vec!["uint256", "int256", "uint64"]),
        ) {
            let (n, edges) = CONFLICT_GRAPHS[graph];
            let mut dag = TypeDependencyDag::new(SolverConfig::with_seed(seed_value));
            for _ in 0..n {
                dag.new_node().unwrap();
            }
            for &(from, to, weak) in edges {
                let rank = if weak { EdgeRank::Weak } else { EdgeRank::Hard };
                dag.connect(NodeId(from), NodeId(to), rank).unwrap();
            }
            dag.get_heads().unwrap();
            let heads: HeadAssignment = dag
                .dag()
                .real_heads()
                .iter()
                .map(|&h| (h, ty(head_ty)))
                .collect();
            dag.seed_heads(&heads).unwrap();
            dag.resolve().unwrap();
            prop_assert_eq!(dag.verify(), Ok(()));
            prop_assert_eq!(dag.resolved_types().len(), n as usize);
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn node_ids_stop_at_u32() {
        assert_eq!(next_node_id(7), Ok(NodeId(7)));
        assert_eq!(next_node_id(u32::MAX as usize), Ok(NodeId(u32::MAX)));
        assert_eq!(
            next_node_id(u32::MAX as usize + 1),
            Err(SolverError::NodeIdOverflow {
                count: u32::MAX as usize + 1
            })
        );
    }

    #[test]
    fn same_seed_same_types() {
        let run = || {
            let mut dag = build(5, &[(0, 1, true), (0, 2, true), (2, 3, true), (4, 3, true)]);
            let candidates: HeadCandidates = dag
                .dag()
                .real_heads()
                .iter()
                .map(|&h| (h, vec![ty("uint256")]))
                .collect();
            let first = dag.resolve_heads(&candidates).unwrap().remove(0);
            dag.seed_heads(&first).unwrap();
            dag.resolve().unwrap();
            dag.resolved_types().clone()
        };
        assert_eq!(run(), run());
    }

    // -----------------------------------------------------------------------
    // verify
    // -----------------------------------------------------------------------

    #[test]
    fn verify_rejects_hard_mismatch() {
        let mut dag = build(2, &[(0, 1, false)]);
        seed(&mut dag, &[(0, "uint8")]);
        dag.assign(NodeId(1), ty("uint16"));
        assert_eq!(
            dag.verify(),
            Err(SolverError::HardConstraintViolated {
                from: NodeId(0),
                from_ty: ty("uint8"),
                to: NodeId(1),
                to_ty: ty("uint16"),
            })
        );
    }

    #[test]
    fn verify_rejects_weak_widening() {
        let mut dag = build(2, &[(0, 1, true)]);
        seed(&mut dag, &[(0, "uint8")]);
        dag.assign(NodeId(1), ty("uint16"));
        assert!(matches!(
            dag.verify(),
            Err(SolverError::WeakConstraintViolated { .. })
        ));
    }

    #[test]
    fn verify_rejects_weak_non_integer() {
        let mut dag = build(2, &[(0, 1, true)]);
        seed(&mut dag, &[(0, "bool")]);
        dag.assign(NodeId(1), ty("bool"));
        assert!(matches!(
            dag.verify(),
            Err(SolverError::WeakConstraintViolated { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Enumeration and reset
    // -----------------------------------------------------------------------

    #[test]
    fn first_head_varies_fastest() {
        let dag = build(2, &[]);
        let candidates: HeadCandidates = [
            (NodeId(0), vec![ty("uint8"), ty("uint16")]),
            (NodeId(1), vec![ty("bool"), ty("string")]),
        ]
        .into_iter()
        .collect();
        let combos = dag.resolve_heads(&candidates).unwrap();
        let keys: Vec<(String, String)> = combos
            .iter()
            .map(|c| (c[&NodeId(0)].key(), c[&NodeId(1)].key()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("uint8".into(), "bool".into()),
                ("uint16".into(), "bool".into()),
                ("uint8".into(), "string".into()),
                ("uint16".into(), "string".into()),
            ]
        );
    }

    #[test]
    fn missing_or_empty_candidates_fail() {
        let dag = build(2, &[]);
        let missing: HeadCandidates = [(NodeId(0), vec![ty("bool")])].into_iter().collect();
        assert_eq!(
            dag.resolve_heads(&missing),
            Err(SolverError::MissingCandidates { head: NodeId(1) })
        );
        let empty: HeadCandidates = [(NodeId(0), vec![ty("bool")]), (NodeId(1), vec![])]
            .into_iter()
            .collect();
        assert_eq!(
            dag.resolve_heads(&empty),
            Err(SolverError::EmptyCandidates { head: NodeId(1) })
        );
    }

    #[test]
    fn combination_cap_is_enforced() {
        let mut dag = TypeDependencyDag::new(SolverConfig {
            random_seed: 0,
            max_head_combinations: 100,
        });
        for _ in 0..2 {
            dag.new_node().unwrap();
        }
        dag.get_heads().unwrap();
        let candidates: HeadCandidates = [
            (NodeId(0), all_integer_types()),
            (NodeId(1), all_integer_types()),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            dag.resolve_heads(&candidates),
            Err(SolverError::TooManyCombinations {
                count: 144,
                limit: 100
            })
        );
        assert_eq!(dag.head_combinations(&candidates).unwrap().count(), 144);
    }

    #[test]
    fn init_resolution_keeps_topology() {
        let mut dag = build(3, &[(0, 1, true), (1, 2, false)]);
        seed(&mut dag, &[(0, "int64")]);
        dag.resolve().unwrap();

        dag.init_resolution();
        assert!(dag.resolved_types().is_empty());
        assert!(dag.dag().nodes().iter().all(|n| !n.resolved));
        assert!(dag.is_weak(NodeId(0), NodeId(1)));
        assert_eq!(dag.weak_edges().len(), 1);
        assert_eq!(dag.dag().edges().count(), 2);

        seed(&mut dag, &[(0, "uint8")]);
        dag.resolve().unwrap();
        dag.verify().unwrap();
        assert!(dag.resolved_types().values().all(|t| *t == ty("uint8")));
    }
}
