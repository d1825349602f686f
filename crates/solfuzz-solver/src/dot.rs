//! Graphviz rendering of a type dependency DAG, for debugging generated
//! programs.
//!
//! Real heads are drawn red, nominal heads pink, everything else blue. Weak
//! edges carry a `weak` label. Nodes typed in the current attempt show their
//! type next to the id.

use petgraph::dot::{Config, Dot};
use petgraph::graph::{EdgeReference, Graph, NodeIndex};
use solfuzz_core::NodeId;

use crate::dag::EdgeRank;
use crate::type_dag::TypeDependencyDag;

impl TypeDependencyDag {
    /// Renders the DAG in DOT. Head colors are only meaningful after
    /// `get_heads`.
    pub fn to_dot(&self) -> String {
        let topology = self.dag();
        let mut graph: Graph<String, EdgeRank> = Graph::with_capacity(topology.len(), 0);
        for node in topology.nodes() {
            let label = match self.resolved_type(node.id) {
                Some(ty) => format!("{}: {}", node.id, ty),
                None => node.id.to_string(),
            };
            graph.add_node(label);
        }
        for (from, to) in topology.edges() {
            let rank = if self.is_weak(from, to) {
                EdgeRank::Weak
            } else {
                EdgeRank::Hard
            };
            graph.add_edge(from.into(), to.into(), rank);
        }

        let edge_attrs = |_: &Graph<String, EdgeRank>, edge: EdgeReference<'_, EdgeRank>| {
            match edge.weight() {
                EdgeRank::Weak => "label = \"weak\"".to_string(),
                EdgeRank::Hard => String::new(),
            }
        };
        let node_attrs = |_: &Graph<String, EdgeRank>, (idx, _): (NodeIndex, &String)| {
            let id = NodeId::from(idx);
            let color = if topology.real_heads().contains(&id) {
                "red"
            } else if topology.nominal_heads().contains(&id) {
                "pink"
            } else {
                "blue"
            };
            format!("color = {color}")
        };
        let dot = Dot::with_attr_getters(&graph, &[Config::EdgeNoLabel], &edge_attrs, &node_attrs);
        format!("{dot}")
    }
}
