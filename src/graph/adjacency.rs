//! Adjacency views derived from a graph snapshot
//!
//! The snapshot is loaded into a petgraph `DiGraph` whose node indices follow
//! snapshot order, then flattened into per-node neighbor lists. Topology
//! queries use the undirected view; sensitive-access queries use the
//! directed one.

use crate::graph::GraphSnapshot;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

/// Which edges a view follows from a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Only outgoing edges (`a -> b` gives `b` from `a`)
    Directed,
    /// Both directions (`a -> b` gives `b` from `a` and `a` from `b`)
    Undirected,
}

/// Neighbor lookup over one snapshot
///
/// Every snapshot node is present, including isolated ones. Neighbors are
/// listed in edge declaration order; for the undirected view an edge adds to
/// both endpoints at its declaration position. Parallel edges collapse into
/// a single neighbor entry.
#[derive(Debug, Clone)]
pub struct AdjacencyView<'g> {
    graph: DiGraph<&'g str, ()>,
    index: HashMap<&'g str, NodeIndex>,
    neighbors: Vec<Vec<NodeIndex>>,
    orientation: Orientation,
}

impl<'g> AdjacencyView<'g> {
    /// Build a view following outgoing edges only
    pub fn directed(snapshot: &'g GraphSnapshot) -> Self {
        Self::build(snapshot, Orientation::Directed)
    }

    /// Build a view treating every edge as bidirectional
    pub fn undirected(snapshot: &'g GraphSnapshot) -> Self {
        Self::build(snapshot, Orientation::Undirected)
    }

    /// Build a view in O(V + E)
    pub fn build(snapshot: &'g GraphSnapshot, orientation: Orientation) -> Self {
        let mut graph = DiGraph::with_capacity(snapshot.node_count(), snapshot.edge_count());
        let mut index = HashMap::with_capacity(snapshot.node_count());

        for node in &snapshot.nodes {
            let idx = graph.add_node(node.id.as_str());
            index.insert(node.id.as_str(), idx);
        }

        for edge in &snapshot.edges {
            match (index.get(edge.from.as_str()), index.get(edge.to.as_str())) {
                (Some(&from), Some(&to)) => {
                    graph.add_edge(from, to, ());
                }
                _ => tracing::debug!(
                    graph_id = %snapshot.graph_id,
                    from = %edge.from,
                    to = %edge.to,
                    "skipping edge with unknown endpoint"
                ),
            }
        }

        let mut neighbors = vec![Vec::new(); graph.node_count()];
        let mut seen: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();

        // edge_references() yields edges by index, i.e. declaration order
        for edge in graph.edge_references() {
            let (source, target) = (edge.source(), edge.target());
            if seen.insert((source, target)) {
                neighbors[source.index()].push(target);
            }
            if orientation == Orientation::Undirected && seen.insert((target, source)) {
                neighbors[target.index()].push(source);
            }
        }

        Self {
            graph,
            index,
            neighbors,
            orientation,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Index of a node identifier, if the node exists
    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// Identifier of a node index
    ///
    /// Panics if the index did not come from this view.
    pub fn id(&self, idx: NodeIndex) -> &'g str {
        self.graph[idx]
    }

    /// Neighbors of a node in enumeration order
    pub fn neighbors(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.neighbors
            .get(idx.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Node indices in snapshot order
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Convert a sequence of indices back into owned identifiers
    pub fn ids(&self, path: &[NodeIndex]) -> Vec<String> {
        path.iter().map(|&idx| self.id(idx).to_string()).collect()
    }

    /// The underlying petgraph graph (edges in declaration order, no dedup)
    pub fn graph(&self) -> &DiGraph<&'g str, ()> {
        &self.graph
    }
}
