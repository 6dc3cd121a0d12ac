// Graph snapshot data model shared by the topology and risk analyses

pub mod adjacency;
pub mod components;
pub mod diameter;
pub mod export;
pub mod metrics;
pub mod shortest;

pub use adjacency::{AdjacencyView, Orientation};
pub use components::connected_components;
pub use diameter::diameter;
pub use export::{export_dot, export_json, GraphExport};
pub use metrics::{compute_metrics, GraphMetrics, MetricsRequest};
pub use shortest::{hop_distance, shortest_path};

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Node identifier, unique within one graph
pub type NodeId = String;

/// A node in an access graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier within the graph
    pub id: NodeId,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Privileged or protected resource; reaching one ends a path
    #[serde(default)]
    pub sensitive: bool,
    /// Opaque metadata, carried but never interpreted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl Node {
    /// Create a plain (non-sensitive) node
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            sensitive: false,
            meta: None,
        }
    }

    /// Create a node flagged as sensitive
    pub fn sensitive(id: impl Into<NodeId>) -> Self {
        Self {
            sensitive: true,
            ..Self::new(id)
        }
    }

    /// Attach a display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name for display, falling back to the identifier
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// A directed edge `from -> to`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    /// Reserved for cost-based paths; ignored by every current algorithm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Edge {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight: None,
        }
    }
}

/// Immutable graph definition handed to the analyses
///
/// Node identifiers must be unique; that is the only precondition the
/// algorithms rely on. Edge endpoint validity is checked by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(rename = "graphId")]
    pub graph_id: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn new(graph_id: impl Into<String>, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            graph_id: graph_id.into(),
            nodes,
            edges,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Look up a node by identifier
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Identifiers of all nodes flagged sensitive, in snapshot order
    pub fn sensitive_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.sensitive)
            .map(|n| n.id.clone())
            .collect()
    }

    /// Check unique node ids and that every edge endpoint exists
    ///
    /// The first violation found is returned; nodes are checked before edges.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(AnalysisError::DuplicateNode {
                    graph_id: self.graph_id.clone(),
                    node_id: node.id.clone(),
                });
            }
        }

        for edge in &self.edges {
            let missing = if !seen.contains(edge.from.as_str()) {
                &edge.from
            } else if !seen.contains(edge.to.as_str()) {
                &edge.to
            } else {
                continue;
            };
            return Err(AnalysisError::DanglingEdge {
                graph_id: self.graph_id.clone(),
                from: edge.from.clone(),
                to: edge.to.clone(),
                missing: missing.clone(),
            });
        }

        Ok(())
    }
}
