//! Combined topology metrics for one graph

use crate::graph::components::component_indices;
use crate::graph::diameter::diameter_in;
use crate::graph::shortest::shortest_path_in;
use crate::graph::{AdjacencyView, GraphSnapshot, NodeId};
use serde::{Deserialize, Serialize};

/// Which optional metrics to compute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsRequest {
    /// Start node for the shortest-path metric
    pub start: Option<NodeId>,
    /// End node for the shortest-path metric
    pub end: Option<NodeId>,
    pub include_components: bool,
    pub include_diameter: bool,
}

impl MetricsRequest {
    /// Request a shortest path between two nodes
    pub fn with_shortest_path(mut self, start: impl Into<NodeId>, end: impl Into<NodeId>) -> Self {
        self.start = Some(start.into());
        self.end = Some(end.into());
        self
    }

    pub fn with_components(mut self) -> Self {
        self.include_components = true;
        self
    }

    pub fn with_diameter(mut self) -> Self {
        self.include_diameter = true;
        self
    }

    /// Both endpoints, when a shortest path was requested
    pub fn endpoints(&self) -> Option<(&str, &str)> {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => Some((start.as_str(), end.as_str())),
            _ => None,
        }
    }
}

/// Topology metrics; optional fields are `None` when not requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub graph_id: String,
    pub node_count: usize,
    pub edge_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortest_path: Option<Vec<NodeId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_components: Option<Vec<Vec<NodeId>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diameter: Option<usize>,
}

/// Compute the requested metrics, sharing one undirected view
///
/// A requested shortest path that turns out empty is reported as `None`.
pub fn compute_metrics(graph: &GraphSnapshot, request: &MetricsRequest) -> GraphMetrics {
    let view = AdjacencyView::undirected(graph);

    let shortest_path = request
        .endpoints()
        .map(|(start, end)| shortest_path_in(&view, start, end))
        .filter(|path| !path.is_empty());

    let connected_components = request.include_components.then(|| {
        component_indices(&view)
            .iter()
            .map(|component| view.ids(component))
            .collect()
    });

    let diameter = request.include_diameter.then(|| diameter_in(&view));

    GraphMetrics {
        graph_id: graph.graph_id.clone(),
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        shortest_path,
        connected_components,
        diameter,
    }
}
