//! Whole-graph risk aggregation
//!
//! Every node is analyzed as an origin against the graph's own sensitive
//! set. With the `parallel` feature the per-node searches run on the rayon
//! pool; results land in a `BTreeMap` so output never depends on scheduling.

use crate::error::Result;
use crate::graph::{AdjacencyView, GraphSnapshot, NodeId};
use crate::risk::reachability::{analyze_origin, sensitive_set, HopBound, SensitiveReach, WorkBudget};
use crate::risk::RiskLevel;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Headline counts for one analysis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub total_nodes: usize,
    pub sensitive_nodes: usize,
    /// Nodes whose risk is anything but NONE
    pub nodes_with_access: usize,
    pub high_risk_nodes: usize,
    /// Qualifying paths summed over every origin
    pub total_paths: usize,
}

/// Number of nodes at each risk level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub none: usize,
}

impl LevelCounts {
    fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
            RiskLevel::None => self.none += 1,
        }
    }

    pub fn get(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => self.low,
            RiskLevel::None => self.none,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low + self.none
    }
}

/// Nodes bucketed by kind of access, each list in snapshot order
///
/// The three lists are disjoint and together cover every node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskMatrix {
    /// HIGH
    pub direct_access: Vec<NodeId>,
    /// MEDIUM or LOW
    pub indirect_access: Vec<NodeId>,
    /// NONE
    pub no_access: Vec<NodeId>,
    pub level_counts: LevelCounts,
}

/// Result of a full risk analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskReport {
    pub graph_id: String,
    pub hop_bound: HopBound,
    pub summary: RiskSummary,
    pub risk_matrix: RiskMatrix,
    /// Per-node results keyed by node id
    pub results: BTreeMap<NodeId, SensitiveReach>,
}

impl RiskReport {
    pub fn result(&self, node_id: &str) -> Option<&SensitiveReach> {
        self.results.get(node_id)
    }

    pub fn risk_of(&self, node_id: &str) -> Option<RiskLevel> {
        self.result(node_id).map(|r| r.risk)
    }

    /// Every edge `(from, to)` that lies on some node's shortest access path
    pub fn access_edges(&self) -> HashSet<(&str, &str)> {
        self.results
            .values()
            .filter_map(|r| r.shortest_path.as_ref())
            .flat_map(|path| path.windows(2).map(|w| (w[0].as_str(), w[1].as_str())))
            .collect()
    }
}

/// Analyze every node of `graph` without a work budget
///
/// # Examples
///
/// ```rust
/// use warden_analyzer::graph::{Edge, GraphSnapshot, Node};
/// use warden_analyzer::risk::{analyze_risk, HopBound};
///
/// let graph = GraphSnapshot::new(
///     "g",
///     vec![Node::new("a"), Node::sensitive("vault")],
///     vec![Edge::new("a", "vault")],
/// );
/// let report = analyze_risk(&graph, HopBound::DEFAULT);
/// assert_eq!(report.summary.high_risk_nodes, 2);
/// ```
pub fn analyze_risk(graph: &GraphSnapshot, bound: HopBound) -> RiskReport {
    let budget = WorkBudget::unlimited();
    match analyze_risk_with_budget(graph, bound, &budget) {
        Ok(report) => report,
        // An unlimited budget never runs out
        Err(_) => RiskReport {
            graph_id: graph.graph_id.clone(),
            hop_bound: bound,
            summary: RiskSummary::default(),
            risk_matrix: RiskMatrix::default(),
            results: BTreeMap::new(),
        },
    }
}

/// Analyze every node, charging all searches to one shared budget
///
/// Fails as a whole when the budget runs out; no partial report is returned.
pub fn analyze_risk_with_budget(
    graph: &GraphSnapshot,
    bound: HopBound,
    budget: &WorkBudget,
) -> Result<RiskReport> {
    let view = AdjacencyView::directed(graph);
    let sensitive_ids = graph.sensitive_ids();
    let sensitive = sensitive_set(&view, &sensitive_ids);
    let origins: Vec<NodeIndex> = view.node_indices().collect();

    #[cfg(feature = "parallel")]
    let reaches = analyze_parallel(&view, &origins, &sensitive, bound, budget)?;
    #[cfg(not(feature = "parallel"))]
    let reaches = analyze_sequential(&view, &origins, &sensitive, bound, budget)?;

    Ok(aggregate(graph, bound, sensitive_ids.len(), reaches))
}

#[cfg(feature = "parallel")]
fn analyze_parallel(
    view: &AdjacencyView<'_>,
    origins: &[NodeIndex],
    sensitive: &HashSet<NodeIndex>,
    bound: HopBound,
    budget: &WorkBudget,
) -> Result<Vec<SensitiveReach>> {
    origins
        .par_iter()
        .map(|&origin| analyze_origin(view, origin, sensitive, bound, budget))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn analyze_sequential(
    view: &AdjacencyView<'_>,
    origins: &[NodeIndex],
    sensitive: &HashSet<NodeIndex>,
    bound: HopBound,
    budget: &WorkBudget,
) -> Result<Vec<SensitiveReach>> {
    origins
        .iter()
        .map(|&origin| analyze_origin(view, origin, sensitive, bound, budget))
        .collect()
}

/// Fold per-node results (in snapshot order) into a report
fn aggregate(
    graph: &GraphSnapshot,
    bound: HopBound,
    sensitive_nodes: usize,
    reaches: Vec<SensitiveReach>,
) -> RiskReport {
    let mut summary = RiskSummary {
        total_nodes: graph.node_count(),
        sensitive_nodes,
        ..RiskSummary::default()
    };
    let mut matrix = RiskMatrix::default();
    let mut results = BTreeMap::new();

    for reach in reaches {
        summary.total_paths += reach.path_count();
        if reach.risk.has_access() {
            summary.nodes_with_access += 1;
        }
        if reach.risk == RiskLevel::High {
            summary.high_risk_nodes += 1;
        }

        matrix.level_counts.record(reach.risk);
        let bucket = match reach.risk {
            RiskLevel::High => &mut matrix.direct_access,
            RiskLevel::Medium | RiskLevel::Low => &mut matrix.indirect_access,
            RiskLevel::None => &mut matrix.no_access,
        };
        bucket.push(reach.origin.clone());

        results.insert(reach.origin.clone(), reach);
    }

    RiskReport {
        graph_id: graph.graph_id.clone(),
        hop_bound: bound,
        summary,
        risk_matrix: matrix,
        results,
    }
}
