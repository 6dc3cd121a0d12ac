//! Analysis engine: resolves graphs through a store and runs the analyses
//!
//! The engine is stateless apart from its limits. Every call resolves the
//! current snapshot, validates the request against it, builds the adjacency
//! view it needs and discards everything on return.

use crate::error::{AnalysisError, Result};
use crate::graph::{self, AdjacencyView, GraphMetrics, GraphSnapshot, MetricsRequest, NodeId};
use crate::risk::reachability::{analyze_origin, sensitive_set};
use crate::risk::{analyze_risk_with_budget, HopBound, RiskReport, SensitiveReach, WorkBudget};
use crate::store::GraphStore;
use std::sync::Arc;
use std::time::Instant;

/// Limits applied to every engine request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineLimits {
    /// Hop bound used when a request does not give one
    pub default_hop_bound: HopBound,
    /// Work units per request; `None` disables the budget
    pub max_work_units: Option<usize>,
    /// Node count above which a diameter request logs a warning
    pub diameter_warn_nodes: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            default_hop_bound: HopBound::DEFAULT,
            max_work_units: Some(1_000_000),
            diameter_warn_nodes: 500,
        }
    }
}

impl EngineLimits {
    /// Create limits with a custom default hop bound
    pub fn with_default_hop_bound(mut self, bound: HopBound) -> Self {
        self.default_hop_bound = bound;
        self
    }

    /// Create limits with a custom work budget
    pub fn with_max_work_units(mut self, max_work_units: Option<usize>) -> Self {
        self.max_work_units = max_work_units;
        self
    }

    /// Create limits with a custom diameter warning threshold
    pub fn with_diameter_warn_nodes(mut self, nodes: usize) -> Self {
        self.diameter_warn_nodes = nodes;
        self
    }

    /// Fresh budget for one request
    fn budget(&self) -> WorkBudget {
        WorkBudget::new(self.max_work_units)
    }
}

/// Runs analyses against graphs held by a [`GraphStore`]
///
/// # Examples
///
/// ```rust
/// use warden_analyzer::engine::Engine;
/// use warden_analyzer::graph::{Edge, GraphSnapshot, Node};
/// use warden_analyzer::risk::RiskLevel;
/// use warden_analyzer::store::MemoryStore;
///
/// let store = MemoryStore::new();
/// store
///     .create(GraphSnapshot::new(
///         "prod",
///         vec![Node::new("svc"), Node::sensitive("secrets")],
///         vec![Edge::new("svc", "secrets")],
///     ))
///     .unwrap();
///
/// let engine = Engine::new(&store);
/// let report = engine.full_risk_analysis("prod", None).unwrap();
/// assert_eq!(report.risk_of("svc"), Some(RiskLevel::High));
/// ```
#[derive(Debug, Clone)]
pub struct Engine<S: GraphStore> {
    store: S,
    limits: EngineLimits,
}

impl<S: GraphStore> Engine<S> {
    pub fn new(store: S) -> Self {
        Self::with_limits(store, EngineLimits::default())
    }

    pub fn with_limits(store: S, limits: EngineLimits) -> Self {
        Self { store, limits }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn limits(&self) -> &EngineLimits {
        &self.limits
    }

    /// Shortest undirected path between two nodes
    ///
    /// Both nodes must exist. An empty result means they are not connected.
    pub fn shortest_path(&self, graph_id: &str, start: &str, end: &str) -> Result<Vec<NodeId>> {
        let snapshot = self.store.require(graph_id)?;
        require_node(&snapshot, start)?;
        require_node(&snapshot, end)?;

        let started = Instant::now();
        let path = graph::shortest_path(&snapshot, start, end);
        tracing::debug!(
            graph_id,
            start,
            end,
            hops = path.len().saturating_sub(1),
            found = !path.is_empty(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "shortest path"
        );
        Ok(path)
    }

    pub fn connected_components(&self, graph_id: &str) -> Result<Vec<Vec<NodeId>>> {
        let snapshot = self.store.require(graph_id)?;

        let started = Instant::now();
        let components = graph::connected_components(&snapshot);
        tracing::debug!(
            graph_id,
            nodes = snapshot.node_count(),
            components = components.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "connected components"
        );
        Ok(components)
    }

    pub fn diameter(&self, graph_id: &str) -> Result<usize> {
        let snapshot = self.store.require(graph_id)?;
        self.warn_if_large(&snapshot);

        let started = Instant::now();
        let diameter = graph::diameter(&snapshot);
        tracing::debug!(
            graph_id,
            nodes = snapshot.node_count(),
            diameter,
            elapsed_us = started.elapsed().as_micros() as u64,
            "diameter"
        );
        Ok(diameter)
    }

    /// Paths from `origin` to any of `sensitive_ids` within `hop_bound` edges
    ///
    /// The origin must exist; sensitive ids that are not in the graph are
    /// ignored.
    pub fn sensitive_reachability(
        &self,
        graph_id: &str,
        origin: &str,
        sensitive_ids: &[NodeId],
        hop_bound: u32,
    ) -> Result<SensitiveReach> {
        let bound = HopBound::new(hop_bound)?;
        let snapshot = self.store.require(graph_id)?;

        let view = AdjacencyView::directed(&snapshot);
        let origin_idx = view
            .index_of(origin)
            .ok_or_else(|| AnalysisError::unknown_node(graph_id, origin))?;
        let sensitive = sensitive_set(&view, sensitive_ids);

        let started = Instant::now();
        let budget = self.limits.budget();
        let reach = analyze_origin(&view, origin_idx, &sensitive, bound, &budget)
            .map_err(|e| self.log_budget(graph_id, &budget, e))?;

        tracing::debug!(
            graph_id,
            origin,
            hop_bound = bound.get(),
            paths = reach.path_count(),
            risk = %reach.risk,
            work_units = budget.used(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "sensitive reachability"
        );
        Ok(reach)
    }

    /// Risk analysis of every node; `None` uses the configured default bound
    pub fn full_risk_analysis(&self, graph_id: &str, hop_bound: Option<u32>) -> Result<RiskReport> {
        let bound = match hop_bound {
            Some(value) => HopBound::new(value)?,
            None => self.limits.default_hop_bound,
        };
        let snapshot = self.store.require(graph_id)?;

        let started = Instant::now();
        let budget = self.limits.budget();
        let report = analyze_risk_with_budget(&snapshot, bound, &budget)
            .map_err(|e| self.log_budget(graph_id, &budget, e))?;

        tracing::debug!(
            graph_id,
            nodes = report.summary.total_nodes,
            sensitive = report.summary.sensitive_nodes,
            high_risk = report.summary.high_risk_nodes,
            paths = report.summary.total_paths,
            work_units = budget.used(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "full risk analysis"
        );
        Ok(report)
    }

    /// Counts plus whichever optional metrics the request asks for
    pub fn metrics(&self, graph_id: &str, request: &MetricsRequest) -> Result<GraphMetrics> {
        let snapshot = self.store.require(graph_id)?;
        if let Some((start, end)) = request.endpoints() {
            require_node(&snapshot, start)?;
            require_node(&snapshot, end)?;
        }
        if request.include_diameter {
            self.warn_if_large(&snapshot);
        }

        let started = Instant::now();
        let metrics = graph::compute_metrics(&snapshot, request);
        tracing::debug!(
            graph_id,
            nodes = metrics.node_count,
            edges = metrics.edge_count,
            elapsed_us = started.elapsed().as_micros() as u64,
            "graph metrics"
        );
        Ok(metrics)
    }

    /// Identifiers of the nodes flagged sensitive in a graph
    pub fn sensitive_ids(&self, graph_id: &str) -> Result<Vec<NodeId>> {
        Ok(self.store.require(graph_id)?.sensitive_ids())
    }

    /// Resolve a graph snapshot
    pub fn snapshot(&self, graph_id: &str) -> Result<Arc<GraphSnapshot>> {
        self.store.require(graph_id)
    }

    fn warn_if_large(&self, snapshot: &GraphSnapshot) {
        if snapshot.node_count() > self.limits.diameter_warn_nodes {
            tracing::warn!(
                graph_id = %snapshot.graph_id,
                nodes = snapshot.node_count(),
                threshold = self.limits.diameter_warn_nodes,
                "diameter runs one BFS per node pair and may be slow on this graph"
            );
        }
    }

    fn log_budget(&self, graph_id: &str, budget: &WorkBudget, err: AnalysisError) -> AnalysisError {
        if let AnalysisError::BudgetExhausted { limit } = err {
            tracing::warn!(graph_id, limit, used = budget.used(), "work budget exhausted");
        }
        err
    }
}

fn require_node(snapshot: &GraphSnapshot, node_id: &str) -> Result<()> {
    if snapshot.contains_node(node_id) {
        Ok(())
    } else {
        Err(AnalysisError::unknown_node(&snapshot.graph_id, node_id))
    }
}
