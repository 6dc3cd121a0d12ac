//! Bounded enumeration of paths to sensitive nodes
//!
//! From a single origin, every acyclic path along outgoing edges is explored
//! up to the hop bound. A path ends at the first sensitive node it meets;
//! traversal never continues past one. Each branch keeps its own visited
//! set, so a node excluded on one branch is still explorable from a sibling.

use crate::error::{AnalysisError, Result};
use crate::graph::{AdjacencyView, GraphSnapshot, NodeId};
use crate::risk::RiskLevel;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A path from an origin to the sensitive node that ended it
///
/// `path_id` is a BLAKE3 hash of the node sequence so the same path can be
/// recognised across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessPath {
    /// Unique identifier (BLAKE3 hash of the node sequence)
    pub path_id: String,
    /// Node identifiers from origin to terminus
    pub nodes: Vec<NodeId>,
    /// First node
    pub origin: NodeId,
    /// Last node (the sensitive one)
    pub terminus: NodeId,
}

impl AccessPath {
    /// Create a path from a node sequence
    pub fn new(nodes: Vec<NodeId>) -> Self {
        let origin = nodes.first().cloned().unwrap_or_default();
        let terminus = nodes.last().cloned().unwrap_or_default();
        let path_id = hash_path(&nodes);

        Self {
            path_id,
            nodes,
            origin,
            terminus,
        }
    }

    /// Number of edges traversed
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Number of nodes on the path
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.iter().any(|n| n == node_id)
    }
}

/// Compute the BLAKE3 hash of a node sequence
///
/// The sequence length and each identifier's length are hashed ahead of the
/// bytes, so `["ab", "c"]` and `["a", "bc"]` never collide.
pub fn hash_path(nodes: &[NodeId]) -> String {
    let mut hasher = blake3::Hasher::new();

    hasher.update(&(nodes.len() as u64).to_le_bytes());
    for node in nodes {
        hasher.update(&(node.len() as u64).to_le_bytes());
        hasher.update(node.as_bytes());
    }

    hasher.finalize().to_hex().to_string()
}

/// Inclusive maximum number of edges on a candidate path
///
/// Always within `MIN..=MAX`; out-of-range values are rejected, never
/// clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct HopBound(u32);

impl HopBound {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 20;
    pub const DEFAULT: HopBound = HopBound(6);

    /// Validate a hop bound
    pub fn new(value: u32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AnalysisError::InvalidHopBound {
                value,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn hops(self) -> usize {
        self.0 as usize
    }
}

impl Default for HopBound {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for HopBound {
    type Error = AnalysisError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<HopBound> for u32 {
    fn from(bound: HopBound) -> u32 {
        bound.0
    }
}

impl fmt::Display for HopBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Work-unit budget shared by every traversal of one request
///
/// One unit is charged per search frame expanded. Safe to share across
/// threads; a request that runs out fails with
/// [`AnalysisError::BudgetExhausted`].
#[derive(Debug, Default)]
pub struct WorkBudget {
    limit: Option<usize>,
    used: AtomicUsize,
}

impl WorkBudget {
    /// Budget with the given limit, or unlimited for `None`
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            used: AtomicUsize::new(0),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    pub fn limited(limit: usize) -> Self {
        Self::new(Some(limit))
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Units consumed so far
    pub fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }

    /// Consume one unit
    pub fn charge(&self) -> Result<()> {
        let used = self.used.fetch_add(1, Ordering::Relaxed) + 1;
        match self.limit {
            Some(limit) if used > limit => Err(AnalysisError::BudgetExhausted { limit }),
            _ => Ok(()),
        }
    }
}

/// Everything found from one origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitiveReach {
    pub origin: NodeId,
    /// At least one sensitive node is reachable within the bound
    pub reachable: bool,
    /// Every qualifying path, in depth-first discovery order
    pub paths: Vec<AccessPath>,
    /// First-found path of minimal length
    pub shortest_path: Option<Vec<NodeId>>,
    /// Hop length of `shortest_path`
    pub hops: Option<usize>,
    /// Distinct sensitive nodes reached, in first-reached order
    pub sensitive_reached: Vec<NodeId>,
    pub risk: RiskLevel,
}

impl SensitiveReach {
    /// Result for an origin that reaches nothing
    pub fn unreachable(origin: impl Into<NodeId>) -> Self {
        Self::from_paths(origin.into(), Vec::new())
    }

    /// Derive the summary fields from the enumerated paths
    fn from_paths(origin: NodeId, paths: Vec<AccessPath>) -> Self {
        let mut shortest: Option<&AccessPath> = None;
        for path in &paths {
            // strict comparison keeps the first-found path on ties
            if shortest.map_or(true, |best| path.len() < best.len()) {
                shortest = Some(path);
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let sensitive_reached = paths
            .iter()
            .filter(|p| seen.insert(p.terminus.as_str()))
            .map(|p| p.terminus.clone())
            .collect();

        let hops = shortest.map(AccessPath::hops);
        let shortest_path = shortest.map(|p| p.nodes.clone());

        Self {
            origin,
            reachable: !paths.is_empty(),
            shortest_path,
            hops,
            sensitive_reached,
            risk: RiskLevel::from_hops(hops),
            paths,
        }
    }

    /// Total number of qualifying paths
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }
}

/// Enumerate paths from `origin` to any of `sensitive_ids`
///
/// Pure convenience over [`analyze_origin`] with no work budget. An origin
/// that is not in the graph reaches nothing. Sensitive ids missing from the
/// graph are ignored.
///
/// # Examples
///
/// ```rust
/// use warden_analyzer::graph::{Edge, GraphSnapshot, Node};
/// use warden_analyzer::risk::{find_sensitive_paths, HopBound, RiskLevel};
///
/// let graph = GraphSnapshot::new(
///     "g",
///     vec![Node::new("user"), Node::new("app"), Node::sensitive("db")],
///     vec![Edge::new("user", "app"), Edge::new("app", "db")],
/// );
/// let reach = find_sensitive_paths(&graph, "user", &graph.sensitive_ids(), HopBound::DEFAULT);
/// assert_eq!(reach.hops, Some(2));
/// assert_eq!(reach.risk, RiskLevel::Medium);
/// ```
pub fn find_sensitive_paths(
    graph: &GraphSnapshot,
    origin: &str,
    sensitive_ids: &[NodeId],
    bound: HopBound,
) -> SensitiveReach {
    let view = AdjacencyView::directed(graph);
    let Some(origin_idx) = view.index_of(origin) else {
        return SensitiveReach::unreachable(origin);
    };

    let sensitive = sensitive_set(&view, sensitive_ids);
    match analyze_origin(&view, origin_idx, &sensitive, bound, &WorkBudget::unlimited()) {
        Ok(reach) => reach,
        // An unlimited budget never runs out
        Err(_) => SensitiveReach::unreachable(origin),
    }
}

/// Resolve sensitive identifiers to indices of `view`, dropping unknown ones
pub fn sensitive_set(view: &AdjacencyView<'_>, sensitive_ids: &[NodeId]) -> HashSet<NodeIndex> {
    sensitive_ids
        .iter()
        .filter_map(|id| view.index_of(id))
        .collect()
}

/// Exhaustive bounded depth-first search from one origin
///
/// Uses an explicit stack of frames, each holding the path so far; the path
/// doubles as the branch's visited set. Successors are pushed in reverse so
/// they are popped in enumeration order, which makes discovery order match a
/// recursive search. An origin that is itself sensitive yields `[origin]`
/// without expansion.
pub fn analyze_origin(
    view: &AdjacencyView<'_>,
    origin: NodeIndex,
    sensitive: &HashSet<NodeIndex>,
    bound: HopBound,
    budget: &WorkBudget,
) -> Result<SensitiveReach> {
    let origin_id = view.id(origin).to_string();

    if sensitive.contains(&origin) {
        let path = AccessPath::new(vec![origin_id.clone()]);
        return Ok(SensitiveReach::from_paths(origin_id, vec![path]));
    }

    let max_hops = bound.hops();
    let mut paths = Vec::new();
    let mut stack: Vec<Vec<NodeIndex>> = vec![vec![origin]];

    while let Some(path) = stack.pop() {
        budget.charge()?;

        let current = match path.last() {
            Some(&node) => node,
            None => continue,
        };

        // Sensitive nodes terminate the branch
        if sensitive.contains(&current) {
            paths.push(AccessPath::new(view.ids(&path)));
            continue;
        }

        // hops so far == path.len() - 1; one more edge would exceed the bound
        if path.len() > max_hops {
            continue;
        }

        for &next in view.neighbors(current).iter().rev() {
            if path.contains(&next) {
                continue;
            }
            let mut branch = Vec::with_capacity(path.len() + 1);
            branch.extend_from_slice(&path);
            branch.push(next);
            stack.push(branch);
        }
    }

    Ok(SensitiveReach::from_paths(origin_id, paths))
}
