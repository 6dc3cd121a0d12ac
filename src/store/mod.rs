// Graph store: resolves graph identifiers to immutable snapshots
//
// The engine only needs read access (GraphStore). MemoryStore adds the
// create/update/remove operations and JSON loading used by the CLI.
// Snapshots are shared as Arc so an update never mutates an in-flight
// analysis.

use crate::error::{AnalysisError, Result};
use crate::graph::GraphSnapshot;
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Read access to stored graphs
///
/// All methods take `&self` so one store can back many concurrent requests.
///
/// # Examples
///
/// ```rust
/// # use warden_analyzer::graph::{GraphSnapshot, Node};
/// # use warden_analyzer::store::{GraphStore, MemoryStore};
/// let store = MemoryStore::new();
/// store.create(GraphSnapshot::new("g", vec![Node::new("a")], vec![])).unwrap();
///
/// let snapshot = store.snapshot("g").unwrap();
/// assert_eq!(snapshot.node_count(), 1);
/// assert!(store.snapshot("missing").is_none());
/// ```
pub trait GraphStore: Send + Sync {
    /// Current snapshot for `graph_id`, if stored
    fn snapshot(&self, graph_id: &str) -> Option<Arc<GraphSnapshot>>;

    /// Resolve a snapshot or fail with `GraphNotFound`
    fn require(&self, graph_id: &str) -> Result<Arc<GraphSnapshot>> {
        self.snapshot(graph_id)
            .ok_or_else(|| AnalysisError::graph_not_found(graph_id))
    }
}

impl<T: GraphStore + ?Sized> GraphStore for &T {
    fn snapshot(&self, graph_id: &str) -> Option<Arc<GraphSnapshot>> {
        (**self).snapshot(graph_id)
    }
}

impl<T: GraphStore + ?Sized> GraphStore for Arc<T> {
    fn snapshot(&self, graph_id: &str) -> Option<Arc<GraphSnapshot>> {
        (**self).snapshot(graph_id)
    }
}

/// Input accepted by [`MemoryStore::load_json`]: one graph or a list
#[derive(Deserialize)]
#[serde(untagged)]
enum GraphFile {
    Many(Vec<GraphSnapshot>),
    One(GraphSnapshot),
}

/// In-process graph registry
#[derive(Debug, Default)]
pub struct MemoryStore {
    graphs: RwLock<HashMap<String, Arc<GraphSnapshot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every graph from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open graph file: {}", path.display()))?;

        let store = Self::new();
        store
            .load_json(file)
            .with_context(|| format!("Failed to load graphs from {}", path.display()))?;
        Ok(store)
    }

    /// Parse one graph object or an array of them and create each
    ///
    /// Returns the identifiers created, in file order.
    pub fn load_json<R: Read>(&self, reader: R) -> anyhow::Result<Vec<String>> {
        let parsed: GraphFile =
            serde_json::from_reader(reader).context("Invalid graph JSON")?;

        let graphs = match parsed {
            GraphFile::Many(graphs) => graphs,
            GraphFile::One(graph) => vec![graph],
        };

        let mut ids = Vec::with_capacity(graphs.len());
        for graph in graphs {
            let stored = self.create(graph)?;
            ids.push(stored.graph_id.clone());
        }
        Ok(ids)
    }

    /// Store a new graph after validating it
    pub fn create(&self, snapshot: GraphSnapshot) -> Result<Arc<GraphSnapshot>> {
        snapshot.validate()?;

        let mut graphs = self.write();
        if graphs.contains_key(&snapshot.graph_id) {
            return Err(AnalysisError::DuplicateGraph {
                graph_id: snapshot.graph_id,
            });
        }

        tracing::info!(
            graph_id = %snapshot.graph_id,
            nodes = snapshot.node_count(),
            edges = snapshot.edge_count(),
            "graph created"
        );

        let snapshot = Arc::new(snapshot);
        graphs.insert(snapshot.graph_id.clone(), Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// All stored graph identifiers, sorted
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn get(&self, graph_id: &str) -> Option<Arc<GraphSnapshot>> {
        self.read().get(graph_id).cloned()
    }

    /// Replace an existing graph; the stored id is always `graph_id`
    pub fn update(&self, graph_id: &str, mut snapshot: GraphSnapshot) -> Result<Arc<GraphSnapshot>> {
        snapshot.graph_id = graph_id.to_string();
        snapshot.validate()?;

        let mut graphs = self.write();
        let slot = graphs
            .get_mut(graph_id)
            .ok_or_else(|| AnalysisError::graph_not_found(graph_id))?;

        tracing::info!(
            graph_id,
            nodes = snapshot.node_count(),
            edges = snapshot.edge_count(),
            "graph updated"
        );

        let snapshot = Arc::new(snapshot);
        *slot = Arc::clone(&snapshot);
        Ok(snapshot)
    }

    /// Remove a graph; returns whether it existed
    pub fn remove(&self, graph_id: &str) -> bool {
        let removed = self.write().remove(graph_id).is_some();
        if removed {
            tracing::info!(graph_id, "graph removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // The map only holds immutable Arcs, so a poisoned lock is still usable
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<GraphSnapshot>>> {
        self.graphs.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<GraphSnapshot>>> {
        self.graphs.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl GraphStore for MemoryStore {
    fn snapshot(&self, graph_id: &str) -> Option<Arc<GraphSnapshot>> {
        self.get(graph_id)
    }
}
