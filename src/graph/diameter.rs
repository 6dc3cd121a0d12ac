//! Graph diameter over connected node pairs

use crate::graph::shortest::bfs_path;
use crate::graph::{AdjacencyView, GraphSnapshot};

/// Longest shortest-path hop distance among connected node pairs
///
/// Unreachable pairs are skipped rather than making the result undefined.
/// Returns 0 for graphs with fewer than two nodes or no connected pair.
///
/// Runs one BFS per ordered pair, O(V² · (V + E)). Fine for the tens to low
/// thousands of nodes this is used on; callers with larger graphs should
/// expect it to be slow.
pub fn diameter(graph: &GraphSnapshot) -> usize {
    let view = AdjacencyView::undirected(graph);
    diameter_in(&view)
}

/// Same as [`diameter`] over a prebuilt undirected view
pub fn diameter_in(view: &AdjacencyView<'_>) -> usize {
    let mut longest = 0;

    for from in view.node_indices() {
        for to in view.node_indices() {
            if from == to {
                continue;
            }
            if let Some(path) = bfs_path(view, from, to) {
                longest = longest.max(path.len() - 1);
            }
        }
    }

    longest
}
