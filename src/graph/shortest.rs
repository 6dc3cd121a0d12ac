//! Breadth-first shortest paths over the undirected adjacency view

use crate::graph::{AdjacencyView, GraphSnapshot, NodeId};
use petgraph::graph::NodeIndex;
use std::collections::{HashSet, VecDeque};

/// Shortest path between two nodes, treating edges as bidirectional
///
/// Returns `[start]` when `start == end`, and an empty vec when either node is
/// absent or the two are not connected. Among several shortest paths the one
/// discovered first in neighbor enumeration order is returned; only its
/// length is guaranteed.
///
/// # Examples
///
/// ```rust
/// use warden_analyzer::graph::{shortest_path, Edge, GraphSnapshot, Node};
///
/// let graph = GraphSnapshot::new(
///     "g",
///     vec![Node::new("a"), Node::new("b"), Node::new("c")],
///     vec![Edge::new("a", "b"), Edge::new("c", "b")],
/// );
/// assert_eq!(shortest_path(&graph, "a", "c"), vec!["a", "b", "c"]);
/// ```
pub fn shortest_path(graph: &GraphSnapshot, start: &str, end: &str) -> Vec<NodeId> {
    let view = AdjacencyView::undirected(graph);
    shortest_path_in(&view, start, end)
}

/// Same as [`shortest_path`] over a prebuilt view
///
/// Lets callers computing several metrics build the view once.
pub fn shortest_path_in(view: &AdjacencyView<'_>, start: &str, end: &str) -> Vec<NodeId> {
    let (Some(from), Some(to)) = (view.index_of(start), view.index_of(end)) else {
        return Vec::new();
    };

    bfs_path(view, from, to)
        .map(|path| view.ids(&path))
        .unwrap_or_default()
}

/// Hop distance between two nodes, `None` when unreachable or absent
pub fn hop_distance(view: &AdjacencyView<'_>, start: &str, end: &str) -> Option<usize> {
    let from = view.index_of(start)?;
    let to = view.index_of(end)?;
    bfs_path(view, from, to).map(|path| path.len() - 1)
}

/// Level-by-level BFS carrying the path with each queued entry
///
/// The visited set guarantees the first discovery of a node is along a
/// shortest path.
pub(crate) fn bfs_path(
    view: &AdjacencyView<'_>,
    from: NodeIndex,
    to: NodeIndex,
) -> Option<Vec<NodeIndex>> {
    if from == to {
        return Some(vec![from]);
    }

    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut queue: VecDeque<Vec<NodeIndex>> = VecDeque::new();

    visited.insert(from);
    queue.push_back(vec![from]);

    while let Some(path) = queue.pop_front() {
        let current = match path.last() {
            Some(&node) => node,
            None => continue,
        };

        for &next in view.neighbors(current) {
            if !visited.insert(next) {
                continue;
            }

            let mut extended = path.clone();
            extended.push(next);

            if next == to {
                return Some(extended);
            }
            queue.push_back(extended);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    fn nodes(ids: &[&str]) -> Vec<Node> {
        ids.iter().map(|id| Node::new(*id)).collect()
    }

    /// Chain 1 -> 2 -> 3 -> 4
    fn create_chain() -> GraphSnapshot {
        GraphSnapshot::new(
            "chain",
            nodes(&["1", "2", "3", "4"]),
            vec![Edge::new("1", "2"), Edge::new("2", "3"), Edge::new("3", "4")],
        )
    }

    #[test]
    fn test_same_node() {
        let graph = create_chain();
        assert_eq!(shortest_path(&graph, "3", "3"), vec!["3"]);
    }

    #[test]
    fn test_forward_path() {
        let graph = create_chain();
        assert_eq!(shortest_path(&graph, "1", "4"), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_edges_traversed_backwards() {
        let graph = create_chain();
        assert_eq!(shortest_path(&graph, "4", "1"), vec!["4", "3", "2", "1"]);
    }

    #[test]
    fn test_unknown_node_gives_empty() {
        let graph = create_chain();
        assert!(shortest_path(&graph, "1", "nope").is_empty());
        assert!(shortest_path(&graph, "nope", "1").is_empty());
        assert!(shortest_path(&graph, "nope", "nope").is_empty());
    }

    #[test]
    fn test_disconnected_gives_empty() {
        let graph = GraphSnapshot::new("split", nodes(&["a", "b"]), vec![]);
        assert!(shortest_path(&graph, "a", "b").is_empty());
    }

    #[test]
    fn test_shortcut_preferred() {
        // a -> b -> c -> d plus a shortcut a -> d
        let graph = GraphSnapshot::new(
            "shortcut",
            nodes(&["a", "b", "c", "d"]),
            vec![
                Edge::new("a", "b"),
                Edge::new("b", "c"),
                Edge::new("c", "d"),
                Edge::new("a", "d"),
            ],
        );
        assert_eq!(shortest_path(&graph, "a", "d"), vec!["a", "d"]);
    }

    #[test]
    fn test_tie_has_shortest_length() {
        // Diamond: s -> x -> t, s -> y -> t
        let graph = GraphSnapshot::new(
            "diamond",
            nodes(&["s", "x", "y", "t"]),
            vec![
                Edge::new("s", "x"),
                Edge::new("s", "y"),
                Edge::new("x", "t"),
                Edge::new("y", "t"),
            ],
        );
        let path = shortest_path(&graph, "s", "t");
        assert_eq!(path.len(), 3);
        assert_eq!(path.first().map(String::as_str), Some("s"));
        assert_eq!(path.last().map(String::as_str), Some("t"));
    }

    #[test]
    fn test_hop_distance() {
        let graph = create_chain();
        let view = AdjacencyView::undirected(&graph);

        assert_eq!(hop_distance(&view, "1", "1"), Some(0));
        assert_eq!(hop_distance(&view, "1", "3"), Some(2));
        assert_eq!(hop_distance(&view, "4", "2"), Some(2));
        assert_eq!(hop_distance(&view, "1", "missing"), None);
    }

    #[test]
    fn test_cycle_terminates() {
        let graph = GraphSnapshot::new(
            "ring",
            nodes(&["a", "b", "c", "z"]),
            vec![Edge::new("a", "b"), Edge::new("b", "c"), Edge::new("c", "a")],
        );
        assert!(shortest_path(&graph, "a", "z").is_empty());
        assert_eq!(shortest_path(&graph, "a", "c"), vec!["a", "c"]);
    }
}
