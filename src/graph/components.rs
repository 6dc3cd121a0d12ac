//! Connected components under undirected adjacency

use crate::graph::{AdjacencyView, GraphSnapshot, NodeId};
use petgraph::graph::NodeIndex;

/// Partition every node into maximal connected groups
///
/// Components are emitted in the order their first node appears in the
/// snapshot. Inside a component nodes follow depth-first traversal order.
/// Isolated nodes form singleton components.
pub fn connected_components(graph: &GraphSnapshot) -> Vec<Vec<NodeId>> {
    let view = AdjacencyView::undirected(graph);
    component_indices(&view)
        .iter()
        .map(|component| view.ids(component))
        .collect()
}

/// Components as node indices of the view
pub(crate) fn component_indices(view: &AdjacencyView<'_>) -> Vec<Vec<NodeIndex>> {
    let mut visited = vec![false; view.node_count()];
    let mut components = Vec::new();

    for start in view.node_indices() {
        if visited[start.index()] {
            continue;
        }

        // Explicit stack so deep chains cannot overflow the call stack
        let mut component = Vec::new();
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            if visited[node.index()] {
                continue;
            }
            visited[node.index()] = true;
            component.push(node);

            for &next in view.neighbors(node).iter().rev() {
                if !visited[next.index()] {
                    stack.push(next);
                }
            }
        }

        components.push(component);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    fn nodes(ids: &[&str]) -> Vec<Node> {
        ids.iter().map(|id| Node::new(*id)).collect()
    }

    #[test]
    fn test_empty_graph() {
        let graph = GraphSnapshot::new("empty", vec![], vec![]);
        assert!(connected_components(&graph).is_empty());
    }

    #[test]
    fn test_all_isolated() {
        let graph = GraphSnapshot::new("iso", nodes(&["a", "b", "c"]), vec![]);
        assert_eq!(
            connected_components(&graph),
            vec![vec!["a"], vec!["b"], vec!["c"]]
        );
    }

    #[test]
    fn test_direction_ignored() {
        // b -> a and b -> c join all three even though a cannot reach c
        let graph = GraphSnapshot::new(
            "fan",
            nodes(&["a", "b", "c"]),
            vec![Edge::new("b", "a"), Edge::new("b", "c")],
        );
        let components = connected_components(&graph);

        assert_eq!(components.len(), 1);
        assert_eq!(components[0], vec!["a", "b", "c"]);
    }

    #[test]
    fn test_two_islands() {
        let graph = GraphSnapshot::new(
            "islands",
            nodes(&["a", "x", "b", "y", "z"]),
            vec![Edge::new("a", "b"), Edge::new("x", "y"), Edge::new("z", "y")],
        );
        let components = connected_components(&graph);

        assert_eq!(components.len(), 2);
        assert_eq!(components[0], vec!["a", "b"]);
        assert_eq!(components[1], vec!["x", "y", "z"]);
    }

    #[test]
    fn test_every_node_once() {
        let graph = GraphSnapshot::new(
            "ring",
            nodes(&["a", "b", "c", "d"]),
            vec![
                Edge::new("a", "b"),
                Edge::new("b", "c"),
                Edge::new("c", "a"),
                Edge::new("d", "d"),
            ],
        );
        let components = connected_components(&graph);

        let mut all: Vec<_> = components.iter().flatten().cloned().collect();
        all.sort();
        assert_eq!(all, vec!["a", "b", "c", "d"]);
        assert_eq!(components.len(), 2);
    }

    #[test]
    fn test_matches_petgraph_component_count() {
        let graph = GraphSnapshot::new(
            "mixed",
            nodes(&["1", "2", "3", "4", "5", "6"]),
            vec![Edge::new("1", "2"), Edge::new("3", "2"), Edge::new("5", "6")],
        );
        let view = AdjacencyView::directed(&graph);

        assert_eq!(
            connected_components(&graph).len(),
            petgraph::algo::connected_components(view.graph())
        );
    }
}
