//! Graph export to DOT and JSON formats

use crate::graph::{GraphSnapshot, NodeId};
use crate::risk::{RiskLevel, RiskReport};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write;

/// Export a graph to DOT format for Graphviz
///
/// With a report, nodes are filled by risk level and edges on any node's
/// shortest access path are drawn bold.
pub fn export_dot(graph: &GraphSnapshot, report: Option<&RiskReport>) -> String {
    let access_edges: HashSet<(&str, &str)> =
        report.map(RiskReport::access_edges).unwrap_or_default();

    let mut dot = format!("digraph \"{}\" {{\n", escape_dot_string(&graph.graph_id));
    dot.push_str("  rankdir=LR;\n");
    dot.push_str("  node [shape=box, style=rounded];\n\n");

    // Define nodes
    for node in &graph.nodes {
        let mut attrs = vec![format!("label=\"{}\"", escape_dot_string(node.label()))];

        if node.sensitive {
            attrs.push("shape=doubleoctagon".to_string());
        }
        if let Some(level) = report.and_then(|r| r.risk_of(&node.id)) {
            attrs.push(format!("style=filled, fillcolor={}", risk_color(level)));
        }

        writeln!(
            dot,
            "  \"{}\" [{}];",
            escape_dot_string(&node.id),
            attrs.join(", ")
        )
        .ok();
    }

    // Define edges
    dot.push('\n');
    for edge in &graph.edges {
        let style = if access_edges.contains(&(edge.from.as_str(), edge.to.as_str())) {
            " [style=bold, color=red]"
        } else {
            ""
        };
        writeln!(
            dot,
            "  \"{}\" -> \"{}\"{};",
            escape_dot_string(&edge.from),
            escape_dot_string(&edge.to),
            style
        )
        .ok();
    }

    dot.push_str("}\n");
    dot
}

fn escape_dot_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn risk_color(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => "red",
        RiskLevel::Medium => "orange",
        RiskLevel::Low => "yellow",
        RiskLevel::None => "green",
    }
}

/// Complete graph export for JSON serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub graph_id: String,
    pub nodes: Vec<NodeExport>,
    pub edges: Vec<EdgeExport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeExport {
    pub id: NodeId,
    pub name: String,
    pub sensitive: bool,
    pub risk: Option<RiskLevel>,
    /// Hops to the nearest sensitive node, when reachable
    pub hops: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeExport {
    pub from: NodeId,
    pub to: NodeId,
    pub on_access_path: bool,
}

/// Export a graph to JSON format
pub fn export_json(graph: &GraphSnapshot, report: Option<&RiskReport>) -> GraphExport {
    let access_edges: HashSet<(&str, &str)> =
        report.map(RiskReport::access_edges).unwrap_or_default();

    let nodes = graph
        .nodes
        .iter()
        .map(|node| {
            let result = report.and_then(|r| r.result(&node.id));
            NodeExport {
                id: node.id.clone(),
                name: node.label().to_string(),
                sensitive: node.sensitive,
                risk: result.map(|r| r.risk),
                hops: result.and_then(|r| r.hops),
            }
        })
        .collect();

    let edges = graph
        .edges
        .iter()
        .map(|edge| EdgeExport {
            from: edge.from.clone(),
            to: edge.to.clone(),
            on_access_path: access_edges.contains(&(edge.from.as_str(), edge.to.as_str())),
        })
        .collect();

    GraphExport {
        graph_id: graph.graph_id.clone(),
        nodes,
        edges,
    }
}
