// Warden: sensitive-access graph analyzer
//
// Topology queries (shortest path, components, diameter) and bounded
// enumeration of paths from every node to sensitive nodes, with per-node
// risk classification and whole-graph aggregation.

pub mod cli;
pub mod engine;
pub mod error;
pub mod graph;
pub mod output;
pub mod risk;
pub mod store;

pub use engine::{Engine, EngineLimits};
pub use error::{AnalysisError, Result};
pub use graph::{Edge, GraphSnapshot, Node, NodeId};
pub use risk::{HopBound, RiskLevel, RiskReport, SensitiveReach};
pub use store::{GraphStore, MemoryStore};
