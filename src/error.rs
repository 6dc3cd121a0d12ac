//! Error types for graph resolution, input validation and work budgets

use thiserror::Error;

/// Errors reported by the store and the analysis engine
///
/// Every variant is local to a single request. The engine holds no state,
/// so nothing needs to be rolled back when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The graph identifier does not resolve through the store
    #[error("graph '{graph_id}' not found")]
    GraphNotFound {
        /// Identifier that failed to resolve
        graph_id: String,
    },

    /// Hop bound outside the accepted range
    #[error("hop bound {value} is out of range (expected {min}..={max})")]
    InvalidHopBound {
        /// Rejected value
        value: u32,
        /// Smallest accepted bound
        min: u32,
        /// Largest accepted bound
        max: u32,
    },

    /// A start, end or origin node is not part of the graph
    #[error("node '{node_id}' not found in graph '{graph_id}'")]
    UnknownNode {
        /// Graph that was searched
        graph_id: String,
        /// Node that is missing
        node_id: String,
    },

    /// The work budget for a single request was used up
    #[error("analysis aborted after exceeding the work budget of {limit} units")]
    BudgetExhausted {
        /// Configured budget
        limit: usize,
    },

    /// A graph with this identifier is already stored
    #[error("graph '{graph_id}' already exists")]
    DuplicateGraph {
        /// Conflicting identifier
        graph_id: String,
    },

    /// Two nodes in one graph share an identifier
    #[error("duplicate node id '{node_id}' in graph '{graph_id}'")]
    DuplicateNode {
        /// Graph being validated
        graph_id: String,
        /// Repeated node identifier
        node_id: String,
    },

    /// An edge references a node that does not exist
    #[error("edge {from} -> {to} in graph '{graph_id}' references unknown node '{missing}'")]
    DanglingEdge {
        /// Graph being validated
        graph_id: String,
        /// Edge source
        from: String,
        /// Edge target
        to: String,
        /// The endpoint that is missing
        missing: String,
    },
}

impl AnalysisError {
    /// Create a graph-not-found error
    pub fn graph_not_found(graph_id: impl Into<String>) -> Self {
        Self::GraphNotFound {
            graph_id: graph_id.into(),
        }
    }

    /// Create an unknown-node error
    pub fn unknown_node(graph_id: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self::UnknownNode {
            graph_id: graph_id.into(),
            node_id: node_id.into(),
        }
    }

    /// True for caller errors (bad bound, unknown node, invalid graph definition)
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidHopBound { .. }
                | Self::UnknownNode { .. }
                | Self::DuplicateNode { .. }
                | Self::DanglingEdge { .. }
                | Self::DuplicateGraph { .. }
        )
    }

    /// True when the requested graph or node does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::GraphNotFound { .. } | Self::UnknownNode { .. })
    }
}

/// Result alias used throughout the library
pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::graph_not_found("g1");
        assert_eq!(err.to_string(), "graph 'g1' not found");

        let err = AnalysisError::InvalidHopBound { value: 21, min: 1, max: 20 };
        assert_eq!(err.to_string(), "hop bound 21 is out of range (expected 1..=20)");

        let err = AnalysisError::unknown_node("g1", "n9");
        assert_eq!(err.to_string(), "node 'n9' not found in graph 'g1'");
    }

    #[test]
    fn test_error_classification() {
        assert!(AnalysisError::graph_not_found("g").is_not_found());
        assert!(!AnalysisError::graph_not_found("g").is_invalid_input());
        assert!(AnalysisError::unknown_node("g", "n").is_not_found());
        assert!(AnalysisError::unknown_node("g", "n").is_invalid_input());
        assert!(!AnalysisError::BudgetExhausted { limit: 10 }.is_invalid_input());
        assert!(!AnalysisError::BudgetExhausted { limit: 10 }.is_not_found());
    }
}
