// Output formatting utilities: terminal messages, exit codes, JSON envelopes

use crate::error::AnalysisError;
use crate::risk::RiskLevel;
use std::io::IsTerminal;

// Colors for terminal output (when supported)
pub const RED: &str = "\x1b[0;31m";
pub const GREEN: &str = "\x1b[0;32m";
pub const YELLOW: &str = "\x1b[1;33m";
pub const BLUE: &str = "\x1b[0;34m";
pub const MAGENTA: &str = "\x1b[0;35m";
pub const BOLD: &str = "\x1b[1m";
pub const NC: &str = "\x1b[0m"; // No Color

/// Check if stdout is a terminal (for color output)
#[inline]
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Print info message
pub fn info(msg: &str) {
    let color = if is_terminal() { GREEN } else { "" };
    let reset = if is_terminal() { NC } else { "" };
    println!("{}[INFO]{} {}", color, reset, msg);
}

/// Print warning message
pub fn warn(msg: &str) {
    let color = if is_terminal() { YELLOW } else { "" };
    let reset = if is_terminal() { NC } else { "" };
    eprintln!("{}[WARN]{} {}", color, reset, msg);
}

/// Print error message
pub fn error(msg: &str) {
    let color = if is_terminal() { RED } else { "" };
    let reset = if is_terminal() { NC } else { "" };
    eprintln!("{}[ERROR]{} {}", color, reset, msg);
}

/// Print success message
pub fn success(msg: &str) {
    let color = if is_terminal() { MAGENTA } else { "" };
    let reset = if is_terminal() { NC } else { "" };
    println!("{}[OK]{} {}", color, reset, msg);
}

/// Print section header
pub fn header(msg: &str) {
    let bold = if is_terminal() { BOLD } else { "" };
    let reset = if is_terminal() { NC } else { "" };
    println!("{}===>{} {}", bold, reset, msg);
    println!();
}

/// Risk level colored for the terminal
pub fn risk_label(level: RiskLevel) -> String {
    if !is_terminal() {
        return level.to_string();
    }
    let color = match level {
        RiskLevel::High => RED,
        RiskLevel::Medium => YELLOW,
        RiskLevel::Low => BLUE,
        RiskLevel::None => GREEN,
    };
    format!("{}{}{}", color, level, NC)
}

/// Exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_FILE_NOT_FOUND: i32 = 4;
pub const EXIT_VALIDATION: i32 = 5;
pub const EXIT_NOT_FOUND: i32 = 6;
pub const EXIT_BUDGET: i32 = 7;

/// Exit code for a library error
pub fn exit_code_for(err: &AnalysisError) -> i32 {
    match err {
        AnalysisError::GraphNotFound { .. } | AnalysisError::UnknownNode { .. } => EXIT_NOT_FOUND,
        AnalysisError::BudgetExhausted { .. } => EXIT_BUDGET,
        AnalysisError::InvalidHopBound { .. }
        | AnalysisError::DuplicateGraph { .. }
        | AnalysisError::DuplicateNode { .. }
        | AnalysisError::DanglingEdge { .. } => EXIT_VALIDATION,
    }
}

// ============================================================================
// Error Codes and Remediation
// ============================================================================

/// Error codes for JSON error responses
pub const E_GRAPH_FILE_NOT_FOUND: &str = "E001";
pub const E_GRAPH_NOT_FOUND: &str = "E002";
pub const E_NODE_NOT_FOUND: &str = "E003";
pub const E_INVALID_HOP_BOUND: &str = "E004";
pub const E_BUDGET_EXHAUSTED: &str = "E005";
pub const E_INVALID_INPUT: &str = "E006";
pub const E_INVALID_GRAPH: &str = "E007";
pub const E_INTERNAL: &str = "E008";

/// Common remediation messages
pub const R_HINT_GRAPHS_FILE: &str = "Pass --graphs FILE or set WARDEN_GRAPHS to a JSON graph file";
pub const R_HINT_LIST_GRAPHS: &str = "Run 'warden list' to see available graphs";
pub const R_HINT_GRAPH_ID: &str = "Pass --graph-id ID to choose a graph";
pub const R_HINT_NODE: &str = "Run 'warden export --format json' to see node identifiers";
pub const R_HINT_MAX_HOPS: &str = "Use --max-hops N with N between 1 and 20";
pub const R_HINT_MAX_WORK: &str = "Lower --max-hops or raise --max-work to allow more exploration";
pub const R_HINT_FIX_GRAPH: &str = "Fix the graph definition: node ids must be unique and edges must reference existing nodes";

/// JSON output wrapper
#[derive(Debug, Clone, serde::Serialize)]
pub struct JsonResponse<T> {
    pub schema_version: String,
    pub execution_id: String,
    pub tool: String,
    pub timestamp: String,
    pub data: T,
}

impl<T: serde::Serialize> JsonResponse<T> {
    pub fn new(data: T) -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};

        let timestamp = chrono::Utc::now().to_rfc3339();
        let exec_id = format!(
            "{:x}-{}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
            std::process::id()
        );

        JsonResponse {
            schema_version: "1.0.0".to_string(),
            execution_id: exec_id,
            tool: "warden".to_string(),
            timestamp,
            data,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Error response format for JSON mode
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl JsonError {
    pub fn new(category: &str, message: &str, code: &str) -> Self {
        JsonError {
            error: category.to_string(),
            message: message.to_string(),
            code: code.to_string(),
            remediation: None,
        }
    }

    pub fn with_remediation(mut self, remediation: &str) -> Self {
        self.remediation = Some(remediation.to_string());
        self
    }

    /// Graph file missing or unreadable
    pub fn graph_file_not_found(path: &str) -> Self {
        Self::new(
            "GraphFileNotFound",
            &format!("Graph file not found: {}", path),
            E_GRAPH_FILE_NOT_FOUND,
        )
        .with_remediation(R_HINT_GRAPHS_FILE)
    }

    /// Several graphs loaded and none selected
    pub fn ambiguous_graph(count: usize) -> Self {
        Self::new(
            "AmbiguousGraph",
            &format!("{} graphs loaded; choose one with --graph-id", count),
            E_INVALID_INPUT,
        )
        .with_remediation(R_HINT_GRAPH_ID)
    }

    /// Anything without a more specific category
    pub fn internal(message: &str) -> Self {
        Self::new("Error", message, E_INTERNAL)
    }

    /// Map a library error onto a category, code and hint
    pub fn from_analysis(err: &AnalysisError) -> Self {
        let message = err.to_string();
        match err {
            AnalysisError::GraphNotFound { .. } => {
                Self::new("GraphNotFound", &message, E_GRAPH_NOT_FOUND)
                    .with_remediation(R_HINT_LIST_GRAPHS)
            }
            AnalysisError::UnknownNode { .. } => {
                Self::new("NodeNotFound", &message, E_NODE_NOT_FOUND).with_remediation(R_HINT_NODE)
            }
            AnalysisError::InvalidHopBound { .. } => {
                Self::new("InvalidHopBound", &message, E_INVALID_HOP_BOUND)
                    .with_remediation(R_HINT_MAX_HOPS)
            }
            AnalysisError::BudgetExhausted { .. } => {
                Self::new("BudgetExhausted", &message, E_BUDGET_EXHAUSTED)
                    .with_remediation(R_HINT_MAX_WORK)
            }
            AnalysisError::DuplicateGraph { .. }
            | AnalysisError::DuplicateNode { .. }
            | AnalysisError::DanglingEdge { .. } => {
                Self::new("InvalidGraph", &message, E_INVALID_GRAPH)
                    .with_remediation(R_HINT_FIX_GRAPH)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_response() {
        let data = vec!["item1", "item2"];
        let response = JsonResponse::new(data);
        let json = response.to_json();
        assert!(json.contains("\"tool\":\"warden\""));
        assert!(json.contains("\"data\":[\"item1\",\"item2\"]"));
        assert!(json.contains("\"schema_version\":\"1.0.0\""));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(&AnalysisError::graph_not_found("g")), EXIT_NOT_FOUND);
        assert_eq!(exit_code_for(&AnalysisError::unknown_node("g", "n")), EXIT_NOT_FOUND);
        assert_eq!(
            exit_code_for(&AnalysisError::InvalidHopBound { value: 0, min: 1, max: 20 }),
            EXIT_VALIDATION
        );
        assert_eq!(exit_code_for(&AnalysisError::BudgetExhausted { limit: 5 }), EXIT_BUDGET);
    }

    #[test]
    fn test_json_error_from_analysis() {
        let err = JsonError::from_analysis(&AnalysisError::graph_not_found("prod"));
        assert_eq!(err.error, "GraphNotFound");
        assert_eq!(err.code, E_GRAPH_NOT_FOUND);
        assert_eq!(err.message, "graph 'prod' not found");
        assert_eq!(err.remediation.as_deref(), Some(R_HINT_LIST_GRAPHS));

        let err = JsonError::from_analysis(&AnalysisError::BudgetExhausted { limit: 9 });
        assert_eq!(err.code, E_BUDGET_EXHAUSTED);
    }

    #[test]
    fn test_json_error_skips_missing_remediation() {
        let json = serde_json::to_string(&JsonError::internal("boom")).unwrap();
        assert!(!json.contains("remediation"));
        assert!(json.contains("\"code\":\"E008\""));
    }
}
