//! Integration tests for all warden commands
//!
//! These are "smoke tests" that verify:
//! - CLI parsing works correctly
//! - Commands produce the expected results on a small fixture graph
//! - Output format is correct (human/json/pretty)
//! - Failures map to the documented exit codes
//!
//! For deeper functional testing, see the unit tests in src/cli/mod.rs.

use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Fixture: chain 1 -> 2 -> 3 -> 4 (2 and 4 sensitive) plus an isolated node
const CHAIN_GRAPH: &str = r#"{
    "graphId": "chain",
    "nodes": [
        {"id": "1", "name": "intern"},
        {"id": "2", "name": "admin-role", "sensitive": true},
        {"id": "3"},
        {"id": "4", "name": "payroll-db", "sensitive": true},
        {"id": "5"}
    ],
    "edges": [
        {"from": "1", "to": "2"},
        {"from": "2", "to": "3"},
        {"from": "3", "to": "4"}
    ]
}"#;

const SECOND_GRAPH: &str = r#"{
    "graphId": "flat",
    "nodes": [{"id": "a"}, {"id": "vault", "sensitive": true}],
    "edges": []
}"#;

/// Test context for integration tests
///
/// Provides a graph file in a temp dir and the warden binary path.
struct TestContext {
    warden_bin: PathBuf,
    graphs_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestContext {
    /// Create a context whose graph file holds just the chain graph
    fn new() -> Self {
        Self::with_graphs(CHAIN_GRAPH)
    }

    fn with_graphs(contents: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let graphs_path = temp_dir.path().join("graphs.json");
        std::fs::write(&graphs_path, contents).unwrap();

        // Use CARGO_BIN_EXE_warden if available (for cargo test), otherwise fallback
        let warden_bin = std::env::var("CARGO_BIN_EXE_warden")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let debug_path = PathBuf::from("./target/debug/warden");
                if debug_path.exists() {
                    debug_path
                } else {
                    PathBuf::from("./target/release/warden")
                }
            });

        Self {
            warden_bin,
            graphs_path,
            _temp_dir: temp_dir,
        }
    }

    /// Run warden with the given arguments against the fixture file
    fn run_command(&self, args: &[&str]) -> TestOutput {
        let output = Command::new(&self.warden_bin)
            .args(args)
            .arg("--graphs")
            .arg(&self.graphs_path)
            .env_remove("WARDEN_GRAPHS")
            .env_remove("WARDEN_MAX_HOPS")
            .env_remove("WARDEN_MAX_WORK")
            .output()
            .expect("Failed to run warden");

        TestOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

/// Output from running a warden command
struct TestOutput {
    stdout: String,
    stderr: String,
    status: std::process::ExitStatus,
}

impl TestOutput {
    /// Returns true if the command succeeded
    fn success(&self) -> bool {
        self.status.success()
    }

    fn code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Returns true if stdout contains the given substring
    fn stdout_contains(&self, s: &str) -> bool {
        self.stdout.contains(s)
    }

    /// Returns true if stderr contains the given substring
    fn stderr_contains(&self, s: &str) -> bool {
        self.stderr.contains(s)
    }

    /// Parse stdout as JSON
    fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({}): {}", e, self.stdout))
    }
}

// ============================================================================
// Integration tests for each command
// ============================================================================

#[test]
fn test_list_command() {
    let ctx = TestContext::with_graphs(&format!("[{}, {}]", CHAIN_GRAPH, SECOND_GRAPH));
    let output = ctx.run_command(&["list"]);

    assert!(output.success(), "list should succeed: {}", output.stderr);
    assert!(output.stdout_contains("chain"));
    assert!(output.stdout_contains("flat"));
}

#[test]
fn test_list_command_json() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&["list", "--output", "json"]);

    assert!(output.success());
    let json = output.json();
    assert_eq!(json["tool"], "warden");
    assert_eq!(json["data"][0]["graph_id"], "chain");
    assert_eq!(json["data"][0]["nodes"], 5);
    assert_eq!(json["data"][0]["sensitive_nodes"], 2);
}

#[test]
fn test_shortest_path_command() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&["shortest-path", "--from", "4", "--to", "1", "--output", "json"]);

    assert!(output.success(), "shortest-path should succeed: {}", output.stderr);
    let json = output.json();
    assert_eq!(json["data"]["path"], serde_json::json!(["4", "3", "2", "1"]));
    assert_eq!(json["data"]["hops"], 3);
}

#[test]
fn test_shortest_path_unconnected_is_empty() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&["shortest-path", "--from", "1", "--to", "5", "--output", "json"]);

    assert!(output.success(), "no path is not an error");
    assert_eq!(output.json()["data"]["path"], serde_json::json!([]));
}

#[test]
fn test_shortest_path_unknown_node() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&["shortest-path", "--from", "1", "--to", "ghost"]);

    assert_eq!(output.code(), Some(6));
    assert!(output.stderr_contains("ghost"));
}

#[test]
fn test_components_command() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&["components", "--output", "json"]);

    assert!(output.success());
    let json = output.json();
    assert_eq!(json["data"]["count"], 2);
    assert_eq!(json["data"]["components"][1], serde_json::json!(["5"]));
}

#[test]
fn test_diameter_command() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&["diameter"]);

    assert!(output.success());
    assert!(output.stdout_contains("Diameter of chain: 3"));
}

#[test]
fn test_reach_command() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&["reach", "--node", "1", "--output", "json"]);

    assert!(output.success(), "reach should succeed: {}", output.stderr);
    let data = &output.json()["data"];
    assert_eq!(data["reachable"], true);
    assert_eq!(data["risk"], "HIGH");
    assert_eq!(data["shortest_path"], serde_json::json!(["1", "2"]));
    assert_eq!(data["sensitive"], serde_json::json!(["2", "4"]));
}

#[test]
fn test_reach_with_explicit_sensitive_set() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&[
        "reach", "--node", "1", "--sensitive", "4", "--max-hops", "2", "--output", "json",
    ]);

    assert!(output.success());
    let data = &output.json()["data"];
    assert_eq!(data["reachable"], false);
    assert_eq!(data["risk"], "NONE");
}

#[test]
fn test_reach_rejects_hop_bound() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&["reach", "--node", "1", "--max-hops", "21", "--output", "json"]);

    assert_eq!(output.code(), Some(5));
    let json = output.json();
    assert_eq!(json["error"], "InvalidHopBound");
    assert!(json["remediation"].is_string());
}

#[test]
fn test_risk_command() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&["risk"]);

    assert!(output.success(), "risk should succeed: {}", output.stderr);
    assert!(output.stdout_contains("Risk analysis of chain"));
    assert!(output.stdout_contains("HIGH"));
}

#[test]
fn test_risk_command_json() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&["risk", "--output", "pretty"]);

    assert!(output.success());
    let data = &output.json()["data"];
    assert_eq!(data["summary"]["total_nodes"], 5);
    assert_eq!(data["summary"]["high_risk_nodes"], 4);
    assert_eq!(data["risk_matrix"]["no_access"], serde_json::json!(["5"]));
    assert_eq!(data["results"]["3"]["shortest_path"], serde_json::json!(["3", "4"]));
}

#[test]
fn test_risk_budget_exhausted() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&["risk", "--max-work", "1", "--output", "json"]);

    assert_eq!(output.code(), Some(7));
    assert_eq!(output.json()["error"], "BudgetExhausted");
}

#[test]
fn test_metrics_command() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&[
        "metrics", "--from", "1", "--to", "4", "--components", "--diameter", "--output", "json",
    ]);

    assert!(output.success());
    let data = &output.json()["data"];
    assert_eq!(data["node_count"], 5);
    assert_eq!(data["edge_count"], 3);
    assert_eq!(data["diameter"], 3);
    assert_eq!(data["connected_components"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_export_dot() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&["export", "--format", "dot"]);

    assert!(output.success());
    assert!(output.stdout.starts_with("digraph \"chain\""));
    assert!(output.stdout_contains("doubleoctagon"));
    assert!(output.stdout_contains("\"1\" -> \"2\" [style=bold, color=red];"));
}

#[test]
fn test_export_json() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&["export", "--format", "json"]);

    assert!(output.success());
    let json = output.json();
    assert_eq!(json["graph_id"], "chain");
    assert_eq!(json["nodes"][0]["name"], "intern");
    assert_eq!(json["nodes"][4]["risk"], "NONE");
}

#[test]
fn test_ambiguous_graph_requires_id() {
    let ctx = TestContext::with_graphs(&format!("[{}, {}]", CHAIN_GRAPH, SECOND_GRAPH));

    let output = ctx.run_command(&["components"]);
    assert_eq!(output.code(), Some(2));
    assert!(output.stderr_contains("--graph-id"));

    let output = ctx.run_command(&["components", "--graph-id", "flat", "--output", "json"]);
    assert!(output.success());
    assert_eq!(output.json()["data"]["count"], 2);
}

#[test]
fn test_unknown_graph_id() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&["diameter", "--graph-id", "nope", "--output", "json"]);

    assert_eq!(output.code(), Some(6));
    assert_eq!(output.json()["error"], "GraphNotFound");
}

#[test]
fn test_missing_graph_file() {
    let ctx = TestContext::new();
    let output = Command::new(&ctx.warden_bin)
        .args(["list", "--graphs", "/no/such/graphs.json"])
        .output()
        .expect("Failed to run warden");

    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_invalid_graph_file() {
    let ctx = TestContext::with_graphs(
        r#"{"graphId": "bad", "nodes": [{"id": "a"}], "edges": [{"from": "a", "to": "b"}]}"#,
    );
    let output = ctx.run_command(&["list", "--output", "json"]);

    assert_eq!(output.code(), Some(5));
    assert_eq!(output.json()["error"], "InvalidGraph");
}

#[test]
fn test_usage_error() {
    let ctx = TestContext::new();
    let output = ctx.run_command(&["reach"]);
    assert_eq!(output.code(), Some(2));
}
