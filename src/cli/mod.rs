// CLI command definitions and handlers

use crate::engine::EngineLimits;
use crate::error::AnalysisError;
use crate::output::{self, JsonError};
use crate::store::MemoryStore;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::Path;
use thiserror::Error;

/// Warden - sensitive-access graph analyzer
///
/// Answers which nodes of an access graph can reach privileged resources,
/// how quickly, and along which paths.
#[derive(Parser, Debug, Clone)]
#[command(name = "warden")]
#[command(author, version, about)]
#[command(long_about = "Warden analyzes directed access graphs (users, roles, services, resources).

Nodes flagged as sensitive are privileged or protected resources. For every
node Warden finds the paths that reach a sensitive node within a hop bound
and classifies the node's risk:

  HIGH    sensitive itself, or one hop away
  MEDIUM  two hops away
  LOW     three or more hops away
  NONE    nothing sensitive within the bound

Graphs are read from a JSON file holding one graph or an array of graphs.")]
pub struct Cli {
    /// JSON file with one graph or an array of graphs
    #[arg(global = true, long, env = "WARDEN_GRAPHS")]
    pub graphs: Option<String>,

    /// Graph to analyze (optional when the file holds exactly one)
    #[arg(global = true, long)]
    pub graph_id: Option<String>,

    /// Output format
    #[arg(global = true, long, value_enum, default_value_t = OutputFormat::Human)]
    pub output: OutputFormat,

    /// Work units allowed per request (0 disables the budget)
    #[arg(global = true, long, env = "WARDEN_MAX_WORK")]
    pub max_work: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    Human,
    /// Compact JSON for programmatic consumption
    Json,
    /// Formatted JSON with indentation
    Pretty,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List loaded graphs
    List,

    /// Shortest undirected path between two nodes
    ShortestPath(ShortestPathArgs),

    /// Connected components (edge direction ignored)
    Components,

    /// Longest shortest path among connected node pairs
    Diameter,

    /// Paths from one node to sensitive nodes
    Reach(ReachArgs),

    /// Risk level of every node
    Risk(RiskArgs),

    /// Node and edge counts plus optional topology metrics
    Metrics(MetricsArgs),

    /// Export the graph with risk annotations
    Export(ExportArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ShortestPathArgs {
    /// Start node id
    #[arg(long)]
    pub from: String,

    /// End node id
    #[arg(long)]
    pub to: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ReachArgs {
    /// Origin node id
    #[arg(long)]
    pub node: String,

    /// Maximum edges per path (1-20)
    #[arg(long, env = "WARDEN_MAX_HOPS", default_value_t = 6)]
    pub max_hops: u32,

    /// Sensitive node id; repeatable (default: nodes flagged sensitive)
    #[arg(long)]
    pub sensitive: Vec<String>,
}

#[derive(Parser, Debug, Clone, Copy)]
pub struct RiskArgs {
    /// Maximum edges per path (1-20)
    #[arg(long, env = "WARDEN_MAX_HOPS", default_value_t = 6)]
    pub max_hops: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct MetricsArgs {
    /// Start node for the shortest path metric
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// End node for the shortest path metric
    #[arg(long, requires = "from")]
    pub to: Option<String>,

    /// Include connected components
    #[arg(long)]
    pub components: bool,

    /// Include the diameter
    #[arg(long)]
    pub diameter: bool,
}

#[derive(Parser, Debug, Clone, Copy)]
pub struct ExportArgs {
    /// Export format
    #[arg(long, value_enum, default_value_t = ExportFormat::Dot)]
    pub format: ExportFormat,

    /// Hop bound for the risk annotations (1-20)
    #[arg(long, env = "WARDEN_MAX_HOPS", default_value_t = 6)]
    pub max_hops: u32,
}

/// Graph export format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Graphviz DOT format
    Dot,
    /// JSON export
    Json,
}

/// Failures that only exist at the command line
#[derive(Debug, Error)]
pub enum CliError {
    #[error("graph file not found: {path}")]
    GraphFileNotFound { path: String },

    #[error("{count} graphs loaded; choose one with --graph-id")]
    AmbiguousGraph { count: usize },

    #[error("no graphs in {path}")]
    EmptyGraphFile { path: String },
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Resolve the graph file path from multiple sources
///
/// Priority: CLI arg > WARDEN_GRAPHS env var > default "./graphs.json"
pub fn resolve_graphs_path(cli_graphs: Option<String>) -> String {
    match cli_graphs {
        Some(path) => path,
        None => std::env::var("WARDEN_GRAPHS").unwrap_or_else(|_| "./graphs.json".to_string()),
    }
}

/// Engine limits from the global options
pub fn resolve_limits(max_work: Option<usize>) -> EngineLimits {
    let limits = EngineLimits::default();
    match max_work {
        Some(0) => limits.with_max_work_units(None),
        Some(units) => limits.with_max_work_units(Some(units)),
        None => limits,
    }
}

/// Load the graph file named by the global options
pub fn open_store(cli_graphs: Option<String>) -> anyhow::Result<MemoryStore> {
    let path = resolve_graphs_path(cli_graphs);
    if !Path::new(&path).exists() {
        return Err(CliError::GraphFileNotFound { path }.into());
    }
    let store = MemoryStore::from_path(&path)?;
    tracing::debug!(path = %path, graphs = store.len(), "loaded graph file");
    Ok(store)
}

/// Pick the graph to analyze
///
/// An explicit id is returned as is; the engine reports it if missing.
pub fn select_graph(store: &MemoryStore, requested: Option<&str>, path: &str) -> Result<String, CliError> {
    if let Some(id) = requested {
        return Ok(id.to_string());
    }
    let mut ids = store.list();
    match ids.len() {
        0 => Err(CliError::EmptyGraphFile {
            path: path.to_string(),
        }),
        1 => Ok(ids.remove(0)),
        count => Err(CliError::AmbiguousGraph { count }),
    }
}

/// Exit code and JSON error body for a failed command
pub fn classify_failure(err: &anyhow::Error) -> (i32, JsonError) {
    if let Some(cli_err) = err.chain().find_map(|e| e.downcast_ref::<CliError>()) {
        return match cli_err {
            CliError::GraphFileNotFound { path } => {
                (output::EXIT_FILE_NOT_FOUND, JsonError::graph_file_not_found(path))
            }
            CliError::AmbiguousGraph { count } => {
                (output::EXIT_USAGE, JsonError::ambiguous_graph(*count))
            }
            CliError::EmptyGraphFile { .. } => (
                output::EXIT_VALIDATION,
                JsonError::new("EmptyGraphFile", &cli_err.to_string(), output::E_INVALID_GRAPH)
                    .with_remediation(output::R_HINT_GRAPHS_FILE),
            ),
        };
    }

    if let Some(analysis_err) = err.chain().find_map(|e| e.downcast_ref::<AnalysisError>()) {
        return (
            output::exit_code_for(analysis_err),
            JsonError::from_analysis(analysis_err),
        );
    }

    if err.chain().any(|e| e.downcast_ref::<serde_json::Error>().is_some()) {
        return (
            output::EXIT_VALIDATION,
            JsonError::new("InvalidGraphFile", &format!("{:#}", err), output::E_INVALID_GRAPH)
                .with_remediation(output::R_HINT_FIX_GRAPH),
        );
    }

    (output::EXIT_ERROR, JsonError::internal(&format!("{:#}", err)))
}

/// Print a failure in the requested format and return its exit code
pub fn report_failure(err: &anyhow::Error, format: OutputFormat) -> i32 {
    let (code, body) = classify_failure(err);
    match format {
        OutputFormat::Human => output::error(&format!("{:#}", err)),
        OutputFormat::Json => println!("{}", serde_json::to_string(&body).unwrap_or_default()),
        OutputFormat::Pretty => {
            println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default())
        }
    }
    code
}

/// Run the parsed command
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::List => cmds::list(cli),
        Commands::ShortestPath(args) => cmds::shortest_path(args, cli),
        Commands::Components => cmds::components(cli),
        Commands::Diameter => cmds::diameter(cli),
        Commands::Reach(args) => cmds::reach(args, cli),
        Commands::Risk(args) => cmds::risk(*args, cli),
        Commands::Metrics(args) => cmds::metrics(args, cli),
        Commands::Export(args) => cmds::export(*args, cli),
    }
}

// ============================================================================
// Command Handlers
// ============================================================================

pub mod cmds {
    use super::*;
    use crate::engine::Engine;
    use crate::graph::{export_dot, export_json, MetricsRequest, NodeId};
    use crate::risk::{RiskReport, SensitiveReach};
    use anyhow::Result;
    use serde::Serialize;

    /// Store, engine and selected graph for one invocation
    struct Session {
        engine: Engine<MemoryStore>,
        graph_id: String,
    }

    fn open_session(cli: &Cli) -> Result<Session> {
        let path = resolve_graphs_path(cli.graphs.clone());
        let store = open_store(Some(path.clone()))?;
        let graph_id = select_graph(&store, cli.graph_id.as_deref(), &path)?;
        let engine = Engine::with_limits(store, resolve_limits(cli.max_work));
        Ok(Session { engine, graph_id })
    }

    /// Print `data` as JSON, or run `human` for text output
    fn emit<T: Serialize>(format: OutputFormat, data: T, human: impl FnOnce(&T)) {
        match format {
            OutputFormat::Human => human(&data),
            OutputFormat::Json => println!("{}", output::JsonResponse::new(data).to_json()),
            OutputFormat::Pretty => {
                println!("{}", output::JsonResponse::new(data).to_pretty_json())
            }
        }
    }

    #[derive(Serialize)]
    struct GraphListEntry {
        graph_id: String,
        nodes: usize,
        edges: usize,
        sensitive_nodes: usize,
    }

    pub fn list(cli: &Cli) -> Result<()> {
        let store = open_store(cli.graphs.clone())?;
        let entries: Vec<GraphListEntry> = store
            .list()
            .into_iter()
            .filter_map(|id| store.get(&id))
            .map(|g| GraphListEntry {
                graph_id: g.graph_id.clone(),
                nodes: g.node_count(),
                edges: g.edge_count(),
                sensitive_nodes: g.sensitive_ids().len(),
            })
            .collect();

        emit(cli.output, entries, |entries| {
            output::header(&format!("{} graph(s)", entries.len()));
            for e in entries {
                println!(
                    "  {}  ({} nodes, {} edges, {} sensitive)",
                    e.graph_id, e.nodes, e.edges, e.sensitive_nodes
                );
            }
        });
        Ok(())
    }

    #[derive(Serialize)]
    struct ShortestPathResponse {
        graph_id: String,
        from: String,
        to: String,
        path: Vec<NodeId>,
        hops: Option<usize>,
    }

    pub fn shortest_path(args: &ShortestPathArgs, cli: &Cli) -> Result<()> {
        let session = open_session(cli)?;
        let path = session
            .engine
            .shortest_path(&session.graph_id, &args.from, &args.to)?;

        let response = ShortestPathResponse {
            graph_id: session.graph_id,
            from: args.from.clone(),
            to: args.to.clone(),
            hops: (!path.is_empty()).then(|| path.len() - 1),
            path,
        };
        emit(cli.output, response, |r| {
            if r.path.is_empty() {
                output::warn(&format!("No path between '{}' and '{}'", r.from, r.to));
            } else {
                println!("{}", r.path.join(" -> "));
                output::info(&format!("{} hop(s)", r.hops.unwrap_or_default()));
            }
        });
        Ok(())
    }

    #[derive(Serialize)]
    struct ComponentsResponse {
        graph_id: String,
        count: usize,
        components: Vec<Vec<NodeId>>,
    }

    pub fn components(cli: &Cli) -> Result<()> {
        let session = open_session(cli)?;
        let components = session.engine.connected_components(&session.graph_id)?;

        let response = ComponentsResponse {
            graph_id: session.graph_id,
            count: components.len(),
            components,
        };
        emit(cli.output, response, |r| {
            output::header(&format!("{} component(s) in {}", r.count, r.graph_id));
            for (i, component) in r.components.iter().enumerate() {
                println!("  {} ({} nodes): {}", i + 1, component.len(), component.join(", "));
            }
        });
        Ok(())
    }

    #[derive(Serialize)]
    struct DiameterResponse {
        graph_id: String,
        diameter: usize,
    }

    pub fn diameter(cli: &Cli) -> Result<()> {
        let session = open_session(cli)?;
        let diameter = session.engine.diameter(&session.graph_id)?;

        let response = DiameterResponse {
            graph_id: session.graph_id,
            diameter,
        };
        emit(cli.output, response, |r| {
            println!("Diameter of {}: {}", r.graph_id, r.diameter);
        });
        Ok(())
    }

    #[derive(Serialize)]
    struct ReachResponse {
        graph_id: String,
        hop_bound: u32,
        sensitive: Vec<NodeId>,
        #[serde(flatten)]
        reach: SensitiveReach,
    }

    pub fn reach(args: &ReachArgs, cli: &Cli) -> Result<()> {
        let session = open_session(cli)?;
        let sensitive = if args.sensitive.is_empty() {
            session.engine.sensitive_ids(&session.graph_id)?
        } else {
            args.sensitive.clone()
        };

        let reach = session.engine.sensitive_reachability(
            &session.graph_id,
            &args.node,
            &sensitive,
            args.max_hops,
        )?;

        let response = ReachResponse {
            graph_id: session.graph_id,
            hop_bound: args.max_hops,
            sensitive,
            reach,
        };
        emit(cli.output, response, |r| {
            output::header(&format!(
                "{} -> sensitive (max {} hops)",
                r.reach.origin, r.hop_bound
            ));
            println!("  Risk: {}", output::risk_label(r.reach.risk));
            match &r.reach.shortest_path {
                Some(path) => println!("  Shortest: {}", path.join(" -> ")),
                None => println!("  Shortest: -"),
            }
            if !r.reach.sensitive_reached.is_empty() {
                println!("  Reached: {}", r.reach.sensitive_reached.join(", "));
            }
            println!("  Paths: {}", r.reach.path_count());
            for path in &r.reach.paths {
                println!("    {}  [{}]", path.nodes.join(" -> "), &path.path_id[..12]);
            }
        });
        Ok(())
    }

    pub fn risk(args: RiskArgs, cli: &Cli) -> Result<()> {
        let session = open_session(cli)?;
        let report = session
            .engine
            .full_risk_analysis(&session.graph_id, Some(args.max_hops))?;

        emit(cli.output, report, print_report);
        Ok(())
    }

    fn print_report(report: &RiskReport) {
        let summary = &report.summary;
        output::header(&format!(
            "Risk analysis of {} (max {} hops)",
            report.graph_id, report.hop_bound
        ));
        println!("  Nodes:            {}", summary.total_nodes);
        println!("  Sensitive:        {}", summary.sensitive_nodes);
        println!("  With access:      {}", summary.nodes_with_access);
        println!("  High risk:        {}", summary.high_risk_nodes);
        println!("  Paths:            {}", summary.total_paths);
        println!();

        let matrix = &report.risk_matrix;
        println!("  Direct access:    {}", matrix.direct_access.join(", "));
        println!("  Indirect access:  {}", matrix.indirect_access.join(", "));
        println!("  No access:        {}", matrix.no_access.join(", "));
        println!();

        for (id, result) in &report.results {
            let via = result
                .shortest_path
                .as_ref()
                .map(|p| p.join(" -> "))
                .unwrap_or_else(|| "-".to_string());
            println!("  {:<20} {:<8} {}", id, output::risk_label(result.risk), via);
        }

        if summary.high_risk_nodes > 0 {
            output::warn(&format!(
                "{} node(s) at HIGH risk",
                summary.high_risk_nodes
            ));
        } else {
            output::success("No HIGH risk nodes");
        }
    }

    pub fn metrics(args: &MetricsArgs, cli: &Cli) -> Result<()> {
        let session = open_session(cli)?;
        let mut request = MetricsRequest::default();
        if let (Some(from), Some(to)) = (&args.from, &args.to) {
            request = request.with_shortest_path(from.clone(), to.clone());
        }
        if args.components {
            request = request.with_components();
        }
        if args.diameter {
            request = request.with_diameter();
        }

        let metrics = session.engine.metrics(&session.graph_id, &request)?;
        emit(cli.output, metrics, |m| {
            output::header(&format!("Metrics for {}", m.graph_id));
            println!("  Nodes: {}", m.node_count);
            println!("  Edges: {}", m.edge_count);
            if request.endpoints().is_some() {
                match &m.shortest_path {
                    Some(path) => println!("  Shortest path: {}", path.join(" -> ")),
                    None => println!("  Shortest path: none"),
                }
            }
            if let Some(components) = &m.connected_components {
                println!("  Components: {}", components.len());
            }
            if let Some(diameter) = m.diameter {
                println!("  Diameter: {}", diameter);
            }
        });
        Ok(())
    }

    pub fn export(args: ExportArgs, cli: &Cli) -> Result<()> {
        let session = open_session(cli)?;
        let snapshot = session.engine.snapshot(&session.graph_id)?;
        let report = session
            .engine
            .full_risk_analysis(&session.graph_id, Some(args.max_hops))?;

        match args.format {
            ExportFormat::Dot => print!("{}", export_dot(&snapshot, Some(&report))),
            ExportFormat::Json => {
                let export = export_json(&snapshot, Some(&report));
                emit(cli.output, export, |e| {
                    println!("{}", serde_json::to_string_pretty(e).unwrap_or_default());
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
