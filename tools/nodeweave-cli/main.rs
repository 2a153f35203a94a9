use clap::Parser;
use nodeweave::forest::flatten_forest;
use nodeweave::prelude::*;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Compiles a saved workflow graph into the execution forest sent on deploy
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workflow graph JSON file (`{ "nodes": [...], "edges": [...] }`)
    graph_path: String,

    /// Optional engine configuration TOML file
    #[arg(short, long)]
    config: Option<String>,

    /// Write the compiled output here instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Wrap the forest in a deployment request batch with this name
    #[arg(long)]
    deployment_name: Option<String>,

    /// Workspace id recorded in the deployment metadata
    #[arg(long)]
    workspace: Option<String>,

    /// Fail if compilation dropped cycle edges or left nodes unreachable
    #[arg(long)]
    strict: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let total_start = Instant::now();

    // --- 1. Configuration ---
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load config '{}': {}", path, e))
        }),
        None => EngineConfig::default(),
    };

    // --- 2. Loading ---
    let load_start = Instant::now();
    let graph_json = fs::read_to_string(&cli.graph_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read graph file '{}': {}",
            &cli.graph_path, e
        ))
    });
    let graph = WorkflowGraph::from_json(&graph_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse graph JSON: {}", e)));

    // Round-trip through a document so the CLI compiles exactly what the editor would.
    let mut store = DocumentStore::with_config(&config);
    store.open(&cli.graph_path, Some(graph));
    let load_duration = load_start.elapsed();

    // --- 3. Compilation ---
    let compile_start = Instant::now();
    let compiled = store
        .export_forest(&cli.graph_path)
        .unwrap_or_else(|| exit_with_error("Document was not opened"));
    let compile_duration = compile_start.elapsed();
    let report = compiled.report;

    if cli.strict && report.is_lossy() {
        exit_with_error(&format!(
            "Lossy compilation: {} cyclic edge(s) dropped, {} edge(s) past the depth limit, {} node(s) unreachable",
            report.dropped_cycle_edges, report.truncated_edges, report.unreachable_nodes
        ));
    }

    // --- 4. Output ---
    let flat_edges = flatten_forest(&compiled.roots).len();
    let serialized = if cli.deployment_name.is_some() || cli.workspace.is_some() {
        let metadata = DeploymentMetadata {
            name: cli.deployment_name.clone(),
            workspace_id: cli.workspace.clone(),
            path: Some(cli.graph_path.clone()),
        };
        let batch = vec![DeploymentRequest::new(compiled.roots, metadata)];
        if cli.pretty {
            serde_json::to_string_pretty(&batch)
        } else {
            serde_json::to_string(&batch)
        }
    } else if cli.pretty {
        compiled.to_json_pretty()
    } else {
        compiled.to_json()
    };
    let output = serialized
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize output: {}", e)));

    match &cli.output {
        Some(path) => fs::write(path, &output).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to write output '{}': {}", path, e))
        }),
        None => println!("{}", output),
    }

    // --- 5. Summary ---
    let total_duration = total_start.elapsed();
    eprintln!("\n--- Compile Summary ---");
    eprintln!("Trees:                {}", report.roots);
    eprintln!("Tree edges:           {}", flat_edges);
    eprintln!("Dangling edges:       {}", report.dangling_edges);
    eprintln!("Dropped cycle edges:  {}", report.dropped_cycle_edges);
    eprintln!("Truncated edges:      {}", report.truncated_edges);
    eprintln!("Unreachable nodes:    {}", report.unreachable_nodes);
    eprintln!("\n--- Performance Summary ---");
    eprintln!("Loading:              {:?}", load_duration);
    eprintln!("Compilation:          {:?}", compile_duration);
    eprintln!("-----------------------------");
    eprintln!("Total Execution:      {:?}", total_duration);
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
