use clap::Parser;
use nodeweave::graph::{Connection, Edge, Node, NodeData, Position, WorkflowGraph};
use rand::Rng;
use rand::rngs::ThreadRng;
use serde_json::json;
use std::fs;

const NODE_TYPES: [&str; 5] = ["http", "transform", "condition", "llm", "notify"];
const SOURCE_HANDLES: [&str; 3] = ["default", "success", "error"];

/// A CLI tool to generate random workflow graphs for the nodeweave compiler
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_graph.json")]
    output: String,

    /// Number of nodes to generate
    #[arg(short, long, default_value_t = 50)]
    nodes: usize,

    /// Probability that a node gets linked to an earlier node
    #[arg(long, default_value_t = 0.3)]
    density: f64,

    /// Number of back edges to add, each of which closes a cycle
    #[arg(long, default_value_t = 0)]
    cycles: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if !(0.0..=1.0).contains(&cli.density) {
        eprintln!("Error: --density ({}) must be between 0 and 1", cli.density);
        std::process::exit(1);
    }
    if cli.cycles > 0 && cli.nodes < 2 {
        eprintln!("Error: --cycles needs at least two nodes");
        std::process::exit(1);
    }

    println!(
        "Generating workflow graph ({} nodes, density {}, {} cycle(s))...",
        cli.nodes, cli.density, cli.cycles
    );

    let nodes = generate_nodes(&mut rng, cli.nodes);
    let mut edges = generate_forward_edges(&mut rng, cli.nodes, cli.density);
    println!("-> Generated {} forward edge(s).", edges.len());

    // Edges from a later node back to an earlier one; the compiler must cut these.
    for _ in 0..cli.cycles {
        let from = rng.random_range(1..cli.nodes);
        let to = rng.random_range(0..from);
        edges.push(random_edge(&mut rng, from, to));
    }
    if cli.cycles > 0 {
        println!("-> Added {} back edge(s).", cli.cycles);
    }

    let graph = WorkflowGraph::new(nodes, edges);
    let json_output = serde_json::to_string_pretty(&graph)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated and saved workflow graph to '{}'",
        cli.output
    );

    Ok(())
}

fn node_id(index: usize) -> String {
    format!("node-{:04}", index)
}

fn generate_nodes(rng: &mut ThreadRng, count: usize) -> Vec<Node> {
    (0..count)
        .map(|i| {
            let node_type = NODE_TYPES[rng.random_range(0..NODE_TYPES.len())];
            let position = Position::new((i % 10) as f64 * 220.0, (i / 10) as f64 * 140.0);
            let mut data = NodeData::default();
            data.values.insert("label".to_string(), json!(format!("{} {}", node_type, i)));
            data.values
                .insert("timeout".to_string(), json!(rng.random_range(1..=60)));
            Node::new(node_id(i), node_type, position).with_data(data)
        })
        .collect()
}

/// Edges only point from lower to higher indices, so the result is acyclic.
fn generate_forward_edges(rng: &mut ThreadRng, count: usize, density: f64) -> Vec<Edge> {
    let mut edges = Vec::new();
    for target in 1..count {
        if rng.random_bool(density) {
            let source = rng.random_range(0..target);
            edges.push(random_edge(rng, source, target));
        }
    }
    edges
}

fn random_edge(rng: &mut ThreadRng, source: usize, target: usize) -> Edge {
    let handle = SOURCE_HANDLES[rng.random_range(0..SOURCE_HANDLES.len())];
    let mut connection = Connection::new(node_id(source), node_id(target));
    connection.source_handle = Some(handle.to_string());
    connection.into_edge()
}
