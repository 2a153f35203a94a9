//! Common test utilities for building workflow graphs and change-sets.
use nodeweave::graph::ParameterSchema;
use nodeweave::prelude::*;
use serde_json::{Map, Value, json};

/// A node of type `"task"` at the origin.
#[allow(dead_code)]
pub fn node(id: &str) -> Node {
    Node::new(id, "task", Position::default())
}

/// An edge between the default output port and the activation input port.
#[allow(dead_code)]
pub fn edge(source: &str, target: &str) -> Edge {
    Connection::new(source, target).into_edge()
}

/// An edge between named ports.
#[allow(dead_code)]
pub fn edge_with(source: &str, source_handle: &str, target: &str, target_handle: &str) -> Edge {
    Connection::with_handles(source, source_handle, target, target_handle).into_edge()
}

#[allow(dead_code)]
pub fn graph(nodes: Vec<Node>, edges: Vec<Edge>) -> WorkflowGraph {
    WorkflowGraph::new(nodes, edges)
}

/// `a -> b -> c`
#[allow(dead_code)]
pub fn create_chain_graph() -> WorkflowGraph {
    graph(
        vec![node("a"), node("b"), node("c")],
        vec![edge("a", "b"), edge("b", "c")],
    )
}

#[allow(dead_code)]
pub fn add_change(id: &str) -> NodeChange {
    NodeChange::Add {
        item: node(id),
        index: None,
    }
}

#[allow(dead_code)]
pub fn local_add(id: &str) -> ChangeSet<NodeChange> {
    ChangeSet::local(vec![add_change(id)])
}

#[allow(dead_code)]
pub fn remote_add(id: &str) -> ChangeSet<NodeChange> {
    ChangeSet::remote(vec![add_change(id)])
}

/// Builds a JSON object from a `json!` literal.
#[allow(dead_code)]
pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// An HTTP request node with a typed schema:
/// `url` (string, linkable), `method` (enum GET/POST), `retries` (number).
#[allow(dead_code)]
pub fn create_http_node(id: &str) -> Node {
    let parameter = |id: &str, type_name: &str, can_connect: bool| ParameterSchema {
        id: id.to_string(),
        label: id.to_string(),
        type_name: type_name.to_string(),
        value: Value::Null,
        can_connect,
        values: None,
    };
    let schema = NodeSchema {
        label: "HTTP Request".to_string(),
        category: "network".to_string(),
        description: None,
        parameters: vec![
            parameter("url", "string", true),
            ParameterSchema {
                values: Some(vec!["GET".to_string(), "POST".to_string()]),
                ..parameter("method", "enum", false)
            },
            parameter("retries", "number", false),
        ],
        outputs: vec![],
    };
    let mut data = NodeData::with_schema(schema);
    data.values.insert("method".to_string(), json!("GET"));
    Node::new(id, "http", Position::new(0.0, 0.0)).with_data(data)
}
