use super::data::NodeData;
use serde::{Deserialize, Serialize};

/// Node type used when a node does not declare one.
pub const GENERIC_NODE_TYPE: &str = "generic";

fn generic_node_type() -> String {
    GENERIC_NODE_TYPE.to_string()
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A typed automation step placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type", default = "generic_node_type")]
    pub node_type: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
    /// Canvas selection state. Never part of the compiled forest.
    #[serde(default, skip_serializing_if = "is_false")]
    pub selected: bool,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            position,
            data: NodeData::default(),
            selected: false,
        }
    }

    pub fn with_data(mut self, data: NodeData) -> Self {
        self.data = data;
        self
    }

    /// The type exported to the execution backend; blank types fall back to `"generic"`.
    pub fn export_type(&self) -> &str {
        if self.node_type.is_empty() {
            GENERIC_NODE_TYPE
        } else {
            &self.node_type
        }
    }
}
