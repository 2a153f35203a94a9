use super::node::is_false;
use serde::{Deserialize, Serialize};

/// Output port used when an edge does not name its source handle.
pub const DEFAULT_SOURCE_HANDLE: &str = "default";

/// Input port used when an edge does not name its target handle.
/// Edges into this port trigger the target rather than feeding a parameter.
pub const ACTIVATION_HANDLE: &str = "activation";

/// A directed connection from an output port of one node to an input port of another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub selected: bool,
}

impl Edge {
    /// The output port this edge leaves from, resolving the `"default"` sentinel.
    pub fn source_port(&self) -> &str {
        resolve_handle(self.source_handle.as_deref(), DEFAULT_SOURCE_HANDLE)
    }

    /// The input port this edge arrives at, resolving the `"activation"` sentinel.
    pub fn target_port(&self) -> &str {
        resolve_handle(self.target_handle.as_deref(), ACTIVATION_HANDLE)
    }

    pub fn is_activation(&self) -> bool {
        self.target_port() == ACTIVATION_HANDLE
    }

    /// Whether this edge links the same ports as `connection`.
    pub fn matches(&self, connection: &Connection) -> bool {
        self.source == connection.source
            && self.target == connection.target
            && self.source_port() == connection.source_port()
            && self.target_port() == connection.target_port()
    }
}

/// A request to link two ports, as emitted by the canvas when the user drags a wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    pub target: String,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_handle: None,
            target: target.into(),
            target_handle: None,
        }
    }

    pub fn with_handles(
        source: impl Into<String>,
        source_handle: impl Into<String>,
        target: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            source_handle: Some(source_handle.into()),
            target: target.into(),
            target_handle: Some(target_handle.into()),
        }
    }

    pub fn source_port(&self) -> &str {
        resolve_handle(self.source_handle.as_deref(), DEFAULT_SOURCE_HANDLE)
    }

    pub fn target_port(&self) -> &str {
        resolve_handle(self.target_handle.as_deref(), ACTIVATION_HANDLE)
    }

    /// Deterministic edge id for this connection.
    pub fn edge_id(&self) -> String {
        format!(
            "edge__{}{}-{}{}",
            self.source,
            self.source_handle.as_deref().unwrap_or_default(),
            self.target,
            self.target_handle.as_deref().unwrap_or_default()
        )
    }

    /// Materializes the connection as a new edge.
    pub fn into_edge(self) -> Edge {
        Edge {
            id: self.edge_id(),
            source: self.source,
            source_handle: self.source_handle,
            target: self.target,
            target_handle: self.target_handle,
            selected: false,
        }
    }
}

fn resolve_handle<'a>(handle: Option<&'a str>, sentinel: &'static str) -> &'a str {
    match handle {
        Some(h) if !h.is_empty() => h,
        _ => sentinel,
    }
}
