use crate::graph::NodeData;
use ahash::AHashSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One node of a compiled execution tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTreeNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub data: NodeData,
    /// Children grouped by the outgoing source handle used to reach them.
    #[serde(default)]
    pub connections: IndexMap<String, Vec<TreeConnection>>,
}

/// A child reached through one output port, tagged with the input port it arrives at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeConnection {
    pub target_handle: String,
    pub target_node: Box<WorkflowTreeNode>,
}

impl WorkflowTreeNode {
    /// Children reached through `source_handle`, in edge creation order.
    pub fn children(&self, source_handle: &str) -> impl Iterator<Item = &WorkflowTreeNode> {
        self.connections
            .get(source_handle)
            .into_iter()
            .flatten()
            .map(|c| c.target_node.as_ref())
    }

    fn child_nodes(&self) -> impl Iterator<Item = &WorkflowTreeNode> {
        self.connections
            .values()
            .flatten()
            .map(|c| c.target_node.as_ref())
    }

    /// Every node of this subtree, itself included, in depth-first pre-order.
    pub fn descendants(&self) -> impl Iterator<Item = &WorkflowTreeNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            let len = stack.len();
            stack.extend(node.child_nodes());
            stack[len..].reverse();
            Some(node)
        })
    }

    /// Number of tree nodes in this subtree, counting repeats.
    pub fn size(&self) -> usize {
        self.descendants().count()
    }

    /// Whether any strict descendant carries `id`.
    pub fn has_descendant(&self, id: &str) -> bool {
        self.descendants().skip(1).any(|n| n.id == id)
    }

    /// Whether some node in this subtree appears as its own descendant.
    pub fn contains_cycle(&self) -> bool {
        self.descendants().any(|n| n.has_descendant(&n.id))
    }
}

/// An edge recovered from a compiled forest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlatEdge {
    pub source: String,
    pub source_handle: String,
    pub target: String,
    pub target_handle: String,
}

/// Flattens a forest back into its edge list.
///
/// A node reachable from several roots is expanded once, so shared subtrees do not
/// duplicate their edges. Within one port, edge order is preserved.
pub fn flatten_forest(roots: &[WorkflowTreeNode]) -> Vec<FlatEdge> {
    let mut expanded = AHashSet::new();
    let mut edges = Vec::new();
    for root in roots {
        for node in root.descendants() {
            if !expanded.insert(node.id.as_str()) {
                continue;
            }
            for (handle, children) in &node.connections {
                edges.extend(children.iter().map(|child| FlatEdge {
                    source: node.id.clone(),
                    source_handle: handle.clone(),
                    target: child.target_node.id.clone(),
                    target_handle: child.target_handle.clone(),
                }));
            }
        }
    }
    edges
}
