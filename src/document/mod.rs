//! Per-tab workflow documents and the store that owns them.
//!
//! A [`WorkflowDocument`] is a value: every transition consumes the document and
//! returns the next one, so a caller can never observe a half-applied change. The
//! graph itself is held behind an `Arc`, which makes recording an undo snapshot a
//! reference-count bump rather than a deep copy.
mod cursor;
mod history;
mod store;

pub use cursor::RemoteCursor;
pub use history::{History, Snapshot};
pub use store::DocumentStore;

use crate::config::DEFAULT_HISTORY_LIMIT;
use crate::error::NodeDataError;
use crate::forest::{CompiledForest, ForestCompiler};
use crate::graph::{Connection, Edge, Node, NodeData, WorkflowGraph};
use crate::patch::{self, ChangeOrigin, ChangeSet, EdgeChange, NodeChange};
use ahash::AHashMap;
use serde_json::{Map, Value};
use std::sync::Arc;

/// The editable state behind one tab.
#[derive(Debug, Clone)]
pub struct WorkflowDocument {
    graph: Snapshot,
    history: History,
    cursors: AHashMap<String, RemoteCursor>,
    is_dirty: bool,
}

impl Default for WorkflowDocument {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl WorkflowDocument {
    pub fn new(history_limit: usize) -> Self {
        Self::from_graph(WorkflowGraph::default(), history_limit)
    }

    pub fn from_graph(graph: WorkflowGraph, history_limit: usize) -> Self {
        Self {
            graph: Arc::new(graph),
            history: History::new(history_limit),
            cursors: AHashMap::new(),
            is_dirty: false,
        }
    }

    // --- Accessors ---

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    /// The current graph as a shareable snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.graph)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.graph.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.graph.edges
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn cursors(&self) -> &AHashMap<String, RemoteCursor> {
        &self.cursors
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Compiles the current graph. Has no effect on history or dirty state.
    pub fn export_forest(&self) -> CompiledForest {
        ForestCompiler::new(&self.graph.nodes, &self.graph.edges).compile()
    }

    /// Shallow-merges `partial` into a node's data without applying it.
    ///
    /// Returns `Ok(None)` when the node does not exist.
    pub fn merged_node_data(
        &self,
        node_id: &str,
        partial: &Map<String, Value>,
    ) -> Result<Option<NodeData>, NodeDataError> {
        self.graph
            .node(node_id)
            .map(|node| node.data.merged(node_id, partial))
            .transpose()
    }

    // --- Transitions ---

    /// Pushes the current graph onto the undo stack and invalidates redo.
    pub fn record_snapshot(mut self) -> Self {
        self.history.record(&self.graph);
        self
    }

    pub fn apply_node_changes(self, changes: &ChangeSet<NodeChange>) -> Self {
        if changes.changes.is_empty() {
            return self;
        }
        let local = !changes.is_remote();
        let structural = changes.changes.iter().any(NodeChange::is_structural);
        let settled = changes.changes.iter().any(NodeChange::is_settled_move);

        let nodes = patch::apply_node_changes(&changes.changes, &self.graph.nodes);
        // Changes naming only unknown ids leave the list untouched.
        if nodes == self.graph.nodes {
            return self;
        }
        let mut doc = if local && structural {
            self.record_snapshot()
        } else {
            self
        };
        let edges = doc.graph.edges.clone();
        doc = doc.commit(WorkflowGraph::new(nodes, edges));
        if local && (structural || settled) {
            doc.is_dirty = true;
        }
        doc
    }

    pub fn apply_edge_changes(self, changes: &ChangeSet<EdgeChange>) -> Self {
        if changes.changes.is_empty() {
            return self;
        }
        let local = !changes.is_remote();
        let structural = changes.changes.iter().any(EdgeChange::is_structural);

        let edges = patch::apply_edge_changes(&changes.changes, &self.graph.edges);
        if edges == self.graph.edges {
            return self;
        }
        let mut doc = if local && structural {
            self.record_snapshot()
        } else {
            self
        };
        let nodes = doc.graph.nodes.clone();
        doc = doc.commit(WorkflowGraph::new(nodes, edges));
        if local && structural {
            doc.is_dirty = true;
        }
        doc
    }

    /// Records history, then links two ports. An already existing link is a no-op.
    pub fn connect(self, connection: &Connection) -> Self {
        if self.graph.edges.iter().any(|e| e.matches(connection)) {
            return self;
        }
        let mut doc = self.record_snapshot();
        let edges = patch::connect(connection, &doc.graph.edges);
        let nodes = doc.graph.nodes.clone();
        doc = doc.commit(WorkflowGraph::new(nodes, edges));
        doc.is_dirty = true;
        doc
    }

    /// Removes the edges matching `connection`. Records history only if something was removed.
    pub fn disconnect(self, connection: &Connection) -> Self {
        if !self.graph.edges.iter().any(|e| e.matches(connection)) {
            return self;
        }
        let mut doc = self.record_snapshot();
        let edges = patch::disconnect(connection, &doc.graph.edges);
        let nodes = doc.graph.nodes.clone();
        doc = doc.commit(WorkflowGraph::new(nodes, edges));
        doc.is_dirty = true;
        doc
    }

    /// Records history, then appends `node`.
    pub fn add_node(self, node: Node) -> Self {
        let mut doc = self.record_snapshot();
        let mut nodes = doc.graph.nodes.clone();
        nodes.push(node);
        let edges = doc.graph.edges.clone();
        doc = doc.commit(WorkflowGraph::new(nodes, edges));
        doc.is_dirty = true;
        doc
    }

    /// Replaces a node's data. Local writes are undoable and dirty the document;
    /// remote writes do neither.
    pub fn with_node_data(self, node_id: &str, data: NodeData, origin: ChangeOrigin) -> Self {
        if self.graph.node(node_id).is_none() {
            return self;
        }
        let local = origin == ChangeOrigin::Local;
        let mut doc = if local { self.record_snapshot() } else { self };
        let nodes = doc
            .graph
            .nodes
            .iter()
            .map(|n| {
                if n.id == node_id {
                    Node {
                        data: data.clone(),
                        ..n.clone()
                    }
                } else {
                    n.clone()
                }
            })
            .collect();
        let edges = doc.graph.edges.clone();
        doc = doc.commit(WorkflowGraph::new(nodes, edges));
        if local {
            doc.is_dirty = true;
        }
        doc
    }

    pub fn undo(mut self) -> Self {
        if let Some(previous) = self.history.undo(&self.graph) {
            self.graph = previous;
            self.is_dirty = true;
        }
        self
    }

    pub fn redo(mut self) -> Self {
        if let Some(next) = self.history.redo(&self.graph) {
            self.graph = next;
            self.is_dirty = true;
        }
        self
    }

    pub fn mark_dirty(mut self, is_dirty: bool) -> Self {
        self.is_dirty = is_dirty;
        self
    }

    /// Empties the graph and both history stacks.
    pub fn clear(self) -> Self {
        self.replace_graph(WorkflowGraph::default())
    }

    /// Swaps in a freshly loaded graph. History is reset and the document is clean.
    pub fn replace_graph(mut self, graph: WorkflowGraph) -> Self {
        self.graph = Arc::new(graph);
        self.history.clear();
        self.is_dirty = false;
        self
    }

    pub fn with_cursor(mut self, cursor: RemoteCursor) -> Self {
        self.cursors.insert(cursor.user_id.clone(), cursor);
        self
    }

    pub fn without_cursor(mut self, user_id: &str) -> Self {
        self.cursors.remove(user_id);
        self
    }

    fn commit(mut self, graph: WorkflowGraph) -> Self {
        self.graph = Arc::new(graph);
        self
    }
}
