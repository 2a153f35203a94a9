use super::{RemoteCursor, WorkflowDocument};
use crate::config::{DEFAULT_HISTORY_LIMIT, EngineConfig};
use crate::error::NodeDataError;
use crate::forest::CompiledForest;
use crate::graph::{Connection, Node, WorkflowGraph};
use crate::patch::{ChangeOrigin, ChangeSet, EdgeChange, NodeChange};
use ahash::AHashMap;
use serde_json::{Map, Value};
use tracing::debug;

/// Owns one [`WorkflowDocument`] per open tab path.
///
/// Every operation is keyed by path. Operations on a path that was never opened (or has
/// been closed) are silent no-ops; callers are expected to [`open`](Self::open) first.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    documents: AHashMap<String, WorkflowDocument>,
    history_limit: usize,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            documents: AHashMap::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            documents: AHashMap::new(),
            history_limit: config.history_limit,
        }
    }

    // --- Lifecycle ---

    /// Creates the document for `path` if absent. Returns `true` if it was created.
    pub fn open(&mut self, path: &str, initial: Option<WorkflowGraph>) -> bool {
        if self.documents.contains_key(path) {
            debug!(path = %path, "document already open");
            return false;
        }
        let document = WorkflowDocument::from_graph(initial.unwrap_or_default(), self.history_limit);
        self.documents.insert(path.to_string(), document);
        true
    }

    pub fn close(&mut self, path: &str) -> Option<WorkflowDocument> {
        self.documents.remove(path)
    }

    pub fn close_all(&mut self) {
        self.documents.clear();
    }

    // --- Queries ---

    pub fn get(&self, path: &str) -> Option<&WorkflowDocument> {
        self.documents.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.documents.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// `false` for unknown paths.
    pub fn is_dirty(&self, path: &str) -> bool {
        self.documents.get(path).is_some_and(WorkflowDocument::is_dirty)
    }

    /// Compiles the document's graph for deployment. Pure.
    pub fn export_forest(&self, path: &str) -> Option<CompiledForest> {
        self.documents.get(path).map(WorkflowDocument::export_forest)
    }

    // --- Mutations ---

    pub fn apply_node_changes(&mut self, path: &str, changes: ChangeSet<NodeChange>) {
        self.update(path, |doc| doc.apply_node_changes(&changes));
    }

    pub fn apply_edge_changes(&mut self, path: &str, changes: ChangeSet<EdgeChange>) {
        self.update(path, |doc| doc.apply_edge_changes(&changes));
    }

    /// Snapshot the current graph before a free-form edit such as a drag.
    pub fn record_snapshot(&mut self, path: &str) {
        self.update(path, WorkflowDocument::record_snapshot);
    }

    pub fn connect(&mut self, path: &str, connection: &Connection) {
        self.update(path, |doc| doc.connect(connection));
    }

    pub fn disconnect(&mut self, path: &str, connection: &Connection) {
        self.update(path, |doc| doc.disconnect(connection));
    }

    pub fn add_node(&mut self, path: &str, node: Node) {
        self.update(path, |doc| doc.add_node(node));
    }

    /// Shallow-merges `partial` into a node's data.
    ///
    /// The merged data is checked against the node's schema first; on error the document
    /// is left untouched. Unknown paths and node ids are no-ops.
    pub fn update_node_data(
        &mut self,
        path: &str,
        node_id: &str,
        partial: &Map<String, Value>,
        origin: ChangeOrigin,
    ) -> Result<(), NodeDataError> {
        let Some(document) = self.documents.get(path) else {
            debug!(path = %path, "ignoring data update for unopened document");
            return Ok(());
        };
        let Some(data) = document.merged_node_data(node_id, partial)? else {
            debug!(path = %path, node_id = %node_id, "ignoring data update for unknown node");
            return Ok(());
        };
        self.update(path, |doc| doc.with_node_data(node_id, data, origin));
        Ok(())
    }

    /// Returns `true` if a snapshot was restored.
    pub fn undo(&mut self, path: &str) -> bool {
        let applied = self.get(path).is_some_and(|d| d.history().can_undo());
        self.update(path, WorkflowDocument::undo);
        applied
    }

    /// Returns `true` if a snapshot was restored.
    pub fn redo(&mut self, path: &str) -> bool {
        let applied = self.get(path).is_some_and(|d| d.history().can_redo());
        self.update(path, WorkflowDocument::redo);
        applied
    }

    pub fn mark_dirty(&mut self, path: &str, is_dirty: bool) {
        self.update(path, |doc| doc.mark_dirty(is_dirty));
    }

    pub fn clear(&mut self, path: &str) {
        self.update(path, WorkflowDocument::clear);
    }

    /// Installs a graph loaded from persistence, resetting history and the dirty flag.
    pub fn replace_graph(&mut self, path: &str, graph: WorkflowGraph) {
        self.update(path, |doc| doc.replace_graph(graph));
    }

    pub fn update_remote_cursor(&mut self, path: &str, cursor: RemoteCursor) {
        self.update(path, |doc| doc.with_cursor(cursor));
    }

    pub fn remove_remote_cursor(&mut self, path: &str, user_id: &str) {
        self.update(path, |doc| doc.without_cursor(user_id));
    }

    /// Runs a document transition in place. Unknown paths are ignored.
    fn update<F>(&mut self, path: &str, f: F)
    where
        F: FnOnce(WorkflowDocument) -> WorkflowDocument,
    {
        match self.documents.get_mut(path) {
            Some(slot) => {
                let document = std::mem::take(slot);
                *slot = f(document);
            }
            None => debug!(path = %path, "ignoring operation on unopened document"),
        }
    }
}
