//! # nodeweave - Workflow Graph Document Engine
//!
//! **nodeweave** is the editing core behind a node-based workflow editor. It owns the
//! per-tab graph documents, applies the incremental change events a canvas emits, keeps
//! a bounded undo/redo history for every document, and compiles a flat node/edge graph
//! into the forest of execution trees an execution backend consumes.
//!
//! ## Core Workflow
//!
//! 1.  **Open a tab**: [`TabManager::open_tab`](tabs::TabManager::open_tab) creates a
//!     [`WorkflowDocument`](document::WorkflowDocument) for a workspace-relative path.
//! 2.  **Edit**: feed canvas change-sets, connections and data updates into the
//!     [`DocumentStore`](document::DocumentStore). Local edits are undoable and mark the
//!     document dirty; remote edits (see [`sync`]) do neither.
//! 3.  **Save**: [`TabManager::begin_save`](tabs::TabManager::begin_save) captures the graph,
//!     a [`WorkflowRepository`](persistence::WorkflowRepository) stores it, and
//!     [`TabManager::complete_save`](tabs::TabManager::complete_save) clears the dirty flag.
//! 4.  **Deploy**: [`ForestCompiler`](forest::ForestCompiler) turns the graph into a forest
//!     of [`WorkflowTreeNode`](forest::WorkflowTreeNode)s, one tree per root node.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nodeweave::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut tabs = TabManager::new().for_workspace("ws-1");
//!     tabs.open_tab("flows/ingest.json", "ingest");
//!
//!     let add = |id: &str, x: f64| NodeChange::Add {
//!         item: Node::new(id, "http", Position::new(x, 0.0)),
//!         index: None,
//!     };
//!     let store = tabs.documents_mut();
//!     store.apply_node_changes("flows/ingest.json", ChangeSet::local(vec![add("fetch", 0.0)]));
//!     store.apply_node_changes("flows/ingest.json", ChangeSet::local(vec![add("store", 200.0)]));
//!     store.connect("flows/ingest.json", &Connection::new("fetch", "store"));
//!     assert!(tabs.is_dirty("flows/ingest.json"));
//!
//!     // Compile the active document for deployment.
//!     if let CommandOutcome::DeployRequested(request) = tabs.execute(EditorCommand::Deploy) {
//!         println!("{}", request.to_batch_json()?);
//!     }
//!
//!     // Undo the connection.
//!     tabs.execute(EditorCommand::Undo);
//!     assert!(tabs.document("flows/ingest.json").is_some_and(|d| d.edges().is_empty()));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod forest;
pub mod graph;
pub mod patch;
pub mod persistence;
pub mod prelude;
pub mod sync;
pub mod tabs;
