//! Prelude module for convenient imports
//!
//! Re-exports the types needed to open documents, edit them and compile them for
//! deployment.
//!
//! # Example
//!
//! ```rust,no_run
//! use nodeweave::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/workflow.json")?;
//! let graph = WorkflowGraph::from_json(&json)?;
//!
//! let compiled = ForestCompiler::new(&graph.nodes, &graph.edges).compile();
//! println!("{} trees, report: {:?}", compiled.roots.len(), compiled.report);
//! # Ok(())
//! # }
//! ```

// Graph model
pub use crate::graph::{Connection, Edge, Node, NodeData, NodeSchema, Position, WorkflowGraph};

// Change application
pub use crate::patch::{ChangeOrigin, ChangeSet, EdgeChange, NodeChange};

// Documents and tabs
pub use crate::document::{DocumentStore, RemoteCursor, WorkflowDocument};
pub use crate::tabs::{CommandOutcome, EditorCommand, SaveRequest, TabManager};

// Compilation
pub use crate::forest::{
    CompiledForest, DeploymentMetadata, DeploymentRequest, ForestCompiler, WorkflowTreeNode,
    compile_forest,
};

// Boundaries
pub use crate::config::EngineConfig;
pub use crate::persistence::{JsonFileRepository, WorkflowRepository};
pub use crate::sync::{RemoteSyncAdapter, SyncEndpoint, SyncMessage};

// Error types
pub use crate::error::{
    ConfigError, NodeDataError, PersistenceError, SyncError, TabOrderError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
