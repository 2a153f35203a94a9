//! Async storage boundary for workflow graphs.
use crate::error::PersistenceError;
use crate::graph::WorkflowGraph;
use ahash::AHashMap;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Stores and retrieves graphs by `(workspace_id, path)`.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    async fn save(
        &self,
        workspace_id: &str,
        path: &str,
        graph: &WorkflowGraph,
    ) -> Result<(), PersistenceError>;

    async fn load(&self, workspace_id: &str, path: &str) -> Result<WorkflowGraph, PersistenceError>;
}

/// Process-local repository, mainly for tests and the CLI's dry runs.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    graphs: tokio::sync::RwLock<AHashMap<(String, String), WorkflowGraph>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowRepository for MemoryRepository {
    async fn save(
        &self,
        workspace_id: &str,
        path: &str,
        graph: &WorkflowGraph,
    ) -> Result<(), PersistenceError> {
        self.graphs
            .write()
            .await
            .insert((workspace_id.to_string(), path.to_string()), graph.clone());
        Ok(())
    }

    async fn load(&self, workspace_id: &str, path: &str) -> Result<WorkflowGraph, PersistenceError> {
        self.graphs
            .read()
            .await
            .get(&(workspace_id.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound {
                workspace_id: workspace_id.to_string(),
                path: path.to_string(),
            })
    }
}

/// Stores each graph as pretty JSON at `<root>/<workspace_id>/<path>`.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    root: PathBuf,
}

impl JsonFileRepository {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a document location. Both segments must be relative and free of `..`.
    pub fn resolve(&self, workspace_id: &str, path: &str) -> Result<PathBuf, PersistenceError> {
        let workspace = checked_relative(workspace_id)?;
        let file = checked_relative(path)?;
        Ok(self.root.join(workspace).join(file))
    }
}

fn checked_relative(segment: &str) -> Result<&Path, PersistenceError> {
    let candidate = Path::new(segment);
    let valid = !segment.is_empty()
        && candidate
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if valid {
        Ok(candidate)
    } else {
        Err(PersistenceError::InvalidPath(segment.to_string()))
    }
}

#[async_trait]
impl WorkflowRepository for JsonFileRepository {
    async fn save(
        &self,
        workspace_id: &str,
        path: &str,
        graph: &WorkflowGraph,
    ) -> Result<(), PersistenceError> {
        let target = self.resolve(workspace_id, path)?;
        let io_error = |source| PersistenceError::Io {
            path: path.to_string(),
            source,
        };

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        let json = serde_json::to_vec_pretty(graph).map_err(|source| {
            PersistenceError::Serialization {
                path: path.to_string(),
                source,
            }
        })?;
        tokio::fs::write(&target, json).await.map_err(io_error)?;
        debug!(workspace_id = %workspace_id, path = %path, "saved workflow");
        Ok(())
    }

    async fn load(&self, workspace_id: &str, path: &str) -> Result<WorkflowGraph, PersistenceError> {
        let target = self.resolve(workspace_id, path)?;
        let bytes = match tokio::fs::read(&target).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistenceError::NotFound {
                    workspace_id: workspace_id.to_string(),
                    path: path.to_string(),
                });
            }
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: path.to_string(),
                    source,
                });
            }
        };
        serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Serialization {
            path: path.to_string(),
            source,
        })
    }
}
