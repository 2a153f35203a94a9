//! The ordered set of open tabs and the documents behind them.
use crate::config::EngineConfig;
use crate::document::{DocumentStore, WorkflowDocument};
use crate::error::{PersistenceError, TabOrderError};
use crate::forest::{DeploymentMetadata, DeploymentRequest};
use crate::graph::WorkflowGraph;
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info, warn};

mod command;

pub use command::*;

/// An open document, keyed by its workspace-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub path: String,
    pub name: String,
}

/// A tab as presented to the UI, with its dirty flag read from the backing document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSummary {
    pub path: String,
    pub name: String,
    pub is_dirty: bool,
    pub is_active: bool,
}

/// Tab ordering, activation and document lifetime for one workspace session.
#[derive(Debug, Clone, Default)]
pub struct TabManager {
    open_tabs: Vec<Tab>,
    active_tab_path: Option<String>,
    documents: DocumentStore,
    workspace_id: Option<String>,
}

impl TabManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            documents: DocumentStore::with_config(config),
            ..Self::default()
        }
    }

    pub fn for_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self
    }

    // --- Queries ---

    pub fn workspace_id(&self) -> Option<&str> {
        self.workspace_id.as_deref()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.open_tabs
    }

    pub fn tab(&self, path: &str) -> Option<&Tab> {
        self.open_tabs.iter().find(|t| t.path == path)
    }

    pub fn summaries(&self) -> Vec<TabSummary> {
        self.open_tabs
            .iter()
            .map(|tab| TabSummary {
                path: tab.path.clone(),
                name: tab.name.clone(),
                is_dirty: self.documents.is_dirty(&tab.path),
                is_active: self.active_tab_path.as_deref() == Some(tab.path.as_str()),
            })
            .collect()
    }

    pub fn active_tab_path(&self) -> Option<&str> {
        self.active_tab_path.as_deref()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_path.as_deref().and_then(|p| self.tab(p))
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// Mutable access for editing operations. Opening and closing documents should go
    /// through the tab operations so tabs and documents stay paired.
    pub fn documents_mut(&mut self) -> &mut DocumentStore {
        &mut self.documents
    }

    pub fn document(&self, path: &str) -> Option<&WorkflowDocument> {
        self.documents.get(path)
    }

    pub fn is_dirty(&self, path: &str) -> bool {
        self.documents.is_dirty(path)
    }

    /// Whether closing the session would lose edits.
    pub fn has_unsaved_changes(&self) -> bool {
        self.open_tabs.iter().any(|t| self.documents.is_dirty(&t.path))
    }

    // --- Tab lifecycle ---

    /// Opens (or re-focuses) a tab with an empty document.
    pub fn open_tab(&mut self, path: &str, name: &str) {
        self.open_tab_inner(path, name, None);
    }

    /// Opens (or re-focuses) a tab seeded with a saved graph. An already open tab keeps
    /// its current document.
    pub fn open_tab_with(&mut self, path: &str, name: &str, graph: WorkflowGraph) {
        self.open_tab_inner(path, name, Some(graph));
    }

    fn open_tab_inner(&mut self, path: &str, name: &str, graph: Option<WorkflowGraph>) {
        if self.tab(path).is_none() {
            self.open_tabs.push(Tab {
                path: path.to_string(),
                name: name.to_string(),
            });
            self.documents.open(path, graph);
            info!(path = %path, tabs = self.open_tabs.len(), "opened tab");
        }
        self.active_tab_path = Some(path.to_string());
    }

    /// Closes a tab and destroys its document. If it was active, the last remaining tab
    /// becomes active. Dirty-state confirmation is the caller's responsibility.
    pub fn close_tab(&mut self, path: &str) -> Option<WorkflowDocument> {
        let index = self.open_tabs.iter().position(|t| t.path == path)?;
        self.open_tabs.remove(index);
        let document = self.documents.close(path);

        if self.active_tab_path.as_deref() == Some(path) {
            self.active_tab_path = self.open_tabs.last().map(|t| t.path.clone());
        }
        info!(
            path = %path,
            active = ?self.active_tab_path,
            "closed tab"
        );
        document
    }

    pub fn close_all_tabs(&mut self) {
        self.open_tabs.clear();
        self.active_tab_path = None;
        self.documents.close_all();
        debug!("closed all tabs");
    }

    /// Drops every tab and document and binds the session to another workspace.
    pub fn switch_workspace(&mut self, workspace_id: impl Into<String>) {
        self.close_all_tabs();
        let workspace_id = workspace_id.into();
        info!(workspace_id = %workspace_id, "switched workspace");
        self.workspace_id = Some(workspace_id);
    }

    /// Replaces the tab order. `new_order` must be a permutation of the open paths.
    pub fn reorder_tabs<S: AsRef<str>>(&mut self, new_order: &[S]) -> Result<(), TabOrderError> {
        let order: Vec<&str> = new_order.iter().map(|p| p.as_ref()).collect();

        if let Some(dup) = order.iter().duplicates().next() {
            return Err(TabOrderError::DuplicateTab(dup.to_string()));
        }
        if let Some(unknown) = order.iter().find(|p| self.tab(p).is_none()) {
            return Err(TabOrderError::UnknownTab(unknown.to_string()));
        }
        if let Some(missing) = self
            .open_tabs
            .iter()
            .find(|t| !order.contains(&t.path.as_str()))
        {
            return Err(TabOrderError::MissingTab(missing.path.clone()));
        }

        let reordered = order.iter().filter_map(|p| self.tab(p).cloned()).collect();
        self.open_tabs = reordered;
        Ok(())
    }

    /// Moves the active tab by `delta` positions, wrapping around. No-op with one tab or none.
    ///
    /// Without an active tab, a positive delta selects the first tab and a negative one the last.
    pub fn switch_tab_relative(&mut self, delta: isize) {
        let len = self.open_tabs.len();
        if len <= 1 || delta == 0 {
            return;
        }
        let current = self
            .active_tab_path
            .as_deref()
            .and_then(|p| self.open_tabs.iter().position(|t| t.path == p));

        let next = match current {
            Some(index) => (index + delta.rem_euclid(len as isize) as usize) % len,
            None if delta > 0 => 0,
            None => len - 1,
        };
        self.active_tab_path = Some(self.open_tabs[next].path.clone());
    }

    // --- Persistence protocol ---

    /// Captures the graph of `path` for saving. `None` without a workspace or for an unknown path.
    pub fn begin_save(&self, path: &str) -> Option<SaveRequest> {
        let Some(workspace_id) = self.workspace_id.clone() else {
            debug!(path = %path, "save requested without an active workspace");
            return None;
        };
        let document = self.documents.get(path)?;
        Some(SaveRequest {
            workspace_id,
            path: path.to_string(),
            graph: document.graph().clone(),
        })
    }

    /// Reports the result of a save. Only success clears the dirty flag.
    pub fn complete_save(&mut self, path: &str, result: &Result<(), PersistenceError>) {
        match result {
            Ok(()) => self.documents.mark_dirty(path, false),
            Err(e) => warn!(path = %path, error = %e, "save failed; document stays dirty"),
        }
    }

    /// Installs a graph returned by a load.
    pub fn complete_load(&mut self, path: &str, graph: WorkflowGraph) {
        self.documents.replace_graph(path, graph);
    }

    // --- Commands ---

    /// Runs a keyboard command against the active tab.
    pub fn execute(&mut self, command: EditorCommand) -> CommandOutcome {
        match command {
            EditorCommand::NextTab | EditorCommand::PreviousTab => {
                let before = self.active_tab_path.clone();
                let delta = if command == EditorCommand::NextTab { 1 } else { -1 };
                self.switch_tab_relative(delta);
                if before == self.active_tab_path {
                    CommandOutcome::Ignored
                } else {
                    CommandOutcome::Applied
                }
            }
            _ => {
                let Some(path) = self.active_tab_path.clone() else {
                    return CommandOutcome::Ignored;
                };
                self.execute_on(&path, command)
            }
        }
    }

    fn execute_on(&mut self, path: &str, command: EditorCommand) -> CommandOutcome {
        let applied = |ok: bool| {
            if ok {
                CommandOutcome::Applied
            } else {
                CommandOutcome::Ignored
            }
        };
        match command {
            EditorCommand::Undo => applied(self.documents.undo(path)),
            EditorCommand::Redo => applied(self.documents.redo(path)),
            EditorCommand::Save => self
                .begin_save(path)
                .map_or(CommandOutcome::Ignored, CommandOutcome::SaveRequested),
            EditorCommand::Deploy => {
                let Some(compiled) = self.documents.export_forest(path) else {
                    return CommandOutcome::Ignored;
                };
                let metadata = DeploymentMetadata {
                    name: self.tab(path).map(|t| t.name.clone()),
                    workspace_id: self.workspace_id.clone(),
                    path: Some(path.to_string()),
                };
                CommandOutcome::DeployRequested(DeploymentRequest::new(compiled.roots, metadata))
            }
            EditorCommand::NextTab | EditorCommand::PreviousTab => CommandOutcome::Ignored,
        }
    }
}
