use crate::forest::DeploymentRequest;
use crate::graph::WorkflowGraph;

/// Editor commands bound to keyboard shortcuts by the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorCommand {
    Undo,
    Redo,
    Save,
    Deploy,
    NextTab,
    PreviousTab,
}

/// A graph captured for persistence. The caller hands it to a
/// [`WorkflowRepository`](crate::persistence::WorkflowRepository) and reports back through
/// [`TabManager::complete_save`](super::TabManager::complete_save).
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub workspace_id: String,
    pub path: String,
    pub graph: WorkflowGraph,
}

/// What the engine did with a command, and any follow-up work for the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// State changed in memory; nothing else to do.
    Applied,
    /// Nothing to act on (no active tab, empty history, single tab, ...).
    Ignored,
    SaveRequested(SaveRequest),
    DeployRequested(DeploymentRequest),
}
