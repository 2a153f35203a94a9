use crate::graph::WorkflowGraph;
use std::collections::VecDeque;
use std::sync::Arc;

/// An immutable graph captured for undo/redo. Cloning is a reference-count bump.
pub type Snapshot = Arc<WorkflowGraph>;

/// Linear undo/redo stacks with a bounded past.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Snapshot>,
    future: Vec<Snapshot>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Undo snapshots, oldest first.
    pub fn past(&self) -> impl Iterator<Item = &Snapshot> {
        self.past.iter()
    }

    /// Records `current` as the state to return to, invalidating redo.
    pub(super) fn record(&mut self, current: &Snapshot) {
        self.push_past(Arc::clone(current));
        self.future.clear();
    }

    /// Pops the most recent past state, parking `current` on the redo stack.
    pub(super) fn undo(&mut self, current: &Snapshot) -> Option<Snapshot> {
        let previous = self.past.pop_back()?;
        self.future.push(Arc::clone(current));
        Some(previous)
    }

    /// Pops the most recent future state, parking `current` back on the undo stack.
    pub(super) fn redo(&mut self, current: &Snapshot) -> Option<Snapshot> {
        let next = self.future.pop()?;
        self.push_past(Arc::clone(current));
        Some(next)
    }

    pub(super) fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    fn push_past(&mut self, snapshot: Snapshot) {
        self.past.push_back(snapshot);
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
    }
}
