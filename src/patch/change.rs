use crate::graph::{Edge, Node, Position};
use serde::{Deserialize, Serialize};

/// A declarative change to the node list, as emitted by the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeChange {
    Add {
        item: Node,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
    Remove {
        id: String,
    },
    Replace {
        id: String,
        item: Node,
    },
    Position {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<Position>,
        /// `Some(true)` while the pointer is still down.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dragging: Option<bool>,
    },
    Select {
        id: String,
        selected: bool,
    },
    /// Canvas-only change kinds (e.g. `dimensions`) that carry no document state.
    #[serde(other)]
    Unsupported,
}

impl NodeChange {
    /// Add, remove and replace alter the graph's structure.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            NodeChange::Add { .. } | NodeChange::Remove { .. } | NodeChange::Replace { .. }
        )
    }

    /// A position change whose drag has finished (or was never a drag).
    pub fn is_settled_move(&self) -> bool {
        matches!(
            self,
            NodeChange::Position {
                position: Some(_),
                dragging,
                ..
            } if *dragging != Some(true)
        )
    }
}

/// A declarative change to the edge list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EdgeChange {
    Add {
        item: Edge,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
    Remove {
        id: String,
    },
    Replace {
        id: String,
        item: Edge,
    },
    Select {
        id: String,
        selected: bool,
    },
    #[serde(other)]
    Unsupported,
}

impl EdgeChange {
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            EdgeChange::Add { .. } | EdgeChange::Remove { .. } | EdgeChange::Replace { .. }
        )
    }
}

/// Where a change-set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeOrigin {
    /// Made by the user at this editor; eligible for undo history.
    #[default]
    Local,
    /// Received from a collaborator over the sync channel; never recorded in history.
    Remote,
}

/// A batch of changes tagged with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet<C> {
    pub changes: Vec<C>,
    pub origin: ChangeOrigin,
}

impl<C> ChangeSet<C> {
    pub fn local(changes: Vec<C>) -> Self {
        Self {
            changes,
            origin: ChangeOrigin::Local,
        }
    }

    pub fn remote(changes: Vec<C>) -> Self {
        Self {
            changes,
            origin: ChangeOrigin::Remote,
        }
    }

    pub fn is_remote(&self) -> bool {
        self.origin == ChangeOrigin::Remote
    }
}
