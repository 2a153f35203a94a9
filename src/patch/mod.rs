//! Pure functions applying change-sets to node and edge lists.
//!
//! Nothing in this module mutates its input: every function borrows the current list
//! and returns a freshly built one, so callers can keep the previous list as an undo
//! snapshot.
mod change;

pub use change::*;

use crate::graph::{Connection, Edge, Node};

trait Element: Clone {
    fn id(&self) -> &str;
    fn set_selected(&mut self, selected: bool);
}

impl Element for Node {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

impl Element for Edge {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

fn insert<T: Element>(items: &mut Vec<T>, item: &T, index: Option<usize>) {
    match index {
        Some(i) if i <= items.len() => items.insert(i, item.clone()),
        _ => items.push(item.clone()),
    }
}

fn find_mut<'a, T: Element>(items: &'a mut [T], id: &str) -> Option<&'a mut T> {
    items.iter_mut().find(|item| item.id() == id)
}

fn replace<T: Element>(items: &mut [T], id: &str, item: &T) {
    if let Some(slot) = find_mut(items, id) {
        *slot = item.clone();
    }
}

fn select<T: Element>(items: &mut [T], id: &str, selected: bool) {
    if let Some(item) = find_mut(items, id) {
        item.set_selected(selected);
    }
}

/// Applies node changes in order. Changes naming unknown ids are ignored.
pub fn apply_node_changes(changes: &[NodeChange], nodes: &[Node]) -> Vec<Node> {
    let mut next = nodes.to_vec();
    for change in changes {
        match change {
            NodeChange::Add { item, index } => insert(&mut next, item, *index),
            NodeChange::Remove { id } => next.retain(|n| n.id != *id),
            NodeChange::Replace { id, item } => replace(&mut next, id, item),
            NodeChange::Position { id, position, .. } => {
                if let (Some(node), Some(position)) = (find_mut(&mut next, id), position) {
                    node.position = *position;
                }
            }
            NodeChange::Select { id, selected } => select(&mut next, id, *selected),
            NodeChange::Unsupported => {}
        }
    }
    next
}

/// Applies edge changes in order. Changes naming unknown ids are ignored.
pub fn apply_edge_changes(changes: &[EdgeChange], edges: &[Edge]) -> Vec<Edge> {
    let mut next = edges.to_vec();
    for change in changes {
        match change {
            EdgeChange::Add { item, index } => insert(&mut next, item, *index),
            EdgeChange::Remove { id } => next.retain(|e| e.id != *id),
            EdgeChange::Replace { id, item } => replace(&mut next, id, item),
            EdgeChange::Select { id, selected } => select(&mut next, id, *selected),
            EdgeChange::Unsupported => {}
        }
    }
    next
}

/// Appends an edge for `connection`.
///
/// Port types are not checked for compatibility. If an edge already links exactly these
/// ports, the list is returned unchanged.
pub fn connect(connection: &Connection, edges: &[Edge]) -> Vec<Edge> {
    let mut next = edges.to_vec();
    if !edges.iter().any(|e| e.matches(connection)) {
        next.push(connection.clone().into_edge());
    }
    next
}

/// Removes every edge whose endpoints match `connection`. No match is not an error.
pub fn disconnect(connection: &Connection, edges: &[Edge]) -> Vec<Edge> {
    edges
        .iter()
        .filter(|e| !e.matches(connection))
        .cloned()
        .collect()
}
