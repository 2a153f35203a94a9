use crate::graph::{Edge, Node};
use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;

/// Ports reached from one source handle, in edge insertion order: `(target_id, target_handle)`.
pub(super) type PortTargets<'a> = Vec<(&'a str, &'a str)>;

/// Lookup tables built once per compilation.
pub(super) struct EdgeIndex<'a> {
    /// `source -> source_handle -> targets`. Handles keep first-appearance order.
    outgoing: AHashMap<&'a str, IndexMap<&'a str, PortTargets<'a>>>,
    has_incoming: AHashSet<&'a str>,
    pub(super) dangling: usize,
}

impl<'a> EdgeIndex<'a> {
    pub(super) fn new(nodes: &AHashMap<&'a str, &'a Node>, edges: &'a [Edge]) -> Self {
        let mut outgoing: AHashMap<&'a str, IndexMap<&'a str, PortTargets<'a>>> = AHashMap::new();
        let mut has_incoming = AHashSet::new();
        let mut dangling = 0;

        for edge in edges {
            if !nodes.contains_key(edge.source.as_str()) || !nodes.contains_key(edge.target.as_str())
            {
                tracing::debug!(
                    edge_id = %edge.id,
                    source = %edge.source,
                    target = %edge.target,
                    "skipping dangling edge"
                );
                dangling += 1;
                continue;
            }

            // Only retained edges count: a node whose sole incoming edge dangles is a root.
            has_incoming.insert(edge.target.as_str());
            outgoing
                .entry(edge.source.as_str())
                .or_default()
                .entry(edge.source_port())
                .or_default()
                .push((edge.target.as_str(), edge.target_port()));
        }

        Self {
            outgoing,
            has_incoming,
            dangling,
        }
    }

    pub(super) fn has_incoming(&self, node_id: &str) -> bool {
        self.has_incoming.contains(node_id)
    }

    pub(super) fn outgoing(&self, node_id: &str) -> Option<&IndexMap<&'a str, PortTargets<'a>>> {
        self.outgoing.get(node_id)
    }
}
