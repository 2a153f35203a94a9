//! Compiles a flat node/edge graph into the forest of execution trees sent on deploy.
//!
//! Every node without an incoming edge becomes the root of one tree. Each tree node
//! lists its children grouped by the output port (source handle) they hang off, and
//! records the input port (target handle) each child is entered through, so both
//! multi-port fan-out (e.g. `success`/`error`) and fan-in onto named parameters survive.
//!
//! Diamonds are expanded: a node reachable from two parents appears under both.
//! Cycles are cut: an edge leading back into the current root-to-node path is dropped
//! from the output. Dropped edges are counted in the [`CompileReport`] and logged.
//!
//! Trees are at most [`DEFAULT_MAX_TREE_DEPTH`] levels deep unless configured otherwise
//! with [`ForestCompiler::with_max_depth`]. Edges past the limit are cut and counted, so
//! serializing, cloning or dropping a compiled tree never recurses without bound.
use crate::graph::{Edge, Node};
use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use itertools::Itertools;

mod deploy;
mod index;
mod tree;

pub use deploy::*;
pub use tree::*;

use index::EdgeIndex;

/// Maximum number of levels in a compiled tree, root included.
pub const DEFAULT_MAX_TREE_DEPTH: usize = 128;

/// Diagnostics collected while compiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Number of trees produced.
    pub roots: usize,
    /// Edges ignored because their source or target node does not exist.
    pub dangling_edges: usize,
    /// Edge traversals cut because they would re-enter the current path.
    pub dropped_cycle_edges: usize,
    /// Edges cut because their target would sit below the depth limit.
    pub truncated_edges: usize,
    /// Nodes that appear in no tree (only reachable through a rootless cycle or below
    /// the depth limit).
    pub unreachable_nodes: usize,
}

impl CompileReport {
    /// Whether compilation discarded part of the graph.
    pub fn is_lossy(&self) -> bool {
        self.dropped_cycle_edges > 0 || self.truncated_edges > 0 || self.unreachable_nodes > 0
    }
}

/// The output of a compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledForest {
    pub roots: Vec<WorkflowTreeNode>,
    pub report: CompileReport,
}

impl CompiledForest {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.roots)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.roots)
    }
}

/// Per-root traversal state.
struct Traversal<'a> {
    /// Ids on the path from the current root to the node being built.
    path: AHashSet<&'a str>,
    /// Ids materialized anywhere in the forest so far.
    reached: AHashSet<&'a str>,
    dropped_cycle_edges: usize,
    truncated_edges: usize,
}

/// Converts a node/edge graph into rooted execution trees.
pub struct ForestCompiler<'a> {
    nodes: &'a [Node],
    by_id: AHashMap<&'a str, &'a Node>,
    index: EdgeIndex<'a>,
    max_depth: usize,
}

impl<'a> ForestCompiler<'a> {
    pub fn new(nodes: &'a [Node], edges: &'a [Edge]) -> Self {
        let by_id: AHashMap<&'a str, &'a Node> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let index = EdgeIndex::new(&by_id, edges);
        Self {
            nodes,
            by_id,
            index,
            max_depth: DEFAULT_MAX_TREE_DEPTH,
        }
    }

    /// Overrides the depth limit. Values below 1 are treated as 1.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn compile(self) -> CompiledForest {
        let root_ids: Vec<&'a str> = self
            .nodes
            .iter()
            .filter(|n| !self.index.has_incoming(&n.id))
            .map(|n| n.id.as_str())
            .unique()
            .collect();

        let mut traversal = Traversal {
            path: AHashSet::new(),
            reached: AHashSet::new(),
            dropped_cycle_edges: 0,
            truncated_edges: 0,
        };

        let roots: Vec<WorkflowTreeNode> = root_ids
            .into_iter()
            .filter_map(|id| {
                traversal.path.clear();
                self.build_tree(id, 1, &mut traversal)
            })
            .collect();

        let report = CompileReport {
            roots: roots.len(),
            dangling_edges: self.index.dangling,
            dropped_cycle_edges: traversal.dropped_cycle_edges,
            truncated_edges: traversal.truncated_edges,
            unreachable_nodes: self.by_id.len() - traversal.reached.len(),
        };

        if report.unreachable_nodes > 0 {
            let missing = self
                .by_id
                .keys()
                .filter(|id| !traversal.reached.contains(*id))
                .sorted()
                .join(", ");
            tracing::warn!(
                count = report.unreachable_nodes,
                nodes = %missing,
                "nodes excluded from forest"
            );
        }
        tracing::debug!(
            roots = report.roots,
            dangling_edges = report.dangling_edges,
            dropped_cycle_edges = report.dropped_cycle_edges,
            truncated_edges = report.truncated_edges,
            "compiled workflow forest"
        );

        CompiledForest { roots, report }
    }

    /// Depth-first materialization of `node_id` and everything below it. `depth` counts
    /// the levels from the root down to `node_id`, and never exceeds `max_depth`.
    fn build_tree(
        &self,
        node_id: &'a str,
        depth: usize,
        state: &mut Traversal<'a>,
    ) -> Option<WorkflowTreeNode> {
        let node = self.by_id.get(node_id)?;
        state.path.insert(node_id);
        state.reached.insert(node_id);

        let mut connections: IndexMap<String, Vec<TreeConnection>> = IndexMap::new();
        if let Some(ports) = self.index.outgoing(node_id) {
            for (source_handle, targets) in ports {
                let mut children = Vec::with_capacity(targets.len());
                for &(target_id, target_handle) in targets {
                    if state.path.contains(target_id) {
                        tracing::warn!(
                            source = %node_id,
                            source_handle = %source_handle,
                            target = %target_id,
                            "dropping cyclic edge from compiled forest"
                        );
                        state.dropped_cycle_edges += 1;
                        continue;
                    }
                    if depth >= self.max_depth {
                        tracing::warn!(
                            source = %node_id,
                            target = %target_id,
                            max_depth = self.max_depth,
                            "cutting edge below the tree depth limit"
                        );
                        state.truncated_edges += 1;
                        continue;
                    }
                    if let Some(child) = self.build_tree(target_id, depth + 1, state) {
                        children.push(TreeConnection {
                            target_handle: target_handle.to_string(),
                            target_node: Box::new(child),
                        });
                    }
                }
                connections.insert(source_handle.to_string(), children);
            }
        }

        state.path.remove(node_id);
        Some(WorkflowTreeNode {
            id: node.id.clone(),
            node_type: node.export_type().to_string(),
            data: node.data.clone(),
            connections,
        })
    }
}

/// Compiles a graph and returns only the trees.
pub fn compile_forest(nodes: &[Node], edges: &[Edge]) -> Vec<WorkflowTreeNode> {
    ForestCompiler::new(nodes, edges).compile().roots
}
