use crate::tri_node::{NodeHandle, TriNode};
use std::fmt;

/// The node pool ran out of free `TriNode`s. Non-fatal: the caller aborts the split that
/// triggered it and leaves the tree unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolExhausted;

impl fmt::Display for PoolExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node pool exhausted")
    }
}

impl std::error::Error for PoolExhausted {}

/// Fixed-capacity arena of `TriNode`s: a backing `Vec` plus an explicit LIFO free-list of the
/// slots currently unused. Allocate/release are O(1), since they happen on every split/merge,
/// every frame.
pub struct NodePool {
    nodes: Vec<TriNode>,
    free: Vec<NodeHandle>,
    /// The `with_capacity` argument, i.e. the churn budget. Kept separate from `nodes.len()`
    /// because `allocate_permanent` grows `nodes` past it for patch roots, which live for the
    /// program's whole lifetime and are never split-allocated/merge-released, so they're excluded
    /// from the tracked budget entirely.
    churn_capacity: usize,
}

impl NodePool {
    /// Creates a pool with `capacity` pre-allocated, all-free slots.
    pub fn with_capacity(capacity: u32) -> Self {
        let nodes = vec![TriNode::default(); capacity as usize];
        // Push in decreasing order so the first allocations hand out increasing handles, which
        // keeps early pool activity (e.g. in tests) easy to read.
        let free = (0..capacity).rev().map(NodeHandle).collect();
        Self {
            nodes,
            free,
            churn_capacity: capacity as usize,
        }
    }

    /// The churn budget this pool was built with (excludes permanent roots).
    pub fn capacity(&self) -> usize {
        self.churn_capacity
    }

    /// Number of handles currently free.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn allocate(&mut self) -> Result<NodeHandle, PoolExhausted> {
        match self.free.pop() {
            Some(handle) => {
                self.nodes[handle.index()] = TriNode::default();
                Ok(handle)
            }
            None => {
                log::debug!(
                    "node pool exhausted ({} nodes in churn)",
                    self.churn_capacity
                );
                Err(PoolExhausted)
            }
        }
    }

    /// Returns `handle` to the pool, resetting its fields to the initial state.
    pub fn release(&mut self, handle: NodeHandle) {
        self.nodes[handle.index()] = TriNode::default();
        self.free.push(handle);
    }

    /// Allocates a node outside the churn budget: used once per patch, for the two root
    /// `TriNode`s, which are created at `Landscape` init and never released. Unlike `allocate`,
    /// this cannot fail and does not affect `free_count`/`capacity`, which are defined over the
    /// churn budget alone.
    pub fn allocate_permanent(&mut self) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len() as u32);
        self.nodes.push(TriNode::default());
        handle
    }

    pub fn get(&self, handle: NodeHandle) -> &TriNode {
        &self.nodes[handle.index()]
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> &mut TriNode {
        &mut self.nodes[handle.index()]
    }
}
