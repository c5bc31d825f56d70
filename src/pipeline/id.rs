//! Identity types for the filter graph.
//!
//! A `NodeId` is an index into one `FilterGraph`'s node storage, tagged with
//! the identity of the graph that issued it. The tag lets a graph refuse ids
//! minted by another graph, so a node can never be wired into two pipelines.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_GRAPH_ID: AtomicU32 = AtomicU32::new(0);

/// Identity of one `FilterGraph` arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphId(u32);

impl GraphId {
    /// Allocate a process-unique graph identity.
    pub(crate) fn next() -> Self {
        GraphId(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GraphId({})", self.0)
    }
}

/// Handle to a node stored in a `FilterGraph`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    graph: GraphId,
    index: u32,
}

impl NodeId {
    pub(crate) fn new(graph: GraphId, index: u32) -> Self {
        Self { graph, index }
    }

    /// The graph that issued this id.
    #[inline]
    pub fn graph(self) -> GraphId {
        self.graph
    }

    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}:{})", self.graph.0, self.index)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
