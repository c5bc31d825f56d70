//! Topology capabilities.
//!
//! Graph mutation is not part of the `Filter` surface. The owner of a
//! `FilterGraph` obtains a [`GraphBuilder`] to wire nodes and drive message
//! propagation; a [`FanoutBuilder`] exposes the same wiring scoped to one
//! fan-out node, plus the ability to take ownership of its children.

use crate::error::Result;
use crate::pipeline::graph::FilterGraph;
use crate::pipeline::id::NodeId;

/// Owner-level handle for editing a graph's topology.
pub struct GraphBuilder<'g> {
    graph: &'g mut FilterGraph,
}

impl<'g> GraphBuilder<'g> {
    pub(crate) fn new(graph: &'g mut FilterGraph) -> Self {
        Self { graph }
    }

    /// Append `child` at the end of `parent`'s active-port chain.
    ///
    /// Returns the node `child` was attached below. Fails if that node is not
    /// attachable, if `child` already has a parent, or if the edge would close
    /// a cycle. The child is claimed on success.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        self.graph.attach(parent, child)
    }

    /// Replace the children of `node`, resetting its port and owned count.
    ///
    /// Previous children, owned ones included, are released as unclaimed
    /// roots and are not destroyed; the caller destroys or reattaches them.
    pub fn set_downstream(&mut self, node: NodeId, children: &[NodeId]) -> Result<()> {
        self.graph.set_downstream(node, children)
    }

    pub fn set_port(&mut self, node: NodeId, port: usize) -> Result<()> {
        self.graph.set_port(node, port)
    }

    pub fn total_ports(&self, node: NodeId) -> Result<usize> {
        self.graph.total_ports(node)
    }

    pub fn current_port(&self, node: NodeId) -> Result<usize> {
        self.graph.current_port(node)
    }

    /// Number of trailing children destroyed together with `node`.
    pub fn owned_count(&self, node: NodeId) -> Result<usize> {
        self.graph.owned_count(node)
    }

    /// The child on `node`'s active port.
    pub fn next(&self, node: NodeId) -> Result<Option<NodeId>> {
        self.graph.next(node)
    }

    /// Start a message on `node` and every node reachable from it.
    pub fn propagate_start(&mut self, node: NodeId) -> Result<()> {
        self.graph.propagate_start(node)
    }

    /// End the message on `node` and every node reachable from it.
    pub fn propagate_end(&mut self, node: NodeId) -> Result<()> {
        self.graph.propagate_end(node)
    }
}

/// Topology handle scoped to a single fan-out node.
pub struct FanoutBuilder<'g> {
    graph: &'g mut FilterGraph,
    node: NodeId,
}

impl<'g> FanoutBuilder<'g> {
    pub(crate) fn new(graph: &'g mut FilterGraph, node: NodeId) -> Self {
        Self { graph, node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn attach(&mut self, child: NodeId) -> Result<NodeId> {
        self.graph.attach(self.node, child)
    }

    /// Replace this node's children. Released children are not destroyed,
    /// see [`GraphBuilder::set_downstream`].
    pub fn set_downstream(&mut self, children: &[NodeId]) -> Result<()> {
        self.graph.set_downstream(self.node, children)
    }

    pub fn set_port(&mut self, port: usize) -> Result<()> {
        self.graph.set_port(self.node, port)
    }

    /// Take responsibility for destroying one more trailing child.
    pub fn increment_owned_count(&mut self) -> Result<()> {
        self.graph.increment_owned_count(self.node)
    }

    /// Link `links` one after another below this node, each owning the next.
    pub fn attach_owned_chain(&mut self, links: &[NodeId]) -> Result<()> {
        self.graph.attach_owned_chain(self.node, links)
    }
}
