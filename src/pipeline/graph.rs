//! Filter graph: node storage, topology and message delivery.
//!
//! A `FilterGraph` owns every node added to it. Nodes are linked into chains
//! and fan-outs through the capability handles in [`crate::pipeline::builder`];
//! the graph itself only exposes the owner-facing surface: adding nodes,
//! driving messages, writing, reading sink output and destroying nodes.
//!
//! Delivery is iterative. A filter call records its output in an `Emitter`;
//! afterwards the graph routes each chunk to the addressed child through a
//! FIFO worklist, so per-child ordering is preserved and deep chains do not
//! grow the call stack.

use crate::config::GraphSettings;
use crate::error::{CipherPipeError, Result};
use crate::pipeline::builder::{FanoutBuilder, GraphBuilder};
use crate::pipeline::error::TopologyError;
use crate::pipeline::id::{GraphId, NodeId};
use crate::pipeline::node::{AnyFilter, FanoutFilter, Filter};
use crate::pipeline::port::{Chunk, Emitter, Route};
use std::collections::{HashSet, VecDeque};
use zeroize::Zeroizing;

/// A node and its graph bookkeeping.
pub(crate) struct NodeSlot {
    pub(crate) filter: AnyFilter,
    /// Output with nowhere to go yet (this node is currently a sink).
    pending: Zeroizing<Vec<u8>>,
    /// Children, by slot index. The last `owned` entries are destroyed with this node.
    downstream: Vec<usize>,
    port: usize,
    owned: usize,
    /// Set once the node has a parent.
    claimed: bool,
    in_message: bool,
}

impl NodeSlot {
    fn new(filter: AnyFilter, capacity: usize) -> Self {
        Self {
            filter,
            pending: Zeroizing::new(Vec::with_capacity(capacity)),
            downstream: Vec::new(),
            port: 0,
            owned: 0,
            claimed: false,
            in_message: false,
        }
    }

    fn total_ports(&self) -> usize {
        self.downstream.len().max(1)
    }

    fn next(&self) -> Option<usize> {
        self.downstream.get(self.port).copied()
    }
}

enum Call<'a> {
    Write(&'a [u8]),
    Start,
    End,
}

/// Arena of filter nodes and the edges between them.
pub struct FilterGraph {
    id: GraphId,
    nodes: Vec<Option<NodeSlot>>,
    settings: GraphSettings,
}

impl Default for FilterGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::with_settings(GraphSettings::default())
    }

    pub fn with_settings(settings: GraphSettings) -> Self {
        Self {
            id: GraphId::next(),
            nodes: Vec::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    // ── Nodes ──

    /// Add an ordinary filter. The new node is unclaimed and has no children.
    pub fn add(&mut self, filter: impl Filter + 'static) -> NodeId {
        self.insert(AnyFilter::Plain(Box::new(filter)))
    }

    /// Add a fan-out filter. Its topology can be edited through [`FilterGraph::fanout`].
    pub fn add_fanout(&mut self, filter: impl FanoutFilter + 'static) -> NodeId {
        self.insert(AnyFilter::Fanout(Box::new(filter)))
    }

    /// Add an already-boxed filter of either kind.
    pub fn insert(&mut self, filter: AnyFilter) -> NodeId {
        let id = NodeId::new(self.id, self.nodes.len() as u32);
        tracing::trace!("Added {} ({:?})", id, filter);
        self.nodes
            .push(Some(NodeSlot::new(filter, self.settings.output_capacity)));
        id
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.resolve(node).is_ok()
    }

    pub fn name(&self, node: NodeId) -> Result<&str> {
        Ok(self.slot(self.resolve(node)?).filter.name())
    }

    /// Whether the node already has a parent.
    pub fn is_claimed(&self, node: NodeId) -> Result<bool> {
        Ok(self.slot(self.resolve(node)?).claimed)
    }

    pub fn is_attachable(&self, node: NodeId) -> Result<bool> {
        Ok(self.slot(self.resolve(node)?).filter.is_attachable())
    }

    /// Whether the node is between `start_message` and `end_message`.
    pub fn in_message(&self, node: NodeId) -> Result<bool> {
        Ok(self.slot(self.resolve(node)?).in_message)
    }

    /// Children of a node in port order.
    pub fn downstream(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let idx = self.resolve(node)?;
        Ok(self
            .slot(idx)
            .downstream
            .iter()
            .map(|&i| self.node_id(i))
            .collect())
    }

    // ── Capabilities ──

    /// Topology editing handle for the graph owner.
    pub fn builder(&mut self) -> GraphBuilder<'_> {
        GraphBuilder::new(self)
    }

    /// Topology editing handle scoped to one fan-out node.
    pub fn fanout(&mut self, node: NodeId) -> Result<FanoutBuilder<'_>> {
        let idx = self.resolve(node)?;
        if !self.slot(idx).filter.is_fanout() {
            return Err(TopologyError::NotFanout { node }.into());
        }
        Ok(FanoutBuilder::new(self, node))
    }

    // ── Messages ──

    /// Open a message on `node` and everything reachable from it.
    pub fn start_message(&mut self, node: NodeId) -> Result<()> {
        self.propagate_start(node)
    }

    /// Close the message on `node` and everything reachable from it.
    pub fn end_message(&mut self, node: NodeId) -> Result<()> {
        self.propagate_end(node)
    }

    /// Feed bytes into `node`. All input is processed and forwarded before return.
    ///
    /// Every node reachable from `node` must be inside a message (unless
    /// headless writes are enabled); otherwise no filter runs at all.
    pub fn write(&mut self, node: NodeId, input: &[u8]) -> Result<()> {
        let idx = self.resolve(node)?;
        self.check_writable_from(idx)?;
        let chunks = self.call(idx, Call::Write(input))?;
        let mut queue = VecDeque::new();
        self.route(idx, chunks, &mut queue);
        self.drain(queue)
    }

    /// Bytes accumulated at a sink node, without draining them.
    pub fn output(&self, node: NodeId) -> Result<&[u8]> {
        Ok(self.slot(self.resolve(node)?).pending.as_slice())
    }

    /// Drain the bytes accumulated at a sink node.
    pub fn take_output(&mut self, node: NodeId) -> Result<Vec<u8>> {
        let idx = self.resolve(node)?;
        Ok(std::mem::take(&mut *self.slot_mut(idx).pending))
    }

    // ── Destruction ──

    /// Destroy an unclaimed node together with the owned tail of its children,
    /// recursively. Borrowed children are detached and become unclaimed.
    ///
    /// Returns the number of nodes destroyed.
    pub fn destroy(&mut self, node: NodeId) -> Result<usize> {
        let root = self.resolve(node)?;
        if self.slot(root).claimed {
            return Err(TopologyError::StillAttached { node }.into());
        }

        let mut doomed = Vec::new();
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let slot = self.slot(idx);
            if slot.in_message {
                return Err(CipherPipeError::MessageInProgress);
            }
            doomed.push(idx);
            let split = slot.downstream.len() - slot.owned;
            stack.extend(slot.downstream[split..].iter().copied());
        }

        // Owned children go before their owner.
        for &idx in doomed.iter().rev() {
            if let Some(slot) = self.nodes[idx].take() {
                let split = slot.downstream.len() - slot.owned;
                for &borrowed in &slot.downstream[..split] {
                    if let Some(child) = self.nodes[borrowed].as_mut() {
                        child.claimed = false;
                    }
                }
                tracing::debug!("Destroyed {} ('{}')", self.node_id(idx), slot.filter.name());
            }
        }

        Ok(doomed.len())
    }

    // ── Topology primitives (reached through the builders) ──

    /// Append `child` at the end of `parent`'s active-port chain.
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        let parent_idx = self.resolve(parent)?;
        let child_idx = self.resolve(child)?;
        let tail = self.attach_index(parent_idx, child_idx)?;
        Ok(self.node_id(tail))
    }

    fn attach_index(&mut self, parent: usize, child: usize) -> Result<usize> {
        let child_slot = self.slot(child);
        if child_slot.claimed {
            tracing::warn!("Refusing to attach {}: already claimed", self.node_id(child));
            return Err(TopologyError::AlreadyClaimed {
                node: self.node_id(child),
            }
            .into());
        }

        let tail = self.tail_of(parent);
        let tail_slot = self.slot(tail);
        if !tail_slot.filter.is_attachable() {
            tracing::warn!(
                "Refusing to attach below {} ('{}'): not attachable",
                self.node_id(tail),
                tail_slot.filter.name()
            );
            return Err(TopologyError::NotAttachable {
                node: self.node_id(tail),
                name: tail_slot.filter.name().to_string(),
            }
            .into());
        }
        if tail_slot.in_message || child_slot.in_message {
            return Err(CipherPipeError::MessageInProgress);
        }
        if self.reaches(child, tail) {
            return Err(TopologyError::WouldCreateCycle {
                parent: self.node_id(tail),
                child: self.node_id(child),
            }
            .into());
        }

        // The tail has nothing on its port, so it has no children at all.
        self.slot_mut(tail).downstream.push(child);
        self.slot_mut(child).claimed = true;

        tracing::debug!(
            "Attached {} ('{}') below {} ('{}')",
            self.node_id(child),
            self.slot(child).filter.name(),
            self.node_id(tail),
            self.slot(tail).filter.name()
        );
        Ok(tail)
    }

    /// Replace a node's children. Resets its port and owned count.
    /// Previous children, owned or not, become unclaimed roots.
    pub(crate) fn set_downstream(&mut self, node: NodeId, children: &[NodeId]) -> Result<()> {
        let idx = self.resolve(node)?;
        let mut new_children = Vec::with_capacity(children.len());
        for &child in children {
            new_children.push(self.resolve(child)?);
        }

        let slot = self.slot(idx);
        if slot.in_message {
            return Err(CipherPipeError::MessageInProgress);
        }
        if !new_children.is_empty() && !slot.filter.is_attachable() {
            return Err(TopologyError::NotAttachable {
                node,
                name: slot.filter.name().to_string(),
            }
            .into());
        }

        for (pos, &child) in new_children.iter().enumerate() {
            let child_slot = self.slot(child);
            let duplicate = new_children[..pos].contains(&child);
            let foreign_parent = child_slot.claimed && !slot.downstream.contains(&child);
            if duplicate || foreign_parent {
                return Err(TopologyError::AlreadyClaimed {
                    node: self.node_id(child),
                }
                .into());
            }
            if child_slot.in_message {
                return Err(CipherPipeError::MessageInProgress);
            }
            if self.reaches(child, idx) {
                return Err(TopologyError::WouldCreateCycle {
                    parent: node,
                    child: self.node_id(child),
                }
                .into());
            }
        }

        let previous = std::mem::take(&mut self.slot_mut(idx).downstream);
        for old in previous {
            self.slot_mut(old).claimed = false;
        }
        for &child in &new_children {
            self.slot_mut(child).claimed = true;
        }
        let slot = self.slot_mut(idx);
        slot.downstream = new_children;
        slot.port = 0;
        slot.owned = 0;

        tracing::debug!("Set {} children of {}", children.len(), node);
        Ok(())
    }

    pub(crate) fn set_port(&mut self, node: NodeId, port: usize) -> Result<()> {
        let idx = self.resolve(node)?;
        let slot = self.slot_mut(idx);
        let total = slot.total_ports();
        if port >= total {
            return Err(TopologyError::PortOutOfRange { node, port, total }.into());
        }
        slot.port = port;
        Ok(())
    }

    pub(crate) fn total_ports(&self, node: NodeId) -> Result<usize> {
        Ok(self.slot(self.resolve(node)?).total_ports())
    }

    pub(crate) fn current_port(&self, node: NodeId) -> Result<usize> {
        Ok(self.slot(self.resolve(node)?).port)
    }

    pub(crate) fn owned_count(&self, node: NodeId) -> Result<usize> {
        Ok(self.slot(self.resolve(node)?).owned)
    }

    /// The child on the active port, if any.
    pub(crate) fn next(&self, node: NodeId) -> Result<Option<NodeId>> {
        let idx = self.resolve(node)?;
        Ok(self.slot(idx).next().map(|i| self.node_id(i)))
    }

    pub(crate) fn increment_owned_count(&mut self, node: NodeId) -> Result<()> {
        let idx = self.resolve(node)?;
        self.own_one(idx)
    }

    fn own_one(&mut self, idx: usize) -> Result<()> {
        let node = self.node_id(idx);
        let slot = self.slot_mut(idx);
        let ports = slot.downstream.len();
        if slot.owned + 1 > ports {
            return Err(TopologyError::OwnershipExceedsPorts {
                node,
                owned: slot.owned + 1,
                ports,
            }
            .into());
        }
        slot.owned += 1;
        Ok(())
    }

    /// Link `links` one after another below `head`, each node owning the next.
    ///
    /// Everything is validated up front, so a refused chain leaves the graph untouched.
    pub(crate) fn attach_owned_chain(&mut self, head: NodeId, links: &[NodeId]) -> Result<()> {
        let head_idx = self.resolve(head)?;
        let mut indices = Vec::with_capacity(links.len());
        for &link in links {
            indices.push(self.resolve(link)?);
        }

        let tail = self.tail_of(head_idx);
        let mut upstream = tail;
        for (pos, &idx) in indices.iter().enumerate() {
            let slot = self.slot(idx);
            if slot.claimed || indices[..pos].contains(&idx) {
                return Err(TopologyError::AlreadyClaimed {
                    node: self.node_id(idx),
                }
                .into());
            }
            if self.reaches(idx, head_idx) {
                return Err(TopologyError::WouldCreateCycle {
                    parent: self.node_id(upstream),
                    child: self.node_id(idx),
                }
                .into());
            }
            let up = self.slot(upstream);
            if !up.filter.is_attachable() {
                return Err(TopologyError::NotAttachable {
                    node: self.node_id(upstream),
                    name: up.filter.name().to_string(),
                }
                .into());
            }
            if up.in_message || slot.in_message {
                return Err(CipherPipeError::MessageInProgress);
            }
            upstream = self.tail_of(idx);
        }

        for &idx in &indices {
            let owner = self.attach_index(head_idx, idx)?;
            self.own_one(owner)?;
        }
        Ok(())
    }

    pub(crate) fn propagate_start(&mut self, node: NodeId) -> Result<()> {
        let root = self.message_root(node)?;
        let order = self.preorder(root);

        if let Some(&open) = order.iter().find(|&&i| self.slot(i).in_message) {
            return Err(CipherPipeError::MessageAlreadyStarted {
                node: self.node_id(open),
            });
        }

        for &idx in &order {
            self.slot_mut(idx).in_message = true;
        }

        // Every node sees its start before anything emitted during starts is delivered.
        let mut emitted = Vec::new();
        for &idx in &order {
            match self.call(idx, Call::Start) {
                Ok(chunks) => emitted.push((idx, chunks)),
                Err(e) => {
                    self.abort(&order);
                    return Err(e);
                }
            }
        }

        let mut queue = VecDeque::new();
        for (idx, chunks) in emitted {
            self.route(idx, chunks, &mut queue);
        }
        if let Err(e) = self.drain(queue) {
            self.abort(&order);
            return Err(e);
        }

        tracing::trace!("Started message at {} across {} nodes", node, order.len());
        Ok(())
    }

    pub(crate) fn propagate_end(&mut self, node: NodeId) -> Result<()> {
        let root = self.message_root(node)?;
        let order = self.preorder(root);
        if let Some(&closed) = order.iter().find(|&&i| !self.slot(i).in_message) {
            return Err(CipherPipeError::MessageNotStarted {
                node: self.node_id(closed),
            });
        }

        // Pre-order: a node's flushed output reaches its children before they end.
        for &idx in &order {
            let result = self.call(idx, Call::End).and_then(|chunks| {
                let mut queue = VecDeque::new();
                self.route(idx, chunks, &mut queue);
                self.drain(queue)
            });
            if let Err(e) = result {
                self.abort(&order);
                return Err(e);
            }
            self.slot_mut(idx).in_message = false;
        }

        tracing::trace!("Ended message at {} across {} nodes", node, order.len());
        Ok(())
    }

    /// Message brackets are driven from roots only, so a whole tree opens and
    /// closes together.
    fn message_root(&self, node: NodeId) -> Result<usize> {
        let idx = self.resolve(node)?;
        if self.slot(idx).claimed {
            tracing::warn!("Refusing message boundary on {}: not a root", node);
            return Err(CipherPipeError::NotMessageRoot { node });
        }
        Ok(idx)
    }

    // ── Delivery ──

    fn call(&mut self, idx: usize, call: Call<'_>) -> Result<Vec<Chunk>> {
        let node = self.node_id(idx);
        let slot = self.slot_mut(idx);
        let mut out = Emitter::new(node, slot.port, slot.total_ports());
        match call {
            Call::Write(input) => slot.filter.write(input, &mut out)?,
            Call::Start => slot.filter.start_message(&mut out)?,
            Call::End => slot.filter.end_message(&mut out)?,
        }
        slot.port = out.port();
        Ok(out.into_chunks())
    }

    /// Queue a node's output for its children, or keep it if it has none.
    fn route(&mut self, idx: usize, chunks: Vec<Chunk>, queue: &mut VecDeque<(usize, Vec<u8>)>) {
        if chunks.is_empty() {
            return;
        }
        let slot = self.slot_mut(idx);
        if slot.downstream.is_empty() {
            for chunk in chunks {
                slot.pending.extend_from_slice(&chunk.bytes);
            }
            return;
        }

        // Output held from before this node had children goes out first,
        // along the same route as the output that releases it.
        if !slot.pending.is_empty() {
            let held = std::mem::take(&mut *slot.pending);
            match chunks[0].route {
                Route::All => {
                    for &child in &slot.downstream {
                        queue.push_back((child, held.clone()));
                    }
                }
                Route::Port(port) => match slot.downstream.get(port) {
                    Some(&child) => queue.push_back((child, held)),
                    None => *slot.pending = held,
                },
            }
        }

        for chunk in chunks {
            match chunk.route {
                Route::Port(port) => match slot.downstream.get(port) {
                    Some(&child) => queue.push_back((child, chunk.bytes)),
                    None => slot.pending.extend_from_slice(&chunk.bytes),
                },
                Route::All => {
                    for &child in &slot.downstream {
                        queue.push_back((child, chunk.bytes.clone()));
                    }
                }
            }
        }
    }

    fn drain(&mut self, mut queue: VecDeque<(usize, Vec<u8>)>) -> Result<()> {
        while let Some((idx, bytes)) = queue.pop_front() {
            self.check_writable(idx)?;
            let chunks = self.call(idx, Call::Write(&bytes))?;
            self.route(idx, chunks, &mut queue);
        }
        Ok(())
    }

    fn check_writable(&self, idx: usize) -> Result<()> {
        if !self.settings.allow_headless_writes && !self.slot(idx).in_message {
            return Err(CipherPipeError::MessageNotStarted {
                node: self.node_id(idx),
            });
        }
        Ok(())
    }

    /// Refuse a write unless everything it can reach is inside a message.
    fn check_writable_from(&self, root: usize) -> Result<()> {
        if self.settings.allow_headless_writes {
            return Ok(());
        }
        match self
            .preorder(root)
            .into_iter()
            .find(|&i| !self.slot(i).in_message)
        {
            Some(idx) => Err(CipherPipeError::MessageNotStarted {
                node: self.node_id(idx),
            }),
            None => Ok(()),
        }
    }

    fn abort(&mut self, order: &[usize]) {
        tracing::warn!("Aborting message across {} nodes", order.len());
        for &idx in order {
            if let Some(slot) = self.nodes[idx].as_mut() {
                slot.in_message = false;
            }
        }
    }

    // ── Traversal ──

    /// Every node reachable from `root`, parents before children.
    fn preorder(&self, root: usize) -> Vec<usize> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(self.slot(idx).downstream.iter().rev().copied());
        }
        order
    }

    fn reaches(&self, from: usize, target: usize) -> bool {
        let mut stack = vec![from];
        let mut visited = HashSet::new();
        while let Some(idx) = stack.pop() {
            if idx == target {
                return true;
            }
            if !visited.insert(idx) {
                continue;
            }
            stack.extend(self.slot(idx).downstream.iter().copied());
        }
        false
    }

    /// Follow active ports from `idx` until a node with nothing on its port.
    fn tail_of(&self, idx: usize) -> usize {
        let mut last = idx;
        let mut steps = 0;
        while let Some(next) = self.slot(last).next() {
            last = next;
            steps += 1;
            if steps > self.nodes.len() {
                break;
            }
        }
        last
    }

    // ── Slot access ──

    fn node_id(&self, idx: usize) -> NodeId {
        NodeId::new(self.id, idx as u32)
    }

    fn resolve(&self, node: NodeId) -> Result<usize> {
        if node.graph() != self.id {
            return Err(TopologyError::ForeignNode { node }.into());
        }
        match self.nodes.get(node.index()) {
            Some(Some(_)) => Ok(node.index()),
            _ => Err(TopologyError::UnknownNode { node }.into()),
        }
    }

    // Indices handed to these come from `resolve` or from live edges; destroy
    // never leaves an edge pointing at an empty slot.
    fn slot(&self, idx: usize) -> &NodeSlot {
        match &self.nodes[idx] {
            Some(slot) => slot,
            None => unreachable!("edge to destroyed node {}", idx),
        }
    }

    fn slot_mut(&mut self, idx: usize) -> &mut NodeSlot {
        match &mut self.nodes[idx] {
            Some(slot) => slot,
            None => unreachable!("edge to destroyed node {}", idx),
        }
    }
}
