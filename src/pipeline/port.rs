//! Output ports for filters.
//!
//! A filter never touches the graph directly. Each call into a filter is
//! handed an [`Emitter`] that records what the filter sends; once the call
//! returns, the graph routes the recorded chunks to the node's children (or
//! into its pending output when it has none).
//!
//! Fan-out filters get a [`FanoutEmitter`] instead, which additionally lets
//! them pick the active port and replicate output to every child.

use crate::error::Result;
use crate::pipeline::error::TopologyError;
use crate::pipeline::id::NodeId;

/// Where a chunk of output is headed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    /// The child at this port.
    Port(usize),
    /// Every child.
    All,
}

#[derive(Debug)]
pub(crate) struct Chunk {
    pub(crate) route: Route,
    pub(crate) bytes: Vec<u8>,
}

/// Output side of a filter call.
#[derive(Debug)]
pub struct Emitter {
    node: NodeId,
    port: usize,
    total_ports: usize,
    chunks: Vec<Chunk>,
}

impl Emitter {
    pub(crate) fn new(node: NodeId, port: usize, total_ports: usize) -> Self {
        Self {
            node,
            port,
            total_ports,
            chunks: Vec::new(),
        }
    }

    /// Forward bytes to the child on the active port.
    pub fn send(&mut self, bytes: &[u8]) {
        self.push(Route::Port(self.port), bytes);
    }

    /// Forward a single byte to the child on the active port.
    pub fn send_byte(&mut self, byte: u8) {
        self.send(&[byte]);
    }

    /// The node this emitter belongs to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Total bytes sent during this call.
    pub fn sent_len(&self) -> usize {
        self.chunks.iter().map(|c| c.bytes.len()).sum()
    }

    fn push(&mut self, route: Route, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        // Coalesce consecutive sends along the same route.
        match self.chunks.last_mut() {
            Some(last) if last.route == route => last.bytes.extend_from_slice(bytes),
            _ => self.chunks.push(Chunk {
                route,
                bytes: bytes.to_vec(),
            }),
        }
    }

    pub(crate) fn port(&self) -> usize {
        self.port
    }

    pub(crate) fn into_chunks(self) -> Vec<Chunk> {
        self.chunks
    }
}

/// Output side of a fan-out filter call.
pub struct FanoutEmitter<'a> {
    inner: &'a mut Emitter,
}

impl<'a> FanoutEmitter<'a> {
    pub(crate) fn new(inner: &'a mut Emitter) -> Self {
        Self { inner }
    }

    /// Forward bytes to the child on the active port.
    pub fn send(&mut self, bytes: &[u8]) {
        self.inner.send(bytes);
    }

    /// Replicate bytes to every child.
    pub fn broadcast(&mut self, bytes: &[u8]) {
        self.inner.push(Route::All, bytes);
    }

    pub fn current_port(&self) -> usize {
        self.inner.port
    }

    pub fn total_ports(&self) -> usize {
        self.inner.total_ports
    }

    /// Select the child that receives subsequent `send`s.
    ///
    /// The selection persists after the call returns.
    pub fn set_port(&mut self, port: usize) -> Result<()> {
        if port >= self.inner.total_ports {
            return Err(TopologyError::PortOutOfRange {
                node: self.inner.node,
                port,
                total: self.inner.total_ports,
            }
            .into());
        }
        self.inner.port = port;
        Ok(())
    }
}
