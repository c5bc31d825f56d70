//! BufferSink: terminal node that accumulates everything written to it.
//!
//! Nothing can be attached after a `BufferSink`; read its contents through
//! [`FilterGraph::output`](crate::pipeline::FilterGraph::output) or
//! [`FilterGraph::take_output`](crate::pipeline::FilterGraph::take_output).

use crate::error::Result;
use crate::pipeline::node::Filter;
use crate::pipeline::port::Emitter;

#[derive(Debug, Default)]
pub struct BufferSink {
    received: u64,
}

impl BufferSink {
    pub fn new() -> Self {
        Self { received: 0 }
    }

    /// Total bytes written over the sink's lifetime.
    pub fn received(&self) -> u64 {
        self.received
    }
}

impl Filter for BufferSink {
    fn name(&self) -> &str {
        "BufferSink"
    }

    fn write(&mut self, input: &[u8], out: &mut Emitter) -> Result<()> {
        self.received += input.len() as u64;
        out.send(input);
        Ok(())
    }

    fn is_attachable(&self) -> bool {
        false
    }
}
