//! Fork: fan-out node.
//!
//! In broadcast mode every write is replicated to all children. In routing
//! mode writes go only to the child on the active port, which the graph owner
//! selects through [`FanoutBuilder::set_port`](crate::pipeline::FanoutBuilder::set_port).

use crate::error::Result;
use crate::pipeline::node::FanoutFilter;
use crate::pipeline::port::FanoutEmitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForkMode {
    Broadcast,
    Route,
}

#[derive(Debug)]
pub struct Fork {
    mode: ForkMode,
}

impl Fork {
    /// A fork that replicates to every child.
    pub fn new() -> Self {
        Self {
            mode: ForkMode::Broadcast,
        }
    }

    /// A fork that forwards to the active port only.
    pub fn routing() -> Self {
        Self {
            mode: ForkMode::Route,
        }
    }

    pub fn mode(&self) -> ForkMode {
        self.mode
    }
}

impl Default for Fork {
    fn default() -> Self {
        Self::new()
    }
}

impl FanoutFilter for Fork {
    fn name(&self) -> &str {
        "Fork"
    }

    fn write(&mut self, input: &[u8], out: &mut FanoutEmitter<'_>) -> Result<()> {
        match self.mode {
            ForkMode::Broadcast => out.broadcast(input),
            ForkMode::Route => out.send(input),
        }
        Ok(())
    }
}
