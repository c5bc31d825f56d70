//! Passthrough: forwards its input unchanged.

use crate::error::Result;
use crate::pipeline::node::Filter;
use crate::pipeline::port::Emitter;

#[derive(Debug, Default)]
pub struct Passthrough;

impl Passthrough {
    pub fn new() -> Self {
        Self
    }
}

impl Filter for Passthrough {
    fn name(&self) -> &str {
        "Passthrough"
    }

    fn write(&mut self, input: &[u8], out: &mut Emitter) -> Result<()> {
        out.send(input);
        Ok(())
    }
}
