//! KeystreamFilter: a stream cipher as a pipeline stage.
//!
//! Every written byte is XORed with the next keystream byte and sent on.
//! The keystream continues across message boundaries, so one filter models
//! one logical stream; decrypting requires a filter keyed the same way and
//! fed the same byte offsets.

use crate::cipher::{Arc4, StreamCipher};
use crate::config::KeystreamSettings;
use crate::error::Result;
use crate::pipeline::node::Filter;
use crate::pipeline::port::Emitter;
use zeroize::Zeroize;

pub struct KeystreamFilter<C: StreamCipher = Arc4> {
    engine: C,
    name: String,
    scratch: Vec<u8>,
}

impl<C: StreamCipher> KeystreamFilter<C> {
    pub fn new(engine: C) -> Self {
        let name = engine.name();
        Self {
            engine,
            name,
            scratch: Vec::new(),
        }
    }

    pub fn engine(&self) -> &C {
        &self.engine
    }
}

impl KeystreamFilter<Arc4> {
    /// ARC4 stage keyed with `key` and configured by `settings`.
    pub fn arc4(key: &[u8], settings: &KeystreamSettings) -> Result<Self> {
        Ok(Self::new(Arc4::with_settings(key, settings)?))
    }
}

impl<C: StreamCipher> Filter for KeystreamFilter<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, input: &[u8], out: &mut Emitter) -> Result<()> {
        self.scratch.clear();
        self.scratch.extend_from_slice(input);
        self.engine.apply_keystream(&mut self.scratch)?;
        out.send(&self.scratch);
        Ok(())
    }
}

impl<C: StreamCipher> Drop for KeystreamFilter<C> {
    fn drop(&mut self) {
        self.scratch.zeroize();
    }
}
