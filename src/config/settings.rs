//! Tunable settings for the graph and the keystream engine
//!
//! # Main Types
//!
//! - [`GraphSettings`] - Message-state strictness and buffer sizing for a `FilterGraph`
//! - [`KeystreamSettings`] - Drop count and block size for ARC4 engines

use serde::{Deserialize, Serialize};

/// Default number of keystream bytes generated per refill
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Drop count that turns ARC4 into MARK-4
pub const MARK4_DROP: usize = 256;

/// Settings applied to every node of a `FilterGraph`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Accept writes outside a start/end message bracket
    pub allow_headless_writes: bool,

    /// Initial capacity reserved for each node's pending output
    pub output_capacity: usize,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            allow_headless_writes: false,
            output_capacity: 0,
        }
    }
}

/// Settings for keystream engines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeystreamSettings {
    /// Keystream bytes discarded right after key scheduling
    pub drop: usize,

    /// Bytes generated per refill of the output buffer
    pub block_size: usize,
}

impl Default for KeystreamSettings {
    fn default() -> Self {
        Self {
            drop: 0,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl KeystreamSettings {
    /// Settings for MARK-4 (ARC4 with the first 256 bytes dropped)
    pub fn mark4() -> Self {
        Self {
            drop: MARK4_DROP,
            ..Self::default()
        }
    }

    pub fn with_drop(mut self, drop: usize) -> Self {
        self.drop = drop;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }
}
