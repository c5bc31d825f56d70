//! # cipherpipe: Filter Pipelines with Keystream Ciphers
//!
//! A byte-stream processing library. Data written into a [`FilterGraph`] flows
//! through chains of filters, may be split across fan-out nodes, and collects
//! at sink nodes. Message boundaries (`start_message` / `end_message`)
//! propagate through every reachable node so filters can flush on time.
//!
//! ## Architecture
//!
//! - **Pipeline**: arena-backed graph of filter nodes with port addressing,
//!   single-parent claims and destruction ownership
//! - **Cipher**: the ARC4 keystream engine and the `StreamCipher` interface
//! - **Config**: serde-backed graph and engine settings stored as JSON or TOML
//!
//! ## Example
//!
//! ```ignore
//! use cipherpipe::{config::KeystreamSettings, BufferSink, FilterGraph, KeystreamFilter};
//!
//! fn main() -> cipherpipe::Result<()> {
//!     let mut graph = FilterGraph::new();
//!     let cipher = graph.add(KeystreamFilter::arc4(b"Key", &KeystreamSettings::default())?);
//!     let sink = graph.add(BufferSink::new());
//!     graph.builder().attach(cipher, sink)?;
//!
//!     graph.start_message(cipher)?;
//!     graph.write(cipher, b"Plaintext")?;
//!     graph.end_message(cipher)?;
//!
//!     assert_eq!(graph.take_output(sink)?, [0xbb, 0xf3, 0x16, 0xe8, 0xd9, 0x40, 0xaf, 0x0a, 0xd3]);
//!     Ok(())
//! }
//! ```

pub mod cipher;
pub mod config;
pub mod error;
pub mod pipeline;

// Re-export commonly used types
pub use cipher::{Arc4, KeyLength, StreamCipher};
pub use config::{CipherPipeConfig, GraphSettings, KeystreamSettings};
pub use error::{CipherPipeError, ErrorKind, Result, ResultExt};
pub use pipeline::{
    BufferSink, Chain, Emitter, FanoutBuilder, FanoutEmitter, FanoutFilter, Filter, FilterGraph,
    Fork, GraphBuilder, KeystreamFilter, NodeId, Passthrough, TopologyError,
};
