//! Filter-chain pipeline.
//!
//! Bytes flow through a graph of filter nodes. Ordinary filters form chains;
//! fan-out filters route or replicate their output across several children.
//!
//! # Architecture
//!
//! ```text
//! [KeystreamFilter] ──► [Fork] ──► [BufferSink]
//!                             ├──► [Passthrough] ──► [BufferSink]
//!                             └──► [Chain] ──► ... (owned links)
//! ```
//!
//! # Design
//!
//! - **Arena graph**: `FilterGraph` owns every node; edges are slot indices and
//!   [`NodeId`] is a typed handle checked against the owning graph.
//! - **Claimed nodes**: a node has at most one parent, so the graph is a forest.
//! - **Ownership tail**: a node destroys only the last `owned` children with itself.
//! - **Capabilities**: filters see an [`Emitter`]; wiring goes through
//!   [`GraphBuilder`] and [`FanoutBuilder`].
//! - **Message boundaries**: start and end propagate to everything reachable.

pub mod builder;
pub mod error;
pub mod graph;
pub mod id;
pub mod node;
pub mod nodes;
pub mod port;

pub use builder::{FanoutBuilder, GraphBuilder};
pub use error::TopologyError;
pub use graph::FilterGraph;
pub use id::{GraphId, NodeId};
pub use node::{AnyFilter, FanoutFilter, Filter};
pub use nodes::{BufferSink, Chain, Fork, ForkMode, KeystreamFilter, Passthrough};
pub use port::{Emitter, FanoutEmitter};
