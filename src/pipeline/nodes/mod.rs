//! Built-in pipeline filters.

pub mod chain;
pub mod fork;
pub mod keystream;
pub mod passthrough;
pub mod sink;

pub use chain::Chain;
pub use fork::{Fork, ForkMode};
pub use keystream::KeystreamFilter;
pub use passthrough::Passthrough;
pub use sink::BufferSink;
