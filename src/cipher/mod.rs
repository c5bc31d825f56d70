//! Keystream ciphers.
//!
//! [`StreamCipher`] is the interface a keystream stage drives; [`Arc4`] is
//! the engine shipped with the crate. Wrap any engine in a
//! [`KeystreamFilter`](crate::pipeline::nodes::KeystreamFilter) to use it as a
//! pipeline stage.

pub mod arc4;
pub mod stream;

pub use arc4::{Arc4, ARC4_KEY_LENGTH};
pub use stream::{KeyLength, StreamCipher};
