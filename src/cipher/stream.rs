//! Keystream cipher interface.

use crate::error::{CipherPipeError, Result};

/// Accepted key sizes for a keyed algorithm, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLength {
    pub min: usize,
    pub max: usize,
    /// Key lengths must be a multiple of this.
    pub multiple: usize,
}

impl KeyLength {
    pub const fn new(min: usize, max: usize) -> Self {
        Self {
            min,
            max,
            multiple: 1,
        }
    }

    pub fn is_valid(&self, length: usize) -> bool {
        length >= self.min && length <= self.max && length % self.multiple.max(1) == 0
    }

    /// Check `length`, naming `algorithm` in the error.
    pub fn check(&self, algorithm: &str, length: usize) -> Result<()> {
        if self.is_valid(length) {
            Ok(())
        } else {
            Err(CipherPipeError::InvalidKeyLength {
                algorithm: algorithm.to_string(),
                length,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// A keyed generator whose output is XORed against data.
///
/// Encryption and decryption are the same operation. Each logical stream
/// needs its own instance: the engine's position in the keystream is its state.
pub trait StreamCipher: Send {
    /// Stable algorithm identifier.
    fn name(&self) -> String;

    fn key_length(&self) -> KeyLength;

    /// Schedule a new key, replacing any previous state.
    fn set_key(&mut self, key: &[u8]) -> Result<()>;

    /// Whether a key is scheduled and the engine can be used.
    fn is_keyed(&self) -> bool;

    /// XOR the next `buf.len()` keystream bytes into `buf`.
    fn apply_keystream(&mut self, buf: &mut [u8]) -> Result<()>;

    /// XOR the keystream against `input`, returning a new buffer of equal length.
    fn transform(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = input.to_vec();
        self.apply_keystream(&mut out)?;
        Ok(out)
    }

    /// Wipe all key-derived state. The engine is unusable until rekeyed.
    fn clear(&mut self);
}
