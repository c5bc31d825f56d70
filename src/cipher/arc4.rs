//! Alleged RC4 keystream engine.
//!
//! The engine keeps a 256-byte permutation and two cursors. Keystream is
//! generated a block at a time into an internal buffer and consumed from
//! there, so splitting input across calls never changes the output.
//!
//! An optional drop count discards the start of the keystream right after
//! key scheduling. Dropping 256 bytes gives the variant known as MARK-4.

use crate::cipher::stream::{KeyLength, StreamCipher};
use crate::config::{KeystreamSettings, MARK4_DROP};
use crate::error::{CipherPipeError, Result};
use std::fmt;
use zeroize::Zeroize;

/// Key sizes accepted by ARC4
pub const ARC4_KEY_LENGTH: KeyLength = KeyLength::new(1, 256);

pub struct Arc4 {
    state: [u8; 256],
    x: u8,
    y: u8,
    buffer: Box<[u8]>,
    /// Bytes of `buffer` already consumed.
    position: usize,
    drop: usize,
    keyed: bool,
}

impl Arc4 {
    /// Key a plain ARC4 engine with the default block size.
    pub fn new(key: &[u8]) -> Result<Self> {
        Self::with_settings(key, &KeystreamSettings::default())
    }

    /// Key an engine that discards the first `drop` keystream bytes.
    pub fn with_drop(key: &[u8], drop: usize) -> Result<Self> {
        Self::with_settings(key, &KeystreamSettings::default().with_drop(drop))
    }

    pub fn with_settings(key: &[u8], settings: &KeystreamSettings) -> Result<Self> {
        let mut engine = Self::unkeyed(settings)?;
        engine.set_key(key)?;
        Ok(engine)
    }

    /// An engine with no key scheduled. `set_key` must be called before use.
    pub fn unkeyed(settings: &KeystreamSettings) -> Result<Self> {
        if settings.block_size == 0 {
            return Err(CipherPipeError::Config(
                "keystream.block_size must be non-zero".to_string(),
            ));
        }
        Ok(Self::blank(settings.drop, settings.block_size))
    }

    /// A new unkeyed engine with the same drop count and block size.
    pub fn fresh(&self) -> Self {
        Self::blank(self.drop, self.buffer.len())
    }

    fn blank(drop: usize, block_size: usize) -> Self {
        Self {
            state: [0; 256],
            x: 0,
            y: 0,
            buffer: vec![0; block_size].into_boxed_slice(),
            position: block_size,
            drop,
            keyed: false,
        }
    }

    pub fn drop_count(&self) -> usize {
        self.drop
    }

    pub fn block_size(&self) -> usize {
        self.buffer.len()
    }

    fn schedule(&mut self, key: &[u8]) {
        for (i, slot) in self.state.iter_mut().enumerate() {
            *slot = i as u8;
        }
        let mut j: u8 = 0;
        for i in 0..256 {
            j = j.wrapping_add(self.state[i]).wrapping_add(key[i % key.len()]);
            self.state.swap(i, j as usize);
        }
        self.x = 0;
        self.y = 0;
        self.position = self.buffer.len();
        self.keyed = true;
        self.skip(self.drop);
    }

    /// Refill the output buffer with the next block of keystream.
    fn generate(&mut self) {
        for out in self.buffer.iter_mut() {
            self.x = self.x.wrapping_add(1);
            let sx = self.state[self.x as usize];
            self.y = self.y.wrapping_add(sx);
            let sy = self.state[self.y as usize];
            self.state[self.x as usize] = sy;
            self.state[self.y as usize] = sx;
            *out = self.state[sx.wrapping_add(sy) as usize];
        }
        self.position = 0;
    }

    fn skip(&mut self, mut count: usize) {
        while count > 0 {
            if self.position == self.buffer.len() {
                self.generate();
            }
            let step = count.min(self.buffer.len() - self.position);
            self.position += step;
            count -= step;
        }
    }

    #[cfg(test)]
    pub(crate) fn raw_state(&self) -> (&[u8; 256], &[u8], u8, u8, usize) {
        (&self.state, &self.buffer[..], self.x, self.y, self.position)
    }
}

impl StreamCipher for Arc4 {
    fn name(&self) -> String {
        match self.drop {
            0 => "ARC4".to_string(),
            MARK4_DROP => "MARK-4".to_string(),
            n => format!("RC4_skip({})", n),
        }
    }

    fn key_length(&self) -> KeyLength {
        ARC4_KEY_LENGTH
    }

    fn set_key(&mut self, key: &[u8]) -> Result<()> {
        ARC4_KEY_LENGTH.check(&self.name(), key.len())?;
        self.clear();
        self.schedule(key);
        Ok(())
    }

    fn is_keyed(&self) -> bool {
        self.keyed
    }

    fn apply_keystream(&mut self, buf: &mut [u8]) -> Result<()> {
        if !self.keyed {
            return Err(CipherPipeError::EngineCleared {
                algorithm: self.name(),
            });
        }

        let mut done = 0;
        while done < buf.len() {
            if self.position == self.buffer.len() {
                self.generate();
            }
            let take = (buf.len() - done).min(self.buffer.len() - self.position);
            let keystream = &self.buffer[self.position..self.position + take];
            for (byte, k) in buf[done..done + take].iter_mut().zip(keystream) {
                *byte ^= k;
            }
            self.position += take;
            done += take;
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.state.zeroize();
        self.buffer[..].zeroize();
        self.x.zeroize();
        self.y.zeroize();
        self.position = self.buffer.len();
        self.keyed = false;
    }
}

impl Drop for Arc4 {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for Arc4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arc4")
            .field("name", &self.name())
            .field("block_size", &self.buffer.len())
            .field("keyed", &self.keyed)
            .finish_non_exhaustive()
    }
}
