//! Filter abstraction for the pipeline.
//!
//! Two-layer design:
//! - **`Filter` trait**: ordinary stages (ciphers, encoders, sinks). They see
//!   only their input and an [`Emitter`] to send output through.
//! - **`FanoutFilter` trait**: stages that route or replicate across several
//!   children. They receive a [`FanoutEmitter`] with port control.
//!
//! `AnyFilter` wraps either kind so the graph can handle both uniformly.

use crate::error::Result;
use crate::pipeline::port::{Emitter, FanoutEmitter};

/// A pipeline stage.
pub trait Filter: Send {
    /// Human-readable name of this filter.
    fn name(&self) -> &str;

    /// Consume all of `input`, sending any derived output through `out`.
    fn write(&mut self, input: &[u8], out: &mut Emitter) -> Result<()>;

    /// Called before the first write of a message.
    fn start_message(&mut self, _out: &mut Emitter) -> Result<()> {
        Ok(())
    }

    /// Called after the last write of a message; flush any buffered state here.
    fn end_message(&mut self, _out: &mut Emitter) -> Result<()> {
        Ok(())
    }

    /// Whether further nodes may be appended after this one.
    fn is_attachable(&self) -> bool {
        true
    }
}

/// A pipeline stage with control over which children receive its output.
pub trait FanoutFilter: Send {
    fn name(&self) -> &str;

    fn write(&mut self, input: &[u8], out: &mut FanoutEmitter<'_>) -> Result<()>;

    fn start_message(&mut self, _out: &mut FanoutEmitter<'_>) -> Result<()> {
        Ok(())
    }

    fn end_message(&mut self, _out: &mut FanoutEmitter<'_>) -> Result<()> {
        Ok(())
    }

    fn is_attachable(&self) -> bool {
        true
    }
}

/// Wrapper that holds either an ordinary or a fan-out filter.
pub enum AnyFilter {
    Plain(Box<dyn Filter>),
    Fanout(Box<dyn FanoutFilter>),
}

impl AnyFilter {
    pub fn name(&self) -> &str {
        match self {
            AnyFilter::Plain(f) => f.name(),
            AnyFilter::Fanout(f) => f.name(),
        }
    }

    pub fn is_attachable(&self) -> bool {
        match self {
            AnyFilter::Plain(f) => f.is_attachable(),
            AnyFilter::Fanout(f) => f.is_attachable(),
        }
    }

    pub fn is_fanout(&self) -> bool {
        matches!(self, AnyFilter::Fanout(_))
    }

    pub(crate) fn write(&mut self, input: &[u8], out: &mut Emitter) -> Result<()> {
        match self {
            AnyFilter::Plain(f) => f.write(input, out),
            AnyFilter::Fanout(f) => f.write(input, &mut FanoutEmitter::new(out)),
        }
    }

    pub(crate) fn start_message(&mut self, out: &mut Emitter) -> Result<()> {
        match self {
            AnyFilter::Plain(f) => f.start_message(out),
            AnyFilter::Fanout(f) => f.start_message(&mut FanoutEmitter::new(out)),
        }
    }

    pub(crate) fn end_message(&mut self, out: &mut Emitter) -> Result<()> {
        match self {
            AnyFilter::Plain(f) => f.end_message(out),
            AnyFilter::Fanout(f) => f.end_message(&mut FanoutEmitter::new(out)),
        }
    }
}

impl std::fmt::Debug for AnyFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnyFilter::Plain(inner) => write!(f, "Plain({})", inner.name()),
            AnyFilter::Fanout(inner) => write!(f, "Fanout({})", inner.name()),
        }
    }
}
