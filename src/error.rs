//! Error handling for cipherpipe
//!
//! This module defines the crate error type and a Result alias used
//! throughout the library. Every error is a programmer or configuration
//! error: nothing is retried internally and nothing is partially applied.

use crate::pipeline::error::TopologyError;
use crate::pipeline::id::NodeId;
use thiserror::Error;

/// Coarse classification of a [`CipherPipeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Graph construction was rejected.
    Topology,
    /// A key was outside the supported length range.
    Key,
    /// An operation was issued in the wrong lifecycle state.
    State,
    /// Configuration could not be loaded, saved or validated.
    Config,
    /// Underlying I/O failure.
    Io,
    /// A filter implementation reported a failure of its own.
    Filter,
}

/// Main error type for cipherpipe operations
#[derive(Error, Debug)]
pub enum CipherPipeError {
    /// Rejected graph mutation
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    /// Key outside the algorithm's accepted range
    #[error("Invalid key length {length} for {algorithm}: expected {min}..={max} bytes")]
    InvalidKeyLength {
        algorithm: String,
        length: usize,
        min: usize,
        max: usize,
    },

    /// Engine used after `clear()` without being rekeyed
    #[error("{algorithm} has been cleared and must be rekeyed before use")]
    EngineCleared { algorithm: String },

    /// Write or end-of-message on a node outside a message
    #[error("No message is open on node {node}")]
    MessageNotStarted { node: NodeId },

    /// Start-of-message on a node that is already inside one
    #[error("A message is already open on node {node}")]
    MessageAlreadyStarted { node: NodeId },

    /// Message boundary driven from a node that has a parent
    #[error("Node {node} is attached below another node; open and close messages at its root")]
    NotMessageRoot { node: NodeId },

    /// Graph mutation attempted while a message is being processed
    #[error("Cannot modify the graph while a message is in progress")]
    MessageInProgress,

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure raised by a filter implementation
    #[error("Filter '{filter}' failed: {message}")]
    Filter { filter: String, message: String },

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CipherPipeError>,
    },
}

impl CipherPipeError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CipherPipeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a filter error
    pub fn filter(filter: impl Into<String>, message: impl Into<String>) -> Self {
        CipherPipeError::Filter {
            filter: filter.into(),
            message: message.into(),
        }
    }

    /// Classify this error, looking through any added context.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CipherPipeError::Topology(_) => ErrorKind::Topology,
            CipherPipeError::InvalidKeyLength { .. } => ErrorKind::Key,
            CipherPipeError::EngineCleared { .. }
            | CipherPipeError::MessageNotStarted { .. }
            | CipherPipeError::MessageAlreadyStarted { .. }
            | CipherPipeError::NotMessageRoot { .. }
            | CipherPipeError::MessageInProgress => ErrorKind::State,
            CipherPipeError::Config(_) => ErrorKind::Config,
            CipherPipeError::Io(_) => ErrorKind::Io,
            CipherPipeError::Filter { .. } => ErrorKind::Filter,
            CipherPipeError::WithContext { source, .. } => source.kind(),
        }
    }
}

/// Result type alias for cipherpipe operations
pub type Result<T> = std::result::Result<T, CipherPipeError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
