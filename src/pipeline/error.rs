//! Topology error types.

use crate::pipeline::id::NodeId;
use thiserror::Error;

/// Reasons a graph mutation is refused.
///
/// These are always reported to the caller performing the mutation; the
/// graph is left exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Node {node} ('{name}') does not accept attachments")]
    NotAttachable { node: NodeId, name: String },

    #[error("Node {node} is already attached to a pipeline")]
    AlreadyClaimed { node: NodeId },

    #[error("Port {port} out of range for node {node} ({total} ports)")]
    PortOutOfRange {
        node: NodeId,
        port: usize,
        total: usize,
    },

    #[error("Unknown node {node}")]
    UnknownNode { node: NodeId },

    #[error("Node {node} belongs to a different graph")]
    ForeignNode { node: NodeId },

    #[error("Attaching {child} below {parent} would create a cycle")]
    WouldCreateCycle { parent: NodeId, child: NodeId },

    #[error("Node {node} cannot own {owned} of its {ports} downstream nodes")]
    OwnershipExceedsPorts {
        node: NodeId,
        owned: usize,
        ports: usize,
    },

    #[error("Node {node} is still attached; destroy its owner instead")]
    StillAttached { node: NodeId },

    #[error("Node {node} is not a fan-out node")]
    NotFanout { node: NodeId },
}
