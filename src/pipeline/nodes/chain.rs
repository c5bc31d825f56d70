//! Chain: a node that owns a linear run of filters below it.
//!
//! Destroying the chain node destroys every filter it was built from.

use crate::error::Result;
use crate::pipeline::graph::FilterGraph;
use crate::pipeline::id::NodeId;
use crate::pipeline::node::FanoutFilter;
use crate::pipeline::port::FanoutEmitter;

#[derive(Debug, Default)]
pub struct Chain;

impl Chain {
    /// Add a chain node to `graph` and link `links` below it in order.
    ///
    /// On failure the chain node is removed again and the links are left
    /// unclaimed.
    pub fn build(graph: &mut FilterGraph, links: &[NodeId]) -> Result<NodeId> {
        let chain = graph.add_fanout(Chain);
        let linked = graph
            .fanout(chain)
            .and_then(|mut fan| fan.attach_owned_chain(links));
        if let Err(e) = linked {
            graph.destroy(chain)?;
            return Err(e);
        }
        tracing::debug!("Built chain {} over {} filters", chain, links.len());
        Ok(chain)
    }
}

impl FanoutFilter for Chain {
    fn name(&self) -> &str {
        "Chain"
    }

    fn write(&mut self, input: &[u8], out: &mut FanoutEmitter<'_>) -> Result<()> {
        out.send(input);
        Ok(())
    }
}
