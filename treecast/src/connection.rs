//! Connection tracking: which sink, if any, each node currently reports to.

use indextree::NodeId;

use crate::dispatch::SinkId;
use crate::identity::{IdentityRegistry, NodeMap};
use crate::trace;
use crate::tree::NodeArena;

/// Side-table from connected nodes to the sink of the root that owns them.
#[derive(Debug, Default)]
pub struct ConnectionTracker {
    sinks: NodeMap<SinkId>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink `node` reports to, `None` when no observed root reaches it.
    pub fn sink_of(&self, node: NodeId) -> Option<SinkId> {
        self.sinks.get(&node).copied()
    }

    /// Connect `node` and every descendant to `sink`, pre-order.
    ///
    /// Nodes without an identity get one. A node bound to another sink is
    /// re-bound; a node already bound to `sink` is left as it is. Returns how
    /// many nodes were newly bound or re-bound.
    pub fn connect(
        &mut self,
        arena: &NodeArena,
        registry: &mut IdentityRegistry,
        node: NodeId,
        sink: SinkId,
    ) -> usize {
        let mut bound = 0;
        for descendant in node.descendants(arena) {
            registry.assign(descendant);
            if self.sinks.insert(descendant, sink) != Some(sink) {
                bound += 1;
            }
        }
        trace!(?node, %sink, bound, "connected subtree");
        bound
    }

    /// Release identity and sink of `node` and every descendant, pre-order.
    /// Returns how many nodes were connected.
    pub fn disconnect(
        &mut self,
        arena: &NodeArena,
        registry: &mut IdentityRegistry,
        node: NodeId,
    ) -> usize {
        let mut released = 0;
        for descendant in node.descendants(arena) {
            registry.release(descendant);
            if self.sinks.remove(&descendant).is_some() {
                released += 1;
            }
        }
        trace!(?node, released, "disconnected subtree");
        released
    }

    /// Number of nodes currently connected to any sink.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}
