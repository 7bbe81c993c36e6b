//! Identity registry: the side-table from connected nodes to remote identities.

use compact_str::format_compact;
use indextree::NodeId;
use rapidhash::RapidHashMap;

use crate::error::{TreeError, label};
use crate::protocol::RemoteId;

pub(crate) type NodeMap<V> = RapidHashMap<NodeId, V>;

/// Remote identities of every connected node.
///
/// Identities are minted from a counter that never goes backwards, so a node
/// that is disconnected and later reconnected gets a fresh identity and no two
/// live nodes can ever share one. Roots hold the sentinel `"~"` instead.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    ids: NodeMap<RemoteId>,
    next: u64,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity of `node`, minting one if it has none yet.
    pub fn assign(&mut self, node: NodeId) -> &RemoteId {
        let next = &mut self.next;
        self.ids.entry(node).or_insert_with(|| {
            *next += 1;
            RemoteId(format_compact!("{next}"))
        })
    }

    /// Give `node` the root sentinel.
    pub fn assign_root(&mut self, node: NodeId) {
        self.ids.insert(node, RemoteId::root());
    }

    /// Forget the identity of `node`. Returns what it was, if anything.
    pub fn release(&mut self, node: NodeId) -> Option<RemoteId> {
        self.ids.remove(&node)
    }

    /// Identity of a node that is expected to be connected.
    pub fn identity_of(&self, node: NodeId) -> Result<&RemoteId, TreeError> {
        self.ids
            .get(&node)
            .ok_or_else(|| TreeError::UnknownIdentity { node: label(node) })
    }

    pub fn get(&self, node: NodeId) -> Option<&RemoteId> {
        self.ids.get(&node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.ids.contains_key(&node)
    }

    /// Number of nodes currently holding an identity.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
