//! Subtree serialization into [`SerializedNode`] snapshots.

use indextree::NodeId;

use crate::identity::IdentityRegistry;
use crate::protocol::SerializedNode;
use crate::tree::{NodeArena, NodeKind};

/// Snapshot `node` and all of its descendants, pre-order.
///
/// Every node in the subtree gets an identity from `registry` (nodes that
/// already have one keep it). Nothing is cached: each call reflects the arena
/// as it is now.
pub fn serialize_node(
    arena: &NodeArena,
    registry: &mut IdentityRegistry,
    node: NodeId,
) -> SerializedNode {
    let id = registry.assign(node).clone();
    let data = arena[node].get();
    let kind = data.node_type();

    match data {
        NodeKind::Element(elem) => SerializedNode {
            kind,
            id,
            element: Some(elem.tag.clone()),
            properties: Some(elem.properties.clone()),
            text: None,
            children: Some(serialize_children(arena, registry, node)),
        },
        NodeKind::Text(text) | NodeKind::Comment(text) => SerializedNode {
            kind,
            id,
            element: None,
            properties: None,
            text: Some(text.clone()),
            children: None,
        },
        NodeKind::Root => SerializedNode {
            kind,
            id,
            element: None,
            properties: None,
            text: None,
            children: Some(serialize_children(arena, registry, node)),
        },
    }
}

fn serialize_children(
    arena: &NodeArena,
    registry: &mut IdentityRegistry,
    node: NodeId,
) -> Vec<SerializedNode> {
    node.children(arena)
        .map(|child| serialize_node(arena, registry, child))
        .collect()
}
