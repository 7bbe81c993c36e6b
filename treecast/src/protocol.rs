//! Wire protocol shared with the remote mirror.
//!
//! A dispatched [`Batch`] is an ordered list of [`Mutation`] records. Nodes are
//! referred to by [`RemoteId`] only; newly inserted subtrees travel as
//! [`SerializedNode`] snapshots.

use compact_str::CompactString;
use facet::Facet;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt;

pub const NODE_TYPE_ELEMENT: u8 = 1;
pub const NODE_TYPE_TEXT: u8 = 3;
pub const NODE_TYPE_COMMENT: u8 = 8;
pub const NODE_TYPE_ROOT: u8 = 9;

pub const MUTATION_TYPE_INSERT_CHILD: u8 = 0;
pub const MUTATION_TYPE_REMOVE_CHILD: u8 = 1;
pub const MUTATION_TYPE_UPDATE_TEXT: u8 = 2;
pub const MUTATION_TYPE_UPDATE_PROPERTY: u8 = 3;

/// Identity reserved for the root of every observed tree.
pub const ROOT_ID: &str = "~";

/// Element properties, in the order they were first set.
pub type Properties = IndexMap<String, CompactString>;

/// Stable key naming a connected node on the other side of the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Facet)]
#[facet(transparent)]
pub struct RemoteId(pub CompactString);

impl RemoteId {
    /// The sentinel identity of an observed root.
    pub fn root() -> Self {
        RemoteId(CompactString::new(ROOT_ID))
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for RemoteId {
    fn from(s: &str) -> Self {
        RemoteId(CompactString::new(s))
    }
}

impl PartialEq<str> for RemoteId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for RemoteId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Snapshot of a node and its descendants at the moment it was inserted.
///
/// Which optional fields are present depends on `kind`:
/// - elements carry `element` (tag), `properties` and `children`
/// - text and comment nodes carry `text`
/// - roots carry `children`
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct SerializedNode {
    pub kind: u8,
    pub id: RemoteId,
    #[facet(default, skip_serializing_if = Option::is_none)]
    pub element: Option<CompactString>,
    #[facet(default, skip_serializing_if = Option::is_none)]
    pub properties: Option<Properties>,
    #[facet(default, skip_serializing_if = Option::is_none)]
    pub text: Option<CompactString>,
    #[facet(default, skip_serializing_if = Option::is_none)]
    pub children: Option<Vec<SerializedNode>>,
}

impl SerializedNode {
    /// Children in order, or an empty slice for leaf kinds.
    pub fn child_nodes(&self) -> &[SerializedNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Number of nodes in this snapshot, itself included.
    pub fn node_count(&self) -> usize {
        1 + self
            .child_nodes()
            .iter()
            .map(SerializedNode::node_count)
            .sum::<usize>()
    }
}

/// One change to an observed tree.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
#[repr(u8)]
pub enum Mutation {
    /// `node` was inserted under `parent` at `index`.
    InsertChild {
        parent: RemoteId,
        node: SerializedNode,
        index: usize,
    },
    /// The child of `parent` at `index` was removed.
    RemoveChild { parent: RemoteId, index: usize },
    /// Character data of a text or comment node changed.
    UpdateText { id: RemoteId, text: CompactString },
    /// A property of an element changed.
    UpdateProperty {
        id: RemoteId,
        name: String,
        value: CompactString,
    },
}

impl Mutation {
    /// Numeric tag this record carries on the wire.
    pub fn kind(&self) -> u8 {
        match self {
            Mutation::InsertChild { .. } => MUTATION_TYPE_INSERT_CHILD,
            Mutation::RemoveChild { .. } => MUTATION_TYPE_REMOVE_CHILD,
            Mutation::UpdateText { .. } => MUTATION_TYPE_UPDATE_TEXT,
            Mutation::UpdateProperty { .. } => MUTATION_TYPE_UPDATE_PROPERTY,
        }
    }

    /// Identity of the node this record targets (the parent, for structural records).
    pub fn target(&self) -> &RemoteId {
        match self {
            Mutation::InsertChild { parent, .. } | Mutation::RemoveChild { parent, .. } => parent,
            Mutation::UpdateText { id, .. } | Mutation::UpdateProperty { id, .. } => id,
        }
    }

    /// Positional form, `[kind, ...payload]`.
    pub fn to_wire(&self) -> WireMutation {
        WireMutation::from(self)
    }
}

/// Records emitted for one triggering operation, in order. Interceptors emit
/// a single record, so one fits inline.
pub type Batch = SmallVec<[Mutation; 1]>;

/// Positional encoding of a [`Mutation`]; serializes as a bare array whose
/// first element is the mutation tag.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
#[facet(untagged)]
#[repr(u8)]
pub enum WireMutation {
    InsertChild(u8, RemoteId, SerializedNode, usize),
    RemoveChild(u8, RemoteId, usize),
    UpdateText(u8, RemoteId, CompactString),
    UpdateProperty(u8, RemoteId, String, CompactString),
}

impl From<&Mutation> for WireMutation {
    fn from(mutation: &Mutation) -> Self {
        let kind = mutation.kind();
        match mutation {
            Mutation::InsertChild {
                parent,
                node,
                index,
            } => WireMutation::InsertChild(kind, parent.clone(), node.clone(), *index),
            Mutation::RemoveChild { parent, index } => {
                WireMutation::RemoveChild(kind, parent.clone(), *index)
            }
            Mutation::UpdateText { id, text } => {
                WireMutation::UpdateText(kind, id.clone(), text.clone())
            }
            Mutation::UpdateProperty { id, name, value } => {
                WireMutation::UpdateProperty(kind, id.clone(), name.clone(), value.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    fn leaf(id: &str) -> SerializedNode {
        SerializedNode {
            kind: NODE_TYPE_TEXT,
            id: RemoteId::from(id),
            element: None,
            properties: None,
            text: Some("x".into()),
            children: None,
        }
    }

    #[test]
    fn root_id_is_sentinel() {
        assert!(RemoteId::root().is_root());
        assert_eq!(RemoteId::root(), ROOT_ID);
        assert!(!RemoteId::from("1").is_root());
    }

    #[test]
    fn mutation_kinds_match_wire_tags() {
        let insert = Mutation::InsertChild {
            parent: RemoteId::root(),
            node: leaf("1"),
            index: 0,
        };
        let remove = Mutation::RemoveChild {
            parent: RemoteId::root(),
            index: 0,
        };
        let text = Mutation::UpdateText {
            id: RemoteId::from("1"),
            text: "hi".into(),
        };
        let prop = Mutation::UpdateProperty {
            id: RemoteId::from("2"),
            name: "color".to_string(),
            value: "blue".into(),
        };
        assert_eq!(insert.kind(), 0);
        assert_eq!(remove.kind(), 1);
        assert_eq!(text.kind(), 2);
        assert_eq!(prop.kind(), 3);
        assert_eq!(prop.target(), &"2");
        assert_eq!(remove.target(), &RemoteId::root());
    }

    #[test]
    fn wire_form_carries_tag_first() {
        let prop = Mutation::UpdateProperty {
            id: RemoteId::from("4"),
            name: "color".to_string(),
            value: "blue".into(),
        };
        assert_eq!(
            prop.to_wire(),
            WireMutation::UpdateProperty(
                MUTATION_TYPE_UPDATE_PROPERTY,
                RemoteId::from("4"),
                "color".to_string(),
                "blue".into()
            )
        );
    }

    #[test]
    fn node_count_includes_descendants() {
        let mut parent = SerializedNode {
            kind: NODE_TYPE_ELEMENT,
            id: RemoteId::from("1"),
            element: Some("div".into()),
            properties: Some(Properties::new()),
            text: None,
            children: Some(vec![leaf("2"), leaf("3")]),
        };
        assert_eq!(parent.node_count(), 3);
        parent.children = None;
        assert_eq!(parent.node_count(), 1);
        assert!(parent.child_nodes().is_empty());
    }
}
