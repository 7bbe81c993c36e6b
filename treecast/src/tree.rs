//! Arena-based node tree with injectable mutation hooks.
//!
//! All nodes of a [`Document`] live in one `indextree` arena. Nodes are created
//! detached; they only become part of a tree through [`Document::insert_child`]
//! and friends, which is also where the [`Hooks`] fire.

use compact_str::CompactString;
use indextree::{Arena, NodeId};

use crate::error::{TreeError, label};
use crate::hooks::Hooks;
use crate::protocol::{
    NODE_TYPE_COMMENT, NODE_TYPE_ELEMENT, NODE_TYPE_ROOT, NODE_TYPE_TEXT, Properties,
};
use crate::trace;

/// The arena every node of a document lives in.
pub type NodeArena = Arena<NodeKind>;

/// What goes in each arena slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Top of an observable tree. Never inserted under another node.
    Root,
    /// Element with tag and properties
    Element(ElementData),
    /// Text content
    Text(CompactString),
    /// Comment
    Comment(CompactString),
}

impl NodeKind {
    /// Numeric node type used on the wire.
    pub fn node_type(&self) -> u8 {
        match self {
            NodeKind::Root => NODE_TYPE_ROOT,
            NodeKind::Element(_) => NODE_TYPE_ELEMENT,
            NodeKind::Text(_) => NODE_TYPE_TEXT,
            NodeKind::Comment(_) => NODE_TYPE_COMMENT,
        }
    }

    /// Whether nodes of this kind may have children.
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Root | NodeKind::Element(_))
    }
}

/// Element data (tag + properties)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: CompactString,

    /// IndexMap keeps properties in the order they were first set
    pub properties: Properties,
}

/// A node tree plus the hooks its primitives report to.
///
/// Every primitive validates its preconditions first and returns an error
/// without touching the tree if they do not hold. Once the tree has changed
/// the corresponding hook runs; an error from the hook is returned as-is and
/// the change stays applied.
#[derive(Debug)]
pub struct Document<H = ()> {
    arena: NodeArena,
    hooks: H,
}

impl<H: Hooks + Default> Default for Document<H> {
    fn default() -> Self {
        Self::new(H::default())
    }
}

impl<H: Hooks> Document<H> {
    pub fn new(hooks: H) -> Self {
        Document {
            arena: Arena::new(),
            hooks,
        }
    }

    pub fn create_root(&mut self) -> NodeId {
        self.arena.new_node(NodeKind::Root)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.new_node(NodeKind::Element(ElementData {
            tag: CompactString::new(tag),
            properties: Properties::new(),
        }))
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.arena.new_node(NodeKind::Text(CompactString::new(data)))
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.arena.new_node(NodeKind::Comment(CompactString::new(data)))
    }

    /// Node data. Panics if `id` does not belong to this document.
    pub fn get(&self, id: NodeId) -> &NodeKind {
        self.arena[id].get()
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Arena and hooks at once, for hook-side operations that read the tree.
    pub(crate) fn parts_mut(&mut self) -> (&NodeArena, &mut H) {
        (&self.arena, &mut self.hooks)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        id.children(&self.arena).count()
    }

    /// Position of `id` among its parent's children, `None` when detached.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.parent(id)?;
        Some(id.preceding_siblings(&self.arena).count() - 1)
    }

    /// Value of an element property, if set.
    pub fn property(&self, element: NodeId, name: &str) -> Option<&str> {
        match self.get(element) {
            NodeKind::Element(elem) => elem.properties.get(name).map(|v| v.as_str()),
            _ => None,
        }
    }

    /// Character data of a text or comment node.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match self.get(node) {
            NodeKind::Text(data) | NodeKind::Comment(data) => Some(data.as_str()),
            _ => None,
        }
    }

    /// Insert `node` under `parent` so that it ends up at `index`.
    ///
    /// A node that already has a parent is removed from it first, which fires
    /// the remove hook for the old position before the insert hook fires.
    /// `index` counts children as they are once `node` has been taken out.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        node: NodeId,
        index: usize,
    ) -> Result<(), TreeError> {
        if !self.get(parent).is_container() {
            return Err(TreeError::NotAContainer {
                node: label(parent),
            });
        }
        if matches!(self.get(node), NodeKind::Root) {
            return Err(TreeError::RootNotInsertable { node: label(node) });
        }
        if parent.ancestors(&self.arena).any(|ancestor| ancestor == node) {
            return Err(TreeError::HierarchyCycle { node: label(node) });
        }

        let old_parent = self.parent(node);
        let len = self.child_count(parent) - usize::from(old_parent == Some(parent));
        if index > len {
            return Err(TreeError::IndexOutOfBounds { index, len });
        }

        if let Some(old_parent) = old_parent {
            self.detach_child(old_parent, node)?;
        }

        match parent.children(&self.arena).nth(index) {
            Some(next_sibling) => next_sibling.insert_before(node, &mut self.arena),
            None => parent.append(node, &mut self.arena),
        }
        trace!(?parent, ?node, index, "insert_child");

        self.hooks.insert_child(&self.arena, parent, node, index)
    }

    /// Insert `node` as the last child of `parent`, returning its index.
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<usize, TreeError> {
        let len = self.child_count(parent) - usize::from(self.parent(node) == Some(parent));
        self.insert_child(parent, node, len)?;
        Ok(len)
    }

    /// Detach `node` from `parent`, returning the index it occupied.
    pub fn remove_child(&mut self, parent: NodeId, node: NodeId) -> Result<usize, TreeError> {
        if self.parent(node) != Some(parent) {
            return Err(TreeError::NotAChild {
                node: label(node),
                parent: label(parent),
            });
        }
        self.detach_child(parent, node)
    }

    /// Replace the data of a text or comment node.
    pub fn set_text(&mut self, node: NodeId, data: &str) -> Result<(), TreeError> {
        match self.arena[node].get_mut() {
            NodeKind::Text(text) | NodeKind::Comment(text) => *text = CompactString::new(data),
            _ => return Err(TreeError::NotCharacterData { node: label(node) }),
        }
        trace!(?node, data, "set_text");

        self.hooks.set_text(&self.arena, node, data)
    }

    /// Set (or overwrite) a property on an element.
    pub fn set_property(
        &mut self,
        element: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), TreeError> {
        match self.arena[element].get_mut() {
            NodeKind::Element(elem) => {
                elem.properties
                    .insert(name.to_string(), CompactString::new(value));
            }
            _ => {
                return Err(TreeError::NotAnElement {
                    node: label(element),
                });
            }
        }
        trace!(?element, name, value, "set_property");

        self.hooks.set_property(&self.arena, element, name, value)
    }

    fn detach_child(&mut self, parent: NodeId, node: NodeId) -> Result<usize, TreeError> {
        let index = node.preceding_siblings(&self.arena).count() - 1;
        node.detach(&mut self.arena);
        trace!(?parent, ?node, index, "remove_child");

        self.hooks.remove_child(&self.arena, parent, node, index)?;
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    /// Hooks that log every call as a string.
    #[derive(Default)]
    struct Log(Vec<String>);

    impl Hooks for Log {
        fn insert_child(
            &mut self,
            _arena: &NodeArena,
            _parent: NodeId,
            _node: NodeId,
            index: usize,
        ) -> Result<(), TreeError> {
            self.0.push(format!("insert@{index}"));
            Ok(())
        }

        fn remove_child(
            &mut self,
            arena: &NodeArena,
            _parent: NodeId,
            node: NodeId,
            index: usize,
        ) -> Result<(), TreeError> {
            assert!(arena[node].parent().is_none(), "hook runs after detach");
            self.0.push(format!("remove@{index}"));
            Ok(())
        }

        fn set_text(&mut self, _arena: &NodeArena, _node: NodeId, data: &str) -> Result<(), TreeError> {
            self.0.push(format!("text={data}"));
            Ok(())
        }

        fn set_property(
            &mut self,
            _arena: &NodeArena,
            _element: NodeId,
            name: &str,
            value: &str,
        ) -> Result<(), TreeError> {
            self.0.push(format!("{name}={value}"));
            Ok(())
        }
    }

    #[test]
    fn test_insert_orders_children() {
        let mut doc: Document = Document::default();
        let root = doc.create_root();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        let c = doc.create_element("c");

        doc.insert_child(root, a, 0).unwrap();
        doc.insert_child(root, c, 1).unwrap();
        doc.insert_child(root, b, 1).unwrap();

        let children: Vec<_> = doc.children(root).collect();
        assert_eq!(children, vec![a, b, c]);
        assert_eq!(doc.index_of(b), Some(1));
        assert_eq!(doc.index_of(root), None);
    }

    #[test]
    fn test_insert_rejects_bad_index() {
        let mut doc: Document = Document::default();
        let root = doc.create_root();
        let a = doc.create_element("a");

        let err = doc.insert_child(root, a, 1).unwrap_err();
        assert_eq!(err, TreeError::IndexOutOfBounds { index: 1, len: 0 });
        assert_eq!(doc.child_count(root), 0);
    }

    #[test]
    fn test_insert_rejects_cycles_and_roots() {
        let mut doc: Document = Document::default();
        let root = doc.create_root();
        let other_root = doc.create_root();
        let outer = doc.create_element("outer");
        let inner = doc.create_element("inner");
        doc.append_child(root, outer).unwrap();
        doc.append_child(outer, inner).unwrap();

        assert!(matches!(
            doc.insert_child(inner, outer, 0),
            Err(TreeError::HierarchyCycle { .. })
        ));
        assert!(matches!(
            doc.insert_child(outer, outer, 0),
            Err(TreeError::HierarchyCycle { .. })
        ));
        assert!(matches!(
            doc.insert_child(root, other_root, 0),
            Err(TreeError::RootNotInsertable { .. })
        ));

        let text = doc.create_text("leaf");
        doc.append_child(outer, text).unwrap();
        assert!(matches!(
            doc.insert_child(text, inner, 0),
            Err(TreeError::NotAContainer { .. })
        ));
    }

    #[test]
    fn test_move_fires_remove_then_insert() {
        let mut doc = Document::new(Log::default());
        let root = doc.create_root();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(root, a).unwrap();
        doc.append_child(root, b).unwrap();

        // Move `a` after `b`: after removal only `b` remains, so index 1 is the end.
        doc.insert_child(root, a, 1).unwrap();

        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(
            doc.hooks().0,
            vec!["insert@0", "insert@1", "remove@0", "insert@1"]
        );
    }

    #[test]
    fn test_append_child_to_same_parent_moves_to_end() {
        let mut doc: Document = Document::default();
        let root = doc.create_root();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(root, a).unwrap();
        doc.append_child(root, b).unwrap();

        assert_eq!(doc.append_child(root, a).unwrap(), 1);
        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![b, a]);
    }

    #[test]
    fn test_remove_child_reports_index() {
        let mut doc = Document::new(Log::default());
        let root = doc.create_root();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(root, a).unwrap();
        doc.append_child(root, b).unwrap();

        assert_eq!(doc.remove_child(root, b).unwrap(), 1);
        assert!(matches!(
            doc.remove_child(root, b),
            Err(TreeError::NotAChild { .. })
        ));
        assert_eq!(doc.hooks().0.last().map(String::as_str), Some("remove@1"));
    }

    #[test]
    fn test_set_text_and_property() {
        let mut doc = Document::new(Log::default());
        let el = doc.create_element("button");
        let text = doc.create_text("old");
        let comment = doc.create_comment("note");

        doc.set_text(text, "new").unwrap();
        doc.set_text(comment, "changed").unwrap();
        doc.set_property(el, "color", "red").unwrap();

        assert_eq!(doc.text(text), Some("new"));
        assert_eq!(doc.text(comment), Some("changed"));
        assert_eq!(doc.property(el, "color"), Some("red"));
        assert_eq!(doc.hooks().0, vec!["text=new", "text=changed", "color=red"]);

        assert!(matches!(
            doc.set_text(el, "nope"),
            Err(TreeError::NotCharacterData { .. })
        ));
        assert!(matches!(
            doc.set_property(text, "color", "red"),
            Err(TreeError::NotAnElement { .. })
        ));
        assert_eq!(doc.hooks().0.len(), 3);
    }

    #[test]
    fn test_node_types() {
        let mut doc: Document = Document::default();
        let root = doc.create_root();
        let el = doc.create_element("div");
        let text = doc.create_text("t");
        let comment = doc.create_comment("c");
        assert_eq!(doc.get(root).node_type(), NODE_TYPE_ROOT);
        assert_eq!(doc.get(el).node_type(), NODE_TYPE_ELEMENT);
        assert_eq!(doc.get(text).node_type(), NODE_TYPE_TEXT);
        assert_eq!(doc.get(comment).node_type(), NODE_TYPE_COMMENT);
        assert!(!doc.get(text).is_container());
    }
}
