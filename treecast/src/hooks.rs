//! Interception points fired by [`Document`](crate::Document) primitives.

use crate::error::TreeError;
use crate::tree::NodeArena;
use indextree::NodeId;

/// Receives every structural and content change made through a
/// [`Document`](crate::Document), synchronously, after the tree has been
/// updated and before the primitive returns.
///
/// All methods default to doing nothing; `()` is the hook set of a tree
/// nobody observes.
pub trait Hooks {
    /// `node` now sits at `index` among `parent`'s children.
    fn insert_child(
        &mut self,
        _arena: &NodeArena,
        _parent: NodeId,
        _node: NodeId,
        _index: usize,
    ) -> Result<(), TreeError> {
        Ok(())
    }

    /// `node` was detached from `parent`, where it used to sit at `index`.
    /// Its subtree is still intact in `arena`.
    fn remove_child(
        &mut self,
        _arena: &NodeArena,
        _parent: NodeId,
        _node: NodeId,
        _index: usize,
    ) -> Result<(), TreeError> {
        Ok(())
    }

    /// Character data of a text or comment node was replaced.
    fn set_text(&mut self, _arena: &NodeArena, _node: NodeId, _data: &str) -> Result<(), TreeError> {
        Ok(())
    }

    /// A property of an element was set.
    fn set_property(
        &mut self,
        _arena: &NodeArena,
        _element: NodeId,
        _name: &str,
        _value: &str,
    ) -> Result<(), TreeError> {
        Ok(())
    }
}

impl Hooks for () {}
