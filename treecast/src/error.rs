use facet::Facet;

/// Errors returned by tree primitives and the capture layer.
///
/// Everything except `UnknownIdentity` is a precondition failure reported before
/// the tree is touched. `UnknownIdentity` means a node that resolved a dispatch
/// sink has no registered identity, which connect/disconnect discipline should
/// make impossible.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum TreeError {
    /// node {node} cannot have children
    NotAContainer { node: String },

    /// node {node} is not an element
    NotAnElement { node: String },

    /// node {node} is neither a text nor a comment node
    NotCharacterData { node: String },

    /// root node {node} cannot be inserted as a child
    RootNotInsertable { node: String },

    /// inserting {node} would make it its own ancestor
    HierarchyCycle { node: String },

    /// index {index} out of bounds for {len} children
    IndexOutOfBounds { index: usize, len: usize },

    /// node {node} is not a child of {parent}
    NotAChild { node: String, parent: String },

    /// node {node} is not a root node
    NotARoot { node: String },

    /// root {node} is already observed
    AlreadyObserved { node: String },

    /// connected node {node} has no remote identity
    UnknownIdentity { node: String },
}

/// Short label for a node in error messages.
pub(crate) fn label(node: indextree::NodeId) -> String {
    format!("{node:?}")
}
