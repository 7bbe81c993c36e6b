//! Indented text rendering of a subtree, for logs and test failures.

use std::fmt;

use indextree::NodeId;

use crate::capture::Capture;
use crate::hooks::Hooks;
use crate::identity::IdentityRegistry;
use crate::tree::{Document, NodeArena, NodeKind};

/// Displays a subtree one node per line, each tagged with its remote identity
/// (`-` when it has none) if a registry is attached.
pub struct TreeDump<'a> {
    arena: &'a NodeArena,
    node: NodeId,
    registry: Option<&'a IdentityRegistry>,
}

impl<'a> TreeDump<'a> {
    pub fn new(arena: &'a NodeArena, node: NodeId) -> Self {
        TreeDump {
            arena,
            node,
            registry: None,
        }
    }

    pub fn with_identities(mut self, registry: &'a IdentityRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, node: NodeId, depth: usize) -> fmt::Result {
        write!(f, "{}", "  ".repeat(depth))?;
        match self.arena[node].get() {
            NodeKind::Root => write!(f, "#root")?,
            NodeKind::Element(elem) => {
                write!(f, "<{}>", elem.tag)?;
                for (name, value) in &elem.properties {
                    write!(f, " {name}={value:?}")?;
                }
            }
            NodeKind::Text(text) => write!(f, "#text {text:?}")?,
            NodeKind::Comment(text) => write!(f, "#comment {text:?}")?,
        }
        if let Some(registry) = self.registry {
            match registry.get(node) {
                Some(id) => write!(f, " [{id}]")?,
                None => write!(f, " [-]")?,
            }
        }
        writeln!(f)?;

        for child in node.children(self.arena) {
            self.fmt_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.node, 0)
    }
}

impl<H: Hooks> Document<H> {
    /// Render the subtree under `node`.
    pub fn dump(&self, node: NodeId) -> TreeDump<'_> {
        TreeDump::new(self.arena(), node)
    }
}

impl Document<Capture> {
    /// Render the subtree under `node` with remote identities.
    pub fn dump_observed(&self, node: NodeId) -> TreeDump<'_> {
        self.dump(node).with_identities(self.hooks().registry())
    }
}
