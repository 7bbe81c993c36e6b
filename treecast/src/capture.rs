//! Mutation capture: the [`Hooks`] implementation that turns tree primitives
//! into mutation records for observed roots.
//!
//! A node is observed when the [`ConnectionTracker`] maps it to a sink. Each
//! interceptor resolves that sink from the node the primitive targeted (the
//! parent, for structural changes) and does nothing at all when there is none.
//! Otherwise it updates the side-tables, builds exactly one record and
//! dispatches it as a batch of one before the primitive returns.

use std::fmt;

use indextree::NodeId;
use smallvec::smallvec;

use crate::connection::ConnectionTracker;
use crate::dispatch::{Dispatch, SinkId};
use crate::error::{TreeError, label};
use crate::hooks::Hooks;
use crate::identity::IdentityRegistry;
use crate::protocol::{Batch, Mutation, RemoteId};
use crate::serialize::serialize_node;
use crate::tree::{Document, NodeArena, NodeKind};
use crate::{debug, trace};

struct Observed {
    root: NodeId,
    sink: Box<dyn Dispatch>,
}

/// Identity registry, connection tracker and the sinks of every observed root.
#[derive(Default)]
pub struct Capture {
    registry: IdentityRegistry,
    connections: ConnectionTracker,
    /// Indexed by `SinkId`; `None` once unobserved. Slots are never reused.
    observed: Vec<Option<Observed>>,
}

impl fmt::Debug for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roots: Vec<_> = self
            .observed
            .iter()
            .flatten()
            .map(|observed| observed.root)
            .collect();
        f.debug_struct("Capture")
            .field("registry", &self.registry)
            .field("connections", &self.connections)
            .field("roots", &roots)
            .finish()
    }
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn connections(&self) -> &ConnectionTracker {
        &self.connections
    }

    /// Identity of a connected node.
    pub fn identity_of(&self, node: NodeId) -> Result<&RemoteId, TreeError> {
        self.registry.identity_of(node)
    }

    pub fn try_identity_of(&self, node: NodeId) -> Option<&RemoteId> {
        self.registry.get(node)
    }

    pub fn sink_of(&self, node: NodeId) -> Option<SinkId> {
        self.connections.sink_of(node)
    }

    /// Root node observed through `sink`, if it still is.
    pub fn root_of(&self, sink: SinkId) -> Option<NodeId> {
        self.slot(sink).map(|observed| observed.root)
    }

    /// Start observing `root`.
    ///
    /// The root takes the sentinel identity and its current subtree is
    /// connected. If it already has children, `sink` immediately receives one
    /// batch inserting each of them, in order, so the mirror starts in sync.
    pub fn observe(
        &mut self,
        arena: &NodeArena,
        root: NodeId,
        sink: Box<dyn Dispatch>,
    ) -> Result<SinkId, TreeError> {
        if !matches!(arena[root].get(), NodeKind::Root) {
            return Err(TreeError::NotARoot { node: label(root) });
        }
        if self.connections.sink_of(root).is_some() {
            return Err(TreeError::AlreadyObserved { node: label(root) });
        }

        let sink_id = SinkId(self.observed.len() as u32);
        self.registry.assign_root(root);
        self.connections
            .connect(arena, &mut self.registry, root, sink_id);

        let batch: Batch = root
            .children(arena)
            .enumerate()
            .map(|(index, child)| Mutation::InsertChild {
                parent: RemoteId::root(),
                node: serialize_node(arena, &mut self.registry, child),
                index,
            })
            .collect();

        self.observed.push(Some(Observed { root, sink }));
        debug!(?root, %sink_id, initial = batch.len(), "observing root");

        if !batch.is_empty() {
            self.emit(sink_id, batch);
        }
        Ok(sink_id)
    }

    /// Stop observing the root behind `sink`, disconnecting its whole subtree.
    /// Hands the sink back; nothing is dispatched.
    pub fn unobserve(&mut self, arena: &NodeArena, sink: SinkId) -> Option<Box<dyn Dispatch>> {
        let observed = self.observed.get_mut(sink.0 as usize)?.take()?;
        let _released = self
            .connections
            .disconnect(arena, &mut self.registry, observed.root);
        debug!(root = ?observed.root, %sink, released = _released, "unobserved root");
        Some(observed.sink)
    }

    fn slot(&self, sink: SinkId) -> Option<&Observed> {
        self.observed.get(sink.0 as usize)?.as_ref()
    }

    fn emit(&mut self, sink: SinkId, batch: Batch) {
        let Some(Some(observed)) = self.observed.get_mut(sink.0 as usize) else {
            return;
        };
        for _mutation in &batch {
            trace!(%sink, kind = _mutation.kind(), target = %_mutation.target(), "dispatch");
        }
        observed.sink.dispatch(&batch);
    }
}

impl Hooks for Capture {
    fn insert_child(
        &mut self,
        arena: &NodeArena,
        parent: NodeId,
        node: NodeId,
        index: usize,
    ) -> Result<(), TreeError> {
        let Some(sink) = self.connections.sink_of(parent) else {
            return Ok(());
        };

        // Descendants need identities before the snapshot refers to them.
        self.connections
            .connect(arena, &mut self.registry, node, sink);
        let parent_id = self.registry.identity_of(parent)?.clone();
        let snapshot = serialize_node(arena, &mut self.registry, node);

        self.emit(
            sink,
            smallvec![Mutation::InsertChild {
                parent: parent_id,
                node: snapshot,
                index,
            }],
        );
        Ok(())
    }

    fn remove_child(
        &mut self,
        arena: &NodeArena,
        parent: NodeId,
        node: NodeId,
        index: usize,
    ) -> Result<(), TreeError> {
        let Some(sink) = self.connections.sink_of(parent) else {
            return Ok(());
        };

        self.connections
            .disconnect(arena, &mut self.registry, node);
        let parent_id = self.registry.identity_of(parent)?.clone();

        self.emit(
            sink,
            smallvec![Mutation::RemoveChild {
                parent: parent_id,
                index,
            }],
        );
        Ok(())
    }

    fn set_text(&mut self, _arena: &NodeArena, node: NodeId, data: &str) -> Result<(), TreeError> {
        let Some(sink) = self.connections.sink_of(node) else {
            return Ok(());
        };
        let id = self.registry.identity_of(node)?.clone();

        self.emit(
            sink,
            smallvec![Mutation::UpdateText {
                id,
                text: data.into(),
            }],
        );
        Ok(())
    }

    fn set_property(
        &mut self,
        _arena: &NodeArena,
        element: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), TreeError> {
        let Some(sink) = self.connections.sink_of(element) else {
            return Ok(());
        };
        let id = self.registry.identity_of(element)?.clone();

        self.emit(
            sink,
            smallvec![Mutation::UpdateProperty {
                id,
                name: name.to_string(),
                value: value.into(),
            }],
        );
        Ok(())
    }
}

impl Document<Capture> {
    /// A document whose primitives are captured.
    pub fn observed() -> Self {
        Document::new(Capture::new())
    }

    /// See [`Capture::observe`].
    pub fn observe(
        &mut self,
        root: NodeId,
        sink: impl Dispatch + 'static,
    ) -> Result<SinkId, TreeError> {
        let (arena, capture) = self.parts_mut();
        capture.observe(arena, root, Box::new(sink))
    }

    /// See [`Capture::unobserve`].
    pub fn unobserve(&mut self, sink: SinkId) -> Option<Box<dyn Dispatch>> {
        let (arena, capture) = self.parts_mut();
        capture.unobserve(arena, sink)
    }

    pub fn identity_of(&self, node: NodeId) -> Result<&RemoteId, TreeError> {
        self.hooks().identity_of(node)
    }

    pub fn try_identity_of(&self, node: NodeId) -> Option<&RemoteId> {
        self.hooks().try_identity_of(node)
    }

    pub fn sink_of(&self, node: NodeId) -> Option<SinkId> {
        self.hooks().sink_of(node)
    }
}
