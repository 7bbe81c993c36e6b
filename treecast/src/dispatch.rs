//! Dispatch sinks: where batches for an observed root end up.

use std::cell::RefCell;
use std::rc::Rc;

use facet::Facet;

use crate::protocol::Mutation;

/// Receiver of the batches produced for one observed root.
///
/// Delivery is the sink's business: the capture layer never looks at what
/// happens to a batch and never retries.
pub trait Dispatch {
    fn dispatch(&mut self, batch: &[Mutation]);
}

impl<F> Dispatch for F
where
    F: FnMut(&[Mutation]),
{
    fn dispatch(&mut self, batch: &[Mutation]) {
        self(batch)
    }
}

/// Lets the host keep a handle on a sink it hands to the capture layer.
impl<D: Dispatch> Dispatch for Rc<RefCell<D>> {
    fn dispatch(&mut self, batch: &[Mutation]) {
        self.borrow_mut().dispatch(batch)
    }
}

/// Handle naming the sink of one observed root.
///
/// Every node connected to that root stores the same `SinkId`, so it is the
/// callback reference the interceptors resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Facet)]
#[facet(transparent)]
pub struct SinkId(pub u32);

impl std::fmt::Display for SinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sink#{}", self.0)
    }
}

/// A sink that keeps every batch it receives, mostly for tests and tooling.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub batches: Vec<Vec<Mutation>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// All received records, batch boundaries dropped.
    pub fn records(&self) -> impl Iterator<Item = &Mutation> + '_ {
        self.batches.iter().flatten()
    }

    /// Take everything received so far.
    pub fn take(&mut self) -> Vec<Vec<Mutation>> {
        std::mem::take(&mut self.batches)
    }
}

impl Dispatch for Recorder {
    fn dispatch(&mut self, batch: &[Mutation]) {
        self.batches.push(batch.to_vec());
    }
}
