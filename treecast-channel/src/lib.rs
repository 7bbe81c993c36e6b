//! Transport-agnostic delivery of treecast mutation batches.
//!
//! [`Outbox`] is a [`Dispatch`] sink: every batch the capture layer hands it
//! becomes one postcard-encoded [`Envelope`] carrying a sequence number, queued
//! until the host drains it onto whatever transport it uses (worker message
//! port, WebSocket, pipe, ...). The receiving side decodes envelopes in `seq`
//! order to get the records back in the order they were captured.

use std::collections::VecDeque;

use facet::Facet;
use treecast::{Dispatch, Mutation, WireMutation};

#[cfg(feature = "tracing")]
use tracing::debug;

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($tt:tt)*) => {};
}

/// Errors from encoding or decoding envelopes.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum ChannelError {
    /// failed to encode: {message}
    Encode { message: String },

    /// failed to decode: {message}
    Decode { message: String },
}

/// One dispatched batch, ready for transport.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Envelope {
    /// Host-chosen label of the observed root this batch belongs to.
    pub root: String,
    /// Position of this batch in its outbox, starting at 0.
    pub seq: u64,
    /// postcard-serialized `Vec<Mutation>`
    pub batch_blob: Vec<u8>,
}

impl Envelope {
    /// Serialize this envelope to postcard bytes.
    pub fn to_postcard(&self) -> Result<Vec<u8>, ChannelError> {
        facet_postcard::to_vec(self).map_err(|e| ChannelError::Encode {
            message: format!("{e:?}"),
        })
    }

    /// Deserialize an `Envelope` from postcard bytes.
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, ChannelError> {
        facet_postcard::from_slice(bytes).map_err(|e| ChannelError::Decode {
            message: format!("{e:?}"),
        })
    }

    /// Records carried by this envelope.
    pub fn decode_batch(&self) -> Result<Vec<Mutation>, ChannelError> {
        facet_postcard::from_slice(&self.batch_blob).map_err(|e| ChannelError::Decode {
            message: format!("{e:?}"),
        })
    }
}

/// postcard encoding of a batch.
pub fn encode_batch(batch: &[Mutation]) -> Result<Vec<u8>, ChannelError> {
    let records: Vec<Mutation> = batch.to_vec();
    facet_postcard::to_vec(&records).map_err(|e| ChannelError::Encode {
        message: format!("{e:?}"),
    })
}

/// JSON encoding of a batch in positional form: `[[0, "~", {...}, 0], ...]`.
pub fn encode_batch_json(batch: &[Mutation]) -> Result<String, ChannelError> {
    let wire: Vec<WireMutation> = batch.iter().map(Mutation::to_wire).collect();
    facet_json::to_string(&wire).map_err(|e| ChannelError::Encode {
        message: format!("{e:?}"),
    })
}

/// Queue of envelopes for one observed root.
///
/// Batches that fail to encode are dropped and counted; the capture layer
/// never hears about delivery problems.
#[derive(Debug)]
pub struct Outbox {
    root: String,
    next_seq: u64,
    queue: VecDeque<Envelope>,
    failures: u64,
}

impl Outbox {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            next_seq: 0,
            queue: VecDeque::new(),
            failures: 0,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Take every queued envelope, oldest first.
    pub fn drain(&mut self) -> Vec<Envelope> {
        self.queue.drain(..).collect()
    }

    /// Oldest queued envelope, if any.
    pub fn pop(&mut self) -> Option<Envelope> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Batches dropped because they could not be encoded.
    pub fn failures(&self) -> u64 {
        self.failures
    }
}

impl Dispatch for Outbox {
    fn dispatch(&mut self, batch: &[Mutation]) {
        match encode_batch(batch) {
            Ok(batch_blob) => {
                let seq = self.next_seq;
                self.next_seq += 1;
                debug!(
                    root = %self.root,
                    seq,
                    records = batch.len(),
                    blob_size = batch_blob.len(),
                    "queued batch"
                );
                self.queue.push_back(Envelope {
                    root: self.root.clone(),
                    seq,
                    batch_blob,
                });
            }
            Err(_e) => {
                self.failures += 1;
                debug!(root = %self.root, error = %_e, "dropping batch that failed to encode");
            }
        }
    }
}
