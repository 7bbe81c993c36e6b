//! Mutation capture for remote tree mirrors.
//!
//! treecast keeps a passive copy of a node tree in sync across a boundary
//! (another thread, process, sandbox) without exposing the tree itself:
//! - **Tree**: arena-backed [`Document`] whose primitives report to injected [`Hooks`]
//! - **Capture**: [`Capture`] tracks identities and sinks of observed roots and
//!   turns each primitive into one [`Mutation`] record
//! - **Protocol**: [`SerializedNode`] snapshots and positional wire records
//!
//! # Example
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//! use treecast::{Document, Mutation, Recorder};
//!
//! let mut doc = Document::observed();
//! let root = doc.create_root();
//! let recorder = Rc::new(RefCell::new(Recorder::new()));
//! doc.observe(root, recorder.clone()).unwrap();
//!
//! let button = doc.create_element("button");
//! doc.append_child(root, button).unwrap();
//! doc.set_property(button, "label", "Save").unwrap();
//!
//! let records: Vec<_> = recorder.borrow().records().map(Mutation::kind).collect();
//! assert_eq!(records, vec![0, 3]);
//! ```

mod tracing_macros;
pub(crate) use tracing_macros::{debug, trace};

pub mod capture;
pub mod connection;
pub mod dispatch;
pub mod dump;
mod error;
pub mod hooks;
pub mod identity;
pub mod protocol;
pub mod serialize;
pub mod tree;

pub use capture::Capture;
pub use dispatch::{Dispatch, Recorder, SinkId};
pub use dump::TreeDump;
pub use error::TreeError;
pub use hooks::Hooks;
pub use indextree::NodeId;
pub use protocol::{Batch, Mutation, ROOT_ID, RemoteId, SerializedNode, WireMutation};
pub use tree::{Document, ElementData, NodeArena, NodeKind};
