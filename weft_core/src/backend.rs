// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host backend seam.
//!
//! A [`HostBackend`] owns the real node tree — a DOM, a widget hierarchy, an
//! in-memory test tree — and exposes the minimal mutation vocabulary the
//! commit phase needs. The engine calls it in two situations: node creation
//! and initial-prop application while reconciling (nodes stay detached), and
//! attach/detach/prop mutations during commit.
//!
//! Every method is fallible. On the first [`HostError`] the engine stops the
//! pass and reports the error to the driver; already-applied mutations stand.

use crate::element::{EventHandler, HostTag, PropValue};
use crate::error::HostError;
use core::fmt;

/// An opaque handle to a node owned by the backend.
///
/// The engine stores these in node-owning fibers and passes them back verbatim;
/// it never fabricates or interprets them.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Mutation interface to the platform node tree.
pub trait HostBackend {
    /// Creates a detached node for the given tag.
    fn create_node(&mut self, tag: &HostTag) -> Result<NodeId, HostError>;

    /// Sets or replaces a plain attribute.
    fn set_attribute(&mut self, node: NodeId, key: &str, value: &PropValue)
    -> Result<(), HostError>;

    /// Removes a plain attribute.
    fn remove_attribute(&mut self, node: NodeId, key: &str) -> Result<(), HostError>;

    /// Binds a handler to an event on a node.
    fn add_event_binding(
        &mut self,
        node: NodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;

    /// Removes a previously bound handler.
    fn remove_event_binding(
        &mut self,
        node: NodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;

    /// Appends `child` under `parent`.
    fn insert_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError>;

    /// Detaches `child` from `parent`. The backend may reclaim the subtree.
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError>;
}
