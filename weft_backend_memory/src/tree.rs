// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node table, mutation log, and event dispatch.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use weft_core::{EventHandler, HostBackend, HostError, HostTag, NodeId, PropValue};

/// One node of the in-memory tree.
#[derive(Clone, Debug)]
pub struct MemoryNode {
    /// Tag the node was created with.
    pub tag: HostTag,
    /// Plain attributes.
    pub attrs: BTreeMap<String, PropValue>,
    /// Event bindings, in binding order.
    pub events: Vec<(String, EventHandler)>,
    /// Attached children, in insertion order.
    pub children: Vec<NodeId>,
    /// Parent, if attached.
    pub parent: Option<NodeId>,
}

impl MemoryNode {
    fn new(tag: HostTag) -> Self {
        Self {
            tag,
            attrs: BTreeMap::new(),
            events: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }
}

/// One logged mutation. Handlers and values are elided; the log captures the
/// shape of what the engine did, not the payloads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostOp {
    /// A node was created (detached).
    CreateNode {
        /// The new node.
        node: NodeId,
        /// Its tag.
        tag: HostTag,
    },
    /// An attribute was set or replaced.
    SetAttribute {
        /// Target node.
        node: NodeId,
        /// Attribute key.
        key: String,
    },
    /// An attribute was removed.
    RemoveAttribute {
        /// Target node.
        node: NodeId,
        /// Attribute key.
        key: String,
    },
    /// A handler was bound.
    AddEventBinding {
        /// Target node.
        node: NodeId,
        /// Event name.
        event: String,
    },
    /// A handler was unbound.
    RemoveEventBinding {
        /// Target node.
        node: NodeId,
        /// Event name.
        event: String,
    },
    /// A child was attached.
    InsertChild {
        /// Parent node.
        parent: NodeId,
        /// Attached child.
        child: NodeId,
    },
    /// A subtree was detached and reclaimed.
    RemoveChild {
        /// Parent node.
        parent: NodeId,
        /// Detached child.
        child: NodeId,
    },
}

/// An inspectable in-memory node tree.
#[derive(Debug, Default)]
pub struct MemoryTree {
    nodes: Vec<Option<MemoryNode>>,
    ops: Vec<HostOp>,
    /// Remaining successful mutations before injected failure, if armed.
    fail_in: Option<u32>,
}

impl MemoryTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached container node to render into. Container creation
    /// is driver work, so it is not logged.
    pub fn create_container(&mut self) -> NodeId {
        self.push_node(MemoryNode::new(HostTag::Named("container".into())))
    }

    /// The node behind `id`, if it exists and was not reclaimed.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Attached children of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a live node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.expect_node(id).children
    }

    /// A plain attribute of `id`, if set.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a live node.
    #[must_use]
    pub fn attr(&self, id: NodeId, key: &str) -> Option<&PropValue> {
        self.expect_node(id).attrs.get(key)
    }

    /// Every mutation applied since the last [`clear_ops`](Self::clear_ops).
    #[must_use]
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    /// Clears the mutation log.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Arms failure injection: the next `ok_mutations` mutations succeed, the
    /// one after fails, and so does every mutation until
    /// [`clear_failure`](Self::clear_failure).
    pub fn fail_after(&mut self, ok_mutations: u32) {
        self.fail_in = Some(ok_mutations);
    }

    /// Disarms failure injection.
    pub fn clear_failure(&mut self) {
        self.fail_in = None;
    }

    /// Invokes every handler bound to `event` on `node`, in binding order,
    /// and returns how many ran. Handlers are collected before any is called,
    /// so a handler queuing state updates cannot disturb the iteration.
    #[must_use]
    pub fn dispatch(&self, node: NodeId, event: &str) -> usize {
        let handlers: Vec<EventHandler> = match self.node(node) {
            Some(n) => n
                .events
                .iter()
                .filter(|(e, _)| e == event)
                .map(|(_, h)| h.clone())
                .collect(),
            None => Vec::new(),
        };
        for h in &handlers {
            h.invoke();
        }
        handlers.len()
    }

    /// Renders the subtree under `root` as indented text, for snapshot-style
    /// assertions. Attributes print in key order, event names in binding
    /// order, text nodes as quoted content.
    ///
    /// # Panics
    ///
    /// Panics if `root` does not refer to a live node.
    #[must_use]
    pub fn render_tree(&self, root: NodeId) -> String {
        let mut out = String::new();
        self.render_node(root, 0, &mut out);
        out
    }

    fn render_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = self.expect_node(id);
        for _ in 0..depth {
            out.push_str("  ");
        }
        match &node.tag {
            HostTag::Named(name) => {
                out.push_str(name);
                for (key, value) in &node.attrs {
                    _ = write!(out, " {key}={}", format_value(value));
                }
                for (event, _) in &node.events {
                    _ = write!(out, " on:{event}");
                }
            }
            HostTag::Text => {
                let content = match node.attrs.get(weft_core::TEXT_ATTR) {
                    Some(PropValue::Text(s)) => s.as_str(),
                    _ => "",
                };
                _ = write!(out, "\"{content}\"");
            }
        }
        out.push('\n');
        for &child in &node.children {
            self.render_node(child, depth + 1, out);
        }
    }

    fn push_node(&mut self, node: MemoryNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u64);
        self.nodes.push(Some(node));
        id
    }

    fn expect_node(&self, id: NodeId) -> &MemoryNode {
        self.node(id)
            .unwrap_or_else(|| panic!("no live node for {id:?}"))
    }

    fn guard(&mut self) -> Result<(), HostError> {
        match self.fail_in.as_mut() {
            Some(0) => Err(HostError::new("injected backend failure")),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut MemoryNode, HostError> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| HostError::new("unknown node"))
    }

    /// Drops `id` and everything under it from the table.
    fn reclaim(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.0 as usize).and_then(Option::take) {
            for child in node.children {
                self.reclaim(child);
            }
        }
    }
}

impl HostBackend for MemoryTree {
    fn create_node(&mut self, tag: &HostTag) -> Result<NodeId, HostError> {
        self.guard()?;
        let node = self.push_node(MemoryNode::new(tag.clone()));
        self.ops.push(HostOp::CreateNode {
            node,
            tag: tag.clone(),
        });
        Ok(node)
    }

    fn set_attribute(
        &mut self,
        node: NodeId,
        key: &str,
        value: &PropValue,
    ) -> Result<(), HostError> {
        self.guard()?;
        self.get_mut(node)?
            .attrs
            .insert(String::from(key), value.clone());
        self.ops.push(HostOp::SetAttribute {
            node,
            key: String::from(key),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, key: &str) -> Result<(), HostError> {
        self.guard()?;
        self.get_mut(node)?.attrs.remove(key);
        self.ops.push(HostOp::RemoveAttribute {
            node,
            key: String::from(key),
        });
        Ok(())
    }

    fn add_event_binding(
        &mut self,
        node: NodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        self.guard()?;
        self.get_mut(node)?
            .events
            .push((String::from(event), handler.clone()));
        self.ops.push(HostOp::AddEventBinding {
            node,
            event: String::from(event),
        });
        Ok(())
    }

    fn remove_event_binding(
        &mut self,
        node: NodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        self.guard()?;
        let events = &mut self.get_mut(node)?.events;
        if let Some(pos) = events.iter().position(|(e, h)| e == event && h == handler) {
            events.remove(pos);
        }
        self.ops.push(HostOp::RemoveEventBinding {
            node,
            event: String::from(event),
        });
        Ok(())
    }

    fn insert_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        self.guard()?;
        if self.get_mut(child)?.parent.is_some() {
            return Err(HostError::new("node is already attached"));
        }
        self.get_mut(parent)?.children.push(child);
        self.get_mut(child)?.parent = Some(parent);
        self.ops.push(HostOp::InsertChild { parent, child });
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        self.guard()?;
        let children = &mut self.get_mut(parent)?.children;
        let Some(pos) = children.iter().position(|&c| c == child) else {
            return Err(HostError::new("child is not attached to this parent"));
        };
        children.remove(pos);
        self.reclaim(child);
        self.ops.push(HostOp::RemoveChild { parent, child });
        Ok(())
    }
}

fn format_value(value: &PropValue) -> String {
    match value {
        PropValue::Text(s) => format!("\"{s}\""),
        PropValue::Int(v) => format!("{v}"),
        PropValue::Float(v) => format!("{v}"),
        PropValue::Bool(v) => format!("{v}"),
        PropValue::Handler(_) => String::from("<handler>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn build_and_render_a_small_tree() {
        let mut tree = MemoryTree::new();
        let container = tree.create_container();
        let div = tree.create_node(&HostTag::Named("div".into())).unwrap();
        tree.set_attribute(div, "class", &PropValue::from("panel"))
            .unwrap();
        let text = tree.create_node(&HostTag::Text).unwrap();
        tree.set_attribute(text, weft_core::TEXT_ATTR, &PropValue::from("hi"))
            .unwrap();
        tree.insert_child(div, text).unwrap();
        tree.insert_child(container, div).unwrap();

        assert_eq!(
            tree.render_tree(container),
            "container\n  div class=\"panel\"\n    \"hi\"\n"
        );
        assert_eq!(tree.ops().len(), 6);
    }

    #[test]
    fn remove_child_reclaims_the_subtree() {
        let mut tree = MemoryTree::new();
        let container = tree.create_container();
        let div = tree.create_node(&HostTag::Named("div".into())).unwrap();
        let inner = tree.create_node(&HostTag::Named("span".into())).unwrap();
        tree.insert_child(div, inner).unwrap();
        tree.insert_child(container, div).unwrap();

        tree.remove_child(container, div).unwrap();
        assert!(tree.children(container).is_empty());
        assert!(tree.node(div).is_none());
        assert!(tree.node(inner).is_none());
    }

    #[test]
    fn double_attach_is_rejected() {
        let mut tree = MemoryTree::new();
        let a = tree.create_container();
        let b = tree.create_container();
        let div = tree.create_node(&HostTag::Named("div".into())).unwrap();
        tree.insert_child(a, div).unwrap();
        assert!(tree.insert_child(b, div).is_err());
    }

    #[test]
    fn dispatch_runs_bound_handlers_in_order() {
        let mut tree = MemoryTree::new();
        let button = tree.create_node(&HostTag::Named("button".into())).unwrap();
        let hits = Rc::new(Cell::new(0_u32));
        for _ in 0..2 {
            let hits = hits.clone();
            tree.add_event_binding(
                button,
                "click",
                &EventHandler::new(move || hits.set(hits.get() + 1)),
            )
            .unwrap();
        }
        assert_eq!(tree.dispatch(button, "click"), 2);
        assert_eq!(tree.dispatch(button, "keydown"), 0);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn unbinding_requires_the_same_handler_identity() {
        let mut tree = MemoryTree::new();
        let button = tree.create_node(&HostTag::Named("button".into())).unwrap();
        let h = EventHandler::new(|| {});
        tree.add_event_binding(button, "click", &h).unwrap();

        // A different closure does not match; removal is idempotent.
        tree.remove_event_binding(button, "click", &EventHandler::new(|| {}))
            .unwrap();
        assert_eq!(tree.dispatch(button, "click"), 1);

        tree.remove_event_binding(button, "click", &h).unwrap();
        assert_eq!(tree.dispatch(button, "click"), 0);
    }

    #[test]
    fn fail_after_counts_successful_mutations() {
        let mut tree = MemoryTree::new();
        tree.fail_after(1);
        tree.create_node(&HostTag::Text).unwrap();
        assert!(tree.create_node(&HostTag::Text).is_err());
        tree.clear_failure();
        tree.create_node(&HostTag::Text).unwrap();
    }
}
