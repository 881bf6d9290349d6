// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The commit phase.
//!
//! Once a pass has reconciled every fiber, the whole batch of effects is
//! applied to the backend in one uninterrupted run: queued deletions first,
//! then a depth-first walk of the new tree applying placements and prop
//! diffs. On success the new tree becomes the baseline and the old tree's
//! slots are recycled; on the first backend error the pass is abandoned and
//! the previous baseline is kept (mutations already applied stand — host
//! trees are not transactional).

use crate::backend::{HostBackend, NodeId};
use crate::element::{PropValue, Props, event_name, is_event_key};
use crate::error::{Error, HostError};
use crate::fiber::{EffectTag, INVALID};
use crate::renderer::{CommitStats, Renderer};
use crate::trace::{CommitBeginEvent, CommitEndEvent, Tracer};

impl Renderer {
    /// Applies the finished pass atomically and promotes it to baseline.
    pub(crate) fn commit_root<B: HostBackend>(
        &mut self,
        backend: &mut B,
        tracer: &mut Tracer<'_>,
    ) -> Result<CommitStats, Error> {
        let wip = self.wip_root;
        tracer.commit_begin(&CommitBeginEvent {
            deletions: self.deletions.len(),
        });

        let deletions = core::mem::take(&mut self.deletions);
        let mut stats = CommitStats::default();
        match self.commit_effects(backend, wip, &deletions, &mut stats) {
            Ok(()) => {
                // The superseded baseline (deletion fibers included) is only
                // reachable from its root; recycle it wholesale.
                let prev = self.current_root;
                self.store.free_tree(prev);
                self.clear_effects(wip);
                self.current_root = wip;
                self.wip_root = INVALID;
                tracer.commit_end(&CommitEndEvent {
                    placements: stats.placements,
                    updates: stats.updates,
                    deletions: stats.deletions,
                });
                Ok(stats)
            }
            Err(e) => {
                // Keep the previous baseline. The end event still fires so
                // begin/end pairs stay balanced; its counts cover what was
                // applied before the failure.
                tracer.commit_end(&CommitEndEvent {
                    placements: stats.placements,
                    updates: stats.updates,
                    deletions: stats.deletions,
                });
                self.deletions = deletions;
                self.abandon_pass();
                Err(e)
            }
        }
    }

    fn commit_effects<B: HostBackend>(
        &mut self,
        backend: &mut B,
        wip: u32,
        deletions: &[u32],
        stats: &mut CommitStats,
    ) -> Result<(), Error> {
        for &fiber in deletions {
            let parent_node = self.host_parent_node(fiber);
            self.commit_deletion(backend, fiber, parent_node)?;
            stats.deletions += 1;
        }
        let first = self.store.child[wip as usize];
        self.commit_work(backend, first, stats)
    }

    /// Applies placement and update effects over a sibling run and its
    /// descendants.
    fn commit_work<B: HostBackend>(
        &mut self,
        backend: &mut B,
        mut fiber: u32,
        stats: &mut CommitStats,
    ) -> Result<(), Error> {
        while fiber != INVALID {
            let i = fiber as usize;
            match (self.store.effect[i], self.store.node[i]) {
                (Some(EffectTag::Placement), Some(node)) => {
                    let parent = self.host_parent_node(fiber);
                    backend.insert_child(parent, node)?;
                    stats.placements += 1;
                }
                (Some(EffectTag::Update), Some(node)) => {
                    let alternate = self.store.alternate[i];
                    assert!(alternate != INVALID, "update fiber without an alternate");
                    let old = self.store.props[alternate as usize].clone();
                    let new = self.store.props[i].clone();
                    apply_props(backend, node, &old, &new)?;
                    stats.updates += 1;
                }
                // Component fibers own no node; their descendants carry the
                // host effects.
                _ => {}
            }
            self.commit_work(backend, self.store.child[i], stats)?;
            fiber = self.store.sibling[i];
        }
        Ok(())
    }

    /// Detaches the single nearest host node of a deleted subtree. Deeper
    /// host nodes go with it; the backend reclaims the subtree.
    fn commit_deletion<B: HostBackend>(
        &mut self,
        backend: &mut B,
        fiber: u32,
        parent_node: NodeId,
    ) -> Result<(), Error> {
        if let Some(node) = self.store.node[fiber as usize] {
            backend.remove_child(parent_node, node)?;
            Ok(())
        } else {
            let child = self.store.child[fiber as usize];
            assert!(child != INVALID, "deleted component fiber has no child");
            self.commit_deletion(backend, child, parent_node)
        }
    }

    /// Nearest node-owning ancestor's node. Component fibers are transparent
    /// to host topology.
    fn host_parent_node(&self, fiber: u32) -> NodeId {
        let mut p = self.store.parent[fiber as usize];
        loop {
            assert!(p != INVALID, "fiber has no node-owning ancestor");
            if let Some(node) = self.store.node[p as usize] {
                return node;
            }
            p = self.store.parent[p as usize];
        }
    }

    /// Clears consumed effect tags so the promoted baseline carries none.
    fn clear_effects(&mut self, mut fiber: u32) {
        while fiber != INVALID {
            self.store.effect[fiber as usize] = None;
            self.clear_effects(self.store.child[fiber as usize]);
            fiber = self.store.sibling[fiber as usize];
        }
    }
}

/// Diffs two prop maps onto a node in four passes: unbind removed or changed
/// event handlers, remove dropped attributes, set new or changed attributes,
/// bind new or changed handlers.
///
/// Handler comparison is pointer identity, so a handler rebuilt every render
/// is unbound and rebound on every commit. A non-handler value under an
/// `"on"`-prefixed key is ignored.
pub(crate) fn apply_props<B: HostBackend>(
    backend: &mut B,
    node: NodeId,
    old: &Props,
    new: &Props,
) -> Result<(), HostError> {
    for (key, value) in &old.attrs {
        if !is_event_key(key) {
            continue;
        }
        let keep = new.attrs.get(key) == Some(value);
        if !keep && let PropValue::Handler(h) = value {
            backend.remove_event_binding(node, &event_name(key), h)?;
        }
    }
    for key in old.attrs.keys() {
        if !is_event_key(key) && !new.attrs.contains_key(key) {
            backend.remove_attribute(node, key)?;
        }
    }
    for (key, value) in &new.attrs {
        if !is_event_key(key) && old.attrs.get(key) != Some(value) {
            backend.set_attribute(node, key, value)?;
        }
    }
    for (key, value) in &new.attrs {
        if !is_event_key(key) {
            continue;
        }
        if old.attrs.get(key) != Some(value)
            && let PropValue::Handler(h) = value
        {
            backend.add_event_binding(node, &event_name(key), h)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::EventHandler;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct OpLog {
        ops: Vec<String>,
    }

    impl HostBackend for OpLog {
        fn create_node(
            &mut self,
            tag: &crate::element::HostTag,
        ) -> Result<NodeId, HostError> {
            self.ops.push(format!("create {tag}"));
            Ok(NodeId(0))
        }
        fn set_attribute(
            &mut self,
            _node: NodeId,
            key: &str,
            _value: &PropValue,
        ) -> Result<(), HostError> {
            self.ops.push(format!("set {key}"));
            Ok(())
        }
        fn remove_attribute(&mut self, _node: NodeId, key: &str) -> Result<(), HostError> {
            self.ops.push(format!("unset {key}"));
            Ok(())
        }
        fn add_event_binding(
            &mut self,
            _node: NodeId,
            event: &str,
            _handler: &EventHandler,
        ) -> Result<(), HostError> {
            self.ops.push(format!("bind {event}"));
            Ok(())
        }
        fn remove_event_binding(
            &mut self,
            _node: NodeId,
            event: &str,
            _handler: &EventHandler,
        ) -> Result<(), HostError> {
            self.ops.push(format!("unbind {event}"));
            Ok(())
        }
        fn insert_child(&mut self, _parent: NodeId, _child: NodeId) -> Result<(), HostError> {
            self.ops.push(String::from("insert"));
            Ok(())
        }
        fn remove_child(&mut self, _parent: NodeId, _child: NodeId) -> Result<(), HostError> {
            self.ops.push(String::from("remove"));
            Ok(())
        }
    }

    #[test]
    fn identical_props_apply_nothing() {
        let mut log = OpLog::default();
        let h = EventHandler::new(|| {});
        let props = Props::new().attr("class", "x").on("click", h);
        apply_props(&mut log, NodeId(0), &props, &props.clone()).unwrap();
        assert!(log.ops.is_empty());
    }

    #[test]
    fn changed_attr_is_set_removed_attr_is_unset() {
        let mut log = OpLog::default();
        let old = Props::new().attr("class", "x").attr("title", "t");
        let new = Props::new().attr("class", "y");
        apply_props(&mut log, NodeId(0), &old, &new).unwrap();
        assert_eq!(log.ops, ["unset title", "set class"]);
    }

    #[test]
    fn handler_identity_controls_rebinding() {
        let mut log = OpLog::default();
        let stable = EventHandler::new(|| {});

        // Same Rc on both sides: untouched.
        let old = Props::new().on("click", stable.clone());
        let new = Props::new().on("click", stable.clone());
        apply_props(&mut log, NodeId(0), &old, &new).unwrap();
        assert!(log.ops.is_empty());

        // Fresh closure: unbind then rebind.
        let new = Props::new().on("click", EventHandler::new(|| {}));
        apply_props(&mut log, NodeId(0), &old, &new).unwrap();
        assert_eq!(log.ops, ["unbind click", "bind click"]);
    }

    #[test]
    fn dropped_handler_is_unbound() {
        let mut log = OpLog::default();
        let old = Props::new().on("click", EventHandler::new(|| {}));
        apply_props(&mut log, NodeId(0), &old, &Props::new()).unwrap();
        assert_eq!(log.ops, ["unbind click"]);
    }

    #[test]
    fn text_content_diffs_like_any_prop() {
        let mut log = OpLog::default();
        let old = Props::new().attr(crate::element::TEXT_ATTR, "before");
        let new = Props::new().attr(crate::element::TEXT_ATTR, "after");
        apply_props(&mut log, NodeId(0), &old, &new).unwrap();
        assert_eq!(log.ops, ["set text"]);
    }
}
