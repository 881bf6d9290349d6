// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays fiber storage.
//!
//! All per-fiber state lives in parallel columns indexed by slot. Tree links
//! (`parent`, `child`, `sibling`, `alternate`) are raw `u32` slot indices with
//! [`INVALID`] as the null value; freed slots go on a free list and are reused
//! with a bumped generation, so public [`FiberId`] handles detect staleness.
//!
//! The reconciler and committer do link surgery on the columns directly. The
//! public accessors take a [`FiberId`] and panic on stale handles; using a
//! handle across a commit that freed its tree is a caller bug, not a runtime
//! condition.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use super::id::{FiberId, INVALID};
use crate::backend::NodeId;
use crate::element::{ElementKind, Props};
use crate::hooks::HookList;

/// What a fiber represents.
#[derive(Clone, Debug, PartialEq)]
pub enum FiberKind {
    /// The synthetic root. Owns the container node; never produced by an
    /// element.
    Root,
    /// A host node fiber.
    Host(crate::element::HostTag),
    /// A component instance fiber.
    Component(crate::element::Component),
}

impl FiberKind {
    /// Whether an element of the given kind pairs with this fiber during
    /// reconciliation.
    pub(crate) fn matches(&self, element: &ElementKind) -> bool {
        match (self, element) {
            (Self::Host(a), ElementKind::Host(b)) => a == b,
            (Self::Component(a), ElementKind::Component(b)) => a.same(b),
            _ => false,
        }
    }

    pub(crate) fn from_element(kind: &ElementKind) -> Self {
        match kind {
            ElementKind::Host(tag) => Self::Host(tag.clone()),
            ElementKind::Component(f) => Self::Component(f.clone()),
        }
    }
}

/// Pending host mutation recorded on a work-in-progress fiber.
///
/// Tags are produced by reconciliation and consumed (cleared) by the commit
/// phase; fibers in the committed baseline carry none.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectTag {
    /// New fiber; its host node (if any) must be attached.
    Placement,
    /// Paired with an alternate; props must be diffed against it.
    Update,
    /// Old fiber with no successor; its host subtree must be detached.
    Deletion,
}

/// Struct-of-arrays storage for fibers.
pub struct FiberStore {
    pub(crate) parent: Vec<u32>,
    pub(crate) child: Vec<u32>,
    pub(crate) sibling: Vec<u32>,
    pub(crate) alternate: Vec<u32>,
    pub(crate) kind: Vec<FiberKind>,
    pub(crate) props: Vec<Rc<Props>>,
    pub(crate) node: Vec<Option<NodeId>>,
    pub(crate) effect: Vec<Option<EffectTag>>,
    pub(crate) hooks: Vec<HookList>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
    /// Shared empty props used to scrub freed slots.
    empty_props: Rc<Props>,
}

impl Default for FiberStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FiberStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            child: Vec::new(),
            sibling: Vec::new(),
            alternate: Vec::new(),
            kind: Vec::new(),
            props: Vec::new(),
            node: Vec::new(),
            effect: Vec::new(),
            hooks: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            empty_props: Rc::new(Props::default()),
        }
    }

    /// Total number of slots ever allocated (live + free).
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Whether the store has no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of live fibers.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len() - self.free_list.len()
    }

    /// Whether `id` refers to a live fiber (non-panicking staleness check).
    #[must_use]
    pub fn contains(&self, id: FiberId) -> bool {
        (id.idx as usize) < self.len()
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Allocates a fiber, reusing a freed slot when one is available.
    ///
    /// Links start out [`INVALID`] except `alternate`, which is set from the
    /// argument. Returns the raw slot index.
    pub(crate) fn alloc(
        &mut self,
        kind: FiberKind,
        props: Rc<Props>,
        node: Option<NodeId>,
        alternate: u32,
        effect: Option<EffectTag>,
    ) -> u32 {
        if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.child[i] = INVALID;
            self.sibling[i] = INVALID;
            self.alternate[i] = alternate;
            self.kind[i] = kind;
            self.props[i] = props;
            self.node[i] = node;
            self.effect[i] = effect;
            self.hooks[i].clear();
            self.generation[i] = self.generation[i].wrapping_add(1);
            idx
        } else {
            assert!(
                self.len() < INVALID as usize,
                "fiber store slot index overflow"
            );
            #[expect(
                clippy::cast_possible_truncation,
                reason = "slot count checked against INVALID above"
            )]
            let idx = self.len() as u32;
            self.parent.push(INVALID);
            self.child.push(INVALID);
            self.sibling.push(INVALID);
            self.alternate.push(alternate);
            self.kind.push(kind);
            self.props.push(props);
            self.node.push(node);
            self.effect.push(effect);
            self.hooks.push(HookList::new());
            self.generation.push(0);
            idx
        }
    }

    /// Frees a whole subtree, children first.
    ///
    /// `alternate` links into other trees are left alone; only slots reachable
    /// through `child`/`sibling` from `root` are freed. No-op on [`INVALID`].
    pub(crate) fn free_tree(&mut self, root: u32) {
        if root == INVALID {
            return;
        }
        let mut child = self.child[root as usize];
        while child != INVALID {
            let next = self.sibling[child as usize];
            self.free_tree(child);
            child = next;
        }
        self.free_slot(root);
    }

    /// Scrubs one slot and puts it on the free list.
    fn free_slot(&mut self, idx: u32) {
        let i = idx as usize;
        self.parent[i] = INVALID;
        self.child[i] = INVALID;
        self.sibling[i] = INVALID;
        self.alternate[i] = INVALID;
        self.kind[i] = FiberKind::Root;
        self.props[i] = self.empty_props.clone();
        self.node[i] = None;
        self.effect[i] = None;
        self.hooks[i].clear();
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.free_list.push(idx);
    }

    /// Panics if `id` is stale; returns the slot index otherwise.
    fn validate(&self, id: FiberId) -> usize {
        let i = id.idx as usize;
        assert!(
            i < self.len() && self.generation[i] == id.generation,
            "stale FiberId: {id:?}"
        );
        i
    }

    /// Handle for a raw slot index at its current generation.
    pub(crate) fn id_at(&self, idx: u32) -> FiberId {
        FiberId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Kind of the fiber.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    #[must_use]
    pub fn kind(&self, id: FiberId) -> &FiberKind {
        &self.kind[self.validate(id)]
    }

    /// Props the fiber was built with.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    #[must_use]
    pub fn props(&self, id: FiberId) -> &Rc<Props> {
        &self.props[self.validate(id)]
    }

    /// Host node owned by the fiber, if any. Component fibers own none.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    #[must_use]
    pub fn node(&self, id: FiberId) -> Option<NodeId> {
        self.node[self.validate(id)]
    }

    /// Pending effect tag, if any.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    #[must_use]
    pub fn effect(&self, id: FiberId) -> Option<EffectTag> {
        self.effect[self.validate(id)]
    }

    /// First child, if any.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    #[must_use]
    pub fn child(&self, id: FiberId) -> Option<FiberId> {
        self.link(self.child[self.validate(id)])
    }

    /// Next sibling, if any.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    #[must_use]
    pub fn sibling(&self, id: FiberId) -> Option<FiberId> {
        self.link(self.sibling[self.validate(id)])
    }

    /// Parent, if any. Only the root has none.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    #[must_use]
    pub fn parent(&self, id: FiberId) -> Option<FiberId> {
        self.link(self.parent[self.validate(id)])
    }

    /// Number of hook records on the fiber.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    #[must_use]
    pub fn hook_count(&self, id: FiberId) -> usize {
        self.hooks[self.validate(id)].len()
    }

    fn link(&self, idx: u32) -> Option<FiberId> {
        (idx != INVALID).then(|| self.id_at(idx))
    }
}

impl fmt::Debug for FiberStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FiberStore")
            .field("slots", &self.len())
            .field("live", &self.live_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::HostTag;

    fn host(store: &mut FiberStore, name: &'static str) -> u32 {
        store.alloc(
            FiberKind::Host(HostTag::Named(name.into())),
            Rc::new(Props::default()),
            None,
            INVALID,
            Some(EffectTag::Placement),
        )
    }

    #[test]
    fn alloc_links_start_invalid() {
        let mut store = FiberStore::new();
        let a = host(&mut store, "div");
        assert_eq!(store.parent[a as usize], INVALID);
        assert_eq!(store.child[a as usize], INVALID);
        assert_eq!(store.sibling[a as usize], INVALID);
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn free_tree_frees_children_and_recycles_slots() {
        let mut store = FiberStore::new();
        let root = host(&mut store, "div");
        let a = host(&mut store, "span");
        let b = host(&mut store, "span");
        store.child[root as usize] = a;
        store.parent[a as usize] = root;
        store.sibling[a as usize] = b;
        store.parent[b as usize] = root;
        assert_eq!(store.live_count(), 3);

        store.free_tree(root);
        assert_eq!(store.live_count(), 0);

        // Reuse does not grow the arena.
        let c = host(&mut store, "p");
        assert!((c as usize) < 3);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn stale_handle_detected_after_free() {
        let mut store = FiberStore::new();
        let a = host(&mut store, "div");
        let id = store.id_at(a);
        assert!(store.contains(id));
        store.free_tree(a);
        assert!(!store.contains(id));
        // The recycled slot gets a fresh generation.
        let b = host(&mut store, "div");
        assert_eq!(a, b);
        assert!(!store.contains(id));
    }

    #[test]
    #[should_panic(expected = "stale FiberId")]
    fn stale_handle_panics_on_access() {
        let mut store = FiberStore::new();
        let a = host(&mut store, "div");
        let id = store.id_at(a);
        store.free_tree(a);
        let _ = store.kind(id);
    }

    #[test]
    fn kind_matching_is_positional_type_identity() {
        use crate::element::{Component, Element, ElementKind};
        let div = FiberKind::Host(HostTag::Named("div".into()));
        assert!(div.matches(&ElementKind::Host(HostTag::Named("div".into()))));
        assert!(!div.matches(&ElementKind::Host(HostTag::Named("span".into()))));
        assert!(!div.matches(&ElementKind::Host(HostTag::Text)));

        let f = Component::new(|_, _| Element::text("x"));
        let fiber = FiberKind::Component(f.clone());
        assert!(fiber.matches(&ElementKind::Component(f)));
        let g = Component::new(|_, _| Element::text("x"));
        assert!(!fiber.matches(&ElementKind::Component(g)));
    }
}
