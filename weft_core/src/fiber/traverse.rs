// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal iterators.

use super::id::{FiberId, INVALID};
use super::store::FiberStore;

/// Iterator over the children of a fiber, in sibling order.
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a FiberStore,
    next: u32,
}

impl Iterator for Children<'_> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        if self.next == INVALID {
            return None;
        }
        let id = self.store.id_at(self.next);
        self.next = self.store.sibling[self.next as usize];
        Some(id)
    }
}

/// Iterator over the ancestors of a fiber, nearest first. Does not yield the
/// starting fiber.
#[derive(Debug)]
pub struct Ancestors<'a> {
    store: &'a FiberStore,
    next: u32,
}

impl Iterator for Ancestors<'_> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        if self.next == INVALID {
            return None;
        }
        let id = self.store.id_at(self.next);
        self.next = self.store.parent[self.next as usize];
        Some(id)
    }
}

impl FiberStore {
    /// Iterates over the children of `id` in order.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    #[must_use]
    pub fn children(&self, id: FiberId) -> Children<'_> {
        // `child` accessor validates the handle.
        let next = self.child(id).map_or(INVALID, |c| c.idx);
        Children { store: self, next }
    }

    /// Iterates over the ancestors of `id`, nearest first.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    #[must_use]
    pub fn ancestors(&self, id: FiberId) -> Ancestors<'_> {
        let next = self.parent(id).map_or(INVALID, |p| p.idx);
        Ancestors { store: self, next }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{HostTag, Props};
    use crate::fiber::{EffectTag, FiberKind};
    use alloc::rc::Rc;
    use alloc::vec::Vec;

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
    fn children_in_sibling_order() {
        let mut store = FiberStore::new();
        let root = host(&mut store, "div");
        let a = host(&mut store, "a");
        let b = host(&mut store, "b");
        let c = host(&mut store, "c");
        store.child[root as usize] = a;
        store.sibling[a as usize] = b;
        store.sibling[b as usize] = c;
        for f in [a, b, c] {
            store.parent[f as usize] = root;
        }

        let ids: Vec<u32> = store
            .children(store.id_at(root))
            .map(FiberId::index)
            .collect();
        assert_eq!(ids, [a, b, c]);
        assert_eq!(store.children(store.id_at(a)).count(), 0);
    }

    #[test]
    fn ancestors_nearest_first() {
        let mut store = FiberStore::new();
        let root = host(&mut store, "div");
        let mid = host(&mut store, "span");
        let leaf = host(&mut store, "p");
        store.child[root as usize] = mid;
        store.parent[mid as usize] = root;
        store.child[mid as usize] = leaf;
        store.parent[leaf as usize] = mid;

        let ids: Vec<u32> = store
            .ancestors(store.id_at(leaf))
            .map(FiberId::index)
            .collect();
        assert_eq!(ids, [mid, root]);
    }
}
