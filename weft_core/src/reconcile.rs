// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positional child reconciliation.
//!
//! Old fibers and new elements are walked in lockstep by position. A pair of
//! the same kind (same host tag, or the same component function by pointer
//! identity) becomes an `Update` fiber that inherits the old fiber's host node
//! and alternate link. A mismatch severs the pair: the element becomes a
//! `Placement` and the old fiber a `Deletion`. There are no keys; inserting at
//! the head of a list shifts every later position out of alignment and
//! replaces the tail pairwise.

use crate::element::Element;
use crate::fiber::{EffectTag, FiberKind, INVALID};
use crate::renderer::Renderer;

impl Renderer {
    /// Diffs `elements` against the old children of `wip`'s alternate and
    /// links the resulting fibers under `wip`.
    ///
    /// Mismatched old fibers are tagged [`EffectTag::Deletion`] in place (they
    /// stay linked into the old tree) and queued for the commit phase.
    pub(crate) fn reconcile_children(&mut self, wip: u32, elements: &[Element]) {
        let Self {
            store, deletions, ..
        } = self;

        let alternate = store.alternate[wip as usize];
        let mut old = if alternate == INVALID {
            INVALID
        } else {
            store.child[alternate as usize]
        };
        let mut prev = INVALID;
        let mut index = 0_usize;

        while index < elements.len() || old != INVALID {
            let element = elements.get(index);
            let same = old != INVALID
                && element.is_some_and(|el| store.kind[old as usize].matches(&el.kind));

            let new_fiber = match element {
                // Same kind: keep the node, diff props at commit.
                Some(el) if same => store.alloc(
                    store.kind[old as usize].clone(),
                    el.props.clone(),
                    store.node[old as usize],
                    old,
                    Some(EffectTag::Update),
                ),
                // Different kind or no old counterpart: fresh fiber.
                Some(el) => store.alloc(
                    FiberKind::from_element(&el.kind),
                    el.props.clone(),
                    None,
                    INVALID,
                    Some(EffectTag::Placement),
                ),
                None => INVALID,
            };

            if old != INVALID && !same {
                store.effect[old as usize] = Some(EffectTag::Deletion);
                deletions.push(old);
            }
            if old != INVALID {
                old = store.sibling[old as usize];
            }

            if index == 0 {
                store.child[wip as usize] = new_fiber;
            } else if new_fiber != INVALID {
                store.sibling[prev as usize] = new_fiber;
            }
            if new_fiber != INVALID {
                store.parent[new_fiber as usize] = wip;
                prev = new_fiber;
            }
            index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, Props};
    use crate::fiber::FiberId;
    use alloc::rc::Rc;
    use alloc::vec::Vec;

    fn wip_root(r: &mut Renderer) -> u32 {
        r.store.alloc(
            FiberKind::Root,
            Rc::new(Props::new()),
            Some(crate::backend::NodeId(0)),
            INVALID,
            None,
        )
    }

    fn child_indices(r: &Renderer, fiber: u32) -> Vec<u32> {
        r.store
            .children(r.store.id_at(fiber))
            .map(FiberId::index)
            .collect()
    }

    #[test]
    fn places_fresh_children_in_order() {
        let mut r = Renderer::new();
        let root = wip_root(&mut r);
        let elements = [
            Element::host("a", Props::new()),
            Element::host("b", Props::new()),
        ];
        r.reconcile_children(root, &elements);

        let children = child_indices(&r, root);
        assert_eq!(children.len(), 2);
        for &c in &children {
            assert_eq!(r.store.effect[c as usize], Some(EffectTag::Placement));
            assert_eq!(r.store.parent[c as usize], root);
        }
        assert!(r.deletions.is_empty());
    }

    #[test]
    fn pairs_same_kind_by_position_and_keeps_node() {
        let mut r = Renderer::new();
        let old_root = wip_root(&mut r);
        r.reconcile_children(old_root, &[Element::host("a", Props::new())]);
        let old_a = r.store.child[old_root as usize];
        r.store.node[old_a as usize] = Some(crate::backend::NodeId(7));

        let new_root = r.store.alloc(
            FiberKind::Root,
            Rc::new(Props::new()),
            Some(crate::backend::NodeId(0)),
            old_root,
            None,
        );
        r.reconcile_children(new_root, &[Element::host("a", Props::new().attr("x", 1))]);

        let new_a = r.store.child[new_root as usize];
        assert_ne!(new_a, old_a);
        assert_eq!(r.store.effect[new_a as usize], Some(EffectTag::Update));
        assert_eq!(r.store.alternate[new_a as usize], old_a);
        assert_eq!(r.store.node[new_a as usize], Some(crate::backend::NodeId(7)));
        assert!(r.deletions.is_empty());
    }

    #[test]
    fn mismatch_replaces_the_tail_pairwise() {
        let mut r = Renderer::new();
        let old_root = wip_root(&mut r);
        let first = [
            Element::host("a", Props::new()),
            Element::host("b", Props::new()),
            Element::host("c", Props::new()),
        ];
        r.reconcile_children(old_root, &first);
        let old = child_indices(&r, old_root);

        let new_root = r.store.alloc(
            FiberKind::Root,
            Rc::new(Props::new()),
            Some(crate::backend::NodeId(0)),
            old_root,
            None,
        );
        // [a, b, c] -> [a, c]: position 1 pairs b with c (mismatch), position
        // 2 has no new element.
        let second = [
            Element::host("a", Props::new()),
            Element::host("c", Props::new()),
        ];
        r.reconcile_children(new_root, &second);

        let new = child_indices(&r, new_root);
        assert_eq!(new.len(), 2);
        assert_eq!(r.store.effect[new[0] as usize], Some(EffectTag::Update));
        assert_eq!(r.store.alternate[new[0] as usize], old[0]);
        assert_eq!(r.store.effect[new[1] as usize], Some(EffectTag::Placement));
        assert_eq!(r.store.alternate[new[1] as usize], INVALID);
        assert_eq!(r.deletions, [old[1], old[2]]);
        assert_eq!(r.store.effect[old[1] as usize], Some(EffectTag::Deletion));
        assert_eq!(r.store.effect[old[2] as usize], Some(EffectTag::Deletion));
    }

    #[test]
    fn empty_element_list_clears_child_link_and_deletes() {
        let mut r = Renderer::new();
        let old_root = wip_root(&mut r);
        r.reconcile_children(old_root, &[Element::host("a", Props::new())]);
        let old_a = r.store.child[old_root as usize];

        let new_root = r.store.alloc(
            FiberKind::Root,
            Rc::new(Props::new()),
            Some(crate::backend::NodeId(0)),
            old_root,
            None,
        );
        r.reconcile_children(new_root, &[]);

        assert_eq!(r.store.child[new_root as usize], INVALID);
        assert_eq!(r.deletions, [old_a]);
    }
}
