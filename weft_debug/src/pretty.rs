// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indented text dumps of fiber trees.

use std::fmt::Write as _;

use weft_core::{FiberId, FiberKind, FiberStore, Renderer};

/// Renders the fiber subtree under `root` as indented text.
///
/// One fiber per line: kind, pending effect tag if any, owned host node if
/// any.
#[must_use]
pub fn fiber_tree(store: &FiberStore, root: FiberId) -> String {
    let mut out = String::new();
    write_fiber(store, root, 0, &mut out);
    out
}

/// Dumps a renderer's committed and in-flight trees, whichever exist.
#[must_use]
pub fn renderer_trees(renderer: &Renderer) -> String {
    let mut out = String::new();
    if let Some(root) = renderer.current_root() {
        out.push_str("current:\n");
        out.push_str(&fiber_tree(renderer.store(), root));
    }
    if let Some(root) = renderer.wip_root() {
        out.push_str("wip:\n");
        out.push_str(&fiber_tree(renderer.store(), root));
    }
    if out.is_empty() {
        out.push_str("(no trees)\n");
    }
    out
}

fn write_fiber(store: &FiberStore, id: FiberId, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    match store.kind(id) {
        FiberKind::Root => out.push_str("root"),
        FiberKind::Host(tag) => {
            _ = write!(out, "{tag}");
        }
        FiberKind::Component(_) => out.push_str("component"),
    }
    if let Some(effect) = store.effect(id) {
        _ = write!(out, " [{effect:?}]");
    }
    if let Some(node) = store.node(id) {
        _ = write!(out, " node={}", node.0);
    }
    out.push('\n');
    for child in store.children(id) {
        write_fiber(store, child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_backend_memory::MemoryTree;
    use weft_core::{Component, Element, Props};

    #[test]
    fn dumps_kinds_nodes_and_structure() {
        let mut tree = MemoryTree::new();
        let container = tree.create_container();
        let mut renderer = Renderer::new();
        let app = Component::new(|_, _| {
            Element::host("div", Props::new().child(Element::text("hi")))
        });
        renderer.render(Element::component(app, Props::new()), container);
        renderer.run_to_idle(&mut tree).unwrap();

        let dump = renderer_trees(&renderer);
        assert!(dump.starts_with("current:\nroot node=0\n"));
        assert!(dump.contains("  component\n"));
        assert!(dump.contains("    div node="));
        assert!(dump.contains("      #text node="));
        // Committed fibers carry no effect tags.
        assert!(!dump.contains('['));
    }
}
