// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A counter rendered into the in-memory backend, driven in budgeted slices
//! with a trace recording. Clicks are injected through the backend's event
//! dispatch, the way a platform loop would deliver them.

use weft_backend_memory::MemoryTree;
use weft_core::trace::Tracer;
use weft_core::{Component, Dep, Element, NodeId, Props, Renderer, UnitBudget, deps};
use weft_debug::{RecorderSink, chrome, pretty};

fn counter_app() -> Component {
    Component::new(|cx, _| {
        let (count, set) = cx.use_state(0_i64);
        cx.use_effect(Some(deps([Dep::from(count)])), move || {
            println!("effect: count is now {count}");
        });
        let on_click = cx.use_callback(Some(deps([Dep::from(count)])), move || {
            set.update(|n| n + 1);
        });
        Element::host(
            "div",
            Props::new()
                .attr("class", "counter")
                .child(Element::text(format!("count = {count}")))
                .child(Element::host(
                    "button",
                    Props::new().attr("label", "+1").on("click", on_click),
                )),
        )
    })
}

/// Runs budgeted slices until the renderer goes idle, recording the trace.
fn drive(
    renderer: &mut Renderer,
    tree: &mut MemoryTree,
    sink: &mut RecorderSink,
) -> Result<(), weft_core::Error> {
    while !renderer.is_idle() {
        let mut budget = UnitBudget::new(3);
        let mut tracer = Tracer::new(sink);
        renderer.run_slice(tree, &mut budget, &mut tracer)?;
    }
    Ok(())
}

fn button_of(tree: &MemoryTree, container: NodeId) -> NodeId {
    let div = tree.children(container)[0];
    tree.children(div)[1]
}

fn main() -> Result<(), weft_core::Error> {
    let mut tree = MemoryTree::new();
    let container = tree.create_container();
    let mut renderer = Renderer::new();
    let mut sink = RecorderSink::new();

    renderer.render(Element::component(counter_app(), Props::new()), container);
    drive(&mut renderer, &mut tree, &mut sink)?;
    println!("-- mounted --\n{}", tree.render_tree(container));

    for _ in 0..3 {
        let handlers = tree.dispatch(button_of(&tree, container), "click");
        println!("click ({handlers} handler)");
        drive(&mut renderer, &mut tree, &mut sink)?;
    }
    println!("-- after clicks --\n{}", tree.render_tree(container));
    println!("-- fibers --\n{}", pretty::renderer_trees(&renderer));

    let summary = sink.summary();
    println!(
        "-- trace -- slices={} units={} commits={} placements={} updates={} deletions={}",
        summary.slices,
        summary.units,
        summary.commits,
        summary.placements,
        summary.updates,
        summary.deletions,
    );
    println!("{}", chrome::to_chrome_trace(sink.events()));
    Ok(())
}
