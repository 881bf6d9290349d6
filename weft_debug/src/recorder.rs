// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered trace-event recording.

use weft_core::trace::{
    CommitBeginEvent, CommitEndEvent, SliceBeginEvent, SliceEndEvent, TraceSink, UnitEvent,
    UnitKind,
};

/// An owned copy of one trace event, in arrival order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A slice started.
    SliceBegin {
        /// Whether it consumed a pending update request.
        dispatched: bool,
    },
    /// A slice ended.
    SliceEnd {
        /// Units completed.
        units: u32,
        /// Whether it yielded with work remaining.
        yielded: bool,
        /// Whether it committed.
        committed: bool,
    },
    /// A commit started.
    CommitBegin {
        /// Queued deletions.
        deletions: usize,
    },
    /// A commit finished.
    CommitEnd {
        /// Placements applied.
        placements: usize,
        /// Updates applied.
        updates: usize,
        /// Deletions applied.
        deletions: usize,
    },
    /// One unit of work completed.
    Unit {
        /// Fiber slot index.
        fiber_index: u32,
        /// Fiber kind.
        kind: UnitKind,
    },
}

/// Totals over a recording.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Slices recorded.
    pub slices: usize,
    /// Units of work across all slices.
    pub units: u64,
    /// Successful commits.
    pub commits: usize,
    /// Placements applied, failed commits included.
    pub placements: usize,
    /// Updates applied, failed commits included.
    pub updates: usize,
    /// Deletions applied, failed commits included.
    pub deletions: usize,
}

/// A [`TraceSink`] that stores every event.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recording so far.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Discards the recording.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Totals the recording.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut s = Summary::default();
        for event in &self.events {
            match *event {
                RecordedEvent::SliceBegin { .. } => s.slices += 1,
                RecordedEvent::SliceEnd {
                    units, committed, ..
                } => {
                    s.units += u64::from(units);
                    // A failed commit emits its end event too; only the
                    // slice knows whether the pass went through.
                    if committed {
                        s.commits += 1;
                    }
                }
                RecordedEvent::CommitBegin { .. } => {}
                RecordedEvent::CommitEnd {
                    placements,
                    updates,
                    deletions,
                } => {
                    s.placements += placements;
                    s.updates += updates;
                    s.deletions += deletions;
                }
                RecordedEvent::Unit { .. } => {}
            }
        }
        s
    }
}

impl TraceSink for RecorderSink {
    fn on_slice_begin(&mut self, e: &SliceBeginEvent) {
        self.events.push(RecordedEvent::SliceBegin {
            dispatched: e.dispatched,
        });
    }

    fn on_slice_end(&mut self, e: &SliceEndEvent) {
        self.events.push(RecordedEvent::SliceEnd {
            units: e.units,
            yielded: e.yielded,
            committed: e.committed,
        });
    }

    fn on_commit_begin(&mut self, e: &CommitBeginEvent) {
        self.events.push(RecordedEvent::CommitBegin {
            deletions: e.deletions,
        });
    }

    fn on_commit_end(&mut self, e: &CommitEndEvent) {
        self.events.push(RecordedEvent::CommitEnd {
            placements: e.placements,
            updates: e.updates,
            deletions: e.deletions,
        });
    }

    fn on_unit(&mut self, e: &UnitEvent) {
        self.events.push(RecordedEvent::Unit {
            fiber_index: e.fiber_index,
            kind: e.kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_backend_memory::MemoryTree;
    use weft_core::trace::Tracer;
    use weft_core::{Element, Props, Renderer, Unbounded, UnitBudget};

    fn record_mount() -> RecorderSink {
        let mut tree = MemoryTree::new();
        let container = tree.create_container();
        let mut renderer = Renderer::new();
        renderer.render(
            Element::host(
                "div",
                Props::new()
                    .child(Element::text("a"))
                    .child(Element::text("b")),
            ),
            container,
        );

        let mut sink = RecorderSink::new();
        while !renderer.is_idle() {
            let mut budget = UnitBudget::new(2);
            let mut tracer = Tracer::new(&mut sink);
            renderer
                .run_slice(&mut tree, &mut budget, &mut tracer)
                .unwrap();
        }
        sink
    }

    #[test]
    fn records_slices_units_and_the_commit() {
        let sink = record_mount();
        let summary = sink.summary();
        // 4 fibers at 2 units a slice.
        assert_eq!(summary.slices, 2);
        assert_eq!(summary.units, 4);
        assert_eq!(summary.commits, 1);
        assert_eq!(summary.placements, 3);
        assert_eq!(summary.deletions, 0);
    }

    #[test]
    fn events_arrive_in_loop_order() {
        let sink = record_mount();
        let events = sink.events();
        assert!(matches!(
            events[0],
            RecordedEvent::SliceBegin { dispatched: false }
        ));
        assert!(matches!(
            events.last(),
            Some(RecordedEvent::SliceEnd {
                committed: true,
                ..
            })
        ));
        // The commit pair sits inside the final slice.
        let begin = events
            .iter()
            .position(|e| matches!(e, RecordedEvent::CommitBegin { .. }))
            .unwrap();
        assert!(matches!(events[begin + 1], RecordedEvent::CommitEnd { .. }));
    }

    #[test]
    fn failed_slices_still_pair_their_events() {
        let mut tree = MemoryTree::new();
        let container = tree.create_container();
        let mut renderer = Renderer::new();
        let mut sink = RecorderSink::new();

        // Creation succeeds, attachment fails: the commit aborts.
        renderer.render(Element::host("div", Props::new()), container);
        tree.fail_after(1);
        let mut tracer = Tracer::new(&mut sink);
        renderer
            .run_slice(&mut tree, &mut Unbounded, &mut tracer)
            .unwrap_err();

        // Creation itself fails: the pass aborts during the render phase.
        tree.fail_after(0);
        renderer.render(Element::host("div", Props::new()), container);
        let mut tracer = Tracer::new(&mut sink);
        renderer
            .run_slice(&mut tree, &mut Unbounded, &mut tracer)
            .unwrap_err();

        let count = |pred: fn(&RecordedEvent) -> bool| {
            sink.events().iter().copied().filter(pred).count()
        };
        assert_eq!(
            count(|e| matches!(e, RecordedEvent::SliceBegin { .. })),
            count(|e| matches!(e, RecordedEvent::SliceEnd { .. }))
        );
        assert_eq!(
            count(|e| matches!(e, RecordedEvent::CommitBegin { .. })),
            count(|e| matches!(e, RecordedEvent::CommitEnd { .. }))
        );
        assert!(matches!(
            sink.events().last(),
            Some(RecordedEvent::SliceEnd {
                committed: false,
                ..
            })
        ));
        // Neither aborted pass counts as a commit.
        assert_eq!(sink.summary().commits, 0);
        assert_eq!(sink.summary().slices, 2);
    }
}
