// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the render loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! work loop calls at each stage. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) — gates the per-unit [`UnitEvent`] plus the
//!   corresponding `TraceSink` method.

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What kind of fiber a unit of work processed.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// The synthetic root fiber.
    Root,
    /// A host fiber (node creation and child reconciliation).
    Host,
    /// A component fiber (function evaluation and child reconciliation).
    Component,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Marks the beginning of a work slice.
#[derive(Clone, Copy, Debug)]
pub struct SliceBeginEvent {
    /// Whether a coalesced update request started a new pass at the top of
    /// this slice.
    pub dispatched: bool,
}

/// Marks the end of a work slice.
#[derive(Clone, Copy, Debug)]
pub struct SliceEndEvent {
    /// Units of work completed during the slice.
    pub units: u32,
    /// Whether the slice stopped with work remaining.
    pub yielded: bool,
    /// Whether the slice ended in a commit.
    pub committed: bool,
}

/// Marks the beginning of a commit.
#[derive(Clone, Copy, Debug)]
pub struct CommitBeginEvent {
    /// Number of queued deletions.
    pub deletions: usize,
}

/// Marks the end of a commit, paired with every [`CommitBeginEvent`].
///
/// After a failed commit the counts cover the effects applied before the
/// failure; whether the pass committed is reported on the enclosing
/// [`SliceEndEvent`].
#[derive(Clone, Copy, Debug)]
pub struct CommitEndEvent {
    /// Placement effects applied.
    pub placements: usize,
    /// Update effects applied.
    pub updates: usize,
    /// Deletion effects applied.
    pub deletions: usize,
}

/// A completed unit of work (requires `trace-rich`).
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct UnitEvent {
    /// Slot index of the fiber processed (for diagnostics only).
    pub fiber_index: u32,
    /// Kind of fiber processed.
    pub kind: UnitKind,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the render loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the beginning of a work slice.
    fn on_slice_begin(&mut self, e: &SliceBeginEvent) {
        _ = e;
    }

    /// Called at the end of a work slice.
    fn on_slice_end(&mut self, e: &SliceEndEvent) {
        _ = e;
    }

    /// Called when a commit starts.
    fn on_commit_begin(&mut self, e: &CommitBeginEvent) {
        _ = e;
    }

    /// Called when a commit completes.
    fn on_commit_end(&mut self, e: &CommitEndEvent) {
        _ = e;
    }

    /// Called after each unit of work (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_unit(&mut self, e: &UnitEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`SliceBeginEvent`].
    #[inline]
    pub fn slice_begin(&mut self, e: &SliceBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_slice_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SliceEndEvent`].
    #[inline]
    pub fn slice_end(&mut self, e: &SliceEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_slice_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CommitBeginEvent`].
    #[inline]
    pub fn commit_begin(&mut self, e: &CommitBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_commit_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CommitEndEvent`].
    #[inline]
    pub fn commit_end(&mut self, e: &CommitEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_commit_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`UnitEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn unit(&mut self, e: &UnitEvent) {
        if let Some(s) = &mut self.sink {
            s.on_unit(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_slice_begin(&SliceBeginEvent { dispatched: false });
        sink.on_slice_end(&SliceEndEvent {
            units: 3,
            yielded: true,
            committed: false,
        });
        sink.on_commit_begin(&CommitBeginEvent { deletions: 0 });
        sink.on_commit_end(&CommitEndEvent {
            placements: 1,
            updates: 0,
            deletions: 0,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.slice_begin(&SliceBeginEvent { dispatched: true });
        tracer.commit_begin(&CommitBeginEvent { deletions: 2 });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            units: Vec<u32>,
        }
        impl TraceSink for RecordingSink {
            fn on_slice_end(&mut self, e: &SliceEndEvent) {
                self.units.push(e.units);
            }
        }

        let mut sink = RecordingSink { units: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.slice_end(&SliceEndEvent {
            units: 7,
            yielded: false,
            committed: true,
        });
        drop(tracer);
        assert_eq!(sink.units, &[7]);
    }
}
