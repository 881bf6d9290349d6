// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render session and cooperative work loop.
//!
//! A [`Renderer`] owns the fiber arena and the bookkeeping for one container:
//! the committed baseline (`current_root`), the work-in-progress tree
//! (`wip_root`), the walk cursor (`next_unit`), and the deletions queued by
//! reconciliation. Drivers feed it slices: [`Renderer::run_slice`] performs
//! units of work until the [`Deadline`] asks it to yield, and commits in the
//! same slice when the walk is exhausted. Between slices the host tree is
//! untouched, so interleaved work (input, timers) never observes a half-built
//! pass.
//!
//! Update scheduling is last-write-wins: dispatching while a pass is in flight
//! abandons the partial tree and restarts from the committed baseline. Setter
//! calls don't dispatch directly; they raise a shared request flag that the
//! next slice consumes, which coalesces any number of setter calls between two
//! slices into one pass.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::backend::{HostBackend, NodeId};
use crate::commit;
use crate::deadline::{Deadline, Unbounded};
use crate::element::{Component, Element, Props};
use crate::error::Error;
use crate::fiber::{FiberId, FiberKind, FiberStore, INVALID};
use crate::hooks::Hooks;
use crate::trace::{SliceBeginEvent, SliceEndEvent, Tracer};
#[cfg(feature = "trace-rich")]
use crate::trace::{UnitEvent, UnitKind};

/// Host mutations applied by one commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitStats {
    /// Placement effects applied (node attachments).
    pub placements: usize,
    /// Update effects visited (prop diffs; an identical diff applies nothing).
    pub updates: usize,
    /// Deletion effects applied (subtree detachments).
    pub deletions: usize,
}

/// What one call to [`Renderer::run_slice`] did.
#[derive(Clone, Copy, Debug, Default)]
pub struct SliceReport {
    /// Units of work completed.
    pub units: u32,
    /// Whether the slice stopped early with work remaining.
    pub yielded: bool,
    /// Whether the pass committed during this slice.
    pub committed: bool,
    /// Mutation counts from the commit; zeroes unless `committed`.
    pub commit: CommitStats,
}

/// The component evaluation in progress, if any.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ActiveComponent {
    /// Work-in-progress fiber being evaluated.
    pub(crate) fiber: u32,
    /// Its alternate in the committed tree, or [`INVALID`] on first render.
    pub(crate) alternate: u32,
    /// Next hook ordinal.
    pub(crate) cursor: usize,
}

/// A reconciliation session bound to one container node.
#[derive(Debug)]
pub struct Renderer {
    pub(crate) store: FiberStore,
    pub(crate) wip_root: u32,
    pub(crate) current_root: u32,
    pub(crate) next_unit: u32,
    pub(crate) deletions: Vec<u32>,
    update_requested: Rc<Cell<bool>>,
    active: Option<ActiveComponent>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Creates an idle renderer with an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: FiberStore::new(),
            wip_root: INVALID,
            current_root: INVALID,
            next_unit: INVALID,
            deletions: Vec::new(),
            update_requested: Rc::new(Cell::new(false)),
            active: None,
        }
    }

    /// The fiber arena, for inspection and diagnostics.
    #[must_use]
    pub fn store(&self) -> &FiberStore {
        &self.store
    }

    /// Root of the committed tree, if anything has been committed.
    #[must_use]
    pub fn current_root(&self) -> Option<FiberId> {
        (self.current_root != INVALID).then(|| self.store.id_at(self.current_root))
    }

    /// Root of the pass in flight, if one is.
    #[must_use]
    pub fn wip_root(&self) -> Option<FiberId> {
        (self.wip_root != INVALID).then(|| self.store.id_at(self.wip_root))
    }

    /// Whether there is no work left: no pass in flight and no pending update
    /// request that could start one.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.next_unit == INVALID
            && self.wip_root == INVALID
            && !(self.update_requested.get() && self.current_root != INVALID)
    }

    /// Starts a pass rendering `element` into `container`.
    ///
    /// The pass is performed by subsequent [`run_slice`](Self::run_slice)
    /// calls; nothing touches the host tree here. Rendering while a pass is
    /// in flight abandons it.
    pub fn render(&mut self, element: Element, container: NodeId) {
        let props = Rc::new(Props::new().child(element));
        let root = self
            .store
            .alloc(FiberKind::Root, props, Some(container), self.current_root, None);
        self.dispatch_root(root);
    }

    /// Starts a pass replaying the committed root element, picking up queued
    /// hook updates.
    ///
    /// # Errors
    ///
    /// [`Error::NoRoot`] if nothing has been committed yet.
    pub fn dispatch_update(&mut self) -> Result<(), Error> {
        if self.current_root == INVALID {
            return Err(Error::NoRoot);
        }
        let cur = self.current_root as usize;
        let root = self.store.alloc(
            FiberKind::Root,
            self.store.props[cur].clone(),
            self.store.node[cur],
            self.current_root,
            None,
        );
        self.dispatch_root(root);
        Ok(())
    }

    fn dispatch_root(&mut self, root: u32) {
        // Last-write-wins: a pass in flight is abandoned wholesale.
        self.abandon_pass();
        self.wip_root = root;
        self.next_unit = root;
    }

    /// Performs units of work until the deadline yields or the pass is done,
    /// committing in the same slice when the walk is exhausted.
    ///
    /// At least one unit is completed per slice, so any deadline makes
    /// progress. A pending setter request is consumed at the top of the
    /// slice and becomes a fresh pass.
    ///
    /// # Errors
    ///
    /// [`Error::Host`] if the backend rejects a mutation. Any host failure,
    /// render-phase or commit-phase, abandons the pass and keeps the
    /// previous baseline; mutations already applied stand (host trees are
    /// not transactional). The slice-end trace event is emitted either way.
    pub fn run_slice<B: HostBackend, D: Deadline>(
        &mut self,
        backend: &mut B,
        deadline: &mut D,
        tracer: &mut Tracer<'_>,
    ) -> Result<SliceReport, Error> {
        let mut dispatched = false;
        if self.update_requested.get() && self.current_root != INVALID {
            self.update_requested.set(false);
            self.dispatch_update()?;
            dispatched = true;
        }
        tracer.slice_begin(&SliceBeginEvent { dispatched });

        let mut units = 0_u32;
        let mut yielded = false;
        let mut failure = None;
        while self.next_unit != INVALID {
            let unit = self.next_unit;
            if let Err(e) = self.perform_unit(backend, unit, tracer) {
                self.abandon_pass();
                failure = Some(e);
                break;
            }
            units += 1;
            if deadline.should_yield() && self.next_unit != INVALID {
                yielded = true;
                break;
            }
        }

        let mut committed = false;
        let mut stats = CommitStats::default();
        if failure.is_none() && self.next_unit == INVALID && self.wip_root != INVALID {
            match self.commit_root(backend, tracer) {
                Ok(s) => {
                    stats = s;
                    committed = true;
                }
                Err(e) => failure = Some(e),
            }
        }

        tracer.slice_end(&SliceEndEvent {
            units,
            yielded,
            committed,
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(SliceReport {
                units,
                yielded,
                committed,
                commit: stats,
            }),
        }
    }

    /// Discards the pass in flight: frees the wip tree, scrubs the deletion
    /// tags it left on baseline fibers, and resets the cursor.
    pub(crate) fn abandon_pass(&mut self) {
        for &d in &self.deletions {
            self.store.effect[d as usize] = None;
        }
        self.deletions.clear();
        let wip = self.wip_root;
        self.wip_root = INVALID;
        self.next_unit = INVALID;
        self.store.free_tree(wip);
    }

    /// Runs unbounded untraced slices until [`is_idle`](Self::is_idle).
    ///
    /// Convenient for tests and synchronous drivers. An effect that
    /// unconditionally queues an update makes this loop forever, exactly as
    /// it would starve a slice-driven loop.
    ///
    /// # Errors
    ///
    /// Propagates the first [`Error`] from a slice.
    pub fn run_to_idle<B: HostBackend>(&mut self, backend: &mut B) -> Result<(), Error> {
        while !self.is_idle() {
            self.run_slice(backend, &mut Unbounded, &mut Tracer::none())?;
        }
        Ok(())
    }

    /// The hook context for the component evaluation in progress.
    ///
    /// Components receive this as their first argument; the accessor exists
    /// for wrappers that thread the context themselves.
    ///
    /// # Errors
    ///
    /// [`Error::HookOutsideRender`] if no component is being evaluated.
    pub fn hooks(&mut self) -> Result<Hooks<'_>, Error> {
        let Self {
            store,
            active,
            update_requested,
            ..
        } = self;
        match active.as_mut() {
            Some(active) => Ok(Hooks::new(store, active, update_requested.clone())),
            None => Err(Error::HookOutsideRender),
        }
    }

    /// One unit: prepare the fiber (evaluate or materialize), reconcile its
    /// children, and advance the cursor pre-order.
    fn perform_unit<B: HostBackend>(
        &mut self,
        backend: &mut B,
        fiber: u32,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), Error> {
        match self.store.kind[fiber as usize].clone() {
            FiberKind::Component(f) => self.update_component(fiber, &f)?,
            FiberKind::Host(_) | FiberKind::Root => self.update_host(backend, fiber)?,
        }

        #[cfg(feature = "trace-rich")]
        {
            let kind = match &self.store.kind[fiber as usize] {
                FiberKind::Root => UnitKind::Root,
                FiberKind::Host(_) => UnitKind::Host,
                FiberKind::Component(_) => UnitKind::Component,
            };
            tracer.unit(&UnitEvent {
                fiber_index: fiber,
                kind,
            });
        }
        #[cfg(not(feature = "trace-rich"))]
        {
            _ = &tracer;
        }

        // Child first, then sibling, then the nearest ancestor's sibling.
        self.next_unit = if self.store.child[fiber as usize] != INVALID {
            self.store.child[fiber as usize]
        } else {
            let mut f = fiber;
            loop {
                if f == INVALID {
                    break INVALID;
                }
                let sibling = self.store.sibling[f as usize];
                if sibling != INVALID {
                    break sibling;
                }
                f = self.store.parent[f as usize];
            }
        };
        Ok(())
    }

    /// Evaluates a component fiber and reconciles its single child.
    fn update_component(&mut self, fiber: u32, f: &Component) -> Result<(), Error> {
        let alternate = self.store.alternate[fiber as usize];
        self.store.hooks[fiber as usize].clear();
        self.active = Some(ActiveComponent {
            fiber,
            alternate,
            cursor: 0,
        });
        let props = self.store.props[fiber as usize].clone();
        let child = {
            let mut cx = self.hooks()?;
            f.call(&mut cx, &props)
        };
        self.active = None;

        if alternate != INVALID {
            debug_assert_eq!(
                self.store.hooks[fiber as usize].len(),
                self.store.hooks[alternate as usize].len(),
                "hook count changed between renders (conditional hook call?)"
            );
        }

        self.reconcile_children(fiber, core::slice::from_ref(&child));
        Ok(())
    }

    /// Materializes a host fiber's node if needed (detached, with initial
    /// props) and reconciles its children.
    fn update_host<B: HostBackend>(&mut self, backend: &mut B, fiber: u32) -> Result<(), Error> {
        let props = self.store.props[fiber as usize].clone();
        if self.store.node[fiber as usize].is_none()
            && let FiberKind::Host(tag) = &self.store.kind[fiber as usize]
        {
            let tag = tag.clone();
            let node = backend.create_node(&tag)?;
            commit::apply_props(backend, node, &Props::new(), &props)?;
            self.store.node[fiber as usize] = Some(node);
        }
        self.reconcile_children(fiber, &props.children);
        Ok(())
    }
}
