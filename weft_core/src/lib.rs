// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core reconciliation engine for retained-mode UI.
//!
//! `weft_core` turns declarative element trees into incremental mutations of a
//! host node tree. Each render pass rebuilds an internal fiber tree against the
//! previously committed one, tags the differences, and applies them atomically
//! through a [`HostBackend`]. The work is cooperative: the walk runs in units
//! and can be interrupted between any two of them, so a large tree never
//! monopolizes the thread that drives it.
//!
//! ```text
//!   Element tree (declarative)
//!        │ render / dispatch_update
//!        ▼
//!   ┌─────────────────────────────┐
//!   │ Renderer                    │   run_slice(backend, deadline, tracer)
//!   │   FiberStore (SoA arena)    │──────────────────────────────────────▶
//!   │   wip root / current root   │   reconcile units, then commit
//!   └─────────────────────────────┘
//!        │ commit (placements, updates, deletions)
//!        ▼
//!   HostBackend (platform node tree)
//! ```
//!
//! The crate is `no_std` + `alloc`. Components are plain functions that receive
//! a [`Hooks`] context for per-instance state; see the [`hooks`] module.
//!
//! # Crate features
//!
//! - `std` — enables [`TimeSlice`], a wall-clock [`Deadline`].
//! - `trace` — enables the [`trace`] module's `Tracer` method bodies.
//! - `trace-rich` (implies `trace`) — per-unit trace events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod backend;
mod commit;
pub mod deadline;
pub mod element;
pub mod error;
pub mod fiber;
pub mod hooks;
mod reconcile;
mod renderer;
pub mod trace;

pub use backend::{HostBackend, NodeId};
pub use deadline::{Deadline, Unbounded, UnitBudget};
#[cfg(feature = "std")]
pub use deadline::TimeSlice;
pub use element::{
    Component, Element, ElementKind, EventHandler, HostTag, PropValue, Props, TEXT_ATTR,
};
pub use error::{Error, HostError};
pub use fiber::{EffectTag, FiberId, FiberKind, FiberStore, INVALID};
pub use hooks::{Dep, Deps, Dispatch, Hooks, Setter, deps};
pub use renderer::{CommitStats, Renderer, SliceReport};
