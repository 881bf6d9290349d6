// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory host backend.
//!
//! [`MemoryTree`] implements [`HostBackend`](weft_core::HostBackend) over a
//! slot-addressed node table. It exists for tests, headless drivers, and as
//! the reference for what a platform backend must do. Three things make it
//! useful beyond a stub:
//!
//! - an append-only [`HostOp`] log of every mutation the engine applies, for
//!   asserting exactly what a pass did (and that a no-op pass did nothing);
//! - [`MemoryTree::dispatch`], which invokes the handlers bound to a node the
//!   way a platform event loop would;
//! - [`MemoryTree::fail_after`], which injects a backend failure after a set
//!   number of successful mutations, for exercising commit-abort paths.

mod tree;

pub use tree::{HostOp, MemoryNode, MemoryTree};
