// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The fiber tree.
//!
//! Fibers are the engine's internal unit of bookkeeping: one per element
//! instance, linked into a tree by `child`/`sibling`/`parent` indices and
//! stored struct-of-arrays in a [`FiberStore`]. Two trees coexist during a
//! pass — the committed baseline and the work-in-progress tree being built
//! against it — connected fiber-by-fiber through `alternate` links.

mod id;
mod store;
mod traverse;

pub use id::{FiberId, INVALID};
pub use store::{EffectTag, FiberKind, FiberStore};
pub use traverse::{Ancestors, Children};
