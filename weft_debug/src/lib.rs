// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debugging companions for the render loop.
//!
//! - [`RecorderSink`] captures trace events in order and totals them into a
//!   [`Summary`].
//! - [`chrome`] converts a recording into Chrome trace-event JSON (load it in
//!   `chrome://tracing` or Perfetto) on a logical timeline, one tick per
//!   event.
//! - [`pretty`] renders fiber trees as indented text for log output and
//!   snapshot assertions.
//!
//! Everything here is development tooling; nothing is meant to ship inside a
//! driver loop.

pub mod chrome;
pub mod pretty;
mod recorder;

pub use recorder::{RecordedEvent, RecorderSink, Summary};
