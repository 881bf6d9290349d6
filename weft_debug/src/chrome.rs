// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome trace-event export.
//!
//! Converts a recording into the Trace Event JSON array understood by
//! `chrome://tracing` and Perfetto. Slices and commits become duration pairs
//! (`B`/`E`), units become instants. The engine carries no clock, so the
//! timeline is logical: one microsecond per recorded event, which preserves
//! ordering and nesting but not real durations.

use serde_json::{Value, json};

use crate::recorder::RecordedEvent;

/// Converts `events` into a Chrome trace-event array.
#[must_use]
pub fn to_chrome_trace(events: &[RecordedEvent]) -> Value {
    let mut out = Vec::with_capacity(events.len());
    for (ts, event) in events.iter().enumerate() {
        out.push(match *event {
            RecordedEvent::SliceBegin { dispatched } => entry(
                "slice",
                "B",
                ts,
                json!({ "dispatched": dispatched }),
            ),
            RecordedEvent::SliceEnd {
                units,
                yielded,
                committed,
            } => entry(
                "slice",
                "E",
                ts,
                json!({ "units": units, "yielded": yielded, "committed": committed }),
            ),
            RecordedEvent::CommitBegin { deletions } => entry(
                "commit",
                "B",
                ts,
                json!({ "queued_deletions": deletions }),
            ),
            RecordedEvent::CommitEnd {
                placements,
                updates,
                deletions,
            } => entry(
                "commit",
                "E",
                ts,
                json!({ "placements": placements, "updates": updates, "deletions": deletions }),
            ),
            RecordedEvent::Unit { fiber_index, kind } => entry(
                "unit",
                "i",
                ts,
                json!({ "fiber": fiber_index, "kind": format!("{kind:?}") }),
            ),
        });
    }
    Value::Array(out)
}

fn entry(name: &str, phase: &str, ts: usize, args: Value) -> Value {
    json!({
        "name": name,
        "ph": phase,
        "ts": ts,
        "pid": 1,
        "tid": 1,
        "args": args,
    })
}
