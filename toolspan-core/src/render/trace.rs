//! Trace-viewer JSON document
//!
//! Produces the Trace Event Format understood by `chrome://tracing` and
//! Perfetto: one flat list of complete (`"ph": "X"`) events with
//! microsecond offsets and durations.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{Event, EventKind};
use crate::log::{chronological, LiveIndex};

/// Value of `displayTimeUnit` in rendered documents
pub const DISPLAY_TIME_UNIT: &str = "ms";

/// Phase marker for a complete event (start + duration)
const PHASE_COMPLETE: &str = "X";

/// Top-level trace document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceDocument {
    #[serde(rename = "traceEvents")]
    pub trace_events: Vec<TraceEvent>,

    #[serde(rename = "displayTimeUnit")]
    pub display_time_unit: String,
}

/// One closed invocation interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// `tool:pkg`
    pub name: String,
    pub ph: String,
    /// Start offset from the collector's origin, in microseconds
    pub ts: f64,
    /// Duration in microseconds
    pub dur: f64,
    pub pid: u64,
    pub tid: u64,
    pub args: TraceArgs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceArgs {
    pub id: String,
    pub tool: String,
    pub pkg: String,
}

/// Pair start/stop events into closed intervals relative to `origin`
///
/// A stop with no earlier start is ignored, and a start that never saw its
/// stop is left out of the document.
pub fn render_trace(events: &[Event], origin: DateTime<Utc>) -> TraceDocument {
    let mut live = LiveIndex::new();
    let mut trace_events = Vec::new();

    for event in chronological(events) {
        match event.kind {
            EventKind::Start => live.apply(event),
            EventKind::Stop => {
                let Some(start) = live.take(&event.id) else {
                    continue;
                };
                trace_events.push(TraceEvent {
                    name: event.trace_name(),
                    ph: PHASE_COMPLETE.to_string(),
                    ts: micros(start.when - origin),
                    dur: micros(event.when - start.when),
                    pid: 0,
                    tid: 0,
                    args: TraceArgs {
                        id: event.id.to_string(),
                        tool: event.tool.clone(),
                        pkg: event.pkg.clone(),
                    },
                });
            }
        }
    }

    TraceDocument {
        trace_events,
        display_time_unit: DISPLAY_TIME_UNIT.to_string(),
    }
}

fn micros(delta: Duration) -> f64 {
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1_000.0,
        None => delta.num_milliseconds() as f64 * 1_000.0,
    }
}
