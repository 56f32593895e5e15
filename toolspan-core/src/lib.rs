//! # Toolspan Core
//!
//! Toolspan records when each invocation of a wrapped build tool starts and
//! stops, so the concurrency of a build can be inspected afterwards. This
//! crate holds everything that doesn't touch the network:
//!
//! - **Event model**: [`Event`], [`EventKind`], [`InvocationId`]
//! - **Event Log**: append-only record of every accepted event
//! - **Live Index**: invocations started but not yet stopped, derived by replay
//! - **Renderers**: a text concurrency chart and a trace-viewer JSON document
//!
//! ## Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use toolspan_core::{Collector, Event, render_chart, render_trace};
//!
//! let origin = Utc::now();
//! let mut collector = Collector::with_origin(origin);
//!
//! let start = Event::start("a1", "compile", "foo", origin);
//! collector.record(start.clone());
//! assert_eq!(collector.live().len(), 1);
//!
//! collector.record(start.stopped_at(origin + Duration::seconds(5)));
//! assert!(collector.live().is_empty());
//!
//! let chart = render_chart(collector.log().as_slice());
//! assert_eq!(chart.lines().count(), 2);
//!
//! let trace = render_trace(collector.log().as_slice(), collector.started_at());
//! assert_eq!(trace.trace_events[0].dur, 5_000_000.0);
//! ```

pub mod error;
pub mod event;
pub mod log;
pub mod render;

pub use error::{CoreError, Result};
pub use event::{Event, EventKind, EventReport, InvocationId};
pub use log::{Collector, EventLog, LiveEntry, LiveIndex, StatusReport};
pub use render::{render_chart, render_trace, TraceDocument, TraceEvent};
