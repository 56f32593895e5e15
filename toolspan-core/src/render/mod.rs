//! Renderers over a snapshot of the Event Log
//!
//! Both renderers are pure: they take the events in arrival order, sort
//! them by reported time (stable, so simultaneous events keep their arrival
//! order), and replay them through a fresh [`LiveIndex`](crate::LiveIndex).
//! Rendering the same snapshot twice yields identical output.

mod chart;
mod trace;

pub use chart::render_chart;
pub use trace::{render_trace, TraceArgs, TraceDocument, TraceEvent, DISPLAY_TIME_UNIT};
