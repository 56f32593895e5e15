//! Live-concurrency text chart

use chrono::{DateTime, Utc};

use crate::event::Event;
use crate::log::{chronological, LiveIndex};

/// Render one line per event: time, live count, sorted live labels
///
/// ```text
/// 00:00:01.00 2 ['compile bar' 'compile foo']
/// ```
pub fn render_chart(events: &[Event]) -> String {
    let mut out = String::new();
    let mut live = LiveIndex::new();

    for event in chronological(events) {
        live.apply(event);
        out.push_str(&chart_line(event.when, &live));
        out.push('\n');
    }

    out
}

/// Format a single chart line for the state of `live` at `when`
fn chart_line(when: DateTime<Utc>, live: &LiveIndex) -> String {
    let labels: Vec<String> = live
        .sorted_labels()
        .into_iter()
        .map(|label| format!("'{}'", label))
        .collect();

    format!("{} {} [{}]", clock(when), live.len(), labels.join(" "))
}

/// `HH:MM:SS.cc`, fractional part truncated to centiseconds
fn clock(when: DateTime<Utc>) -> String {
    let centis = (when.timestamp_subsec_millis() / 10).min(99);
    format!("{}.{:02}", when.format("%H:%M:%S"), centis)
}
