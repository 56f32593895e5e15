//! Event Log and Live Index
//!
//! The [`EventLog`] is the single source of truth: an append-only record of
//! every accepted event, in arrival order. The [`LiveIndex`] is derived from
//! it by replay and maps each running invocation to its start event.
//!
//! ```text
//! report(event) ──► EventLog::append ──► LiveIndex::apply
//!                       │
//!                       └──► chronological() ──► renderers
//! ```

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::event::{Event, EventKind, InvocationId};

/// Append-only, arrival-ordered sequence of events
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event; the log is never reordered or truncated
    pub fn append(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events in arrival order
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    /// Events ordered by reported time, ties kept in arrival order
    pub fn chronological(&self) -> Vec<&Event> {
        chronological(&self.events)
    }
}

/// Stable sort of `events` by `when`
pub fn chronological(events: &[Event]) -> Vec<&Event> {
    let mut sorted: Vec<&Event> = events.iter().collect();
    sorted.sort_by_key(|e| e.when);
    sorted
}

/// Running invocations, keyed by id, holding each one's start event
#[derive(Debug, Clone, Default)]
pub struct LiveIndex {
    live: HashMap<InvocationId, Event>,
}

impl LiveIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index by replaying `events` in the given order
    pub fn replay<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut index = Self::new();
        for event in events {
            index.apply(event);
        }
        index
    }

    /// Fold one event into the index
    ///
    /// A start inserts (a repeated start for a live id replaces the entry);
    /// a stop removes, and a stop for an unknown id changes nothing.
    pub fn apply(&mut self, event: &Event) {
        match event.kind {
            EventKind::Start => {
                self.live.insert(event.id.clone(), event.clone());
            }
            EventKind::Stop => {
                self.live.remove(&event.id);
            }
        }
    }

    /// Remove and return the start event for `id`, if it is live
    pub fn take(&mut self, id: &InvocationId) -> Option<Event> {
        self.live.remove(id)
    }

    pub fn get(&self, id: &InvocationId) -> Option<&Event> {
        self.live.get(id)
    }

    pub fn contains(&self, id: &InvocationId) -> bool {
        self.live.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.live.values()
    }

    /// `"tool pkg"` labels of every live invocation, sorted
    pub fn sorted_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.live.values().map(Event::label).collect();
        labels.sort();
        labels
    }
}

/// Daemon-owned state: the log, the index derived from it, and the origin
/// timestamp used by the trace renderer
#[derive(Debug, Clone)]
pub struct Collector {
    log: EventLog,
    live: LiveIndex,
    started_at: DateTime<Utc>,
}

impl Collector {
    /// Create an empty collector whose timeline starts now
    pub fn new() -> Self {
        Self::with_origin(Utc::now())
    }

    /// Create an empty collector with an explicit timeline origin
    pub fn with_origin(started_at: DateTime<Utc>) -> Self {
        Self {
            log: EventLog::new(),
            live: LiveIndex::new(),
            started_at,
        }
    }

    /// Append an already-validated event and update the live index
    pub fn record(&mut self, event: Event) {
        self.live.apply(&event);
        self.log.append(event);
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn live(&self) -> &LiveIndex {
        &self.live
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Diagnostic view of the current state
    pub fn status(&self) -> StatusReport {
        let mut live: Vec<LiveEntry> = self
            .live
            .events()
            .map(|e| LiveEntry {
                id: e.id.to_string(),
                tool: e.tool.clone(),
                pkg: e.pkg.clone(),
                since: e.when,
            })
            .collect();
        live.sort_by(|a, b| a.since.cmp(&b.since).then_with(|| a.id.cmp(&b.id)));

        StatusReport {
            started_at: self.started_at,
            uptime_secs: (Utc::now() - self.started_at).num_milliseconds() as f64 / 1000.0,
            event_count: self.log.len(),
            live_count: live.len(),
            live,
        }
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

/// A running invocation as shown by the status report
#[derive(Debug, Clone, Serialize)]
pub struct LiveEntry {
    pub id: String,
    pub tool: String,
    pub pkg: String,
    pub since: DateTime<Utc>,
}

/// Snapshot of collector state for human inspection
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub started_at: DateTime<Utc>,
    pub uptime_secs: f64,
    pub event_count: usize,
    pub live_count: usize,
    pub live: Vec<LiveEntry>,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "started: {}", self.started_at.to_rfc3339())?;
        writeln!(f, "uptime: {:.1}s", self.uptime_secs)?;
        writeln!(f, "events: {}", self.event_count)?;
        writeln!(f, "live: {}", self.live_count)?;
        for entry in &self.live {
            writeln!(
                f,
                "  {} {} {} since {}",
                entry.id,
                entry.tool,
                entry.pkg,
                entry.since.to_rfc3339()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
    }

    #[test]
    fn test_live_index_tracks_unstopped_starts() {
        let a = Event::start("a1", "compile", "foo", at(0));
        let b = Event::start("a2", "compile", "bar", at(1));
        let events = vec![a.clone(), b.clone(), a.stopped_at(at(5))];

        let index = LiveIndex::replay(&events);
        assert_eq!(index.len(), 1);
        assert!(index.contains(&b.id));
        assert!(!index.contains(&a.id));
    }

    #[test]
    fn test_unknown_stop_is_noop() {
        let a = Event::start("a1", "compile", "foo", at(0));
        let mut index = LiveIndex::replay([&a]);

        let stray = Event::start("zzz", "compile", "foo", at(2)).stopped_at(at(3));
        index.apply(&stray);
        index.apply(&stray);

        assert_eq!(index.len(), 1);
        assert!(index.contains(&a.id));
    }

    #[test]
    fn test_duplicate_start_last_write_wins() {
        let first = Event::start("a1", "compile", "foo", at(0));
        let second = Event::start("a1", "asm", "foo", at(2));
        let index = LiveIndex::replay([&first, &second]);

        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&first.id).unwrap().tool, "asm");
    }

    #[test]
    fn test_chronological_is_stable() {
        let mut log = EventLog::new();
        log.append(Event::start("late", "link", "main", at(3)));
        log.append(Event::start("tie-1", "compile", "a", at(1)));
        log.append(Event::start("tie-2", "compile", "b", at(1)));
        log.append(Event::start("early", "compile", "c", at(0)));

        let order: Vec<&str> = log.chronological().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(order, vec!["early", "tie-1", "tie-2", "late"]);

        // Stored arrival order is untouched
        assert_eq!(log.as_slice()[0].id.as_str(), "late");
    }

    #[test]
    fn test_collector_record_matches_replay() {
        let mut collector = Collector::with_origin(at(0));
        let a = Event::start("a1", "compile", "foo", at(0));
        let b = Event::start("a2", "compile", "bar", at(1));
        collector.record(a.clone());
        collector.record(b.clone());
        collector.record(a.stopped_at(at(5)));

        let replayed = LiveIndex::replay(collector.log().iter());
        assert_eq!(collector.live().sorted_labels(), replayed.sorted_labels());
        assert_eq!(collector.log().len(), 3);
    }

    #[test]
    fn test_status_report() {
        let mut collector = Collector::with_origin(at(0));
        collector.record(Event::start("a2", "compile", "bar", at(1)));
        collector.record(Event::start("a1", "compile", "foo", at(0)));

        let status = collector.status();
        assert_eq!(status.event_count, 2);
        assert_eq!(status.live_count, 2);
        assert_eq!(status.live[0].id, "a1");

        let text = status.to_string();
        assert!(text.contains("events: 2"));
        assert!(text.contains("a2 compile bar"));
    }
}
