//! Invocation lifecycle events
//!
//! An [`Event`] records one transition (start or stop) of one wrapped tool
//! invocation. Timestamps are taken by the reporting client at the moment of
//! the transition, never by the collector on receipt, so request latency is
//! not attributed to the invocation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Number of random bytes in a generated invocation id
const ID_BYTES: usize = 10;

/// Lifecycle transition reported for an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The wrapped tool is about to run
    Start,
    /// The wrapped tool has exited
    Stop,
}

impl EventKind {
    /// Wire name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::Stop => "stop",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(EventKind::Start),
            "stop" => Ok(EventKind::Stop),
            other => Err(CoreError::UnknownEventKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// Opaque token identifying one invocation
///
/// Generated client-side from the operating system's CSPRNG. A collision
/// would pair the start of one invocation with the stop of another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(String);

impl InvocationId {
    /// Generate a fresh random id (20 lowercase hex characters)
    pub fn generate() -> Self {
        let mut bytes = [0u8; ID_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InvocationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for InvocationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Event as it arrives on the wire, before the kind is validated
///
/// Field names also accept the capitalized spelling used by older clients
/// (`ID`, `Kind`, `When`, `Tool`, `Pkg`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventReport {
    #[serde(alias = "ID")]
    pub id: String,

    #[serde(alias = "Kind")]
    pub kind: String,

    #[serde(alias = "When")]
    pub when: DateTime<Utc>,

    #[serde(alias = "Tool", default)]
    pub tool: String,

    #[serde(alias = "Pkg", default)]
    pub pkg: String,
}

impl EventReport {
    /// Decode a report from a raw request body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}

/// One lifecycle transition of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Invocation this event belongs to
    pub id: InvocationId,

    /// Start or stop
    pub kind: EventKind,

    /// Client-reported time of the transition
    pub when: DateTime<Utc>,

    /// Short name of the invoked program
    pub tool: String,

    /// Unit of work being built
    pub pkg: String,
}

impl Event {
    /// Create a start event for a new invocation
    pub fn start(
        id: impl Into<InvocationId>,
        tool: impl Into<String>,
        pkg: impl Into<String>,
        when: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: EventKind::Start,
            when,
            tool: tool.into(),
            pkg: pkg.into(),
        }
    }

    /// The matching stop event for this invocation, reported at `when`
    pub fn stopped_at(&self, when: DateTime<Utc>) -> Self {
        Self {
            id: self.id.clone(),
            kind: EventKind::Stop,
            when,
            tool: self.tool.clone(),
            pkg: self.pkg.clone(),
        }
    }

    /// Label used by the concurrency chart: `"tool pkg"`
    pub fn label(&self) -> String {
        format!("{} {}", self.tool, self.pkg)
    }

    /// Name used by the trace document: `"tool:pkg"`
    pub fn trace_name(&self) -> String {
        format!("{}:{}", self.tool, self.pkg)
    }
}

impl TryFrom<EventReport> for Event {
    type Error = CoreError;

    fn try_from(report: EventReport) -> Result<Self> {
        let kind = report.kind.parse()?;
        Ok(Self {
            id: InvocationId(report.id),
            kind,
            when: report.when,
            tool: report.tool,
            pkg: report.pkg,
        })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.id,
            self.kind,
            self.when.to_rfc3339(),
            self.tool,
            self.pkg
        )
    }
}
