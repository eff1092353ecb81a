use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::document::DocumentId;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndStatus {
    /// The session ran for its full duration.
    Completed,
    StoppedManually,
}

impl std::fmt::Display for EndStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndStatus::Completed => write!(f, "completed"),
            EndStatus::StoppedManually => write!(f, "stopped_manually"),
        }
    }
}

/// Typed payload of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventKind {
    SessionStarted { duration: f64 },
    SessionEnded { status: EndStatus },
    DocumentSwitched { document: DocumentId },
    ChangeDetected { timestamp: DateTime<Utc> },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::SessionStarted { .. } => "session_started",
            EventKind::SessionEnded { .. } => "session_ended",
            EventKind::DocumentSwitched { .. } => "document_switched",
            EventKind::ChangeDetected { .. } => "change_detected",
        }
    }
}

/// An entry of the event log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Position in the log; breaks ties between equal timestamps.
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Default)]
struct LogInner {
    events: Vec<Event>,
    next_seq: u64,
}

/// Append-only, time-ordered record of session events.
///
/// When a snapshot path is configured, the whole log is rewritten to it as a
/// JSON array after every mutation.
#[derive(Debug, Default)]
pub struct EventLog {
    inner: Mutex<LogInner>,
    snapshot_path: Option<PathBuf>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Mutex::new(LogInner::default()),
            snapshot_path: Some(path.into()),
        }
    }

    /// Append an event stamped with the current time.
    pub fn append(&self, kind: EventKind) -> Event {
        self.append_at(Utc::now(), kind)
    }

    /// Append an event with an explicit timestamp.
    pub fn append_at(&self, timestamp: DateTime<Utc>, kind: EventKind) -> Event {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let event = Event {
            seq: inner.next_seq,
            timestamp,
            kind,
        };
        inner.next_seq += 1;
        inner.events.push(event.clone());
        self.persist(&inner.events);
        debug!(event = event.kind.name(), seq = event.seq, "Event logged");
        event
    }

    /// Drop every event. Only called at session start.
    pub fn clear(&self) {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.events.clear();
        inner.next_seq = 0;
        self.persist(&inner.events);
    }

    /// Copy of the log as of now.
    pub fn snapshot(&self) -> Vec<Event> {
        match self.inner.lock() {
            Ok(inner) => inner.events.clone(),
            Err(poisoned) => poisoned.into_inner().events.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(inner) => inner.events.len(),
            Err(poisoned) => poisoned.into_inner().events.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, events: &[Event]) {
        let Some(path) = self.snapshot_path.as_deref() else {
            return;
        };

        let result = serde_json::to_string_pretty(events)
            .map_err(std::io::Error::from)
            .and_then(|json| std::fs::write(path, json));

        if let Err(e) = result {
            error!(path = %path.display(), error = %e, "Failed to write event log snapshot");
        }
    }
}

/// Load a snapshot previously written by [`EventLog`].
pub fn load_snapshot(path: &Path) -> std::io::Result<Vec<Event>> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(std::io::Error::from)
}
