//! # pagewatch-core
//!
//! Change detection for the pagewatch harness.
//!
//! A [`Monitor`] owns one polling session at a time. While a session runs, a
//! background task reads the active document on a fixed interval and compares
//! it with the previous read; every difference is appended to the
//! [`EventLog`] and queued on the [`DetectionQueue`] until a caller polls it.
//! Sessions end manually or when their duration elapses.
//!
//! ## Key Types
//!
//! - [`Monitor`] - Session controller and shared state
//! - [`DocumentSource`] - Where document contents come from
//! - [`EventLog`] - Append-only session history, optionally mirrored to disk
//! - [`Report`] - Summary statistics over the event log

mod config;
mod detector;
mod document;
mod error;
mod event_log;
mod monitor;
mod queue;
mod report;

pub use config::{
    MonitorConfig, DEFAULT_DURATION_UNIT, DEFAULT_POLL_INTERVAL, DEFAULT_SESSION_DURATION,
    DEFAULT_SNAPSHOT_FILE,
};
pub use detector::{ChangeDetector, CycleOutcome};
pub use document::{
    DocumentId, DocumentPaths, DocumentSelector, DocumentSource, FileSource, MemorySource,
};
pub use error::{MonitorError, SourceError};
pub use event_log::{load_snapshot, EndStatus, Event, EventKind, EventLog};
pub use monitor::{Monitor, SessionStatus};
pub use queue::DetectionQueue;
pub use report::Report;
