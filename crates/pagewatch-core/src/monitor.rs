//! Session controller: owns the session lifecycle and all shared state.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::detector;
use crate::document::{DocumentId, DocumentSelector, DocumentSource};
use crate::error::MonitorError;
use crate::event_log::{EndStatus, Event, EventKind, EventLog};
use crate::queue::DetectionQueue;
use crate::report::Report;

/// Lifecycle state guarded by the session lock.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    running: bool,
    /// Incremented on every start; background tasks carry the value they were
    /// spawned with and stop once it is no longer current.
    generation: u64,
    duration: f64,
    started_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.running && self.generation == generation
    }
}

/// Point-in-time view of the session, for status displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub running: bool,
    pub duration: f64,
    pub started_at: Option<DateTime<Utc>>,
    pub active_document: DocumentId,
    pub pending_detections: usize,
}

pub(crate) struct Shared {
    pub(crate) config: MonitorConfig,
    pub(crate) source: Arc<dyn DocumentSource>,
    pub(crate) selector: DocumentSelector,
    pub(crate) log: EventLog,
    pub(crate) queue: DetectionQueue,
    session: Mutex<SessionState>,
}

impl Shared {
    /// Lock order is session, then log/queue. Never held across an await.
    pub(crate) fn lock_session(&self) -> MutexGuard<'_, SessionState> {
        match self.session.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.lock_session().is_current(generation)
    }

    /// End the session `generation` when its timer fires.
    fn expire(&self, generation: u64) -> bool {
        let mut session = self.lock_session();
        if !session.is_current(generation) {
            debug!(generation, "Session already ended before expiry");
            return false;
        }

        session.running = false;
        self.log.append(EventKind::SessionEnded {
            status: EndStatus::Completed,
        });
        info!(generation, "Simulation ended automatically after scheduled duration");
        true
    }
}

/// Change-detection harness: document selection, polling sessions, the event
/// log and the detection queue behind one cloneable handle.
///
/// `start` spawns background tasks and must be called inside a Tokio runtime.
#[derive(Clone)]
pub struct Monitor {
    shared: Arc<Shared>,
}

impl Monitor {
    pub fn new(config: MonitorConfig, source: Arc<dyn DocumentSource>) -> Self {
        let log = match config.snapshot_path.clone() {
            Some(path) => EventLog::with_snapshot(path),
            None => EventLog::new(),
        };

        Self {
            shared: Arc::new(Shared {
                config,
                source,
                selector: DocumentSelector::default(),
                log,
                queue: DetectionQueue::new(),
                session: Mutex::new(SessionState::default()),
            }),
        }
    }

    pub fn active_document(&self) -> DocumentId {
        self.shared.selector.active()
    }

    pub fn source(&self) -> &Arc<dyn DocumentSource> {
        &self.shared.source
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock_session().running
    }

    pub fn status(&self) -> SessionStatus {
        let session = self.shared.lock_session();
        SessionStatus {
            running: session.running,
            duration: session.duration,
            started_at: session.started_at,
            active_document: self.shared.selector.active(),
            pending_detections: self.shared.queue.len(),
        }
    }

    /// Make `identifier` the monitored document.
    ///
    /// Takes effect on the next poll cycle. Allowed whether or not a session
    /// is running.
    pub fn switch_document(&self, identifier: &str) -> Result<DocumentId, MonitorError> {
        let _session = self.shared.lock_session();
        match self.shared.selector.switch(identifier) {
            Ok(id) => {
                self.shared
                    .log
                    .append(EventKind::DocumentSwitched { document: id });
                info!(document = %id, "HTML switched");
                Ok(id)
            }
            Err(e) => {
                warn!(requested = identifier, "Invalid HTML type requested");
                Err(e)
            }
        }
    }

    /// Pop the oldest pending detection.
    pub fn poll_detection(&self) -> Option<DateTime<Utc>> {
        let detection = self.shared.queue.pop();
        if let Some(at) = detection {
            info!(timestamp = %at.to_rfc3339(), "Reporting detection");
        }
        detection
    }

    /// Start a session lasting `duration` units (the configured default when
    /// `None`).
    pub fn start(&self, duration: Option<f64>) -> Result<(), MonitorError> {
        let duration = duration.unwrap_or(self.shared.config.default_duration);
        let Some(length) = self.shared.config.session_length(duration) else {
            warn!(duration, "Rejected simulation start with invalid duration");
            return Err(MonitorError::InvalidDuration(duration));
        };

        let generation = {
            let mut session = self.shared.lock_session();
            if session.running {
                warn!("Attempt to start simulation when already running");
                return Err(MonitorError::AlreadyRunning);
            }

            session.running = true;
            session.generation += 1;
            session.duration = duration;
            session.started_at = Some(Utc::now());

            self.shared.log.clear();
            self.shared
                .log
                .append(EventKind::SessionStarted { duration });
            session.generation
        };

        info!(generation, duration, "Starting simulation");

        tokio::spawn(detector::run(self.shared.clone(), generation));
        tokio::spawn(expire_after(self.shared.clone(), generation, length));

        Ok(())
    }

    /// End the running session manually.
    pub fn stop(&self) -> Result<(), MonitorError> {
        let mut session = self.shared.lock_session();
        if !session.running {
            warn!("Attempt to stop simulation when not running");
            return Err(MonitorError::NotRunning);
        }

        session.running = false;
        self.shared.log.append(EventKind::SessionEnded {
            status: EndStatus::StoppedManually,
        });
        info!(generation = session.generation, "Simulation stopped manually");
        Ok(())
    }

    /// Stop the session if one is running. Returns whether one was stopped.
    pub fn shutdown(&self) -> bool {
        self.stop().is_ok()
    }

    /// Copy of the event log.
    pub fn events(&self) -> Vec<Event> {
        self.shared.log.snapshot()
    }

    pub fn report(&self) -> Report {
        let report = Report::from_events(self.shared.log.snapshot());
        info!(
            changes = report.total_changes,
            detections = report.detected_changes,
            accuracy = report.accuracy,
            "Report generated"
        );
        report
    }

    #[cfg(test)]
    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    #[cfg(test)]
    pub(crate) fn generation(&self) -> u64 {
        self.shared.lock_session().generation
    }
}

async fn expire_after(shared: Arc<Shared>, generation: u64, length: Duration) {
    debug!(generation, secs = length.as_secs_f64(), "Simulation end scheduled");
    tokio::time::sleep(length).await;
    shared.expire(generation);
}
