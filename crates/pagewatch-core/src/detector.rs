//! Background loop that samples the active document and records changes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::event_log::EventKind;
use crate::monitor::Shared;

/// Compares each read of the monitored document with the previous one.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last_observed: String,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `content` as the latest read.
    ///
    /// Returns true when a previous non-empty read exists and differs from
    /// `content`. The first read never counts as a change.
    pub fn observe(&mut self, content: String) -> bool {
        let changed = !self.last_observed.is_empty() && self.last_observed != content;
        self.last_observed = content;
        changed
    }

    pub fn last_observed(&self) -> &str {
        &self.last_observed
    }
}

/// Result of a single poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Unchanged,
    Changed(DateTime<Utc>),
    /// The document could not be read; nothing was recorded.
    ReadFailed,
    /// The session this detector belongs to is over.
    Superseded,
}

/// Poll the active document until the session identified by `generation` ends.
pub(crate) async fn run(shared: Arc<Shared>, generation: u64) {
    info!(generation, "HTML extractor started");

    let mut detector = ChangeDetector::new();
    // `interval` panics on a zero period.
    let period = shared.config.poll_interval.max(Duration::from_millis(1));
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if !shared.is_current(generation) {
            break;
        }

        if poll_cycle(&shared, &mut detector, generation).await == CycleOutcome::Superseded {
            break;
        }

        debug!(
            interval_secs = period.as_secs_f64(),
            "HTML extractor waiting for next check"
        );
    }

    info!(generation, "HTML extractor stopped");
}

/// Read the active document once and record a detection if it changed.
pub(crate) async fn poll_cycle(
    shared: &Shared,
    detector: &mut ChangeDetector,
    generation: u64,
) -> CycleOutcome {
    let active = shared.selector.active();

    let content = match shared.source.read(active).await {
        Ok(content) => content,
        Err(e) => {
            error!(document = %active, error = %e, "Error in HTML extractor");
            return CycleOutcome::ReadFailed;
        }
    };

    // Commit under the session lock so nothing lands after the session ended.
    let session = shared.lock_session();
    if !session.is_current(generation) {
        return CycleOutcome::Superseded;
    }

    if !detector.observe(content) {
        debug!(document = %active, "HTML extractor check - No changes detected");
        return CycleOutcome::Unchanged;
    }

    let now = Utc::now();
    shared
        .log
        .append_at(now, EventKind::ChangeDetected { timestamp: now });
    shared.queue.push(now);
    drop(session);

    info!(document = %active, timestamp = %now.to_rfc3339(), "HTML change detected");
    CycleOutcome::Changed(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_read_is_not_a_change() {
        let mut detector = ChangeDetector::new();
        assert!(!detector.observe("<html>a</html>".into()));
        assert_eq!(detector.last_observed(), "<html>a</html>");
    }

    #[test]
    fn test_identical_reads() {
        let mut detector = ChangeDetector::new();
        detector.observe("same".into());
        assert!(!detector.observe("same".into()));
        assert!(!detector.observe("same".into()));
    }

    #[test]
    fn test_change_and_restore() {
        let mut detector = ChangeDetector::new();
        detector.observe("original".into());
        assert!(detector.observe("altered".into()));
        assert!(detector.observe("original".into()));
        assert!(!detector.observe("original".into()));
    }

    #[test]
    fn test_empty_previous_read_counts_as_no_prior() {
        let mut detector = ChangeDetector::new();
        detector.observe(String::new());
        assert!(!detector.observe("now filled".into()));
        assert!(detector.observe(String::new()));
    }
}
