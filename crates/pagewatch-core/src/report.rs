use serde::{Deserialize, Serialize};

use crate::event_log::{Event, EventKind};

/// Summary of the current session derived from the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Document switches, i.e. changes the harness deliberately introduced.
    pub total_changes: usize,
    /// Content changes noticed by the detector.
    pub detected_changes: usize,
    /// `detected_changes / total_changes * 100`, rounded to two decimals.
    /// Zero when nothing was switched.
    pub accuracy: f64,
    #[serde(rename = "log_data")]
    pub log: Vec<Event>,
}

impl Report {
    pub fn from_events(log: Vec<Event>) -> Self {
        let total_changes = log
            .iter()
            .filter(|e| matches!(e.kind, EventKind::DocumentSwitched { .. }))
            .count();
        let detected_changes = log
            .iter()
            .filter(|e| matches!(e.kind, EventKind::ChangeDetected { .. }))
            .count();

        Self {
            total_changes,
            detected_changes,
            accuracy: accuracy(detected_changes, total_changes),
            log,
        }
    }
}

fn accuracy(detected: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let ratio = detected as f64 / total as f64 * 100.0;
    (ratio * 100.0).round() / 100.0
}
