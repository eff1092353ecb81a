use std::path::PathBuf;
use std::time::Duration;

use crate::document::DocumentPaths;

/// Default time between two reads of the active document.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);

/// Length of one unit of session duration (durations are given in minutes).
pub const DEFAULT_DURATION_UNIT: Duration = Duration::from_secs(60);

/// Session duration used when a start request does not specify one.
pub const DEFAULT_SESSION_DURATION: f64 = 2.0;

/// Default file the event log is mirrored to.
pub const DEFAULT_SNAPSHOT_FILE: &str = "simulation_log.json";

/// Runtime settings for a [`Monitor`](crate::Monitor).
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    pub duration_unit: Duration,
    pub default_duration: f64,
    /// Where the event log is mirrored; `None` keeps it in memory only.
    pub snapshot_path: Option<PathBuf>,
    pub documents: DocumentPaths,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            duration_unit: DEFAULT_DURATION_UNIT,
            default_duration: DEFAULT_SESSION_DURATION,
            snapshot_path: Some(PathBuf::from(DEFAULT_SNAPSHOT_FILE)),
            documents: DocumentPaths::default(),
        }
    }
}

impl MonitorConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_duration_unit(mut self, unit: Duration) -> Self {
        self.duration_unit = unit;
        self
    }

    pub fn with_default_duration(mut self, duration: f64) -> Self {
        self.default_duration = duration;
        self
    }

    pub fn with_snapshot_path(mut self, path: Option<PathBuf>) -> Self {
        self.snapshot_path = path;
        self
    }

    pub fn with_documents(mut self, documents: DocumentPaths) -> Self {
        self.documents = documents;
        self
    }

    /// Wall-clock length of a session of `duration` units.
    ///
    /// Returns `None` unless `duration` is finite and positive.
    pub fn session_length(&self, duration: f64) -> Option<Duration> {
        if !duration.is_finite() || duration <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(self.duration_unit.as_secs_f64() * duration).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(20));
        assert_eq!(config.default_duration, 2.0);
        assert_eq!(
            config.snapshot_path.as_deref(),
            Some(std::path::Path::new("simulation_log.json"))
        );
    }

    #[test]
    fn test_session_length() {
        let config = MonitorConfig::default();
        assert_eq!(config.session_length(2.0), Some(Duration::from_secs(120)));
        assert_eq!(config.session_length(0.5), Some(Duration::from_secs(30)));
        assert_eq!(config.session_length(0.0), None);
        assert_eq!(config.session_length(-1.0), None);
        assert_eq!(config.session_length(f64::NAN), None);
        assert_eq!(config.session_length(f64::INFINITY), None);
    }
}
