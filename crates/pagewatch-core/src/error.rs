use thiserror::Error;

/// Errors returned by the monitor's control operations.
///
/// Every variant is a rejection: the operation that produced it left all
/// monitor state untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    #[error("Simulation already running")]
    AlreadyRunning,

    #[error("No simulation running")]
    NotRunning,

    #[error("Invalid HTML type: {0}")]
    UnknownDocument(String),

    #[error("Invalid duration: {0} (must be a positive number of duration units)")]
    InvalidDuration(f64),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),
}

impl MonitorError {
    /// Stable, machine-readable name of the condition.
    pub fn code(&self) -> &'static str {
        match self {
            MonitorError::AlreadyRunning => "already_running",
            MonitorError::NotRunning => "not_running",
            MonitorError::UnknownDocument(_) => "unknown_document",
            MonitorError::InvalidDuration(_) => "invalid_duration",
            MonitorError::MalformedRequest(_) => "malformed_request",
        }
    }

    /// True for rejected input, false for illegal state transitions.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, MonitorError::AlreadyRunning | MonitorError::NotRunning)
    }
}

/// Errors raised while reading a monitored document.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Document not available: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(MonitorError::AlreadyRunning.code(), "already_running");
        assert_eq!(MonitorError::NotRunning.code(), "not_running");
        assert_eq!(
            MonitorError::UnknownDocument("x".into()).code(),
            "unknown_document"
        );
        assert_eq!(MonitorError::InvalidDuration(-1.0).code(), "invalid_duration");
    }

    #[test]
    fn test_invalid_duration_message_names_units() {
        let msg = MonitorError::InvalidDuration(0.0).to_string();
        assert!(msg.contains("duration units"));
        assert!(!msg.contains("minutes"));
    }

    #[test]
    fn test_taxonomy() {
        assert!(!MonitorError::AlreadyRunning.is_invalid_input());
        assert!(!MonitorError::NotRunning.is_invalid_input());
        assert!(MonitorError::UnknownDocument("x".into()).is_invalid_input());
        assert!(MonitorError::MalformedRequest("bad".into()).is_invalid_input());
    }
}
