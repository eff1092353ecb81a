use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;

use pagewatch_core::{MonitorError, Report, SessionStatus};

use super::{ActionResponse, ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    /// Session length in duration units; the configured default when absent.
    pub duration: Option<f64>,
}

impl StartRequest {
    /// An empty body means "use the defaults".
    fn parse(body: &[u8]) -> Result<Self, MonitorError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| MonitorError::MalformedRequest(e.to_string()))
    }
}

pub async fn start_simulation(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ActionResponse>, ApiError> {
    let request = StartRequest::parse(&body)?;
    state.monitor.start(request.duration)?;
    Ok(Json(ActionResponse::ok()))
}

pub async fn stop_simulation(
    State(state): State<AppState>,
) -> Result<Json<ActionResponse>, ApiError> {
    state.monitor.stop()?;
    Ok(Json(ActionResponse::ok()))
}

pub async fn get_report(State(state): State<AppState>) -> Json<Report> {
    Json(state.monitor.report())
}

pub async fn get_status(State(state): State<AppState>) -> Json<SessionStatus> {
    Json(state.monitor.status())
}
