use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pagewatch_core::MonitorError;

use super::{ActionResponse, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct SwitchRequest {
    pub html: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DetectionResponse {
    pub detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

pub async fn switch_html(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ActionResponse>, ApiError> {
    let request: SwitchRequest = serde_json::from_slice(&body)
        .map_err(|e| MonitorError::MalformedRequest(e.to_string()))?;
    let html = request
        .html
        .ok_or_else(|| MonitorError::MalformedRequest("missing field `html`".to_string()))?;

    state.monitor.switch_document(&html)?;
    Ok(Json(ActionResponse::ok()))
}

pub async fn check_detections(State(state): State<AppState>) -> Json<DetectionResponse> {
    let timestamp = state.monitor.poll_detection();
    Json(DetectionResponse {
        detected: timestamp.is_some(),
        timestamp,
    })
}
