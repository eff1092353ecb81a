use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use serde_json::json;
use tracing::{error, info};

use pagewatch_core::DocumentSource;

use super::AppState;

/// Serve the document currently selected for monitoring.
pub async fn index(State(state): State<AppState>) -> Response {
    let active = state.monitor.active_document();
    info!(document = %active, "Serving index page");

    match state.monitor.source().read(active).await {
        Ok(content) => Html(content).into_response(),
        Err(e) => {
            error!(document = %active, error = %e, "Failed to serve index page");
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

pub async fn script(State(state): State<AppState>) -> Response {
    info!("Serving script.js");
    let path = state.root.join("script.js");

    match tokio::fs::read_to_string(&path).await {
        Ok(content) => {
            ([(header::CONTENT_TYPE, "application/javascript")], content).into_response()
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to serve script.js");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

pub async fn health() -> Json<serde_json::Value> {
    info!("Health check requested");
    Json(json!({ "status": "ok" }))
}
