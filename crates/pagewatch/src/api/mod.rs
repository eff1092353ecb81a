mod detections;
mod pages;
mod simulation;

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;

use pagewatch_core::{Monitor, MonitorError};

#[derive(Clone)]
pub struct AppState {
    pub monitor: Monitor,
    /// Directory static assets are served from.
    pub root: PathBuf,
}

pub fn create_router(monitor: Monitor, root: PathBuf) -> Router {
    let state = AppState { monitor, root };

    Router::new()
        .route("/", get(pages::index))
        .route("/script.js", get(pages::script))
        .route("/health", get(pages::health))
        .route("/switch-html", post(detections::switch_html))
        .route("/check-detections", get(detections::check_detections))
        .route("/start-simulation", post(simulation::start_simulation))
        .route("/stop-simulation", post(simulation::stop_simulation))
        .route("/simulation-report", get(simulation::get_report))
        .route("/simulation-status", get(simulation::get_status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Body returned by every control operation.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl ActionResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            code: None,
        }
    }
}

/// A rejected control operation.
#[derive(Debug)]
pub struct ApiError(pub MonitorError);

impl From<MonitorError> for ApiError {
    fn from(e: MonitorError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_invalid_input() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::CONFLICT
        };

        let body = ActionResponse {
            success: false,
            error: Some(self.0.to_string()),
            code: Some(self.0.code()),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use pagewatch_core::{DocumentId, MemorySource, MonitorConfig};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn test_router() -> (Router, Monitor) {
        let source = Arc::new(MemorySource::new());
        source.set(DocumentId::Index, "<html>index</html>");
        source.set(DocumentId::Alternative, "<html>alternative</html>");
        let monitor = Monitor::new(MonitorConfig::default().with_snapshot_path(None), source);
        let router = create_router(monitor.clone(), PathBuf::from("."));
        (router, monitor)
    }

    async fn send(router: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn send_json(
        router: &Router,
        method: Method,
        uri: &str,
        body: &str,
    ) -> (StatusCode, Value) {
        let (status, text) = send(router, method, uri, body).await;
        (status, serde_json::from_str(&text).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = test_router();
        let (status, body) = send_json(&router, Method::GET, "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_index_serves_active_document() {
        let (router, monitor) = test_router();
        let (status, body) = send(&router, Method::GET, "/", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<html>index</html>");

        monitor.switch_document("alternative").unwrap();
        let (_, body) = send(&router, Method::GET, "/", "").await;
        assert_eq!(body, "<html>alternative</html>");
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let (router, monitor) = test_router();

        let (status, body) =
            send_json(&router, Method::POST, "/start-simulation", r#"{"duration": 1}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(monitor.is_running());

        let (status, body) = send_json(&router, Method::POST, "/start-simulation", "").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "already_running");
        assert_eq!(body["error"], "Simulation already running");

        let (status, body) = send_json(&router, Method::POST, "/stop-simulation", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, body) = send_json(&router, Method::POST, "/stop-simulation", "").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "not_running");
    }

    #[tokio::test]
    async fn test_start_uses_default_duration() {
        let (router, monitor) = test_router();
        let (status, _) = send_json(&router, Method::POST, "/start-simulation", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(monitor.status().duration, 2.0);
        monitor.shutdown();
    }

    #[tokio::test]
    async fn test_start_rejects_bad_payload() {
        let (router, monitor) = test_router();

        let (status, body) =
            send_json(&router, Method::POST, "/start-simulation", r#"{"duration": "long"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "malformed_request");

        let (status, body) =
            send_json(&router, Method::POST, "/start-simulation", r#"{"duration": -3}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_duration");

        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn test_switch_html() {
        let (router, monitor) = test_router();

        let (status, body) =
            send_json(&router, Method::POST, "/switch-html", r#"{"html": "alternative"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(monitor.active_document(), DocumentId::Alternative);

        let (status, body) =
            send_json(&router, Method::POST, "/switch-html", r#"{"html": "legacy"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "unknown_document");
        assert_eq!(monitor.active_document(), DocumentId::Alternative);

        let (status, body) = send_json(&router, Method::POST, "/switch-html", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "malformed_request");
    }

    #[tokio::test]
    async fn test_check_detections_empty() {
        let (router, _) = test_router();
        let (status, body) = send_json(&router, Method::GET, "/check-detections", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "detected": false }));
    }

    #[tokio::test]
    async fn test_report_shape() {
        let (router, _) = test_router();
        send_json(&router, Method::POST, "/switch-html", r#"{"html": "alternative"}"#).await;

        let (status, body) = send_json(&router, Method::GET, "/simulation-report", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_changes"], 1);
        assert_eq!(body["detected_changes"], 0);
        assert_eq!(body["accuracy"], 0.0);
        assert_eq!(body["log_data"][0]["type"], "document_switched");
    }

    #[tokio::test]
    async fn test_status() {
        let (router, _) = test_router();
        let (status, body) = send_json(&router, Method::GET, "/simulation-status", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["running"], false);
        assert_eq!(body["active_document"], "index");
        assert_eq!(body["pending_detections"], 0);
    }

    #[tokio::test]
    async fn test_script_served_from_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("script.js"), "console.log('hi');").unwrap();
        let source = Arc::new(MemorySource::new());
        let monitor = Monitor::new(MonitorConfig::default().with_snapshot_path(None), source);
        let router = create_router(monitor, dir.path().to_path_buf());

        let (status, body) = send(&router, Method::GET, "/script.js", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "console.log('hi');");

        std::fs::remove_file(dir.path().join("script.js")).unwrap();
        let (status, _) = send(&router, Method::GET, "/script.js", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
