//! HTTP route handlers.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use proctor_core::api::{Sample, TrustSnapshot};

use crate::http::{
    models::{HealthResponse, HttpServerError, LogEventRequest, MessageResponse},
    state::AppState,
};

/// All routes, without middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/log-event", post(log_event_handler))
        .route("/api/logViolation", post(log_violation_handler))
        .route("/api/sample", post(sample_handler))
        .route("/api/trust", get(trust_handler))
        .route("/api/reset", post(reset_handler))
        .route("/logs/activity", get(activity_handler))
        .route("/health", get(health_handler))
        .route("/api/shutdown", post(shutdown_handler))
        .with_state(state)
}

/// POST /log-event - queue one client line for the throttled activity log
async fn log_event_handler(
    State(state): State<AppState>,
    Json(req): Json<LogEventRequest>,
) -> Result<Json<MessageResponse>, HttpServerError> {
    state.record_request("/log-event");

    let message = req
        .log
        .filter(|log| !log.trim().is_empty())
        .ok_or_else(|| HttpServerError::InvalidRequest("Log message is required".into()))?;

    // Lines inside the shared log window are dropped but still reported as saved.
    state.monitor.log_event(message).await?;

    Ok(Json(MessageResponse::new("Log saved")))
}

/// POST /api/logViolation - overwrite the stored trust snapshot
async fn log_violation_handler(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<&'static str, HttpServerError> {
    state.record_request("/api/logViolation");

    let snapshot: TrustSnapshot = serde_json::from_value(body)
        .map_err(|e| HttpServerError::InvalidRequest(format!("invalid trust snapshot: {e}")))?;
    snapshot
        .check()
        .map_err(|reason| HttpServerError::InvalidRequest(format!("invalid trust snapshot: {reason}")))?;

    state
        .sink
        .persist(&snapshot)
        .await
        .inspect_err(|_| state.record_error())?;

    tracing::debug!(
        target: "proctor.http",
        score = snapshot.score,
        label = %snapshot.label,
        "trust snapshot stored by client"
    );
    Ok("Log updated")
}

/// POST /api/sample - queue one raw sample for the monitor
async fn sample_handler(
    State(state): State<AppState>,
    Json(sample): Json<Sample>,
) -> Result<(StatusCode, Json<MessageResponse>), HttpServerError> {
    state.record_request("/api/sample");
    state.monitor.submit(sample).await?;
    Ok((StatusCode::ACCEPTED, Json(MessageResponse::new("Sample queued"))))
}

/// GET /api/trust
async fn trust_handler(State(state): State<AppState>) -> Json<TrustSnapshot> {
    state.record_request("/api/trust");
    Json(state.monitor.snapshot())
}

/// POST /api/reset
async fn reset_handler(
    State(state): State<AppState>,
) -> Result<Json<TrustSnapshot>, HttpServerError> {
    state.record_request("/api/reset");
    let snapshot = state.monitor.reset().await?;
    Ok(Json(snapshot))
}

/// GET /logs/activity - whole activity log as plain text
async fn activity_handler(State(state): State<AppState>) -> Result<String, HttpServerError> {
    state.record_request("/logs/activity");
    state
        .sink
        .read_activity()
        .await
        .inspect_err(|_| state.record_error())
        .map_err(Into::into)
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let (uptime_seconds, requests_handled, errors_total, requests_by_route) = state
        .stats
        .read()
        .map(|stats| {
            (
                stats.uptime_seconds(),
                stats.requests_total,
                stats.errors_total,
                stats.per_route.clone(),
            )
        })
        .unwrap_or_default();

    Json(HealthResponse {
        status: "healthy".into(),
        session_id: state.session_id.clone(),
        uptime_seconds,
        requests_handled,
        errors_total,
        requests_by_route,
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// POST /api/shutdown - trigger graceful shutdown
async fn shutdown_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    let _ = state.shutdown_tx.send(());
    Json(MessageResponse::new("Shutdown signal sent"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
        response::Response,
    };
    use pretty_assertions::assert_eq;
    use proctor_core::api::{
        spawn_monitor, start_persistence, AppConfig, Engine, JsonFileSink, PersistenceSink,
        SystemClock, TrustLabel, ViolationCategory,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::broadcast;
    use tower::ServiceExt;

    fn test_state(dir: &tempfile::TempDir) -> AppState {
        let cfg = AppConfig::default();
        let sink: Arc<dyn PersistenceSink> = Arc::new(JsonFileSink::new(
            dir.path().join("trustScore.json"),
            dir.path().join("activity.log"),
        ));
        let tx = start_persistence(sink.clone(), &cfg.persistence);
        let engine =
            Engine::new(&cfg, Arc::new(SystemClock), Some(tx)).with_session_id("test-session");
        let (monitor, _join) = spawn_monitor(engine, 16);
        let (shutdown_tx, _) = broadcast::channel(1);
        AppState::new(monitor, sink, shutdown_tx)
    }

    fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn log_event_is_appended_to_activity_log() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state.clone());

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/log-event",
                serde_json::json!({"log": "Student opened question 3"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "Log saved");

        state.monitor.stop().await.unwrap();
        let response = app
            .oneshot(empty_request(Method::GET, "/logs/activity"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let log = body_text(response).await;
        assert!(log.starts_with('['));
        assert!(log.lines().next().unwrap().ends_with("] Student opened question 3"));
    }

    #[tokio::test]
    async fn log_events_within_one_second_write_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state.clone());

        state.monitor.submit(Sample::Copy).await.unwrap();
        for i in 0..3 {
            let response = app
                .clone()
                .oneshot(json_request(
                    Method::POST,
                    "/log-event",
                    serde_json::json!({"log": format!("Copy detected {i}")}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_json(response).await["message"], "Log saved");
        }
        state.monitor.stop().await.unwrap();

        let log = state.sink.read_activity().await.unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] Copy action detected"));
        assert!(lines[1].ends_with("] Session closed"));
    }

    #[tokio::test]
    async fn log_event_without_message_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        for body in [serde_json::json!({}), serde_json::json!({"log": "   "})] {
            let response = app
                .clone()
                .oneshot(json_request(Method::POST, "/log-event", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(response).await["error"], "Log message is required");
        }
    }

    #[tokio::test]
    async fn log_violation_overwrites_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state.clone());

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/logViolation",
                serde_json::json!({
                    "trustScore": 8.0,
                    "trustLabel": "High Trust",
                    "violations": [
                        {"type": "Copy Action", "number": 1, "negativeScore": 2.0}
                    ]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Log updated");

        let stored = state.sink.load().await.unwrap().unwrap();
        assert_eq!(stored.score, 8.0);
        assert_eq!(stored.label, TrustLabel::HighTrust);
        assert_eq!(stored.count_of(ViolationCategory::CopyAction), 1);
    }

    #[tokio::test]
    async fn log_violation_rejects_invalid_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let bodies = [
            serde_json::json!({"trustScore": 11.0, "trustLabel": "High Trust", "violations": []}),
            serde_json::json!({
                "trustScore": 9.0,
                "trustLabel": "High Trust",
                "violations": [{"type": "Tab Switch", "number": 1, "negativeScore": 1.0}]
            }),
            serde_json::json!({
                "trustScore": 9.0,
                "trustLabel": "High Trust",
                "violations": [{"type": "Speech", "number": 1, "negativeScore": -1.0}]
            }),
        ];
        for body in bodies {
            let response = app
                .clone()
                .oneshot(json_request(Method::POST, "/api/logViolation", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn samples_update_the_published_score() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state.clone());
        let mut updates = state.monitor.subscribe();

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/sample",
                serde_json::json!({"kind": "face_count", "count": 2}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        tokio::time::timeout(Duration::from_secs(2), updates.changed())
            .await
            .unwrap()
            .unwrap();

        let response = app
            .oneshot(empty_request(Method::GET, "/api/trust"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["trustScore"], 7.0);
        assert_eq!(body["trustLabel"], "Moderate Trust");
    }

    #[tokio::test]
    async fn reset_returns_clean_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        state
            .monitor
            .submit_violation(ViolationCategory::CopyAction)
            .await
            .unwrap();

        let response = create_router(state)
            .oneshot(empty_request(Method::POST, "/api/reset"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["trustScore"], 10.0);
    }

    #[tokio::test]
    async fn sample_after_stop_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        state.monitor.stop().await.unwrap();

        let response = create_router(state)
            .oneshot(json_request(
                Method::POST,
                "/api/sample",
                serde_json::json!({"kind": "copy"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn health_reports_session() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        state.record_request("/api/trust");

        let response = health_handler(State(state)).await;
        assert_eq!(response.0.status, "healthy");
        assert_eq!(response.0.session_id, "test-session");
        assert_eq!(response.0.requests_handled, 1);
        assert_eq!(response.0.errors_total, 0);
        assert_eq!(response.0.requests_by_route["/api/trust"], 1);
    }

    #[tokio::test]
    async fn shutdown_handler_signals() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let mut shutdown_rx = state.shutdown_tx.subscribe();

        let response = shutdown_handler(State(state)).await;
        assert_eq!(response.0.message, "Shutdown signal sent");
        assert!(shutdown_rx.try_recv().is_ok());
    }
}
