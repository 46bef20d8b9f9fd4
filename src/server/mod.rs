//! HTTP surface: a JSON API over the session registry.
//!
//! Route set mirrors the controller's contract: create a session, drive the
//! range-builder filters on it, inspect or close it.

pub mod types;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::error::{RangepilotError, Result};
use crate::range::FilterFailure;
use crate::session::{SessionInfo, SessionRegistry, SessionStatus};
use types::{
    CloseResponse, CreateRequest, CreateResponse, GetRangeRequest, GetRangeResponse,
    SessionListResponse,
};

#[derive(Clone)]
pub struct AppState {
    registry: Arc<SessionRegistry>,
}

/// Error shape for every non-2xx response
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    failures: Vec<FilterFailure>,
    action_performed: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            failures: Vec::new(),
            action_performed: None,
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    fn with_failures(mut self, failures: Vec<FilterFailure>) -> Self {
        self.failures = failures;
        self
    }

    fn with_action(mut self, action_performed: String) -> Self {
        self.action_performed = Some(action_performed);
        self
    }
}

impl From<RangepilotError> for ApiError {
    fn from(err: RangepilotError) -> Self {
        let status = match &err {
            RangepilotError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            RangepilotError::SessionNotActive(_) | RangepilotError::InvalidFilterValue { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let mut body = serde_json::json!({ "error": self.message });
        if !self.failures.is_empty() {
            body["failures"] = serde_json::to_value(&self.failures).unwrap_or_default();
        }
        if let Some(action) = self.action_performed {
            body["action_performed"] = serde_json::Value::String(action);
        }
        (self.status, Json(body)).into_response()
    }
}

/// Liveness banner
async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Range builder browser controller API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateRequest>,
) -> std::result::Result<Json<CreateResponse>, ApiError> {
    if request.action != "create" {
        return Err(ApiError::bad_request("Action must be 'create'"));
    }

    let info = state.registry.create().await;
    tracing::info!(session_id = %info.session_id, "created new browser session");

    Ok(Json(CreateResponse {
        session_id: info.session_id,
        status: info.status.to_string(),
        message: "Browser session created successfully. Browser is launching in background."
            .to_string(),
    }))
}

async fn get_range(
    State(state): State<AppState>,
    Json(request): Json<GetRangeRequest>,
) -> std::result::Result<Json<GetRangeResponse>, ApiError> {
    if request.action != "get-range" {
        return Err(ApiError::bad_request("Action must be 'get-range'"));
    }

    let GetRangeRequest {
        session_id,
        filters,
        ..
    } = request;

    // Unknown ids are 404 regardless of the rest of the payload
    let info = state
        .registry
        .get(&session_id)
        .await
        .ok_or_else(|| ApiError::not_found("Session not found"))?;

    // Validate the whole selection before anything touches the page
    filters.validate()?;

    if info.status != SessionStatus::Active {
        return Err(ApiError::bad_request("Session is not active"));
    }

    let report = state.registry.apply_filters(&session_id, filters).await?;

    if !report.failures.is_empty() {
        let named = report
            .failures
            .iter()
            .map(|f| format!("{} '{}'", f.filter, f.value))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ApiError::internal(format!("Failed to apply {named}"))
            .with_failures(report.failures)
            .with_action(report.action_performed));
    }

    tracing::info!(session_id = %session_id, action = %report.action_performed, "filter sequence completed");

    Ok(Json(GetRangeResponse {
        session_id,
        status: "success".to_string(),
        message: report.message,
        action_performed: report.action_performed,
    }))
}

async fn list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    let sessions = state.registry.list().await;
    let total = sessions.len();
    Json(SessionListResponse { sessions, total })
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> std::result::Result<Json<SessionInfo>, ApiError> {
    state
        .registry
        .get(&session_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Session not found"))
}

async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> std::result::Result<Json<CloseResponse>, ApiError> {
    state.registry.close(&session_id).await?;
    Ok(Json(CloseResponse {
        message: format!("Session {session_id} closed successfully"),
    }))
}

/// Build the application router around a registry
pub fn router(registry: Arc<SessionRegistry>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/create", post(create_session))
        .route("/get-range", post(get_range))
        .route("/sessions", get(list_sessions))
        .route(
            "/sessions/:session_id",
            get(get_session).delete(close_session),
        )
        .layer(CorsLayer::permissive())
        .with_state(AppState { registry })
}

/// Bind and serve until ctrl-c
pub async fn serve(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let registry = Arc::new(SessionRegistry::new(&config));
    let app = router(registry);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "range builder controller listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
