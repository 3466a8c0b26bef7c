use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::answer::{AnswerView, RenderedAnswer};
use crate::citations::parse_answer;
use crate::config::AppConfig;
use crate::highlight::{CodeBlock, HighlighterRegistry};
use crate::models::{AskResponse, Feedback, FrontendSettings, ParsedAnswer};
use crate::state::{Action, AppState, Store};

#[derive(Clone)]
struct ServerState {
    config: AppConfig,
    store: Arc<Mutex<Store>>,
    highlighter: Arc<HighlighterRegistry>,
}

#[derive(Debug, Deserialize)]
struct HighlightRequest {
    class_name: Option<String>,
    code: String,
}

pub async fn run_server(config: AppConfig) -> Result<()> {
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_addr))?;

    let app = build_router(config);

    tracing::info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(config: AppConfig) -> Router {
    let static_dir = config.static_dir.clone();
    let state = ServerState {
        config,
        store: Arc::new(Mutex::new(Store::default())),
        highlighter: Arc::new(HighlighterRegistry::default()),
    };

    Router::new()
        .route("/api/health", get(health))
        .route("/api/frontend_settings", get(frontend_settings))
        .route("/api/answer/parse", post(parse_handler))
        .route("/api/answer/render", post(render_handler))
        .route("/api/code/highlight", post(highlight_handler))
        .route("/api/state", get(get_state))
        .route("/api/state/dispatch", post(dispatch_handler))
        .route("/api/state/feedback/:answer_id", get(get_feedback))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn frontend_settings(State(state): State<ServerState>) -> Json<FrontendSettings> {
    Json(state.config.frontend_settings())
}

async fn parse_handler(
    Json(request): Json<AskResponse>,
) -> Result<Json<ParsedAnswer>, ApiError> {
    parse_answer(&request)
        .map(Json)
        .ok_or_else(ApiError::missing_answer)
}

async fn render_handler(
    Json(request): Json<AskResponse>,
) -> Result<Json<RenderedAnswer>, ApiError> {
    let view = AnswerView::from_response(&request).ok_or_else(ApiError::missing_answer)?;
    Ok(Json(RenderedAnswer::from(view)))
}

async fn highlight_handler(
    State(state): State<ServerState>,
    Json(request): Json<HighlightRequest>,
) -> Result<Json<CodeBlock>, ApiError> {
    let block = state
        .highlighter
        .render(request.class_name.as_deref(), &request.code)?;
    Ok(Json(block))
}

async fn get_state(State(state): State<ServerState>) -> Result<Json<AppState>, ApiError> {
    let store = state
        .store
        .lock()
        .map_err(|_| ApiError::from(anyhow::anyhow!("lock poisoned")))?;
    Ok(Json(store.state().clone()))
}

async fn dispatch_handler(
    State(state): State<ServerState>,
    Json(action): Json<Action>,
) -> Result<Json<AppState>, ApiError> {
    let mut store = state
        .store
        .lock()
        .map_err(|_| ApiError::from(anyhow::anyhow!("lock poisoned")))?;
    Ok(Json(store.dispatch(action).clone()))
}

async fn get_feedback(
    State(state): State<ServerState>,
    Path(answer_id): Path<String>,
) -> Result<Json<Feedback>, ApiError> {
    let feedback = state
        .store
        .lock()
        .map_err(|_| ApiError::from(anyhow::anyhow!("lock poisoned")))?
        .state()
        .feedback_for(&answer_id);

    match feedback {
        Some(feedback) => Ok(Json(feedback)),
        None => Err(ApiError::not_found(format!(
            "no feedback recorded for answer: {}",
            answer_id
        ))),
    }
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: String) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message,
        }
    }

    fn missing_answer() -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "answer text is missing or not a string".to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: value.to_string(),
        }
    }
}

impl From<askama::Error> for ApiError {
    fn from(value: askama::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: value.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}
