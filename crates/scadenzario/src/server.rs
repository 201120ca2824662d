use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, info, warn, Level};

use crate::board::Board;
use crate::html;
use crate::kv::KeyValueStore;
use crate::store::{AssignmentStore, StoreError, ValidationError};
use crate::types::{Assignment, AssignmentDraft};

pub type DynStore = AssignmentStore<Box<dyn KeyValueStore + Send>>;

/// Application state shared across requests
pub struct AppState {
    pub store: Mutex<DynStore>,
    /// Fixed day to classify against, `None` means the local clock
    pub today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(store: DynStore, today: Option<NaiveDate>) -> Self {
        Self {
            store: Mutex::new(store),
            today,
        }
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(crate::urgency::today)
    }
}

/// Start the web server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!(url = %format!("http://{addr}"), "Server running, press Ctrl+C to stop");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/assignments", post(add_form_handler))
        .route("/assignments/{id}/toggle", post(toggle_form_handler))
        .route("/assignments/{id}/delete", post(delete_form_handler))
        .route("/api/assignments", get(list_handler).post(add_api_handler))
        .route("/api/assignments/{id}", delete(delete_api_handler))
        .route("/api/assignments/{id}/toggle", post(toggle_api_handler))
        .route("/api/board", get(board_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Error returned by handlers, rendered as `{"error": ...}`
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    NotFound(String),
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(e) => ApiError::Validation(e),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::NotFound(id) => (StatusCode::NOT_FOUND, format!("assignment not found: {id}")),
            ApiError::Internal(message) => {
                error!(error = %message, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Serve the main HTML page
async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let store = state.store.lock().await;
    let today = state.today();
    let board = Board::build(store.list(), today);
    Html(html::render_page(&board, today).into_string())
}

async fn add_form_handler(
    State(state): State<Arc<AppState>>,
    Form(draft): Form<AssignmentDraft>,
) -> Result<Redirect, ApiError> {
    let mut store = state.store.lock().await;
    match store.add(draft) {
        Ok(_) => {}
        Err(StoreError::Validation(e)) => {
            warn!(error = %e, "Rejected assignment form");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/"))
}

async fn toggle_form_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    state.store.lock().await.toggle_complete(&id)?;
    Ok(Redirect::to("/"))
}

async fn delete_form_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    state.store.lock().await.remove(&id)?;
    Ok(Redirect::to("/"))
}

/// Return assignments as JSON, in insertion order
async fn list_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Assignment>> {
    let store = state.store.lock().await;
    Json(store.list().to_vec())
}

async fn add_api_handler(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<AssignmentDraft>,
) -> Result<(StatusCode, Json<Assignment>), ApiError> {
    let assignment = state.store.lock().await.add(draft)?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn delete_api_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.lock().await.remove(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_api_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Assignment>, ApiError> {
    let mut store = state.store.lock().await;
    if !store.toggle_complete(&id)? {
        return Err(ApiError::NotFound(id));
    }
    store
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

/// Sorted pending items, completed items and the reminder summary
async fn board_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = state.store.lock().await;
    let board = Board::build(store.list(), state.today());
    let value = serde_json::to_value(&board).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(value))
}
