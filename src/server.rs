use crate::cache::{Snapshot, TableCache};
use crate::config::AppConfig;
use crate::data;
use crate::filter::{filter_points, FilterCriteria};
use crate::html;
use crate::map::{build_map_view, MapView};
use crate::render::{ListView, UNAVAILABLE};
use crate::responder::{respond, Reply};
use crate::session::{SessionId, SessionStore};
use crate::types::FocusPoint;
use crate::vocabulary::{extract_materials, municipalities, title_case};
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

pub struct AppState {
    pub config: AppConfig,
    pub cache: TableCache,
    pub sessions: SessionStore,
    page: String,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            cache: TableCache::new(config.cache.ttl()),
            sessions: SessionStore::new(config.server.session_idle()),
            page: html::locator_page(),
            config,
        }
    }

    /// Current snapshot of the data file, re-read when `reload` is set.
    pub fn snapshot(&self, reload: bool) -> Snapshot {
        let input = &self.config.input;
        let load = |path: &std::path::Path| data::load_points(path, input.sheet.as_deref());
        let now = Instant::now();
        if reload {
            self.cache.reload_with(&input.datafile, now, load)
        } else {
            self.cache.get_with(&input.datafile, now, load)
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Unavailable { detail: Option<String> },
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    detail: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unavailable { detail } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody { error: UNAVAILABLE.to_string(), detail },
            ),
            ApiError::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody { error: "Error interno".to_string(), detail: Some(detail) },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Loads off the async workers; an empty table halts rendering.
async fn available(state: &Arc<AppState>, reload: bool) -> Result<Snapshot, ApiError> {
    let state = state.clone();
    let snapshot = tokio::task::spawn_blocking(move || state.snapshot(reload))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    if snapshot.is_unavailable() {
        return Err(ApiError::Unavailable {
            detail: snapshot.failure.as_ref().map(|e| e.to_string()),
        });
    }
    Ok(snapshot)
}

#[derive(Deserialize, Default)]
pub struct FilterQuery {
    comuna: Option<String>,
    materiales: Option<String>,
    session: Option<SessionId>,
}

impl FilterQuery {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria::from_controls(self.comuna.as_deref(), self.materiales.as_deref())
    }
}

#[derive(Serialize)]
pub struct OptionsResponse {
    municipalities: Vec<String>,
    materials: Vec<String>,
}

#[derive(Deserialize)]
pub struct FocusRequest {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Deserialize)]
pub struct AskQuery {
    #[serde(default)]
    q: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/options", get(options_handler))
        .route("/api/points", get(points_handler))
        .route("/api/map", get(map_handler))
        .route("/api/sessions", post(open_session_handler))
        .route("/api/sessions/{id}", delete(close_session_handler))
        .route("/api/sessions/{id}/focus", put(set_focus_handler).delete(clear_focus_handler))
        .route("/api/reload", post(reload_handler))
        .route("/api/ask", get(ask_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: AppConfig) -> Result<()> {
    let port = config.server.port;
    let state = Arc::new(AppState::new(config));

    // warm the cache so a bad source is reported at startup
    let warm = state.clone();
    let snapshot = tokio::task::spawn_blocking(move || warm.snapshot(false)).await?;
    if snapshot.is_unavailable() {
        warn!("{}", UNAVAILABLE);
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.page.clone())
}

async fn options_handler(State(state): State<Arc<AppState>>) -> Result<Json<OptionsResponse>, ApiError> {
    let snapshot = available(&state, false).await?;
    Ok(Json(OptionsResponse {
        municipalities: municipalities(&snapshot.points),
        materials: extract_materials(&snapshot.points).iter().map(|m| title_case(m)).collect(),
    }))
}

async fn points_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<ListView>, ApiError> {
    let snapshot = available(&state, false).await?;
    let filtered = filter_points(&snapshot.points, &params.criteria());
    Ok(Json(ListView::from_points(&filtered)))
}

async fn map_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<MapView>, ApiError> {
    let snapshot = available(&state, false).await?;
    let filtered = filter_points(&snapshot.points, &params.criteria());
    let focus = params.session.and_then(|id| state.sessions.focus(&id, Instant::now()));
    let settings = state.config.map.settings();
    Ok(Json(build_map_view(&filtered, focus.as_ref(), &settings)))
}

async fn open_session_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.sessions.open(Instant::now());
    debug!("Opened session {} ({} active)", session, state.sessions.len());
    (StatusCode::CREATED, Json(serde_json::json!({ "session": session })))
}

async fn close_session_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> StatusCode {
    if state.sessions.close(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn set_focus_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Json(request): Json<FocusRequest>,
) -> StatusCode {
    let focus = FocusPoint::from_coordinates(request.latitude, request.longitude);
    if state.sessions.set_focus(&id, focus, Instant::now()) {
        StatusCode::NO_CONTENT
    } else {
        debug!("Focus for unknown session {}", id);
        StatusCode::NOT_FOUND
    }
}

async fn clear_focus_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> StatusCode {
    if state.sessions.clear_focus(&id, Instant::now()) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn reload_handler(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let snapshot = available(&state, true).await?;
    info!("Reloaded {} points", snapshot.points.len());
    Ok(Json(serde_json::json!({
        "message": "Datos actualizados.",
        "points": snapshot.points.len(),
    })))
}

async fn ask_handler(Query(params): Query<AskQuery>) -> Json<Reply> {
    Json(respond(&params.q))
}
