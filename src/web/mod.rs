pub mod html;
pub mod page;
pub mod sessions;

use crate::composer::Composer;
use crate::state::app_settings::AppSettings;
use crate::state::rotation::RotationController;
use crate::views::{ViewIndicator, ViewRegistry};
use crate::web::html::render_tree;
use crate::web::page::{PageContext, page};
use crate::web::sessions::SessionStore;
use anyhow::Context;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, get_service, post};
use axum::{Json, Router};
use chrono::Utc;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use trophy_api::Snapshot;
use trophy_api::source::{LoadOptions, load_snapshot};

// ---------------------------------------------------------------------------
// Shared server state
// ---------------------------------------------------------------------------

/// State shared by every request. The snapshot is read-only; a refresh
/// replaces the whole `Arc` and never mutates the old one.
#[derive(Clone)]
pub struct BoardState {
    snapshot: Arc<RwLock<Arc<Snapshot>>>,
    sessions: Arc<Mutex<SessionStore>>,
    registry: ViewRegistry,
    rotation_interval: Duration,
    auto_rotate: bool,
    load_options: Arc<LoadOptions>,
}

impl BoardState {
    pub fn new(snapshot: Snapshot, settings: &AppSettings) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Arc::new(snapshot))),
            sessions: Arc::new(Mutex::new(SessionStore::default())),
            registry: settings.views.clone(),
            rotation_interval: settings.rotation_interval,
            auto_rotate: settings.auto_rotate,
            load_options: Arc::new(settings.load_options()),
        }
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn replace_snapshot(&self, snapshot: Snapshot) {
        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(snapshot);
    }

    fn sessions(&self) -> MutexGuard<'_, SessionStore> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: BoardState, assets_dir: &std::path::Path) -> Router {
    let assets = get_service(ServeDir::new(assets_dir));

    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/api/refresh", post(refresh))
        .route("/api/sessions/:id/tick", post(tick))
        .route("/api/sessions/:id/toggle", post(toggle))
        .route("/api/sessions/:id/render", get(render))
        .nest_service("/assets", assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(settings: &AppSettings, snapshot: Snapshot) -> anyhow::Result<()> {
    let addr = settings.bind_addr();
    let app = router(BoardState::new(snapshot, settings), &settings.assets_dir);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    info!("board listening at http://{addr}/");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub view: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TickRequest {
    #[serde(default)]
    pub n_intervals: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TickResponse {
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator: Option<IndicatorBody>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct IndicatorBody {
    pub display_name: String,
    pub dots: Vec<bool>,
}

impl From<ViewIndicator> for IndicatorBody {
    fn from(indicator: ViewIndicator) -> Self {
        Self { display_name: indicator.display_name, dots: indicator.dots }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ToggleResponse {
    pub enabled: bool,
    pub glyph: String,
    pub timer_disabled: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RefreshResponse {
    pub teams: usize,
    pub matches: usize,
    pub players: usize,
    pub loaded_at: String,
}

#[derive(Debug)]
pub enum WebError {
    UnknownSession(String),
    Refresh(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::UnknownSession(id) => (StatusCode::NOT_FOUND, format!("unknown session {id}")).into_response(),
            WebError::Refresh(message) => {
                (StatusCode::BAD_GATEWAY, format!("refresh failed: {message}")).into_response()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index(State(state): State<BoardState>, Query(query): Query<ViewQuery>) -> Html<String> {
    let snapshot = state.snapshot();
    let mut rotation = RotationController::new(state.registry.clone()).with_enabled(state.auto_rotate);
    if let Some(view) = query.view {
        rotation = rotation.with_current(view);
    }

    let tree = Composer::new(&snapshot).render(Some(rotation.current()));
    let indicator = rotation.registry().indicator(tree.view.name());
    let enabled = rotation.is_enabled();
    let glyph = rotation.glyph();
    let session_id = state.sessions().create(rotation, Utc::now());

    let markup = page(PageContext {
        session_id: &session_id,
        title: &snapshot.layout.title,
        interval_ms: state.rotation_interval.as_millis() as u64,
        rotation_enabled: enabled,
        glyph,
        indicator: &indicator,
        content: render_tree(&tree),
    });
    Html(markup.into_string())
}

async fn tick(
    State(state): State<BoardState>,
    Path(id): Path<String>,
    Json(request): Json<TickRequest>,
) -> Result<Json<TickResponse>, WebError> {
    let advanced = state
        .sessions()
        .with_session(&id, Utc::now(), |rotation| {
            rotation
                .advance(request.n_intervals)
                .map(|view| (view, rotation.registry().indicator(view.name())))
        })
        .ok_or(WebError::UnknownSession(id))?;

    let Some((view, indicator)) = advanced else {
        return Ok(Json(TickResponse::default()));
    };

    let snapshot = state.snapshot();
    let html = render_tree(&Composer::new(&snapshot).render_view(view)).into_string();
    Ok(Json(TickResponse {
        changed: true,
        view: Some(view.name().to_string()),
        display_name: Some(view.display_name().to_string()),
        html: Some(html),
        indicator: Some(indicator.into()),
    }))
}

async fn toggle(State(state): State<BoardState>, Path(id): Path<String>) -> Result<Json<ToggleResponse>, WebError> {
    let outcome = state
        .sessions()
        .with_session(&id, Utc::now(), |rotation| rotation.toggle())
        .ok_or(WebError::UnknownSession(id))?;

    Ok(Json(ToggleResponse {
        enabled: outcome.enabled,
        glyph: outcome.glyph.to_string(),
        timer_disabled: outcome.timer_disabled,
    }))
}

async fn render(
    State(state): State<BoardState>,
    Path(id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Result<Html<String>, WebError> {
    state
        .sessions()
        .with_session(&id, Utc::now(), |_| ())
        .ok_or(WebError::UnknownSession(id))?;

    let snapshot = state.snapshot();
    let tree = Composer::new(&snapshot).render(query.view.as_deref());
    Ok(Html(render_tree(&tree).into_string()))
}

async fn refresh(State(state): State<BoardState>) -> Result<Json<RefreshResponse>, WebError> {
    let snapshot = load_snapshot(&state.load_options).await.map_err(|e| {
        error!("snapshot refresh failed: {e}");
        WebError::Refresh(e.to_string())
    })?;

    let response = RefreshResponse {
        teams: snapshot.teams.len(),
        matches: snapshot.matches.len(),
        players: snapshot.players.len(),
        loaded_at: snapshot.loaded_at.to_rfc3339(),
    };
    info!(
        "snapshot refreshed: {} teams, {} matches, {} scorers",
        response.teams, response.matches, response.players
    );
    state.replace_snapshot(snapshot);
    Ok(Json(response))
}

async fn healthz(State(state): State<BoardState>) -> String {
    let snapshot = state.snapshot();
    format!(
        "ok teams={} matches={} players={} sessions={}",
        snapshot.teams.len(),
        snapshot.matches.len(),
        snapshot.players.len(),
        state.sessions().len()
    )
}
