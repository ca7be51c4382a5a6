use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::classify::{PlayerTag, classify};
use crate::engine::Engine;
use crate::error::AdviceError;
use crate::event::GameEvent;
use crate::game::{Decision, GameState};
use crate::history::{HandRecord, LoggedEvent, SessionSummary};
use crate::profile::PlayerProfile;
use crate::stats::PlayerStats;
use crate::tracker::HandState;

#[derive(Clone)]
struct AppState {
    engine: Engine,
}

impl AppState {
    fn new(engine: Engine) -> Self {
        Self { engine }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: String,
}

/// Events may be posted one at a time or as an ordered batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EventBatch {
    Many(Vec<GameEvent>),
    One(GameEvent),
}

impl EventBatch {
    fn into_events(self) -> Vec<GameEvent> {
        match self {
            EventBatch::Many(events) => events,
            EventBatch::One(event) => vec![event],
        }
    }
}

/// Either an explicit state or a tracked session to project one from.
#[derive(Debug, Deserialize)]
struct DecideRequest {
    #[serde(default)]
    state: Option<GameState>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    lambda: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct HandsQuery {
    #[serde(default = "default_hands_limit")]
    limit: usize,
}

fn default_hands_limit() -> usize {
    20
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub tag: PlayerTag,
    pub sample_size: u32,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error("session not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(&'static str),
    #[error(transparent)]
    NoRecommendation(#[from] AdviceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NoRecommendation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub async fn serve(addr: SocketAddr, engine: Engine) -> Result<()> {
    spawn_eviction(engine.clone());
    let app = build_router(AppState::new(engine));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "adviser listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn spawn_eviction(engine: Engine) {
    let every = engine.config().eviction_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            engine.evict_idle();
        }
    });
}

fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/sessions", post(start_session))
        .route("/sessions/:id", get(fetch_session).delete(end_session))
        .route("/sessions/:id/events", get(session_events).post(ingest_events))
        .route("/sessions/:id/summary", get(session_summary))
        .route("/hands", get(recent_hands))
        .route("/decide", post(decide))
        .route("/players", get(list_players))
        .route("/players/:id", get(lookup_player))
        .route("/classify", post(classify_stats));

    Router::new()
        .route("/healthz", get(health))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub fn router() -> Router {
    router_with(Engine::default())
}

pub fn router_with(engine: Engine) -> Router {
    build_router(AppState::new(engine))
}

async fn health() -> &'static str {
    "ok"
}

async fn start_session(State(state): State<AppState>) -> Json<SessionCreated> {
    Json(SessionCreated {
        session_id: state.engine.start_session(),
    })
}

async fn fetch_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HandState>, ApiError> {
    let hand = state.engine.hand_state(&id).ok_or(ApiError::NotFound)?;
    Ok(Json(hand))
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.engine.end_session(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

async fn ingest_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(batch): Json<EventBatch>,
) -> Json<HandState> {
    let mut hand = None;
    for event in batch.into_events() {
        hand = Some(state.engine.ingest(&id, &event));
    }
    let hand = hand
        .or_else(|| state.engine.hand_state(&id))
        .unwrap_or_else(|| HandState::fresh(&id));
    Json(hand)
}

async fn session_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<LoggedEvent>>, ApiError> {
    state.engine.hand_state(&id).ok_or(ApiError::NotFound)?;
    Ok(Json(state.engine.session_events(&id)))
}

async fn session_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSummary>, ApiError> {
    let summary = state.engine.session_summary(&id).ok_or(ApiError::NotFound)?;
    Ok(Json(summary))
}

async fn recent_hands(
    State(state): State<AppState>,
    Query(query): Query<HandsQuery>,
) -> Json<Vec<HandRecord>> {
    Json(state.engine.recent_hands(query.limit))
}

async fn decide(
    State(state): State<AppState>,
    Json(req): Json<DecideRequest>,
) -> Result<Json<Decision>, ApiError> {
    let decision = match (req.state, req.session_id) {
        (Some(game_state), _) => state.engine.decide(&game_state, req.lambda)?,
        (None, Some(id)) => state
            .engine
            .decide_session(&id, req.lambda)
            .ok_or(ApiError::NotFound)??,
        (None, None) => return Err(ApiError::BadRequest("either state or session_id is required")),
    };
    Ok(Json(decision))
}

async fn list_players(State(state): State<AppState>) -> Json<Vec<PlayerProfile>> {
    Json(state.engine.players())
}

async fn lookup_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<PlayerProfile> {
    Json(state.engine.lookup(&id))
}

async fn classify_stats(Json(stats): Json<PlayerStats>) -> Json<ClassifyResponse> {
    Json(ClassifyResponse {
        tag: classify(&stats),
        sample_size: stats.sample_size(),
    })
}
