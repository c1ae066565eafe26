use crate::advisor::{apply_pending, request_analysis, request_tip, Busy};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{
        sse::{Event, Sse},
        IntoResponse, Json, Response,
    },
    routing::{get, post},
    Router,
};
use farm_core::{notification, Command, EventEnvelope, Notification, Tool, UpgradeId};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn make_router(state: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/meta", get(meta_handler))
        .route("/api/v1/state", get(state_handler))
        .route("/api/v1/metrics", get(metrics_handler))
        .route("/api/v1/stream", get(stream_handler))
        .route("/api/v1/tool", post(tool_handler))
        .route("/api/v1/interact", post(interact_handler))
        .route("/api/v1/upgrade", post(upgrade_handler))
        .route("/api/v1/advisor", get(advisor_handler))
        .route("/api/v1/advisor/tip", post(tip_handler))
        .route("/api/v1/advisor/analysis", post(analysis_handler))
        .route("/api/v1/advisor/apply", post(apply_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Read-only views
// ---------------------------------------------------------------------------

pub async fn meta_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    let session = app_state.session.lock();
    let meta = &session.game_state.meta;
    Json(serde_json::json!({
        "tick": meta.tick,
        "seed": meta.seed,
        "session_id": meta.session_id,
        "location": meta.location,
        "content_version": meta.content_version,
        "day": session.game_state.ledger.day,
        "season": session.game_state.ledger.season,
        "ticks_per_sec": app_state.ticks_per_sec,
    }))
}

pub async fn state_handler(
    State(app_state): State<AppState>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let session = app_state.session.lock();
    match serde_json::to_string(&session.game_state) {
        Ok(json) => {
            drop(session);
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                json,
            )
        }
        Err(err) => {
            drop(session);
            tracing::error!("state serialization failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"error":"serialization failed"}"#.to_string(),
            )
        }
    }
}

pub async fn metrics_handler(State(app_state): State<AppState>) -> Json<farm_core::FarmMetrics> {
    let session = app_state.session.lock();
    Json(farm_core::compute_metrics(&session.game_state))
}

pub async fn stream_handler(
    State(app_state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = app_state.event_tx.subscribe();
    let session = app_state.session.clone();

    let stream = async_stream::stream! {
        let mut heartbeat = tokio::time::interval(Duration::from_secs(5));
        heartbeat.tick().await; // discard the immediate first tick
        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(events) => {
                            let data = serde_json::to_string(&events).unwrap_or_default();
                            yield Ok(Event::default().data(data));
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "stream subscriber lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = heartbeat.tick() => {
                    let tick = session.lock().game_state.meta.tick;
                    let hb = serde_json::json!({"heartbeat": true, "tick": tick});
                    yield Ok(Event::default().data(hb.to_string()));
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

// ---------------------------------------------------------------------------
// Player commands
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ToolRequest {
    #[serde(default)]
    pub tool: Option<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct InteractRequest {
    pub tile: usize,
}

#[derive(Debug, Deserialize)]
pub struct UpgradeRequest {
    pub upgrade: UpgradeId,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub events: Vec<EventEnvelope>,
    pub notifications: Vec<Notification>,
}

impl CommandResponse {
    fn new(events: Vec<EventEnvelope>) -> Self {
        let notifications = events.iter().filter_map(|e| notification(&e.event)).collect();
        Self {
            events,
            notifications,
        }
    }
}

fn run_command(app_state: &AppState, command: &Command) -> Json<CommandResponse> {
    let events = app_state.session.lock().apply(command);
    app_state.publish(events.clone());
    Json(CommandResponse::new(events))
}

pub async fn tool_handler(
    State(app_state): State<AppState>,
    Json(body): Json<ToolRequest>,
) -> Json<CommandResponse> {
    run_command(&app_state, &Command::SelectTool { tool: body.tool })
}

pub async fn interact_handler(
    State(app_state): State<AppState>,
    Json(body): Json<InteractRequest>,
) -> Json<CommandResponse> {
    run_command(&app_state, &Command::Interact { tile: body.tile })
}

pub async fn upgrade_handler(
    State(app_state): State<AppState>,
    Json(body): Json<UpgradeRequest>,
) -> Json<CommandResponse> {
    run_command(
        &app_state,
        &Command::PurchaseUpgrade {
            upgrade: body.upgrade,
        },
    )
}

// ---------------------------------------------------------------------------
// Assistant
// ---------------------------------------------------------------------------

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

pub async fn advisor_handler(State(app_state): State<AppState>) -> Json<crate::advisor::DeskView> {
    Json(app_state.desk.view())
}

/// Requests run on their own task so a dropped connection cannot strand
/// the busy flag.
pub async fn tip_handler(State(app_state): State<AppState>) -> Response {
    let task = tokio::spawn(async move { request_tip(&app_state).await });
    match task.await {
        Ok(Ok(tip)) => Json(serde_json::json!({ "tip": tip })).into_response(),
        Ok(Err(Busy)) => error(StatusCode::CONFLICT, "tip request already in progress"),
        Err(err) => {
            tracing::error!("tip task failed: {err}");
            error(StatusCode::INTERNAL_SERVER_ERROR, "tip request failed")
        }
    }
}

pub async fn analysis_handler(State(app_state): State<AppState>) -> Response {
    let task = tokio::spawn(async move { request_analysis(&app_state).await });
    match task.await {
        Ok(Ok(outcome)) => Json(outcome).into_response(),
        Ok(Err(Busy)) => error(StatusCode::CONFLICT, "analysis already in progress"),
        Err(err) => {
            tracing::error!("analysis task failed: {err}");
            error(StatusCode::INTERNAL_SERVER_ERROR, "analysis request failed")
        }
    }
}

pub async fn apply_handler(State(app_state): State<AppState>) -> Response {
    match apply_pending(&app_state) {
        Some(events) => Json(CommandResponse::new(events)).into_response(),
        None => error(StatusCode::CONFLICT, "no pending suggestion"),
    }
}
