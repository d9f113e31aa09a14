//! The HTTP surface: health probes, game history, administrative reset,
//! and (in debug builds only) scenario installation.

use std::sync::Arc;

#[cfg(debug_assertions)]
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use twofold_room::{GameRecord, RoomId};

use crate::history::HistoryStore;
use crate::server::ServerState;

#[derive(Debug, Deserialize)]
struct RoomPayload {
    room: String,
}

pub(crate) fn router<H: HistoryStore>(state: Arc<ServerState<H>>) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(health_detailed::<H>))
        .route("/api/reset", post(reset_room::<H>))
        .route("/api/games", post(save_game::<H>).get(list_games::<H>));

    // The preset installer is the only non-move path that mutates a
    // game; it never ships in release builds.
    #[cfg(debug_assertions)]
    let router = router.route("/api/debug/setup/{scenario}", post(setup_scenario::<H>));

    router.with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn health_detailed<H: HistoryStore>(
    State(state): State<Arc<ServerState<H>>>,
) -> Json<Value> {
    let rooms = state.rooms.lock().await.room_count();
    let sessions = state.sessions.lock().await.len();
    Json(json!({
        "status": "ok",
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "rooms": rooms,
        "sessions": sessions,
    }))
}

/// `POST /api/reset` — administrative, unconditional room reset.
async fn reset_room<H: HistoryStore>(
    State(state): State<Arc<ServerState<H>>>,
    Json(payload): Json<RoomPayload>,
) -> (StatusCode, Json<Value>) {
    let handle = state.rooms.lock().await.get(&RoomId(payload.room));
    match handle {
        Some(handle) => match handle.reset(None).await {
            Ok(()) => (
                StatusCode::OK,
                Json(json!({"message": "game reset successfully"})),
            ),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            ),
        },
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "room not found"})),
        ),
    }
}

/// `POST /api/games` — persist a finished game (legacy manual path).
async fn save_game<H: HistoryStore>(
    State(state): State<Arc<ServerState<H>>>,
    Json(record): Json<GameRecord>,
) -> (StatusCode, Json<Value>) {
    match state.history.list().await {
        Ok(games) if games.iter().any(|g| g.room == record.room) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "game already saved"})),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            );
        }
        Ok(_) => {}
    }

    match state.history.save(&record).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({"message": "game saved successfully"})),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        ),
    }
}

/// `GET /api/games` — list persisted games.
async fn list_games<H: HistoryStore>(
    State(state): State<Arc<ServerState<H>>>,
) -> Result<Json<Vec<GameRecord>>, (StatusCode, Json<Value>)> {
    state.history.list().await.map(Json).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        )
    })
}

/// `POST /api/debug/setup/{scenario}` — install a preset game state.
#[cfg(debug_assertions)]
async fn setup_scenario<H: HistoryStore>(
    State(state): State<Arc<ServerState<H>>>,
    Path(scenario): Path<String>,
    Json(payload): Json<RoomPayload>,
) -> (StatusCode, Json<Value>) {
    let Ok(scenario) = scenario.parse::<twofold_engine::Scenario>() else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": format!("unknown scenario: {scenario}")})),
        );
    };

    let handle = state.rooms.lock().await.get(&RoomId(payload.room));
    match handle {
        Some(handle) => match handle.install_scenario(scenario).await {
            Ok(()) => (
                StatusCode::OK,
                Json(json!({
                    "message": format!("scenario '{}' activated", scenario.name())
                })),
            ),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            ),
        },
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "game not found, join the room first"})),
        ),
    }
}
