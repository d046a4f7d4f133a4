use axum::{Json, Router, extract::State, routing::{get, post}};
use tracing::debug;

use crate::{
    dto::session::{
        EndSessionRequest, LaunchSessionRequest, LeaderboardSnapshot, SessionActionResponse,
        StartSessionRequest,
    },
    error::{AppError, ServiceError},
    services::{leaderboard_service, session_service},
    state::SharedState,
};

/// Host-facing endpoints driving the single session slot.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/api/session/start", post(start_session))
        .route("/api/session/launch", post(launch_session))
        .route("/api/session/end", post(end_session))
        .route("/api/session/leaderboard", get(leaderboard))
}

/// Fold a session operation outcome into the synchronous envelope hosts expect.
///
/// Domain rejections come back as 200 with `success: false`; only transport
/// level failures surface as HTTP errors.
fn envelope(outcome: Result<(), ServiceError>) -> Json<SessionActionResponse> {
    match outcome {
        Ok(()) => Json(SessionActionResponse::ok()),
        Err(err) => {
            debug!(error = %err, "session operation rejected");
            Json(SessionActionResponse::failure(err.to_string()))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/session/start",
    tag = "session",
    request_body = StartSessionRequest,
    responses((status = 200, description = "Outcome of opening the lobby", body = SessionActionResponse))
)]
/// Open a waiting lobby for the given quiz, claiming the session slot.
pub async fn start_session(
    State(state): State<SharedState>,
    Json(payload): Json<StartSessionRequest>,
) -> Json<SessionActionResponse> {
    envelope(session_service::start_session(&state, payload.owner_id, payload.quiz_id).await)
}

#[utoipa::path(
    post,
    path = "/api/session/launch",
    tag = "session",
    request_body = LaunchSessionRequest,
    responses((status = 200, description = "Outcome of launching the session", body = SessionActionResponse))
)]
/// Promote the waiting lobby to live gameplay, recovering it from storage if needed.
pub async fn launch_session(
    State(state): State<SharedState>,
    Json(payload): Json<LaunchSessionRequest>,
) -> Json<SessionActionResponse> {
    envelope(session_service::launch_session(&state, payload.owner_id, payload.quiz_id).await)
}

#[utoipa::path(
    post,
    path = "/api/session/end",
    tag = "session",
    request_body = EndSessionRequest,
    responses((status = 200, description = "Outcome of ending the session", body = SessionActionResponse))
)]
/// Terminate the current session from the lobby or mid-game.
pub async fn end_session(
    State(state): State<SharedState>,
    Json(payload): Json<EndSessionRequest>,
) -> Json<SessionActionResponse> {
    envelope(session_service::end_session(&state, payload.owner_id).await)
}

#[utoipa::path(
    get,
    path = "/api/session/leaderboard",
    tag = "session",
    responses((status = 200, description = "Ranked standings for the current session", body = LeaderboardSnapshot))
)]
/// Return the ranked standings for the quiz currently in the session slot.
pub async fn leaderboard(
    State(state): State<SharedState>,
) -> Result<Json<LeaderboardSnapshot>, AppError> {
    Ok(Json(leaderboard_service::snapshot(&state).await?))
}
