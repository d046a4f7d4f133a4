use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::quiz::{CreateQuizRequest, CreateQuizResponse, QuizListItem},
    error::AppError,
    services::quiz_service,
    state::SharedState,
};

/// Quiz-shell management endpoints for hosts.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/api/quizzes", post(create_quiz))
        .route("/api/quizzes/{owner_id}", get(list_quizzes))
}

#[utoipa::path(
    post,
    path = "/api/quizzes",
    tag = "quizzes",
    request_body = CreateQuizRequest,
    responses(
        (status = 200, description = "Quiz created", body = CreateQuizResponse),
        (status = 409, description = "A quiz with that name already exists")
    )
)]
/// Create an empty quiz shell in the owner's store.
pub async fn create_quiz(
    State(state): State<SharedState>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<Json<CreateQuizResponse>, AppError> {
    Ok(Json(quiz_service::create_quiz(&state, payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/quizzes/{owner_id}",
    tag = "quizzes",
    params(("owner_id" = Uuid, Path, description = "Host whose quizzes to list")),
    responses((status = 200, description = "Quizzes owned by the host", body = [QuizListItem]))
)]
/// List every quiz the owner has created.
pub async fn list_quizzes(
    State(state): State<SharedState>,
    Path(owner_id): Path<Uuid>,
) -> Result<Json<Vec<QuizListItem>>, AppError> {
    Ok(Json(quiz_service::list_quizzes(&state, owner_id).await?))
}
