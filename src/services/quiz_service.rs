use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{QuizEntity, QuizStatus},
    dto::quiz::{CreateQuizRequest, CreateQuizResponse, QuizListItem},
    error::ServiceError,
    services::session_service::generate_join_code,
    state::SharedState,
};

/// Create a quiz in the owner's durable store.
///
/// Quiz names are unique per owner; collisions surface as a conflict. A join
/// code is assigned immediately so the quiz is playable, though starting a
/// session replaces it with a fresh one.
pub async fn create_quiz(
    state: &SharedState,
    request: CreateQuizRequest,
) -> Result<CreateQuizResponse, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("invalid quiz: {err}")))?;

    let store = state.store_for_owner(request.owner_id).await?;
    let quiz = QuizEntity {
        id: Uuid::new_v4(),
        name: request.name,
        status: QuizStatus::Finished,
        join_code: Some(generate_join_code(state.config().join_code_length)),
    };

    store.create_quiz(quiz.clone()).await?;
    info!(owner_id = %request.owner_id, quiz_id = %quiz.id, name = %quiz.name, "quiz created");

    Ok(CreateQuizResponse {
        id: quiz.id,
        join_code: quiz.join_code.unwrap_or_default(),
    })
}

/// List every quiz the owner has created.
pub async fn list_quizzes(
    state: &SharedState,
    owner_id: Uuid,
) -> Result<Vec<QuizListItem>, ServiceError> {
    let store = state.store_for_owner(owner_id).await?;
    let quizzes = store.list_quizzes().await?;
    Ok(quizzes.into_iter().map(Into::into).collect())
}
