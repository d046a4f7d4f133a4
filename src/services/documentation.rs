use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for QuizCraft Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::websocket::ws_handler,
        crate::routes::session::start_session,
        crate::routes::session::launch_session,
        crate::routes::session::end_session,
        crate::routes::session::leaderboard,
        crate::routes::quizzes::create_quiz,
        crate::routes::quizzes::list_quizzes,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::session::StartSessionRequest,
            crate::dto::session::LaunchSessionRequest,
            crate::dto::session::EndSessionRequest,
            crate::dto::session::SessionActionResponse,
            crate::dto::session::LeaderboardSnapshot,
            crate::dto::quiz::CreateQuizRequest,
            crate::dto::quiz::CreateQuizResponse,
            crate::dto::quiz::QuizListItem,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "session", description = "Host operations on the single session slot"),
        (name = "quizzes", description = "Quiz shell management"),
    )
)]
pub struct ApiDoc;
