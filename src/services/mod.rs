/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Leaderboard aggregation and broadcasting.
pub mod leaderboard_service;
/// Participant registry: join, question pacing, disconnect cleanup.
pub mod participant_service;
/// Quiz shell creation and listing for hosts.
pub mod quiz_service;
/// Scoring protocol for answer submissions.
pub mod scoring_service;
/// Session lifecycle: start, launch, end, and lobby recovery.
pub mod session_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
