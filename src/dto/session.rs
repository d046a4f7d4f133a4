//! DTO definitions used by the host-facing session administration API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::ws::LeaderboardEntry;

/// Request to open a waiting lobby for one of the caller's quizzes.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    /// Host issuing the call.
    pub owner_id: Uuid,
    /// Quiz to run.
    pub quiz_id: Uuid,
}

/// Request to promote the waiting lobby to live gameplay.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LaunchSessionRequest {
    /// Host issuing the call.
    pub owner_id: Uuid,
    /// Quiz id, supplied to let the server recover a lobby lost from memory.
    #[serde(default)]
    pub quiz_id: Option<Uuid>,
}

/// Request to terminate the current session.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionRequest {
    /// Host issuing the call.
    pub owner_id: Uuid,
}

/// Synchronous outcome envelope for session administration calls.
///
/// Domain failures come back as `success: false` with a reason instead of an
/// HTTP error status, so the host UI can surface them verbatim.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionActionResponse {
    /// Whether the call took effect.
    pub success: bool,
    /// Human readable reason when it did not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SessionActionResponse {
    /// Successful outcome.
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Failed outcome with a reason.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Leaderboard snapshot returned on demand and reused for broadcasts.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardSnapshot {
    /// Rows ordered score desc, finish time asc.
    pub results: Vec<LeaderboardEntry>,
    /// Quiz the snapshot belongs to, empty when no session is assigned.
    pub quiz_name: String,
}

impl LeaderboardSnapshot {
    /// Snapshot returned when no session occupies the slot.
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            quiz_name: String::new(),
        }
    }
}
