//! DTO definitions for the minimal quiz-shell surface exposed to hosts.
//!
//! Question authoring lives in an external layer; the core only creates and
//! lists quiz records so sessions have something to run.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::QuizEntity;

/// Payload to create an empty quiz shell for an owner.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    /// Host the quiz belongs to.
    pub owner_id: Uuid,
    /// Quiz name, unique per owner.
    #[validate(length(min = 1, max = 128))]
    pub name: String,
}

/// Response describing a freshly created quiz shell.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizResponse {
    /// Identifier of the new quiz.
    pub id: Uuid,
    /// Initial join code assigned at creation time.
    pub join_code: String,
}

/// Quiz projection for host dashboards.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizListItem {
    /// Quiz identifier.
    pub id: Uuid,
    /// Quiz name.
    pub name: String,
    /// Persisted session status.
    pub status: String,
    /// Current join code, if one was assigned.
    pub join_code: Option<String>,
}

impl From<QuizEntity> for QuizListItem {
    fn from(quiz: QuizEntity) -> Self {
        Self {
            id: quiz.id,
            name: quiz.name,
            status: quiz.status.as_str().to_owned(),
            join_code: quiz.join_code,
        }
    }
}
