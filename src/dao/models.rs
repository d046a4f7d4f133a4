use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a quiz as persisted alongside its join code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    /// A lobby is open and accepting participants.
    Waiting,
    /// The session is live and serving questions.
    Active,
    /// No session is running for this quiz.
    Finished,
}

impl QuizStatus {
    /// Stable lowercase name used on the wire and in storage filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizStatus::Waiting => "waiting",
            QuizStatus::Active => "active",
            QuizStatus::Finished => "finished",
        }
    }
}

/// Quiz record owned by a single host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizEntity {
    /// Stable identifier for the quiz.
    pub id: Uuid,
    /// Human readable quiz name, unique per owner.
    pub name: String,
    /// Persisted session status for this quiz.
    pub status: QuizStatus,
    /// Join code participants must supply while the quiz is waiting.
    pub join_code: Option<String>,
}

/// Question belonging to a quiz; immutable once loaded into a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Stable identifier for the question.
    pub id: Uuid,
    /// Quiz this question belongs to.
    pub quiz_id: Uuid,
    /// Position of the question within its quiz, defining serving order.
    pub position: u32,
    /// Question text shown to participants.
    pub text: String,
    /// Ordered answer options (at least two).
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct_option_index: u32,
    /// Seconds the client counts down before auto-submitting a timeout.
    pub time_limit_seconds: u32,
    /// Points awarded for a correct answer.
    pub positive_score: u32,
    /// Points deducted for a wrong answer (never negative).
    pub negative_score: u32,
    /// Optional reference to an illustration asset.
    pub image_ref: Option<String>,
}

/// Durable result row holding a participant's latest standing for a quiz.
///
/// One row per `(quiz_id, name)`; every scored answer overwrites the previous
/// snapshot (last write wins, no history).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultEntity {
    /// Quiz the result belongs to.
    pub quiz_id: Uuid,
    /// Participant name, unique per quiz.
    pub name: String,
    /// Participant branch as declared on join.
    pub branch: String,
    /// Participant year as declared on join.
    pub year: String,
    /// Running signed score.
    pub score: i64,
    /// Unix timestamp in milliseconds of the latest scored answer.
    pub finish_time_ms: i64,
    /// Snapshot of the participant's answers, `None` marking a timeout.
    pub answers: HashMap<Uuid, Option<u32>>,
}

/// Leaderboard projection of a result row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardRowEntity {
    /// Participant name.
    pub name: String,
    /// Signed score at the time of the snapshot.
    pub score: i64,
}
