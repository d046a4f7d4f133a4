//! Realtime protocol messages exchanged with player and viewer clients.
//!
//! All payload fields use camelCase on the wire; the message kind travels in
//! a `type` tag.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dao::models::{LeaderboardRowEntity, QuestionEntity};
use crate::dto::validation::{validate_join_code, validate_participant_name};
use crate::state::state_machine::SessionPhase;

/// Messages accepted from realtime clients.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Enter the waiting lobby as a participant.
    Join(JoinPayload),
    /// Ask for the next question of this participant's own sequence.
    RequestNextQuestion,
    /// Submit the answer to the participant's current question.
    #[serde(rename_all = "camelCase")]
    SubmitAnswer {
        /// Chosen option, `None` when the client-side countdown expired.
        #[serde(default)]
        option_index: Option<u32>,
    },
    /// Request the current leaderboard snapshot on demand.
    GetLeaderboard,
}

/// Join request carried by a [`ClientMessage::Join`].
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    /// Display name, unique case-insensitively within the session.
    #[validate(length(max = 64), custom(function = "validate_participant_name"))]
    pub name: String,
    /// Free-form branch field.
    #[validate(length(max = 64))]
    pub branch: String,
    /// Free-form year field.
    #[validate(length(max = 16))]
    pub year: String,
    /// Code of the waiting session the client wants to enter.
    #[validate(custom(function = "validate_join_code"))]
    pub join_code: String,
}

/// Messages pushed to realtime clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Acknowledges a successful join with the accepted name.
    Joined {
        /// Accepted participant name.
        name: String,
    },
    /// Reports a failed realtime operation to the offending connection.
    Error {
        /// Human readable reason.
        message: String,
    },
    /// Greeting describing the session the client connected into.
    #[serde(rename_all = "camelCase")]
    SessionState {
        /// Current phase, `waiting`/`active`/`finished`.
        status: String,
        /// Name of the quiz occupying the slot, empty when none.
        quiz_name: String,
    },
    /// The waiting lobby was promoted to live gameplay.
    #[serde(rename_all = "camelCase")]
    SessionStarted {
        /// Name of the launched quiz.
        quiz_name: String,
    },
    /// One question of the participant's own sequence.
    Question {
        /// Question payload without the correct answer.
        question: QuestionPayload,
        /// Zero-based index within the session's question list.
        index: usize,
    },
    /// Outcome of a scored answer, sent to the submitter only.
    #[serde(rename_all = "camelCase")]
    AnswerResult {
        /// Whether the submitted option was the correct one.
        is_correct: bool,
        /// Signed delta applied to the running score.
        score_change: i64,
        /// Index of the correct option, revealed after scoring.
        correct_option_index: u32,
        /// The option the participant submitted, if any.
        selected_option_index: Option<u32>,
        /// Running total after the delta.
        score: i64,
    },
    /// The participant finished their sequence or the session ended.
    SessionFinished {
        /// Final score for this participant.
        score: i64,
    },
    /// Number of participants currently in the session.
    ParticipantCount {
        /// Current participant count.
        count: usize,
    },
    /// Ranked snapshot broadcast after every score change.
    #[serde(rename_all = "camelCase")]
    LeaderboardUpdate {
        /// Rows ordered score desc, finish time asc.
        results: Vec<LeaderboardEntry>,
        /// Name of the quiz the snapshot belongs to, empty when none.
        quiz_name: String,
    },
}

/// Question projection pushed to participants.
///
/// Deliberately omits the correct option index and internal identifiers.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    /// Question text.
    pub text: String,
    /// Ordered answer options.
    pub options: Vec<String>,
    /// Seconds the client counts down before auto-submitting a timeout.
    pub time_limit_seconds: u32,
    /// Points awarded for a correct answer.
    pub positive_score: u32,
    /// Points deducted for a wrong answer.
    pub negative_score: u32,
    /// Optional reference to an illustration asset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl From<&QuestionEntity> for QuestionPayload {
    fn from(question: &QuestionEntity) -> Self {
        Self {
            text: question.text.clone(),
            options: question.options.clone(),
            time_limit_seconds: question.time_limit_seconds,
            positive_score: question.positive_score,
            negative_score: question.negative_score,
            image_ref: question.image_ref.clone(),
        }
    }
}

/// One leaderboard row on the wire.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    /// Participant name.
    pub name: String,
    /// Signed score.
    pub score: i64,
}

impl From<LeaderboardRowEntity> for LeaderboardEntry {
    fn from(row: LeaderboardRowEntity) -> Self {
        Self {
            name: row.name,
            score: row.score,
        }
    }
}

/// Wire label for a session phase.
pub fn phase_status(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Waiting => "waiting",
        SessionPhase::Active => "active",
        SessionPhase::Finished => "finished",
    }
}
