use std::collections::HashMap;

use mongodb::bson::{Binary, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{QuestionEntity, QuizEntity, QuizStatus, ResultEntity};

/// Quiz record as stored in the `quizzes` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoQuizDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    status: QuizStatus,
    join_code: Option<String>,
}

impl From<QuizEntity> for MongoQuizDocument {
    fn from(value: QuizEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            status: value.status,
            join_code: value.join_code,
        }
    }
}

impl From<MongoQuizDocument> for QuizEntity {
    fn from(value: MongoQuizDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            status: value.status,
            join_code: value.join_code,
        }
    }
}

/// Question record as stored in the `questions` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoQuestionDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    quiz_id: Uuid,
    position: u32,
    text: String,
    options: Vec<String>,
    correct_option_index: u32,
    time_limit_seconds: u32,
    positive_score: u32,
    negative_score: u32,
    image_ref: Option<String>,
}

impl From<MongoQuestionDocument> for QuestionEntity {
    fn from(value: MongoQuestionDocument) -> Self {
        Self {
            id: value.id,
            quiz_id: value.quiz_id,
            position: value.position,
            text: value.text,
            options: value.options,
            correct_option_index: value.correct_option_index,
            time_limit_seconds: value.time_limit_seconds,
            positive_score: value.positive_score,
            negative_score: value.negative_score,
            image_ref: value.image_ref,
        }
    }
}

/// Result row as stored in the `results` collection.
///
/// Answer keys are stringified question UUIDs since BSON map keys must be
/// strings. The core only writes results, so no reverse conversion exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoResultDocument {
    quiz_id: Uuid,
    name: String,
    branch: String,
    year: String,
    score: i64,
    finish_time_ms: i64,
    answers: HashMap<String, Option<u32>>,
}

impl From<ResultEntity> for MongoResultDocument {
    fn from(value: ResultEntity) -> Self {
        Self {
            quiz_id: value.quiz_id,
            name: value.name,
            branch: value.branch,
            year: value.year,
            score: value.score,
            finish_time_ms: value.finish_time_ms,
            answers: value
                .answers
                .into_iter()
                .map(|(question_id, option)| (question_id.to_string(), option))
                .collect(),
        }
    }
}

/// Leaderboard projection of a stored result row.
impl From<MongoResultDocument> for crate::dao::models::LeaderboardRowEntity {
    fn from(value: MongoResultDocument) -> Self {
        Self {
            name: value.name,
            score: value.score,
        }
    }
}

/// Wrap a UUID into the BSON binary representation used for filters.
pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

/// Filter document selecting a record by `_id`.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}
