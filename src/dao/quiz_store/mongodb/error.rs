use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

use crate::dao::storage::StorageError;

/// Result alias for MongoDB DAO operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Errors raised by the MongoDB quiz store and registry.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// Connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// Offending URI.
        uri: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Client could not be built from options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Initial connection ping never succeeded.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Driver error from the last attempt.
        #[source]
        source: MongoError,
    },
    /// Health check ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Index creation failed.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection holding the index.
        collection: &'static str,
        /// Index key description.
        index: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A quiz with the same name already exists for this owner.
    #[error("a quiz named `{name}` already exists")]
    DuplicateQuizName {
        /// Conflicting quiz name.
        name: String,
    },
    /// Quiz insert failed.
    #[error("failed to create quiz `{id}`")]
    CreateQuiz {
        /// Quiz identifier.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Quiz lookup failed.
    #[error("failed to load quiz `{id}`")]
    LoadQuiz {
        /// Quiz identifier.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Quiz listing failed.
    #[error("failed to list quizzes")]
    ListQuizzes {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Question fetch failed.
    #[error("failed to load questions for quiz `{quiz_id}`")]
    LoadQuestions {
        /// Quiz identifier.
        quiz_id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Quiz status update failed.
    #[error("failed to update status of quiz `{id}`")]
    UpdateQuizStatus {
        /// Quiz identifier.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Result wipe failed.
    #[error("failed to clear results for quiz `{quiz_id}`")]
    ClearResults {
        /// Quiz identifier.
        quiz_id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Result upsert failed.
    #[error("failed to save result for `{name}` in quiz `{quiz_id}`")]
    SaveResult {
        /// Quiz identifier.
        quiz_id: Uuid,
        /// Participant name.
        name: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Leaderboard query failed.
    #[error("failed to load leaderboard for quiz `{quiz_id}`")]
    LoadLeaderboard {
        /// Quiz identifier.
        quiz_id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
}

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::DuplicateQuizName { ref name } => {
                StorageError::conflict(format!("a quiz named `{name}` already exists"))
            }
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
