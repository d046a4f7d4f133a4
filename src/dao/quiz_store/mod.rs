/// MongoDB-backed quiz store and per-owner registry.
pub mod mongodb;

use std::sync::Arc;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    models::{LeaderboardRowEntity, QuestionEntity, QuizEntity, QuizStatus, ResultEntity},
    storage::StorageResult,
};

/// Abstraction over one owner's durable quiz data.
///
/// Every session-engine persistence call goes through this trait; the core
/// never touches a database driver directly.
pub trait QuizStore: Send + Sync {
    /// Fetch a quiz record by id.
    fn find_quiz(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>>;
    /// Create a quiz shell; duplicate names yield [`StorageError::Conflict`].
    ///
    /// [`StorageError::Conflict`]: crate::dao::storage::StorageError::Conflict
    fn create_quiz(&self, quiz: QuizEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// List every quiz belonging to this owner.
    fn list_quizzes(&self) -> BoxFuture<'static, StorageResult<Vec<QuizEntity>>>;
    /// Fetch the questions of a quiz ordered by position.
    fn fetch_questions(
        &self,
        quiz_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;
    /// Update a quiz's persisted status, optionally rotating its join code.
    fn update_quiz_status(
        &self,
        quiz_id: Uuid,
        status: QuizStatus,
        join_code: Option<String>,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete every result row recorded for a quiz.
    fn clear_results(&self, quiz_id: Uuid) -> BoxFuture<'static, StorageResult<()>>;
    /// Insert or overwrite the result row keyed by `(quiz_id, name)`.
    fn upsert_result(&self, result: ResultEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Top `limit` results for a quiz, ordered score desc then finish time asc.
    fn top_results(
        &self,
        quiz_id: Uuid,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<LeaderboardRowEntity>>>;
    /// Verify the backend is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Registry handing out the [`QuizStore`] for a given quiz owner.
///
/// Stores are created lazily on first use and cached for the process
/// lifetime; nothing evicts them. Unbounded growth is accepted for now since
/// the number of owners is small and bounded by the external host layer.
pub trait QuizStoreProvider: Send + Sync {
    /// Obtain (creating if needed) the store scoped to `owner_id`.
    fn store_for(&self, owner_id: Uuid) -> BoxFuture<'static, StorageResult<Arc<dyn QuizStore>>>;
    /// Verify the shared backend connection is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
