use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection, Database,
    bson::doc,
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::IndexOptions,
};
use uuid::Uuid;

use super::{
    error::{MongoDaoError, MongoResult},
    models::{MongoQuestionDocument, MongoQuizDocument, MongoResultDocument, doc_id, uuid_as_binary},
};
use crate::dao::{
    models::{LeaderboardRowEntity, QuestionEntity, QuizEntity, QuizStatus, ResultEntity},
    quiz_store::QuizStore,
    storage::StorageResult,
};

const QUIZ_COLLECTION_NAME: &str = "quizzes";
const QUESTION_COLLECTION_NAME: &str = "questions";
const RESULT_COLLECTION_NAME: &str = "results";

/// Quiz store scoped to a single owner's database.
#[derive(Clone)]
pub struct MongoQuizStore {
    database: Database,
}

impl MongoQuizStore {
    /// Wrap an owner database; callers must have run [`ensure_indexes`] first.
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn quizzes(&self) -> Collection<MongoQuizDocument> {
        self.database
            .collection::<MongoQuizDocument>(QUIZ_COLLECTION_NAME)
    }

    fn questions(&self) -> Collection<MongoQuestionDocument> {
        self.database
            .collection::<MongoQuestionDocument>(QUESTION_COLLECTION_NAME)
    }

    fn results(&self) -> Collection<MongoResultDocument> {
        self.database
            .collection::<MongoResultDocument>(RESULT_COLLECTION_NAME)
    }

    async fn find_quiz(&self, id: Uuid) -> MongoResult<Option<QuizEntity>> {
        let document = self
            .quizzes()
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadQuiz { id, source })?;

        Ok(document.map(Into::into))
    }

    async fn create_quiz(&self, quiz: QuizEntity) -> MongoResult<()> {
        let id = quiz.id;
        let name = quiz.name.clone();
        let document: MongoQuizDocument = quiz.into();

        self.quizzes().insert_one(&document).await.map_err(|source| {
            if is_duplicate_key(&source) {
                MongoDaoError::DuplicateQuizName { name }
            } else {
                MongoDaoError::CreateQuiz { id, source }
            }
        })?;

        Ok(())
    }

    async fn list_quizzes(&self) -> MongoResult<Vec<QuizEntity>> {
        let documents: Vec<MongoQuizDocument> = self
            .quizzes()
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListQuizzes { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListQuizzes { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn fetch_questions(&self, quiz_id: Uuid) -> MongoResult<Vec<QuestionEntity>> {
        let documents: Vec<MongoQuestionDocument> = self
            .questions()
            .find(doc! { "quiz_id": uuid_as_binary(quiz_id) })
            .sort(doc! { "position": 1 })
            .await
            .map_err(|source| MongoDaoError::LoadQuestions { quiz_id, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadQuestions { quiz_id, source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn update_quiz_status(
        &self,
        quiz_id: Uuid,
        status: QuizStatus,
        join_code: Option<String>,
    ) -> MongoResult<()> {
        let mut fields = doc! { "status": status.as_str() };
        if let Some(code) = join_code {
            fields.insert("join_code", code);
        }

        self.quizzes()
            .update_one(doc_id(quiz_id), doc! { "$set": fields })
            .await
            .map_err(|source| MongoDaoError::UpdateQuizStatus {
                id: quiz_id,
                source,
            })?;

        Ok(())
    }

    async fn clear_results(&self, quiz_id: Uuid) -> MongoResult<()> {
        self.results()
            .delete_many(doc! { "quiz_id": uuid_as_binary(quiz_id) })
            .await
            .map_err(|source| MongoDaoError::ClearResults { quiz_id, source })?;

        Ok(())
    }

    async fn upsert_result(&self, result: ResultEntity) -> MongoResult<()> {
        let quiz_id = result.quiz_id;
        let name = result.name.clone();
        let document: MongoResultDocument = result.into();

        self.results()
            .replace_one(
                doc! { "quiz_id": uuid_as_binary(quiz_id), "name": &name },
                &document,
            )
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveResult {
                quiz_id,
                name,
                source,
            })?;

        Ok(())
    }

    async fn top_results(
        &self,
        quiz_id: Uuid,
        limit: usize,
    ) -> MongoResult<Vec<LeaderboardRowEntity>> {
        let documents: Vec<MongoResultDocument> = self
            .results()
            .find(doc! { "quiz_id": uuid_as_binary(quiz_id) })
            .sort(doc! { "score": -1, "finish_time_ms": 1 })
            .limit(limit as i64)
            .await
            .map_err(|source| MongoDaoError::LoadLeaderboard { quiz_id, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadLeaderboard { quiz_id, source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn ping(&self) -> MongoResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }
}

/// Create the per-owner indexes backing uniqueness guarantees and ordering.
pub(super) async fn ensure_indexes(database: &Database) -> MongoResult<()> {
    let quizzes = database.collection::<MongoQuizDocument>(QUIZ_COLLECTION_NAME);
    let quiz_name_index = mongodb::IndexModel::builder()
        .keys(doc! { "name": 1 })
        .options(
            IndexOptions::builder()
                .name(Some("quiz_name_idx".to_owned()))
                .unique(Some(true))
                .build(),
        )
        .build();
    quizzes
        .create_index(quiz_name_index)
        .await
        .map_err(|source| MongoDaoError::EnsureIndex {
            collection: QUIZ_COLLECTION_NAME,
            index: "name",
            source,
        })?;

    let questions = database.collection::<MongoQuestionDocument>(QUESTION_COLLECTION_NAME);
    let question_order_index = mongodb::IndexModel::builder()
        .keys(doc! { "quiz_id": 1, "position": 1 })
        .options(
            IndexOptions::builder()
                .name(Some("question_order_idx".to_owned()))
                .build(),
        )
        .build();
    questions
        .create_index(question_order_index)
        .await
        .map_err(|source| MongoDaoError::EnsureIndex {
            collection: QUESTION_COLLECTION_NAME,
            index: "quiz_id,position",
            source,
        })?;

    let results = database.collection::<MongoResultDocument>(RESULT_COLLECTION_NAME);
    let result_key_index = mongodb::IndexModel::builder()
        .keys(doc! { "quiz_id": 1, "name": 1 })
        .options(
            IndexOptions::builder()
                .name(Some("result_key_idx".to_owned()))
                .unique(Some(true))
                .build(),
        )
        .build();
    results
        .create_index(result_key_index)
        .await
        .map_err(|source| MongoDaoError::EnsureIndex {
            collection: RESULT_COLLECTION_NAME,
            index: "quiz_id,name",
            source,
        })?;

    Ok(())
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) if write_error.code == 11000
    )
}

impl QuizStore for MongoQuizStore {
    fn find_quiz(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_quiz(id).await.map_err(Into::into) })
    }

    fn create_quiz(&self, quiz: QuizEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.create_quiz(quiz).await.map_err(Into::into) })
    }

    fn list_quizzes(&self) -> BoxFuture<'static, StorageResult<Vec<QuizEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_quizzes().await.map_err(Into::into) })
    }

    fn fetch_questions(
        &self,
        quiz_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.fetch_questions(quiz_id).await.map_err(Into::into) })
    }

    fn update_quiz_status(
        &self,
        quiz_id: Uuid,
        status: QuizStatus,
        join_code: Option<String>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_quiz_status(quiz_id, status, join_code)
                .await
                .map_err(Into::into)
        })
    }

    fn clear_results(&self, quiz_id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.clear_results(quiz_id).await.map_err(Into::into) })
    }

    fn upsert_result(&self, result: ResultEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_result(result).await.map_err(Into::into) })
    }

    fn top_results(
        &self,
        quiz_id: Uuid,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<LeaderboardRowEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.top_results(quiz_id, limit).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
