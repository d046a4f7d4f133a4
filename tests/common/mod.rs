#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::extract::ws::Message;
use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use quizcraft_back::{
    config::AppConfig,
    dao::{
        models::{LeaderboardRowEntity, QuestionEntity, QuizEntity, QuizStatus, ResultEntity},
        quiz_store::{QuizStore, QuizStoreProvider},
        storage::{StorageError, StorageResult},
    },
    state::{AppState, ConnectionId, PlayerConnection, SharedState},
};

#[derive(Default)]
struct StoreInner {
    quizzes: HashMap<Uuid, QuizEntity>,
    questions: HashMap<Uuid, Vec<QuestionEntity>>,
    results: HashMap<(Uuid, String), ResultEntity>,
}

/// In-memory stand-in for one owner's durable store.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl InMemoryStore {
    pub fn seed_quiz(&self, quiz: QuizEntity, questions: Vec<QuestionEntity>) {
        let mut inner = self.inner.lock().unwrap();
        inner.questions.insert(quiz.id, questions);
        inner.quizzes.insert(quiz.id, quiz);
    }

    pub fn quiz(&self, quiz_id: Uuid) -> Option<QuizEntity> {
        self.inner.lock().unwrap().quizzes.get(&quiz_id).cloned()
    }

    pub fn result(&self, quiz_id: Uuid, name: &str) -> Option<ResultEntity> {
        self.inner
            .lock()
            .unwrap()
            .results
            .get(&(quiz_id, name.to_owned()))
            .cloned()
    }

    pub fn result_count(&self, quiz_id: Uuid) -> usize {
        self.inner
            .lock()
            .unwrap()
            .results
            .keys()
            .filter(|(id, _)| *id == quiz_id)
            .count()
    }
}

impl QuizStore for InMemoryStore {
    fn find_quiz(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>> {
        let out = self.inner.lock().unwrap().quizzes.get(&id).cloned();
        Box::pin(async move { Ok(out) })
    }

    fn create_quiz(&self, quiz: QuizEntity) -> BoxFuture<'static, StorageResult<()>> {
        let mut inner = self.inner.lock().unwrap();
        let out = if inner.quizzes.values().any(|existing| existing.name == quiz.name) {
            Err(StorageError::conflict(format!(
                "quiz `{}` already exists",
                quiz.name
            )))
        } else {
            inner.quizzes.insert(quiz.id, quiz);
            Ok(())
        };
        Box::pin(async move { out })
    }

    fn list_quizzes(&self) -> BoxFuture<'static, StorageResult<Vec<QuizEntity>>> {
        let out = self.inner.lock().unwrap().quizzes.values().cloned().collect();
        Box::pin(async move { Ok(out) })
    }

    fn fetch_questions(
        &self,
        quiz_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let mut out: Vec<QuestionEntity> = self
            .inner
            .lock()
            .unwrap()
            .questions
            .get(&quiz_id)
            .cloned()
            .unwrap_or_default();
        out.sort_by_key(|question| question.position);
        Box::pin(async move { Ok(out) })
    }

    fn update_quiz_status(
        &self,
        quiz_id: Uuid,
        status: QuizStatus,
        join_code: Option<String>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(quiz) = inner.quizzes.get_mut(&quiz_id) {
            quiz.status = status;
            if join_code.is_some() {
                quiz.join_code = join_code;
            }
        }
        Box::pin(async move { Ok(()) })
    }

    fn clear_results(&self, quiz_id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        self.inner
            .lock()
            .unwrap()
            .results
            .retain(|(id, _), _| *id != quiz_id);
        Box::pin(async move { Ok(()) })
    }

    fn upsert_result(&self, result: ResultEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner
            .lock()
            .unwrap()
            .results
            .insert((result.quiz_id, result.name.clone()), result);
        Box::pin(async move { Ok(()) })
    }

    fn top_results(
        &self,
        quiz_id: Uuid,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<LeaderboardRowEntity>>> {
        let mut rows: Vec<ResultEntity> = self
            .inner
            .lock()
            .unwrap()
            .results
            .values()
            .filter(|result| result.quiz_id == quiz_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.finish_time_ms.cmp(&b.finish_time_ms))
        });
        let out = rows
            .into_iter()
            .take(limit)
            .map(|result| LeaderboardRowEntity {
                name: result.name,
                score: result.score,
            })
            .collect();
        Box::pin(async move { Ok(out) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async move { Ok(()) })
    }
}

/// Provider handing out one [`InMemoryStore`] per owner.
#[derive(Clone, Default)]
pub struct InMemoryProvider {
    stores: Arc<Mutex<HashMap<Uuid, Arc<InMemoryStore>>>>,
}

impl InMemoryProvider {
    /// Fetch or create the concrete store for assertions and seeding.
    pub fn store(&self, owner_id: Uuid) -> Arc<InMemoryStore> {
        self.stores
            .lock()
            .unwrap()
            .entry(owner_id)
            .or_default()
            .clone()
    }
}

impl QuizStoreProvider for InMemoryProvider {
    fn store_for(&self, owner_id: Uuid) -> BoxFuture<'static, StorageResult<Arc<dyn QuizStore>>> {
        let store: Arc<dyn QuizStore> = self.store(owner_id);
        Box::pin(async move { Ok(store) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async move { Ok(()) })
    }
}

/// Fresh application state wired to an in-memory provider.
pub async fn test_state() -> (SharedState, InMemoryProvider) {
    let state = AppState::new(AppConfig::default());
    let provider = InMemoryProvider::default();
    state.install_stores(Arc::new(provider.clone())).await;
    (state, provider)
}

/// Register a fake realtime connection and keep its outbound receiver.
pub fn attach_connection(state: &SharedState) -> (ConnectionId, mpsc::UnboundedReceiver<Message>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let id: ConnectionId = Uuid::new_v4();
    state.connections().insert(id, PlayerConnection { id, tx });
    (id, rx)
}

/// Drain every message queued for a connection, parsed as JSON.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<Value> {
    let mut out = Vec::new();
    while let Ok(message) = rx.try_recv() {
        if let Message::Text(text) = message {
            out.push(serde_json::from_str(&text).expect("server sent invalid JSON"));
        }
    }
    out
}

/// Last message of the given `type` queued for a connection, if any.
pub fn last_of_type(messages: &[Value], kind: &str) -> Option<Value> {
    messages
        .iter()
        .rev()
        .find(|message| message["type"] == kind)
        .cloned()
}

/// Build a question with the given position and scoring values.
pub fn question(quiz_id: Uuid, position: u32, correct: u32, plus: u32, minus: u32) -> QuestionEntity {
    QuestionEntity {
        id: Uuid::new_v4(),
        quiz_id,
        position,
        text: format!("Question {}", position + 1),
        options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        correct_option_index: correct,
        time_limit_seconds: 30,
        positive_score: plus,
        negative_score: minus,
        image_ref: None,
    }
}

/// Seed a three-question quiz (+10/-5 each, correct option 1) and return it.
pub fn seed_default_quiz(provider: &InMemoryProvider, owner_id: Uuid) -> QuizEntity {
    let quiz_id = Uuid::new_v4();
    let quiz = QuizEntity {
        id: quiz_id,
        name: "General Knowledge".into(),
        status: QuizStatus::Finished,
        join_code: None,
    };
    let questions = vec![
        question(quiz_id, 0, 1, 10, 5),
        question(quiz_id, 1, 1, 10, 5),
        question(quiz_id, 2, 1, 10, 5),
    ];
    provider.store(owner_id).seed_quiz(quiz.clone(), questions);
    quiz
}
