mod common;

use axum::extract::ws::Message;
use common::{
    InMemoryProvider, attach_connection, drain, last_of_type, seed_default_quiz, test_state,
};
use tokio::sync::mpsc;
use uuid::Uuid;

use quizcraft_back::{
    dao::{
        models::{QuizEntity, ResultEntity},
        quiz_store::QuizStore,
    },
    dto::ws::JoinPayload,
    error::ServiceError,
    services::{leaderboard_service, participant_service, scoring_service, session_service},
    state::{ConnectionId, SharedState},
};

fn join_payload(name: &str, join_code: &str) -> JoinPayload {
    JoinPayload {
        name: name.into(),
        branch: "CSE".into(),
        year: "3".into(),
        join_code: join_code.into(),
    }
}

/// Open a lobby for a fresh default quiz and return its join code.
async fn open_lobby(state: &SharedState, provider: &InMemoryProvider, owner_id: Uuid) -> (QuizEntity, String) {
    let quiz = seed_default_quiz(provider, owner_id);
    session_service::start_session(state, owner_id, quiz.id)
        .await
        .unwrap();
    let join_code = provider
        .store(owner_id)
        .quiz(quiz.id)
        .unwrap()
        .join_code
        .unwrap();
    (quiz, join_code)
}

/// Join a participant and drop the lobby chatter queued so far.
async fn join_participant(
    state: &SharedState,
    name: &str,
    join_code: &str,
) -> (ConnectionId, mpsc::UnboundedReceiver<Message>) {
    let (id, mut rx) = attach_connection(state);
    participant_service::join(state, id, join_payload(name, join_code))
        .await
        .unwrap();
    drain(&mut rx);
    (id, rx)
}

#[tokio::test]
async fn join_admits_participants_and_updates_the_count() {
    let (state, provider) = test_state().await;
    let owner_id = Uuid::new_v4();
    let (_quiz, join_code) = open_lobby(&state, &provider, owner_id).await;

    let (alice, mut alice_rx) = attach_connection(&state);
    participant_service::join(&state, alice, join_payload("Alice", &join_code))
        .await
        .unwrap();

    let messages = drain(&mut alice_rx);
    let joined = last_of_type(&messages, "joined").expect("join must be acknowledged");
    assert_eq!(joined["name"], "Alice");
    let count = last_of_type(&messages, "participantCount").unwrap();
    assert_eq!(count["count"], 1);

    let (bob, mut bob_rx) = attach_connection(&state);
    participant_service::join(&state, bob, join_payload("Bob", &join_code))
        .await
        .unwrap();
    let count = last_of_type(&drain(&mut bob_rx), "participantCount").unwrap();
    assert_eq!(count["count"], 2);
}

#[tokio::test]
async fn join_rejects_a_wrong_code() {
    let (state, provider) = test_state().await;
    let owner_id = Uuid::new_v4();
    let (_quiz, join_code) = open_lobby(&state, &provider, owner_id).await;

    let (id, _rx) = attach_connection(&state);
    let wrong_code = format!("{join_code}X");
    let err = participant_service::join(&state, id, join_payload("Alice", &wrong_code))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidJoinCode));
}

#[tokio::test]
async fn join_rejects_names_case_insensitively() {
    let (state, provider) = test_state().await;
    let owner_id = Uuid::new_v4();
    let (_quiz, join_code) = open_lobby(&state, &provider, owner_id).await;

    let _alice = join_participant(&state, "Alice", &join_code).await;

    let (imposter, _rx) = attach_connection(&state);
    let err = participant_service::join(&state, imposter, join_payload("ALICE", &join_code))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NameTaken(_)));
}

#[tokio::test]
async fn join_requires_a_waiting_lobby() {
    let (state, _provider) = test_state().await;

    let (id, _rx) = attach_connection(&state);
    let err = participant_service::join(&state, id, join_payload("Alice", "AB12CD"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn participants_pace_their_own_question_sequence() {
    let (state, provider) = test_state().await;
    let owner_id = Uuid::new_v4();
    let (_quiz, join_code) = open_lobby(&state, &provider, owner_id).await;
    let (alice, mut alice_rx) = join_participant(&state, "Alice", &join_code).await;
    session_service::launch_session(&state, owner_id, None)
        .await
        .unwrap();
    drain(&mut alice_rx);

    for expected_index in 0..3 {
        participant_service::request_next_question(&state, alice)
            .await
            .unwrap();
        let messages = drain(&mut alice_rx);
        let question = last_of_type(&messages, "question").expect("question must be served");
        assert_eq!(question["index"], expected_index);
        // The correct answer never leaves the server before scoring.
        assert!(question["question"].get("correctOptionIndex").is_none());
    }

    participant_service::request_next_question(&state, alice)
        .await
        .unwrap();
    let messages = drain(&mut alice_rx);
    let finished = last_of_type(&messages, "sessionFinished").expect("sequence must finish");
    assert_eq!(finished["score"], 0);
}

#[tokio::test]
async fn question_requests_outside_an_active_session_are_ignored() {
    let (state, provider) = test_state().await;
    let owner_id = Uuid::new_v4();
    let (_quiz, _join_code) = open_lobby(&state, &provider, owner_id).await;

    let (id, mut rx) = attach_connection(&state);
    drain(&mut rx);
    participant_service::request_next_question(&state, id)
        .await
        .unwrap();
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn scoring_rewards_penalizes_and_ignores_timeouts() {
    let (state, provider) = test_state().await;
    let owner_id = Uuid::new_v4();
    let (quiz, join_code) = open_lobby(&state, &provider, owner_id).await;
    let (alice, mut alice_rx) = join_participant(&state, "Alice", &join_code).await;
    session_service::launch_session(&state, owner_id, None)
        .await
        .unwrap();
    drain(&mut alice_rx);

    // Correct answer on question 0.
    participant_service::request_next_question(&state, alice)
        .await
        .unwrap();
    scoring_service::submit_answer(&state, alice, Some(1))
        .await
        .unwrap();
    let messages = drain(&mut alice_rx);
    let ack = last_of_type(&messages, "answerResult").unwrap();
    assert_eq!(ack["isCorrect"], true);
    assert_eq!(ack["scoreChange"], 10);
    assert_eq!(ack["correctOptionIndex"], 1);
    assert_eq!(ack["score"], 10);

    // Wrong answer on question 1.
    participant_service::request_next_question(&state, alice)
        .await
        .unwrap();
    scoring_service::submit_answer(&state, alice, Some(3))
        .await
        .unwrap();
    let ack = last_of_type(&drain(&mut alice_rx), "answerResult").unwrap();
    assert_eq!(ack["isCorrect"], false);
    assert_eq!(ack["scoreChange"], -5);
    assert_eq!(ack["score"], 5);

    // Timeout on question 2 is recorded but worth nothing.
    participant_service::request_next_question(&state, alice)
        .await
        .unwrap();
    scoring_service::submit_answer(&state, alice, None)
        .await
        .unwrap();
    let ack = last_of_type(&drain(&mut alice_rx), "answerResult").unwrap();
    assert_eq!(ack["isCorrect"], false);
    assert_eq!(ack["scoreChange"], 0);
    assert_eq!(ack["score"], 5);

    let result = provider
        .store(owner_id)
        .result(quiz.id, "Alice")
        .expect("standing must be persisted");
    assert_eq!(result.score, 5);
    assert_eq!(result.answers.len(), 3);
}

#[tokio::test]
async fn duplicate_submissions_never_double_score() {
    let (state, provider) = test_state().await;
    let owner_id = Uuid::new_v4();
    let (quiz, join_code) = open_lobby(&state, &provider, owner_id).await;
    let (alice, mut alice_rx) = join_participant(&state, "Alice", &join_code).await;
    session_service::launch_session(&state, owner_id, None)
        .await
        .unwrap();

    participant_service::request_next_question(&state, alice)
        .await
        .unwrap();
    scoring_service::submit_answer(&state, alice, Some(1))
        .await
        .unwrap();
    drain(&mut alice_rx);

    // Network retry of the same submission.
    scoring_service::submit_answer(&state, alice, Some(1))
        .await
        .unwrap();
    let replay = drain(&mut alice_rx);
    assert!(last_of_type(&replay, "answerResult").is_none());

    assert_eq!(
        provider
            .store(owner_id)
            .result(quiz.id, "Alice")
            .unwrap()
            .score,
        10
    );
}

#[tokio::test]
async fn leaderboard_orders_by_score_then_finish_time() {
    let (state, provider) = test_state().await;
    let owner_id = Uuid::new_v4();
    let (quiz, join_code) = open_lobby(&state, &provider, owner_id).await;
    let (alice, _alice_rx) = join_participant(&state, "Alice", &join_code).await;
    let (bob, _bob_rx) = join_participant(&state, "Bob", &join_code).await;
    session_service::launch_session(&state, owner_id, None)
        .await
        .unwrap();

    participant_service::request_next_question(&state, alice)
        .await
        .unwrap();
    scoring_service::submit_answer(&state, alice, Some(1))
        .await
        .unwrap();
    participant_service::request_next_question(&state, bob)
        .await
        .unwrap();
    scoring_service::submit_answer(&state, bob, Some(0))
        .await
        .unwrap();

    let snapshot = leaderboard_service::snapshot(&state).await.unwrap();
    assert_eq!(snapshot.quiz_name, "General Knowledge");
    let names: Vec<&str> = snapshot
        .results
        .iter()
        .map(|row| row.name.as_str())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob"]);
    assert_eq!(snapshot.results[0].score, 10);
    assert_eq!(snapshot.results[1].score, -5);

    // Equal scores rank by who got there first.
    let store = provider.store(owner_id);
    for (name, finish_time_ms) in [("Carol", 2_000), ("Dave", 1_000)] {
        store
            .upsert_result(ResultEntity {
                quiz_id: quiz.id,
                name: name.into(),
                branch: "CSE".into(),
                year: "3".into(),
                score: 10,
                finish_time_ms,
                answers: Default::default(),
            })
            .await
            .unwrap();
    }
    let rows = store.top_results(quiz.id, 20).await.unwrap();
    let tied: Vec<&str> = rows
        .iter()
        .filter(|row| row.score == 10)
        .map(|row| row.name.as_str())
        .collect();
    assert_eq!(tied, vec!["Dave", "Carol", "Alice"]);
}

#[tokio::test]
async fn score_changes_broadcast_the_leaderboard_to_everyone() {
    let (state, provider) = test_state().await;
    let owner_id = Uuid::new_v4();
    let (_quiz, join_code) = open_lobby(&state, &provider, owner_id).await;
    let (alice, _alice_rx) = join_participant(&state, "Alice", &join_code).await;
    session_service::launch_session(&state, owner_id, None)
        .await
        .unwrap();

    // A display-only viewer that never joined.
    let (_viewer, mut viewer_rx) = attach_connection(&state);
    drain(&mut viewer_rx);

    participant_service::request_next_question(&state, alice)
        .await
        .unwrap();
    scoring_service::submit_answer(&state, alice, Some(1))
        .await
        .unwrap();

    let messages = drain(&mut viewer_rx);
    let update = last_of_type(&messages, "leaderboardUpdate").expect("viewers follow standings");
    assert_eq!(update["results"][0]["name"], "Alice");
    assert_eq!(update["results"][0]["score"], 10);
}

#[tokio::test]
async fn ending_an_active_session_delivers_final_scores() {
    let (state, provider) = test_state().await;
    let owner_id = Uuid::new_v4();
    let (_quiz, join_code) = open_lobby(&state, &provider, owner_id).await;
    let (alice, mut alice_rx) = join_participant(&state, "Alice", &join_code).await;
    let (bob, mut bob_rx) = join_participant(&state, "Bob", &join_code).await;
    session_service::launch_session(&state, owner_id, None)
        .await
        .unwrap();

    for _ in 0..2 {
        participant_service::request_next_question(&state, alice)
            .await
            .unwrap();
        scoring_service::submit_answer(&state, alice, Some(1))
            .await
            .unwrap();
    }
    participant_service::request_next_question(&state, bob)
        .await
        .unwrap();
    scoring_service::submit_answer(&state, bob, Some(1))
        .await
        .unwrap();
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    session_service::end_session(&state, owner_id).await.unwrap();

    let alice_messages = drain(&mut alice_rx);
    let farewell = last_of_type(&alice_messages, "sessionFinished").unwrap();
    assert_eq!(farewell["score"], 20);
    assert_eq!(
        last_of_type(&alice_messages, "participantCount").unwrap()["count"],
        0
    );

    let farewell = last_of_type(&drain(&mut bob_rx), "sessionFinished").unwrap();
    assert_eq!(farewell["score"], 10);
}

#[tokio::test]
async fn disconnect_removes_the_participant() {
    let (state, provider) = test_state().await;
    let owner_id = Uuid::new_v4();
    let (_quiz, join_code) = open_lobby(&state, &provider, owner_id).await;
    let (alice, _alice_rx) = join_participant(&state, "Alice", &join_code).await;
    let (_bob, mut bob_rx) = join_participant(&state, "Bob", &join_code).await;

    state.connections().remove(&alice);
    participant_service::disconnect(&state, alice).await;

    let count = last_of_type(&drain(&mut bob_rx), "participantCount").unwrap();
    assert_eq!(count["count"], 1);
}
