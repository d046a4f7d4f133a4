use indexmap::IndexMap;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::QuizStatus,
    dto::ws::ServerMessage,
    error::ServiceError,
    services::websocket_service::{broadcast, send_to_connection},
    state::{
        ConnectionId, SessionContext, SessionEvent, SessionPhase, SessionSlot, SharedState,
    },
};

/// Characters used for generated join codes; uppercase base36 like the codes
/// hosts read out loud.
const JOIN_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Open a waiting lobby for `quiz_id`, claiming the global session slot.
///
/// Fails with a state conflict while another session occupies the slot, and
/// with not-found when the quiz is missing or has no questions. On success
/// prior results for the quiz are wiped, a fresh join code is persisted with
/// status `waiting`, and an empty leaderboard tagged with the quiz name is
/// broadcast so displays reset.
pub async fn start_session(
    state: &SharedState,
    owner_id: Uuid,
    quiz_id: Uuid,
) -> Result<(), ServiceError> {
    let quiz_name = {
        let mut slot = state.session().lock().await;
        if slot.phase() != SessionPhase::Finished {
            return Err(ServiceError::StateConflict(
                "another session is already waiting or active".into(),
            ));
        }

        let store = state.store_for_owner(owner_id).await?;
        let Some(quiz) = store.find_quiz(quiz_id).await? else {
            return Err(ServiceError::NotFound(format!("quiz `{quiz_id}` not found")));
        };
        let questions = store.fetch_questions(quiz_id).await?;
        if questions.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "quiz `{quiz_id}` has no questions"
            )));
        }

        let join_code = generate_join_code(state.config().join_code_length);
        store.clear_results(quiz_id).await?;
        store
            .update_quiz_status(quiz_id, QuizStatus::Waiting, Some(join_code.clone()))
            .await?;

        slot.machine.apply(SessionEvent::OpenLobby)?;
        slot.context = Some(SessionContext {
            owner_id,
            quiz_id,
            quiz_name: quiz.name.clone(),
            join_code,
            questions,
            participants: IndexMap::new(),
        });

        info!(%owner_id, %quiz_id, quiz = %quiz.name, "lobby opened");
        quiz.name
    };

    broadcast(
        state,
        &ServerMessage::LeaderboardUpdate {
            results: Vec::new(),
            quiz_name,
        },
    );

    Ok(())
}

/// Promote the waiting lobby to live gameplay.
///
/// Only the owner may launch. When the in-memory slot is Finished but the
/// host supplies a quiz id, the recovery path first tries to rebuild the
/// lobby from durable state (a restart may have wiped memory mid-lobby).
pub async fn launch_session(
    state: &SharedState,
    owner_id: Uuid,
    quiz_id: Option<Uuid>,
) -> Result<(), ServiceError> {
    let quiz_name = {
        let mut guard = state.session().lock().await;
        let slot = &mut *guard;

        if slot.phase() == SessionPhase::Finished
            && let Some(quiz_id) = quiz_id
        {
            recover_waiting_session(state, slot, owner_id, quiz_id).await?;
        }

        if slot.phase() != SessionPhase::Waiting {
            return Err(ServiceError::StateConflict(
                "session is not in a waiting lobby".into(),
            ));
        }

        let Some(ctx) = slot.context.as_ref() else {
            return Err(ServiceError::StateConflict(
                "no session occupies the slot".into(),
            ));
        };
        if ctx.owner_id != owner_id {
            return Err(ServiceError::Unauthorized(
                "only the session owner can launch it".into(),
            ));
        }

        let store = state.store_for_owner(owner_id).await?;
        store
            .update_quiz_status(ctx.quiz_id, QuizStatus::Active, None)
            .await?;

        slot.machine.apply(SessionEvent::Launch)?;
        info!(%owner_id, quiz = %ctx.quiz_name, "session launched");
        ctx.quiz_name.clone()
    };

    broadcast(state, &ServerMessage::SessionStarted { quiz_name });

    Ok(())
}

/// Terminate the current session from the lobby or mid-game.
///
/// When the session was active, each connected participant individually
/// receives their final score before the registry is cleared.
pub async fn end_session(state: &SharedState, owner_id: Uuid) -> Result<(), ServiceError> {
    let farewells: Vec<(ConnectionId, i64)> = {
        let mut guard = state.session().lock().await;
        let slot = &mut *guard;
        let phase = slot.phase();
        if !matches!(phase, SessionPhase::Waiting | SessionPhase::Active) {
            return Err(ServiceError::StateConflict(
                "no session is waiting or active".into(),
            ));
        }

        let Some(ctx) = slot.context.as_ref() else {
            return Err(ServiceError::StateConflict(
                "no session occupies the slot".into(),
            ));
        };
        if ctx.owner_id != owner_id {
            return Err(ServiceError::Unauthorized(
                "only the session owner can end it".into(),
            ));
        }

        let store = state.store_for_owner(owner_id).await?;
        store
            .update_quiz_status(ctx.quiz_id, QuizStatus::Finished, None)
            .await?;

        slot.machine.apply(SessionEvent::Finish)?;

        let farewells = if phase == SessionPhase::Active {
            ctx.participants
                .iter()
                .map(|(connection_id, participant)| (*connection_id, participant.score))
                .collect()
        } else {
            Vec::new()
        };

        info!(%owner_id, quiz = %ctx.quiz_name, participants = ctx.participants.len(), "session ended");
        slot.clear_context();
        farewells
    };

    for (connection_id, score) in farewells {
        send_to_connection(state, connection_id, &ServerMessage::SessionFinished { score });
    }
    broadcast(state, &ServerMessage::ParticipantCount { count: 0 });

    Ok(())
}

/// Rebuild a Waiting lobby from durable state after a restart.
///
/// Leaves the slot untouched unless the persisted quiz exists, is still
/// marked waiting, and carries a join code; `launch_session` re-evaluates its
/// preconditions afterwards either way. Active sessions lost from memory are
/// not recoverable: cursors and unsubmitted answers only ever lived here.
async fn recover_waiting_session(
    state: &SharedState,
    slot: &mut SessionSlot,
    owner_id: Uuid,
    quiz_id: Uuid,
) -> Result<(), ServiceError> {
    let store = state.store_for_owner(owner_id).await?;
    let Some(quiz) = store.find_quiz(quiz_id).await? else {
        return Ok(());
    };
    if quiz.status != QuizStatus::Waiting {
        return Ok(());
    }
    let Some(join_code) = quiz.join_code else {
        return Ok(());
    };

    let questions = store.fetch_questions(quiz_id).await?;

    slot.machine.apply(SessionEvent::OpenLobby)?;
    slot.context = Some(SessionContext {
        owner_id,
        quiz_id,
        quiz_name: quiz.name.clone(),
        join_code,
        questions,
        participants: IndexMap::new(),
    });

    info!(%owner_id, %quiz_id, quiz = %quiz.name, "waiting lobby recovered from storage");
    Ok(())
}

/// Generate an opaque join code of `length` characters.
pub fn generate_join_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let index = rng.random_range(0..JOIN_CODE_CHARSET.len());
            JOIN_CODE_CHARSET[index] as char
        })
        .collect()
}
