use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::{
    dao::models::ResultEntity,
    dto::ws::ServerMessage,
    error::ServiceError,
    services::{leaderboard_service, websocket_service::send_to_connection},
    state::{ConnectionId, SessionContext, SharedState},
};

/// Score one answer submission for a participant's current question.
///
/// Submissions with no current question, or for a question already answered,
/// are silent no-ops: duplicates must not double-score (idempotency) and the
/// client treats missing feedback as "already handled". The whole
/// check-then-score step runs under the session slot lock, so it is atomic
/// with respect to every other handler.
pub async fn submit_answer(
    state: &SharedState,
    connection_id: ConnectionId,
    option_index: Option<u32>,
) -> Result<(), ServiceError> {
    let mut slot = state.session().lock().await;

    let Some(ctx) = slot.context.as_mut() else {
        return Ok(());
    };
    // Split the context into disjoint field borrows so the participant can
    // be mutated while the question list stays readable.
    let SessionContext {
        owner_id,
        quiz_id,
        questions,
        participants,
        ..
    } = ctx;
    let (owner_id, quiz_id) = (*owner_id, *quiz_id);
    let Some(participant) = participants.get_mut(&connection_id) else {
        return Ok(());
    };
    let Some(question) = participant
        .cursor
        .and_then(|cursor| questions.get(cursor))
    else {
        debug!(id = %connection_id, "answer without a current question ignored");
        return Ok(());
    };

    if participant.answers.contains_key(&question.id) {
        debug!(id = %connection_id, question = %question.id, "duplicate answer ignored");
        return Ok(());
    }

    let is_correct = option_index == Some(question.correct_option_index);
    let score_change: i64 = if is_correct {
        i64::from(question.positive_score)
    } else if option_index.is_some() {
        -i64::from(question.negative_score)
    } else {
        // Client-reported timeout: recorded, but worth nothing either way.
        0
    };

    participant.score += score_change;
    participant.answers.insert(question.id, option_index);

    let ack = ServerMessage::AnswerResult {
        is_correct,
        score_change,
        correct_option_index: question.correct_option_index,
        selected_option_index: option_index,
        score: participant.score,
    };

    let result = ResultEntity {
        quiz_id,
        name: participant.name.clone(),
        branch: participant.branch.clone(),
        year: participant.year.clone(),
        score: participant.score,
        finish_time_ms: now_unix_millis(),
        answers: participant.answers.clone(),
    };

    // The in-memory score is authoritative for the submitter; acknowledge
    // before attempting the write-through.
    send_to_connection(state, connection_id, &ack);

    // Still under the slot lock: the write-through is part of this handler's
    // run-to-completion step. A failed write is not retried; the leaderboard
    // and exported history may lag behind this participant's ack.
    match state.store_for_owner(owner_id).await {
        Ok(store) => {
            if let Err(err) = store.upsert_result(result).await {
                warn!(id = %connection_id, error = %err, "failed to persist result");
            }
        }
        Err(err) => {
            warn!(id = %connection_id, error = %err, "storage unavailable; result not persisted");
        }
    }

    drop(slot);
    leaderboard_service::broadcast_snapshot(state).await;

    Ok(())
}

/// Current wall clock as unix milliseconds, for result finish times.
fn now_unix_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
