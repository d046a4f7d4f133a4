use tracing::{debug, info};
use validator::Validate;

use crate::{
    dto::ws::{JoinPayload, QuestionPayload, ServerMessage},
    error::ServiceError,
    services::websocket_service::{broadcast, send_to_connection},
    state::{ConnectionId, Participant, SessionContext, SessionPhase, SharedState},
};

/// Admit a connection into the waiting lobby as a participant.
pub async fn join(
    state: &SharedState,
    connection_id: ConnectionId,
    payload: JoinPayload,
) -> Result<(), ServiceError> {
    payload
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("invalid join request: {err}")))?;

    let (name, count) = {
        let mut slot = state.session().lock().await;
        if slot.phase() != SessionPhase::Waiting {
            return Err(ServiceError::InvalidInput(
                "session is not ready or already started".into(),
            ));
        }

        let Some(ctx) = slot.context.as_mut() else {
            return Err(ServiceError::StateConflict(
                "no session occupies the slot".into(),
            ));
        };

        if payload.join_code != ctx.join_code {
            return Err(ServiceError::InvalidJoinCode);
        }

        if ctx.name_taken(&payload.name) {
            return Err(ServiceError::NameTaken(payload.name));
        }

        let participant = Participant::new(payload.name.clone(), payload.branch, payload.year);
        ctx.participants.insert(connection_id, participant);
        (payload.name, ctx.participants.len())
    };

    info!(id = %connection_id, name = %name, count, "participant joined");
    broadcast(state, &ServerMessage::ParticipantCount { count });
    send_to_connection(state, connection_id, &ServerMessage::Joined { name });

    Ok(())
}

/// Advance this participant's cursor and serve their next question.
///
/// Ignored outside an active session or for connections that never joined —
/// the client simply gets nothing back, mirroring the pacing contract where
/// only joined participants drive their own sequence.
pub async fn request_next_question(
    state: &SharedState,
    connection_id: ConnectionId,
) -> Result<(), ServiceError> {
    enum NextStep {
        Question(QuestionPayload, usize),
        SequenceDone(i64),
    }

    let step = {
        let mut slot = state.session().lock().await;
        if slot.phase() != SessionPhase::Active {
            debug!(id = %connection_id, "question request outside active session ignored");
            return Ok(());
        }

        let Some(ctx) = slot.context.as_mut() else {
            return Ok(());
        };
        let SessionContext {
            questions,
            participants,
            ..
        } = ctx;
        let Some(participant) = participants.get_mut(&connection_id) else {
            debug!(id = %connection_id, "question request from non-participant ignored");
            return Ok(());
        };

        let next = participant.cursor.map_or(0, |cursor| cursor + 1);
        participant.cursor = Some(next);

        match questions.get(next) {
            Some(question) => NextStep::Question(QuestionPayload::from(question), next),
            None => NextStep::SequenceDone(participant.score),
        }
    };

    match step {
        NextStep::Question(question, index) => {
            send_to_connection(
                state,
                connection_id,
                &ServerMessage::Question { question, index },
            );
        }
        NextStep::SequenceDone(score) => {
            send_to_connection(state, connection_id, &ServerMessage::SessionFinished { score });
        }
    }

    Ok(())
}

/// Remove a departed connection's participant, if any, and refresh the count.
///
/// Never fails the session; viewers disconnecting simply drop out of the
/// broadcast audience.
pub async fn disconnect(state: &SharedState, connection_id: ConnectionId) {
    let count = {
        let mut slot = state.session().lock().await;
        match slot.context.as_mut() {
            Some(ctx) => {
                if ctx.participants.shift_remove(&connection_id).is_some() {
                    info!(id = %connection_id, "participant left");
                }
                ctx.participants.len()
            }
            None => 0,
        }
    };

    broadcast(state, &ServerMessage::ParticipantCount { count });
}
