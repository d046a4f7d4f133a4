use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{ClientMessage, ServerMessage, phase_status},
    error::ServiceError,
    services::{leaderboard_service, participant_service, scoring_service},
    state::{ConnectionId, PlayerConnection, SharedState},
};

/// Handle the full lifecycle for an individual realtime connection.
///
/// Every socket, whether it becomes a participant or stays a display-only
/// viewer, is registered here and receives all broadcasts.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let connection_id: ConnectionId = Uuid::new_v4();
    state.connections().insert(
        connection_id,
        PlayerConnection {
            id: connection_id,
            tx: outbound_tx.clone(),
        },
    );

    info!(id = %connection_id, "client connected");

    greet(&state, &outbound_tx).await;

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(inbound) => dispatch(&state, connection_id, &outbound_tx, inbound).await,
                Err(err) => {
                    warn!(id = %connection_id, error = %err, "failed to parse client message");
                    send_message(
                        &outbound_tx,
                        &ServerMessage::Error {
                            message: "malformed message".into(),
                        },
                    );
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(id = %connection_id, "client closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(id = %connection_id, error = %err, "websocket error");
                break;
            }
        }
    }

    state.connections().remove(&connection_id);
    participant_service::disconnect(&state, connection_id).await;
    info!(id = %connection_id, "client disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Send the connect greeting: the session the client walked into, plus the
/// current participant count to everyone.
async fn greet(state: &SharedState, tx: &mpsc::UnboundedSender<Message>) {
    let (status, quiz_name, count) = {
        let slot = state.session().lock().await;
        (
            phase_status(slot.phase()).to_owned(),
            slot.quiz_name().unwrap_or_default().to_owned(),
            slot.participant_count(),
        )
    };

    send_message(tx, &ServerMessage::SessionState { status, quiz_name });
    broadcast(state, &ServerMessage::ParticipantCount { count });
}

/// Route one inbound message to its handler, converting failures into an
/// `error` event for the offending connection only.
async fn dispatch(
    state: &SharedState,
    connection_id: ConnectionId,
    tx: &mpsc::UnboundedSender<Message>,
    inbound: ClientMessage,
) {
    let outcome: Result<(), ServiceError> = match inbound {
        ClientMessage::Join(payload) => {
            participant_service::join(state, connection_id, payload).await
        }
        ClientMessage::RequestNextQuestion => {
            participant_service::request_next_question(state, connection_id).await
        }
        ClientMessage::SubmitAnswer { option_index } => {
            scoring_service::submit_answer(state, connection_id, option_index).await
        }
        ClientMessage::GetLeaderboard => {
            leaderboard_service::send_snapshot(state, connection_id).await
        }
    };

    if let Err(err) = outcome {
        debug!(id = %connection_id, error = %err, "realtime operation rejected");
        send_message(
            tx,
            &ServerMessage::Error {
                message: err.to_string(),
            },
        );
    }
}

/// Serialize a payload and push it onto the provided connection channel.
///
/// Serialization failures are permanent (a bug in our types) and only logged;
/// a closed writer means the connection is going away and its cleanup path
/// will run shortly, so send errors are ignored.
pub fn send_message<T>(tx: &mpsc::UnboundedSender<Message>, value: &T)
where
    T: ?Sized + Serialize + std::fmt::Debug,
{
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{value:?}`");
            return;
        }
    };

    let _ = tx.send(Message::Text(payload.into()));
}

/// Push a payload to one connection by id, if it is still registered.
pub fn send_to_connection<T>(state: &SharedState, connection_id: ConnectionId, value: &T)
where
    T: ?Sized + Serialize + std::fmt::Debug,
{
    let Some(connection) = state.connections().get(&connection_id) else {
        debug!(id = %connection_id, "dropping message for unknown connection");
        return;
    };

    let tx = connection.tx.clone();
    drop(connection);
    send_message(&tx, value);
}

/// Push a payload to every live connection, viewers included.
pub fn broadcast<T>(state: &SharedState, value: &T)
where
    T: ?Sized + Serialize + std::fmt::Debug,
{
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(err) => {
            warn!(error = %err, "failed to serialize broadcast `{value:?}`");
            return;
        }
    };

    for connection in state.connections().iter() {
        let _ = connection.tx.send(Message::Text(payload.clone().into()));
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
