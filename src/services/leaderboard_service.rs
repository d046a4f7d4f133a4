use tracing::warn;

use crate::{
    dto::{session::LeaderboardSnapshot, ws::ServerMessage},
    error::ServiceError,
    services::websocket_service::{broadcast, send_to_connection},
    state::{ConnectionId, SharedState},
};

/// Compute the ranked snapshot for the quiz currently assigned to the slot.
///
/// With no session assigned this returns an empty result set with no quiz
/// name rather than an error, so viewers can poll at any time.
pub async fn snapshot(state: &SharedState) -> Result<LeaderboardSnapshot, ServiceError> {
    let (owner_id, quiz_id, quiz_name) = {
        let slot = state.session().lock().await;
        match slot.context.as_ref() {
            Some(ctx) => (ctx.owner_id, ctx.quiz_id, ctx.quiz_name.clone()),
            None => return Ok(LeaderboardSnapshot::empty()),
        }
    };

    let store = state.store_for_owner(owner_id).await?;
    let rows = store
        .top_results(quiz_id, state.config().leaderboard_limit)
        .await?;

    Ok(LeaderboardSnapshot {
        results: rows.into_iter().map(Into::into).collect(),
        quiz_name,
    })
}

/// Recompute the snapshot and fan it out to every connection.
///
/// Called after each successful score change; viewers are included by design
/// of the single-session model. Failures are logged, never propagated: a
/// stale leaderboard is an accepted consistency gap.
pub async fn broadcast_snapshot(state: &SharedState) {
    match snapshot(state).await {
        Ok(snapshot) => {
            broadcast(
                state,
                &ServerMessage::LeaderboardUpdate {
                    results: snapshot.results,
                    quiz_name: snapshot.quiz_name,
                },
            );
        }
        Err(err) => {
            warn!(error = %err, "failed to compute leaderboard snapshot");
        }
    }
}

/// Push the current snapshot to a single connection on demand.
pub async fn send_snapshot(
    state: &SharedState,
    connection_id: ConnectionId,
) -> Result<(), ServiceError> {
    let snapshot = snapshot(state).await?;
    send_to_connection(
        state,
        connection_id,
        &ServerMessage::LeaderboardUpdate {
            results: snapshot.results,
            quiz_name: snapshot.quiz_name,
        },
    );
    Ok(())
}
