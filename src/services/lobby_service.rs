//! Roster management: player registration and kicks.

use uuid::Uuid;

use crate::{
    dto::{game::PlayerSummary, wire::HostMessage},
    error::ServiceError,
    services::sse_events,
    state::{SharedState, game::epoch_ms, state_machine::GamePhase},
};

/// Register a player under their channel id.
///
/// Joining is accepted in any phase of a hosted game; a player who joins
/// mid-game simply misses the earlier rounds. A second registration under
/// the same channel id replaces the first one wholesale (last write wins),
/// including score and coins.
pub async fn register_player(
    state: &SharedState,
    peer_id: Uuid,
    name: String,
    avatar: String,
    theme: String,
) -> Result<PlayerSummary, ServiceError> {
    let starting_coins = state.config().starting_coins;
    let now_ms = epoch_ms();

    let (summary, player_count) = state
        .with_session_mut(|session| {
            let player =
                session.register_player(peer_id, name, avatar, theme, starting_coins, now_ms);
            Ok((PlayerSummary::from(&player), session.roster.len()))
        })
        .await?;

    sse_events::broadcast_player_joined(state, summary.clone(), player_count);
    Ok(summary)
}

/// Kick a player: notify them, drop their channel and, while still in the
/// lobby, remove them from the roster. Once the game runs the roster entry
/// stays so past scores keep their owner.
pub async fn kick_player(state: &SharedState, peer_id: Uuid) -> Result<(), ServiceError> {
    let phase = state.phase().await;

    let known = state
        .read_session(|maybe| {
            maybe.is_some_and(|session| session.roster.contains_key(&peer_id))
        })
        .await;
    if !known {
        return Err(ServiceError::NotFound(format!("player `{peer_id}`")));
    }

    if phase == GamePhase::Lobby {
        state
            .with_session_mut(|session| {
                session.roster.shift_remove(&peer_id);
                Ok(())
            })
            .await?;
    }

    state.peers().send(&peer_id, HostMessage::Kick);
    state.peers().remove(&peer_id);
    sse_events::broadcast_player_kicked(state, peer_id);
    Ok(())
}
